//! journal 固有のドメイン型（型と不変条件）

pub mod access;
pub mod command;
pub mod config;
pub mod draft;
pub mod filter;
pub mod keywords;
pub mod photo;
pub mod place_entry;
pub mod route;

pub use access::{AccessState, AllowList, RouteDecision};
pub use command::{DraftFields, JournalCommand, ListFilter};
pub use config::{AppConfig, ConfigFile};
pub use draft::{DreamPayload, MemoryDraft, MemoryPayload};
pub use filter::{apply_filters, FilterState};
pub use keywords::{derive_available_keywords, merge_keyword_suggestions};
pub use place_entry::{Coordinate, Dream, MediaItem, Memory, PlaceCandidate, PlaceEntry};
pub use route::Route;

//! Outbound ポート（journal 固有）

pub mod place_search;
pub mod router;

pub use place_search::PlaceSearch;
pub use router::Router;

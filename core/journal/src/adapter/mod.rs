//! アダプター（journal 固有の Outbound 実装）

pub mod config;
pub mod google_places;
pub mod history_router;

pub use config::load_app_config;
pub use google_places::{GooglePlacesSearch, DEFAULT_CENTER};
pub use history_router::HistoryRouter;

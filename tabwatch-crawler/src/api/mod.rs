//! HTTP API handlers for tabwatch-crawler

pub mod health;
pub mod lists;
pub mod songs;
pub mod sync;
pub mod ui;

pub use health::health_routes;
pub use lists::list_routes;
pub use songs::song_routes;
pub use sync::sync_routes;
pub use ui::ui_routes;

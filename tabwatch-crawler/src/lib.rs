//! tabwatch-crawler library
//!
//! Crawls a song-tablature listing page, classifies entries into general,
//! video, piano, followed and favorite buckets, and serves them over HTTP.

pub mod api;
pub mod classifier;
pub mod crawler;
pub mod dedupe;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod snapshot;
pub mod store;

pub use crate::crawler::Crawler;
pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Crawler service shared with the scheduler
    pub crawler: Arc<Crawler>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(crawler: Arc<Crawler>) -> Self {
        Self {
            crawler,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::song_routes())
        .merge(api::sync_routes())
        .merge(api::list_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

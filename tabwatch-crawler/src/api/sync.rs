//! Fire-and-forget cycle triggers
//!
//! POST /api/sync, POST /api/add_url, POST /api/backfill
//!
//! Each handler spawns the cycle and returns 202 immediately. There is no
//! completion signal; callers poll GET /api/songs to observe effects.

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{error::{ApiError, ApiResult}, AppState};

/// POST /api/add_url request
#[derive(Debug, Deserialize)]
pub struct AddUrlRequest {
    #[serde(default)]
    pub url: String,
}

/// Acknowledgment for a started background cycle
#[derive(Debug, Serialize)]
pub struct StartedResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<usize>,
}

impl StartedResponse {
    fn started() -> Self {
        Self {
            status: "started",
            pending: None,
        }
    }
}

/// POST /api/sync
pub async fn start_sync(State(state): State<AppState>) -> (StatusCode, Json<StartedResponse>) {
    let crawler = state.crawler.clone();
    tokio::spawn(async move {
        tracing::info!("Manual sync started");
        crawler.sync_all().await;
    });

    (StatusCode::ACCEPTED, Json(StartedResponse::started()))
}

/// POST /api/add_url
pub async fn add_url(
    State(state): State<AppState>,
    Json(request): Json<AddUrlRequest>,
) -> ApiResult<(StatusCode, Json<StartedResponse>)> {
    let url = request.url.trim().to_string();
    if url.is_empty() {
        return Err(ApiError::BadRequest("url must not be empty".to_string()));
    }
    if reqwest::Url::parse(&url).is_err() {
        return Err(ApiError::BadRequest(format!("not an absolute URL: {}", url)));
    }

    let crawler = state.crawler.clone();
    tokio::spawn(async move {
        tracing::info!(url = %url, "Manual add started");
        crawler.add_url(&url).await;
    });

    Ok((StatusCode::ACCEPTED, Json(StartedResponse::started())))
}

/// POST /api/backfill
pub async fn start_backfill(State(state): State<AppState>) -> (StatusCode, Json<StartedResponse>) {
    let pending = state.crawler.favorites_missing_metadata().await.len();

    if pending > 0 {
        let crawler = state.crawler.clone();
        tokio::spawn(async move {
            crawler.backfill_favorites().await;
        });
    }

    (
        StatusCode::ACCEPTED,
        Json(StartedResponse {
            status: "started",
            pending: Some(pending),
        }),
    )
}

pub fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sync", post(start_sync))
        .route("/api/add_url", post(add_url))
        .route("/api/backfill", post(start_backfill))
}

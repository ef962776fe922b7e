//! Follow/favorite toggles
//!
//! POST /api/follow and POST /api/favorite: synchronous add-or-remove.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{crawler::ListKind, error::ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub status: &'static str,
    /// Whether the value is in the list after the toggle
    pub active: bool,
}

/// POST /api/follow
pub async fn toggle_follow(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<ToggleResponse>> {
    let active = state
        .crawler
        .toggle(ListKind::FollowedArtists, &request.value)
        .await?;
    Ok(Json(ToggleResponse {
        status: "success",
        active,
    }))
}

/// POST /api/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<ToggleResponse>> {
    let active = state
        .crawler
        .toggle(ListKind::Favorites, &request.value)
        .await?;
    Ok(Json(ToggleResponse {
        status: "success",
        active,
    }))
}

pub fn list_routes() -> Router<AppState> {
    Router::new()
        .route("/api/follow", post(toggle_follow))
        .route("/api/favorite", post(toggle_favorite))
}

//! Read API
//!
//! GET /api/songs returns the five dashboard sequences plus their counts.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{
    models::SongRecord,
    snapshot::{Snapshot, SnapshotCounts},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct SongsResponse {
    /// Newest discoveries first
    pub general: Vec<SongRecord>,
    pub video: Vec<SongRecord>,
    pub piano: Vec<SongRecord>,
    pub followed: Vec<SongRecord>,
    pub favorites: Vec<SongRecord>,
    pub counts: SnapshotCounts,
    pub followed_artists: Vec<String>,
    pub favorite_urls: Vec<String>,
}

impl From<Snapshot> for SongsResponse {
    fn from(snapshot: Snapshot) -> Self {
        let counts = snapshot.counts();
        let mut general = snapshot.general;
        // Stable, so same-day records keep store order.
        general.sort_by(|a, b| b.discovered_at.cmp(&a.discovered_at));

        Self {
            general,
            video: snapshot.video,
            piano: snapshot.piano,
            followed: snapshot.followed,
            favorites: snapshot.favorites,
            counts,
            followed_artists: snapshot.followed_artists,
            favorite_urls: snapshot.favorite_urls,
        }
    }
}

/// GET /api/songs
pub async fn get_songs(State(state): State<AppState>) -> Json<SongsResponse> {
    Json(state.crawler.snapshot().await.into())
}

pub fn song_routes() -> Router<AppState> {
    Router::new().route("/api/songs", get(get_songs))
}

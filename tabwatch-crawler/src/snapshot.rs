//! Read-only views for presentation

use serde::Serialize;

use crate::classifier::is_followed;
use crate::dedupe::dedupe;
use crate::models::SongRecord;
use crate::pipeline::PipelineState;
use crate::store::SongStore;

/// Point-in-time copy of everything the dashboard renders
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub general: Vec<SongRecord>,
    pub video: Vec<SongRecord>,
    pub piano: Vec<SongRecord>,
    pub followed: Vec<SongRecord>,
    pub favorites: Vec<SongRecord>,
    pub followed_artists: Vec<String>,
    pub favorite_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotCounts {
    pub general: usize,
    pub video: usize,
    pub piano: usize,
    pub followed: usize,
    pub favorites: usize,
}

impl Snapshot {
    pub fn from_state(state: &PipelineState) -> Self {
        let piano = dedupe(state.permanent.values().filter(|r| r.is_piano).cloned());

        let mut followed = dedupe(
            state
                .permanent
                .values()
                .filter(|r| is_followed(&state.followed_artists, r))
                .cloned(),
        );
        followed.sort_by(|a, b| a.artist.cmp(&b.artist));

        // Later stores override earlier ones for the same URL.
        let mut all_known = SongStore::from_records(state.general.values().cloned());
        for record in state.video.values().chain(state.permanent.values()) {
            all_known.upsert(record.clone());
        }
        let favorites = dedupe(
            all_known
                .values()
                .filter(|r| state.favorite_urls.iter().any(|u| u == &r.url))
                .cloned(),
        );

        Self {
            general: state.general.to_vec(),
            video: state.video.to_vec(),
            piano,
            followed,
            favorites,
            followed_artists: state.followed_artists.clone(),
            favorite_urls: state.favorite_urls.clone(),
        }
    }

    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            general: self.general.len(),
            video: self.video.len(),
            piano: self.piano.len(),
            followed: self.followed.len(),
            favorites: self.favorites.len(),
        }
    }
}

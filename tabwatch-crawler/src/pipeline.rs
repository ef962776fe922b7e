//! Pipeline state: follow/favorite lists plus the three song stores
//!
//! Every method here is synchronous and operates on state already guarded by
//! the crawler's lock, so a merge is never observable half-done.

use std::path::{Path, PathBuf};
use tabwatch_common::list_file::{append_unique, load_list, save_list};
use tabwatch_common::Result;
use tracing::{error, info};

use crate::classifier::is_followed;
use crate::models::SongRecord;
use crate::store::{load_store, save_store, SongStore};

/// File locations inside the data folder
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub general: PathBuf,
    pub video: PathBuf,
    pub permanent: PathBuf,
    pub followed_artists: PathBuf,
    pub favorites: PathBuf,
}

impl DataPaths {
    pub fn new(data_folder: &Path) -> Self {
        Self {
            general: data_folder.join("general_pipeline.json"),
            video: data_folder.join("video_pipeline.json"),
            permanent: data_folder.join("followed_songs_db.json"),
            followed_artists: data_folder.join("followed_artists.txt"),
            favorites: data_folder.join("favorites.txt"),
        }
    }
}

/// Retention caps for the bounded stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionCaps {
    pub general: usize,
    pub video: usize,
}

impl Default for RetentionCaps {
    fn default() -> Self {
        Self {
            general: 50,
            video: 20,
        }
    }
}

/// Counts reported after a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub scraped: usize,
    pub piano: usize,
    pub video_candidates: usize,
    pub general_candidates: usize,
    pub followed: usize,
    pub general_size: usize,
    pub video_size: usize,
    pub permanent_size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub followed_artists: Vec<String>,
    pub favorite_urls: Vec<String>,
    pub general: SongStore,
    pub video: SongStore,
    pub permanent: SongStore,
}

impl PipelineState {
    /// Load lists and stores; anything missing or corrupt starts empty
    pub fn load(paths: &DataPaths) -> Self {
        let state = Self {
            followed_artists: load_list(&paths.followed_artists),
            favorite_urls: load_list(&paths.favorites),
            general: load_store(&paths.general),
            video: load_store(&paths.video),
            permanent: load_store(&paths.permanent),
        };

        info!(
            general = state.general.len(),
            video = state.video.len(),
            permanent = state.permanent.len(),
            followed_artists = state.followed_artists.len(),
            favorites = state.favorite_urls.len(),
            "Loaded pipeline state"
        );
        state
    }

    /// Route freshly scraped records into the stores
    ///
    /// Piano records go only to `permanent`. Video records are candidates
    /// for `video`. Everything else is a `general` candidate and is also kept
    /// in `permanent` when its artist is followed.
    pub fn merge_scraped(&mut self, scraped: Vec<SongRecord>, caps: RetentionCaps) -> MergeSummary {
        let mut summary = MergeSummary {
            scraped: scraped.len(),
            ..MergeSummary::default()
        };

        let mut new_general = Vec::new();
        let mut new_video = Vec::new();

        for record in scraped {
            if record.is_piano {
                summary.piano += 1;
                self.permanent.upsert(record);
                continue;
            }
            if record.is_video {
                new_video.push(record);
                continue;
            }
            if is_followed(&self.followed_artists, &record) {
                summary.followed += 1;
                self.permanent.upsert(record.clone());
            }
            new_general.push(record);
        }

        summary.general_candidates = new_general.len();
        summary.video_candidates = new_video.len();

        self.general = self.general.merged_with(new_general, caps.general);
        self.video = self.video.merged_with(new_video, caps.video);

        summary.general_size = self.general.len();
        summary.video_size = self.video.len();
        summary.permanent_size = self.permanent.len();
        summary
    }

    /// Manual-add bookkeeping: favorite the URL, keep any existing record
    ///
    /// Returns `(favorite_added, record_inserted)`.
    pub fn apply_manual_add(&mut self, record: SongRecord) -> (bool, bool) {
        let favorite_added = append_unique(&mut self.favorite_urls, &record.url);
        let inserted = self.permanent.insert_if_absent(record);
        (favorite_added, inserted)
    }

    /// Favorites with no record in `permanent`
    pub fn favorites_missing_metadata(&self) -> Vec<String> {
        self.favorite_urls
            .iter()
            .filter(|url| !self.permanent.contains(url))
            .cloned()
            .collect()
    }

    /// Write all three stores; every store is attempted even if one fails
    pub fn persist_stores(&self, paths: &DataPaths) -> Result<()> {
        let results = [
            save_store(&paths.general, &self.general),
            save_store(&paths.video, &self.video),
            save_store(&paths.permanent, &self.permanent),
        ];

        let mut first_error = None;
        for result in results {
            if let Err(e) = result {
                error!(error = %e, "Failed to persist store");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn persist_permanent(&self, paths: &DataPaths) -> Result<()> {
        save_store(&paths.permanent, &self.permanent)
    }

    pub fn persist_favorites(&self, paths: &DataPaths) -> Result<()> {
        save_list(&paths.favorites, &self.favorite_urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn song(title: &str, artist: &str, url: &str) -> SongRecord {
        SongRecord {
            title: title.to_string(),
            artist: artist.to_string(),
            url: url.to_string(),
            tags: Vec::new(),
            is_piano: false,
            is_video: false,
            discovered_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_piano_takes_priority_over_video() {
        let mut state = PipelineState::default();
        let mut record = song("P", "a", "u1");
        record.is_piano = true;
        record.is_video = true;

        let summary = state.merge_scraped(vec![record], RetentionCaps::default());

        assert_eq!(summary.piano, 1);
        assert!(state.permanent.contains("u1"));
        assert!(!state.video.contains("u1"));
        assert!(!state.general.contains("u1"));
    }

    #[test]
    fn test_followed_general_record_lands_in_both() {
        let mut state = PipelineState {
            followed_artists: vec!["aimer".to_string()],
            ..PipelineState::default()
        };
        state.merge_scraped(vec![song("Ref:rain", "Aimer", "u1")], RetentionCaps::default());

        assert!(state.general.contains("u1"));
        assert!(state.permanent.contains("u1"));
    }

    #[test]
    fn test_followed_video_record_not_made_permanent() {
        let mut state = PipelineState {
            followed_artists: vec!["aimer".to_string()],
            ..PipelineState::default()
        };
        let mut record = song("V", "Aimer", "u1");
        record.is_video = true;
        state.merge_scraped(vec![record], RetentionCaps::default());

        assert!(state.video.contains("u1"));
        assert!(!state.permanent.contains("u1"));
    }

    #[test]
    fn test_permanent_keeps_content_duplicates() {
        let mut state = PipelineState::default();
        let mut a = song("Same", "x", "u1");
        a.is_piano = true;
        let mut b = song("Same", "x", "u2");
        b.is_piano = true;

        state.merge_scraped(vec![a, b], RetentionCaps::default());
        assert_eq!(state.permanent.len(), 2);
    }

    #[test]
    fn test_manual_add_is_idempotent() {
        let mut state = PipelineState::default();
        assert_eq!(state.apply_manual_add(song("A", "b", "u1")), (true, true));
        assert_eq!(state.apply_manual_add(song("Changed", "b", "u1")), (false, false));
        assert_eq!(state.favorite_urls, vec!["u1"]);
        assert_eq!(state.permanent.get("u1").unwrap().title, "A");
    }

    #[test]
    fn test_favorites_missing_metadata() {
        let mut state = PipelineState {
            favorite_urls: vec!["u1".to_string(), "u2".to_string()],
            ..PipelineState::default()
        };
        state.permanent.upsert(song("A", "b", "u1"));
        assert_eq!(state.favorites_missing_metadata(), vec!["u2"]);
    }
}

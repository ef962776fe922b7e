//! Crawl orchestration
//!
//! A cycle is Idle → Fetching → Extracting → Merging → Persisting → Idle, or
//! Idle → Fetching → Idle when the fetch fails. Fetching and extraction run
//! without the lock; merge and persist happen inside one lock acquisition so
//! readers see either the old or the new state, never a mix.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tabwatch_common::config::TomlConfig;
use tabwatch_common::list_file::{load_list, save_list, toggle_entry};
use tabwatch_common::{Error, Result};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::classifier::MarkerTable;
use crate::extractor::{extract_detail, extract_listing};
use crate::fetcher::PageFetcher;
use crate::models::{CycleState, SongRecord};
use crate::pipeline::{DataPaths, MergeSummary, PipelineState, RetentionCaps};
use crate::snapshot::Snapshot;

/// Tunables for a crawl cycle
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub listing_url: String,
    pub max_items: usize,
    pub caps: RetentionCaps,
    pub markers: MarkerTable,
    pub fetch_timeout: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}

impl From<&TomlConfig> for CrawlSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            listing_url: config.listing_url.clone(),
            max_items: config.max_items,
            caps: RetentionCaps {
                general: config.general_cap,
                video: config.video_cap,
            },
            markers: MarkerTable::from(&config.markers),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }
}

/// Result of a full crawl cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Stores merged; `persisted` is false if any store failed to write
    Merged { summary: MergeSummary, persisted: bool },
    /// Fetch failed; nothing changed
    Skipped,
}

/// Which list a toggle applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    FollowedArtists,
    Favorites,
}

/// Long-lived crawler service
///
/// Constructed once at startup and shared via `Arc` with the scheduler and
/// the HTTP handlers.
pub struct Crawler {
    state: Mutex<PipelineState>,
    paths: DataPaths,
    fetcher: Arc<dyn PageFetcher>,
    settings: CrawlSettings,
    last_sync: RwLock<Option<DateTime<Utc>>>,
}

impl Crawler {
    /// Load persisted state from `paths` and build the service
    pub fn new(paths: DataPaths, fetcher: Arc<dyn PageFetcher>, settings: CrawlSettings) -> Self {
        let state = PipelineState::load(&paths);
        Self {
            state: Mutex::new(state),
            paths,
            fetcher,
            settings,
            last_sync: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    pub async fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.read().await
    }

    /// Run one full crawl cycle against the listing page
    pub async fn sync_all(&self) -> CycleOutcome {
        self.sync_all_on(tabwatch_common::time::today_local()).await
    }

    /// Full crawl cycle with an explicit discovery date
    pub async fn sync_all_on(&self, today: NaiveDate) -> CycleOutcome {
        // Lists are re-read so edits made outside the service are honored.
        {
            let mut state = self.state.lock().await;
            state.followed_artists = load_list(&self.paths.followed_artists);
            state.favorite_urls = load_list(&self.paths.favorites);
        }

        let url = self.settings.listing_url.as_str();
        log_phase(CycleState::Fetching, url);
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %url, error = %e, "Listing fetch failed, skipping cycle");
                log_phase(CycleState::Idle, url);
                return CycleOutcome::Skipped;
            }
        };

        log_phase(CycleState::Extracting, url);
        let scraped = match extract_listing(
            &html,
            url,
            self.settings.max_items,
            today,
            &self.settings.markers,
        ) {
            Ok(records) => records,
            Err(e) => {
                warn!(url = %url, error = %e, "Listing extraction failed, skipping cycle");
                log_phase(CycleState::Idle, url);
                return CycleOutcome::Skipped;
            }
        };

        let outcome = {
            let mut state = self.state.lock().await;

            log_phase(CycleState::Merging, url);
            let summary = state.merge_scraped(scraped, self.settings.caps);

            log_phase(CycleState::Persisting, url);
            let persisted = match state.persist_stores(&self.paths) {
                Ok(()) => true,
                Err(e) => {
                    error!(error = %e, "Persisting stores failed; in-memory state retained");
                    false
                }
            };

            CycleOutcome::Merged { summary, persisted }
        };

        *self.last_sync.write().await = Some(Utc::now());
        log_phase(CycleState::Idle, url);

        if let CycleOutcome::Merged { summary, persisted } = outcome {
            info!(
                scraped = summary.scraped,
                piano = summary.piano,
                followed = summary.followed,
                general = summary.general_size,
                video = summary.video_size,
                permanent = summary.permanent_size,
                persisted,
                "Sync cycle completed"
            );
        }
        outcome
    }

    /// Fetch one detail page, keep it in `permanent`, and favorite its URL
    ///
    /// An existing `permanent` record for the URL is left untouched. Returns
    /// `None` when the page cannot be fetched.
    pub async fn add_url(&self, url: &str) -> Option<SongRecord> {
        self.add_url_on(url, tabwatch_common::time::today_local()).await
    }

    pub async fn add_url_on(&self, url: &str, today: NaiveDate) -> Option<SongRecord> {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %url, error = %e, "Manual add fetch failed");
                return None;
            }
        };

        let record = extract_detail(&html, url, today, &self.settings.markers);

        let mut state = self.state.lock().await;
        let (favorite_added, inserted) = state.apply_manual_add(record.clone());

        if let Err(e) = state.persist_favorites(&self.paths) {
            error!(error = %e, "Failed to save favorites list");
        }
        if let Err(e) = state.persist_permanent(&self.paths) {
            error!(error = %e, "Failed to persist permanent store");
        }

        info!(
            url = %url,
            title = %record.title,
            artist = %record.artist,
            favorite_added,
            inserted,
            "Manual add completed"
        );
        Some(record)
    }

    /// Manual-add every favorite that has no record yet; returns URLs tried
    pub async fn backfill_favorites(&self) -> usize {
        let missing = self.favorites_missing_metadata().await;
        if missing.is_empty() {
            debug!("No favorites missing metadata");
            return 0;
        }

        info!(count = missing.len(), "Backfilling favorites missing metadata");
        for url in &missing {
            self.add_url(url).await;
        }
        missing.len()
    }

    pub async fn favorites_missing_metadata(&self) -> Vec<String> {
        self.state.lock().await.favorites_missing_metadata()
    }

    /// Toggle membership of `value` in a list; returns whether it is now present
    ///
    /// The list is reloaded from disk, toggled, saved, and swapped into
    /// memory under the lock.
    pub async fn toggle(&self, kind: ListKind, value: &str) -> Result<bool> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidInput("value must not be empty".to_string()));
        }

        let path = match kind {
            ListKind::FollowedArtists => &self.paths.followed_artists,
            ListKind::Favorites => &self.paths.favorites,
        };

        let mut state = self.state.lock().await;
        let mut entries = load_list(path);
        let active = toggle_entry(&mut entries, value);
        save_list(path, &entries)?;

        match kind {
            ListKind::FollowedArtists => state.followed_artists = entries,
            ListKind::Favorites => state.favorite_urls = entries,
        }

        info!(list = ?kind, value = %value, active, "List toggled");
        Ok(active)
    }

    /// Consistent read-only view of all stores and lists
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await;
        Snapshot::from_state(&state)
    }
}

fn log_phase(phase: CycleState, url: &str) {
    debug!(phase = %phase, url = %url, "Cycle phase");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_default_config() {
        let settings = CrawlSettings::default();
        assert_eq!(settings.listing_url, "https://www.ufret.jp/new.php");
        assert_eq!(settings.max_items, 100);
        assert_eq!(settings.caps, RetentionCaps { general: 50, video: 20 });
        assert_eq!(settings.fetch_timeout, Duration::from_secs(12));
    }
}

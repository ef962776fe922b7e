//! Song record model and crawl cycle states

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Title used when cleaning leaves nothing behind
pub const UNKNOWN_TITLE: &str = "Unknown Song";

/// Artist used when the page has no artist field
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// A single classified song entry, identified by its absolute URL
///
/// Records are never edited in place. A merge either re-inserts a whole
/// record under its URL or drops it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub title: String,
    pub artist: String,
    /// Absolute URL; identity key in every store
    pub url: String,
    /// Raw badge labels in page order
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_piano: bool,
    #[serde(default)]
    pub is_video: bool,
    /// Creation date, kept as-is when the record is re-merged
    #[serde(default = "tabwatch_common::time::today_local")]
    pub discovered_at: NaiveDate,
}

impl SongRecord {
    /// Content key used for cross-record deduplication
    ///
    /// Exact and case-sensitive, unlike follow matching.
    pub fn dedupe_key(&self) -> (&str, &str) {
        (self.title.as_str(), self.artist.as_str())
    }
}

/// Phases of one crawl cycle
///
/// A failed fetch returns straight to `Idle` without touching any store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    Fetching,
    Extracting,
    Merging,
    Persisting,
}

impl std::fmt::Display for CycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CycleState::Idle => "idle",
            CycleState::Fetching => "fetching",
            CycleState::Extracting => "extracting",
            CycleState::Merging => "merging",
            CycleState::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let record = SongRecord {
            title: "夜に駆ける".to_string(),
            artist: "YOASOBI".to_string(),
            url: "https://www.ufret.jp/song.php?data=1".to_string(),
            tags: vec!["動画プラス".to_string()],
            is_piano: false,
            is_video: true,
            discovered_at: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["discovered_at"], "2025-01-02");
        assert_eq!(json["is_video"], true);
        assert_eq!(json["tags"][0], "動画プラス");
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let record: SongRecord = serde_json::from_str(
            r#"{"title":"A","artist":"B","url":"https://x/1","discovered_at":"2024-12-31"}"#,
        )
        .unwrap();
        assert!(record.tags.is_empty());
        assert!(!record.is_piano);
        assert!(!record.is_video);
    }
}

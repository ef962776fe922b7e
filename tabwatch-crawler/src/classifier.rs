//! Badge classification and artist-follow matching

use tabwatch_common::config::MarkerConfig;

use crate::models::SongRecord;

/// Badge substrings that mark a record as piano or video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTable {
    pub piano: String,
    pub video: String,
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::from(&MarkerConfig::default())
    }
}

impl From<&MarkerConfig> for MarkerTable {
    fn from(config: &MarkerConfig) -> Self {
        Self {
            piano: config.piano.clone(),
            video: config.video.clone(),
        }
    }
}

/// Derived flags for one set of badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub is_piano: bool,
    pub is_video: bool,
}

impl MarkerTable {
    pub fn classify<S: AsRef<str>>(&self, tags: &[S]) -> Classification {
        Classification {
            is_piano: tags.iter().any(|t| t.as_ref().contains(self.piano.as_str())),
            is_video: tags.iter().any(|t| t.as_ref().contains(self.video.as_str())),
        }
    }
}

/// Case-insensitive substring match of any follow pattern against `artist`
pub fn matches_followed<S: AsRef<str>>(patterns: &[S], artist: &str) -> bool {
    let artist = artist.to_lowercase();
    patterns
        .iter()
        .any(|p| artist.contains(p.as_ref().to_lowercase().as_str()))
}

pub fn is_followed<S: AsRef<str>>(patterns: &[S], record: &SongRecord) -> bool {
    matches_followed(patterns, &record.artist)
}

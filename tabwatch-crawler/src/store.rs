//! URL-keyed song stores and their JSON persistence
//!
//! A store keeps insertion order because truncation drops from the tail.
//! On disk a store is a JSON object `{url: record}` written in that order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tabwatch_common::config::write_atomic;
use tabwatch_common::Result;
use tracing::warn;

use crate::dedupe::dedupe;
use crate::models::SongRecord;

/// Ordered mapping URL → record with unique URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongStore {
    records: Vec<SongRecord>,
    /// URL → position in `records`
    index: HashMap<String, usize>,
}

impl SongStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store, later records replacing earlier ones with the same URL
    ///
    /// A replaced record keeps the position of the first occurrence.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SongRecord>,
    {
        let mut store = Self::new();
        for record in records {
            store.upsert(record);
        }
        store
    }

    /// Insert or replace by URL
    pub fn upsert(&mut self, record: SongRecord) {
        match self.index.get(&record.url) {
            Some(&pos) => self.records[pos] = record,
            None => self.push(record),
        }
    }

    /// Insert only if the URL is not present; returns `true` if inserted
    pub fn insert_if_absent(&mut self, record: SongRecord) -> bool {
        if self.contains(&record.url) {
            return false;
        }
        self.push(record);
        true
    }

    fn push(&mut self, record: SongRecord) {
        self.index.insert(record.url.clone(), self.records.len());
        self.records.push(record);
    }

    pub fn get(&self, url: &str) -> Option<&SongRecord> {
        self.index.get(url).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &SongRecord> {
        self.records.iter()
    }

    pub fn to_vec(&self) -> Vec<SongRecord> {
        self.records.clone()
    }

    /// Merge fresh candidates ahead of the stored records, dedupe, truncate
    ///
    /// Fresh records come first, so on a (title, artist) collision the new
    /// record survives. Records past `cap` are forgotten by this store.
    pub fn merged_with(&self, fresh: Vec<SongRecord>, cap: usize) -> SongStore {
        let combined = fresh.into_iter().chain(self.records.iter().cloned());
        let unique = dedupe(combined);
        SongStore::from_records(unique.into_iter().take(cap))
    }
}

impl Serialize for SongStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.url, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SongStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = SongStore;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of URL to song record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<SongStore, A::Error> {
                let mut store = SongStore::new();
                while let Some((key, mut record)) = access.next_entry::<String, SongRecord>()? {
                    // The key is authoritative for identity.
                    record.url = key;
                    store.upsert(record);
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(StoreVisitor)
    }
}

/// Load a store file; missing or corrupt files yield an empty store
pub fn load_store(path: &Path) -> SongStore {
    if !path.exists() {
        return SongStore::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read store, starting empty");
            return SongStore::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(store) => store,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt store file, starting empty");
            SongStore::new()
        }
    }
}

/// Rewrite a store file wholesale
pub fn save_store(path: &Path, store: &SongStore) -> Result<()> {
    let json = serde_json::to_vec_pretty(store)?;
    write_atomic(path, &json)
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
    fn test_upsert_replaces_in_place() {
        let mut store = SongStore::from_records(vec![song("A", "x", "u1"), song("B", "x", "u2")]);
        store.upsert(song("A2", "x", "u1"));

        let titles: Vec<_> = store.values().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A2", "B"]);
    }

    #[test]
    fn test_lookup_tracks_positions_across_upserts() {
        let mut store = SongStore::from_records((0..1000).map(|i| song(&format!("s{i}"), "a", &format!("u{i}"))));
        store.upsert(song("replaced", "a", "u500"));
        store.upsert(song("appended", "a", "u1000"));

        assert_eq!(store.len(), 1001);
        assert_eq!(store.get("u500").unwrap().title, "replaced");
        assert_eq!(store.get("u999").unwrap().title, "s999");
        assert_eq!(store.get("u1000").unwrap().title, "appended");
        assert!(!store.contains("u1001"));
        assert_eq!(store.values().nth(500).unwrap().url, "u500");
    }

    #[test]
    fn test_insert_if_absent_keeps_existing() {
        let mut store = SongStore::from_records(vec![song("A", "x", "u1")]);
        assert!(!store.insert_if_absent(song("Other", "y", "u1")));
        assert_eq!(store.get("u1").unwrap().title, "A");
        assert!(store.insert_if_absent(song("B", "y", "u2")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_merge_new_wins_on_collision() {
        let existing = SongStore::from_records(vec![song("A", "B", "old")]);
        let merged = existing.merged_with(vec![song("A", "B", "new")], 50);

        assert_eq!(merged.len(), 1);
        assert!(merged.contains("new"));
        assert!(!merged.contains("old"));
    }

    #[test]
    fn test_merge_truncates_tail() {
        let existing = SongStore::from_records((0..3).map(|i| song(&format!("s{i}"), "a", &format!("u{i}"))));
        let merged = existing.merged_with(vec![song("fresh", "a", "uf")], 3);

        let urls: Vec<_> = merged.values().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["uf", "u0", "u1"]);
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let store = SongStore::from_records(vec![
            song("Z", "a", "https://x/z"),
            song("A", "a", "https://x/a"),
            song("M", "a", "https://x/m"),
        ]);
        let json = serde_json::to_string(&store).unwrap();
        let back: SongStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn test_reads_object_keyed_by_url() {
        let json = r#"{
            "https://x/1": {"title":"T","artist":"A","url":"https://x/1","tags":["ピアノ"],
                             "is_piano":true,"is_video":false,"discovered_at":"2024-05-06"}
        }"#;
        let store: SongStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("https://x/1").unwrap().is_piano);
    }
}

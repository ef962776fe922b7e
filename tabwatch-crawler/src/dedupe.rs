//! Content deduplication by (title, artist)

use std::collections::HashSet;

use crate::models::SongRecord;

/// Keep the first record for each (title, artist), preserving input order
///
/// Two different URLs with the same cleaned title and artist collapse into
/// whichever came first.
pub fn dedupe<I>(records: I) -> Vec<SongRecord>
where
    I: IntoIterator<Item = SongRecord>,
{
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::new();

    for record in records {
        let (title, artist) = record.dedupe_key();
        if seen.insert((title.to_owned(), artist.to_owned())) {
            unique.push(record);
        }
    }

    unique
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

    fn urls(records: &[SongRecord]) -> Vec<&str> {
        records.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_first_seen_wins() {
        let out = dedupe(vec![
            song("A", "B", "u1"),
            song("A", "B", "u2"),
            song("C", "D", "u3"),
        ]);
        assert_eq!(urls(&out), vec!["u1", "u3"]);
    }

    #[test]
    fn test_order_of_first_occurrences_preserved() {
        let input = vec![
            song("X", "1", "u1"),
            song("Y", "1", "u2"),
            song("X", "1", "u3"),
            song("Z", "1", "u4"),
            song("Y", "1", "u5"),
        ];
        assert_eq!(urls(&dedupe(input)), vec!["u1", "u2", "u4"]);
    }

    #[test]
    fn test_idempotent() {
        let input = vec![
            song("A", "B", "u1"),
            song("A", "B", "u2"),
            song("A", "C", "u3"),
            song("D", "B", "u4"),
            song("D", "B", "u5"),
        ];
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_key_pairs_title_with_artist() {
        let out = dedupe(vec![song("A", "B", "u1"), song("B", "A", "u2")]);
        assert_eq!(urls(&out), vec!["u1", "u2"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }

    #[test]
    fn test_key_is_case_sensitive() {
        // Follow matching ignores case but dedupe does not; both are kept.
        let out = dedupe(vec![song("Song", "YOASOBI", "u1"), song("Song", "yoasobi", "u2")]);
        assert_eq!(out.len(), 2);
    }
}

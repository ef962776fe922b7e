//! Line-oriented list files
//!
//! One entry per line. Blank lines and `#` comment lines are ignored on load.
//! Loading is tolerant: a missing or unreadable file yields an empty list.
//! Saving rewrites the whole file.

use crate::config::write_atomic;
use crate::Result;
use std::path::Path;
use tracing::warn;

/// Load a list file, treating any failure as an empty list
pub fn load_list(path: &Path) -> Vec<String> {
    if !path.exists() {
        return Vec::new();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => parse_list(&content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read list file, treating as empty");
            Vec::new()
        }
    }
}

/// Parse list content (exposed for tests and in-memory callers)
pub fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Overwrite a list file with `entries`
pub fn save_list(path: &Path, entries: &[String]) -> Result<()> {
    let mut content = entries.join("\n");
    content.push('\n');
    write_atomic(path, content.as_bytes())
}

/// Add `value` if absent, remove it if present
///
/// Returns `true` when the value is in the list afterwards.
pub fn toggle_entry(entries: &mut Vec<String>, value: &str) -> bool {
    if let Some(pos) = entries.iter().position(|e| e == value) {
        entries.remove(pos);
        false
    } else {
        entries.push(value.to_string());
        true
    }
}

/// Append `value` unless already listed; returns `true` if appended
pub fn append_unique(entries: &mut Vec<String>, value: &str) -> bool {
    if entries.iter().any(|e| e == value) {
        return false;
    }
    entries.push(value.to_string());
    true
}

//! HTML extraction for listing and detail pages
//!
//! Listing items are parsed one at a time; a malformed item is logged and
//! skipped so it never aborts the batch.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::classifier::MarkerTable;
use crate::models::{SongRecord, UNKNOWN_ARTIST, UNKNOWN_TITLE};

static LISTING_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.list-group a.list-group-item").expect("valid selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));
static BADGE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.badge").expect("valid selector"));
static STYLED_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span[style]").expect("valid selector"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));

/// Badge-like labels and dates that leak into listing titles
static TITLE_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(U-リク|NEW|追加|初心者|動画プラス|ピアノソロ|ソロ|初級|\d{4}/\d{2}/\d{2})")
        .expect("valid regex")
});

/// Per-item parse failures
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("item has no anchor element")]
    MissingAnchor,

    #[error("cannot resolve href {0:?}")]
    InvalidHref(String),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Extract up to `max_items` listing entries in page order
///
/// The cap counts items examined, not records produced.
pub fn extract_listing(
    html: &str,
    base_url: &str,
    max_items: usize,
    today: NaiveDate,
    markers: &MarkerTable,
) -> Result<Vec<SongRecord>, ParseError> {
    let base = Url::parse(base_url).map_err(|e| ParseError::InvalidBaseUrl(e.to_string()))?;
    let document = Html::parse_document(html);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for item in document.select(&LISTING_ITEM).take(max_items) {
        match extract_item(item, &base, today, markers) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::debug!(error = %e, "Skipping malformed listing item");
            }
        }
    }

    tracing::debug!(extracted = records.len(), skipped, "Listing extraction finished");
    Ok(records)
}

/// Parse one listing item into a song record
pub fn extract_item(
    item: ElementRef<'_>,
    base: &Url,
    today: NaiveDate,
    markers: &MarkerTable,
) -> Result<SongRecord, ParseError> {
    let link = if item.value().name() == "a" {
        item
    } else {
        item.select(&ANCHOR).next().ok_or(ParseError::MissingAnchor)?
    };

    let href = link.value().attr("href").unwrap_or("");
    let url = base
        .join(href)
        .map_err(|_| ParseError::InvalidHref(href.to_string()))?
        .to_string();

    let badges: Vec<String> = item
        .select(&BADGE)
        .map(|b| b.text().collect::<String>().trim().to_string())
        .collect();

    let artist = find_styled_span(item, |style| {
        style.contains("font-size:12px") || style.contains("font-size: 12px")
    })
    .map(|span| clean_artist(&element_text(span)))
    .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    let segments: Vec<&str> = link
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let raw_title = segments
        .into_iter()
        .find(|s| !is_noise_segment(s, &artist, &badges))
        .unwrap_or("");

    let flags = markers.classify(&badges);

    Ok(SongRecord {
        title: clean_title(raw_title),
        artist,
        url,
        tags: badges,
        is_piano: flags.is_piano,
        is_video: flags.is_video,
        discovered_at: today,
    })
}

/// Parse a song detail page for the manual-add path
///
/// Never fails: missing pieces fall back to "Unknown".
pub fn extract_detail(html: &str, url: &str, today: NaiveDate, markers: &MarkerTable) -> SongRecord {
    let document = Html::parse_document(html);

    let (title, artist) = match document.select(&HEADING).next() {
        Some(heading) => {
            let title = find_styled_span(heading, |style| style.contains("font-weight:bold"))
                .map(element_text)
                .unwrap_or_else(|| {
                    heading
                        .children()
                        .find_map(|child| child.value().as_text().map(|t| t.trim().to_string()))
                        .unwrap_or_default()
                });
            let artist = find_styled_span(heading, |style| style.contains("font-size"))
                .map(element_text)
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
            (title, artist)
        }
        None => (UNKNOWN_ARTIST.to_string(), UNKNOWN_ARTIST.to_string()),
    };

    let badges: Vec<String> = document
        .select(&BADGE)
        .map(|b| b.text().collect::<String>().trim().to_string())
        .collect();
    let flags = markers.classify(&badges);

    SongRecord {
        title,
        artist,
        url: url.to_string(),
        tags: badges,
        is_piano: flags.is_piano,
        is_video: flags.is_video,
        discovered_at: today,
    }
}

fn find_styled_span<'a, F>(root: ElementRef<'a>, predicate: F) -> Option<ElementRef<'a>>
where
    F: Fn(&str) -> bool,
{
    root.select(&STYLED_SPAN)
        .find(|span| span.value().attr("style").map(&predicate).unwrap_or(false))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn clean_artist(raw: &str) -> String {
    match raw.strip_prefix('-') {
        Some(rest) => rest.trim().to_string(),
        None => raw.to_string(),
    }
}

fn is_noise_segment(segment: &str, artist: &str, badges: &[String]) -> bool {
    segment == artist
        || badges.iter().any(|b| b == segment)
        || segment.contains("追加")
        || segment.contains("NEW")
        || segment == "U-リク"
        || segment == "-"
}

/// Strip noise labels, dates and edge hyphens; empty becomes the sentinel
pub fn clean_title(raw: &str) -> String {
    let stripped = TITLE_NOISE.replace_all(raw, "");
    let cleaned = stripped.trim_matches(|c: char| c == '-' || c.is_whitespace());
    if cleaned.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        cleaned.to_string()
    }
}

//! Shared test helpers: canned-page fetcher and listing markup builders
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tabwatch_crawler::crawler::{CrawlSettings, Crawler};
use tabwatch_crawler::fetcher::{FetchError, PageFetcher};
use tabwatch_crawler::pipeline::DataPaths;

pub const LISTING_URL: &str = "https://tabs.test/new.php";

/// Serves fixed pages; unknown URLs fail with 404
#[derive(Default)]
pub struct StaticFetcher {
    pages: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.set_page(url, html);
        self
    }

    pub fn set_page(&self, url: &str, html: impl Into<String>) {
        self.pages.lock().unwrap().insert(url.to_string(), html.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

pub fn test_settings() -> CrawlSettings {
    CrawlSettings {
        listing_url: LISTING_URL.to_string(),
        ..CrawlSettings::default()
    }
}

pub fn make_crawler(data_folder: &Path, fetcher: Arc<StaticFetcher>) -> Crawler {
    Crawler::new(DataPaths::new(data_folder), fetcher, test_settings())
}

/// One `a.list-group-item` entry
pub fn listing_item(href: &str, title: &str, artist: &str, badges: &[&str]) -> String {
    let badges: String = badges
        .iter()
        .map(|b| format!(r#"<span class="badge">{}</span>"#, b))
        .collect();
    format!(
        r#"<a class="list-group-item" href="{href}"><span>{title}</span><span style="font-size:12px;">- {artist}</span>{badges}</a>"#
    )
}

pub fn listing_page(items: &[String]) -> String {
    format!(
        r#"<html><body><div class="list-group">{}</div></body></html>"#,
        items.concat()
    )
}

pub fn detail_page(title: &str, artist: &str, badges: &[&str]) -> String {
    let badges: String = badges
        .iter()
        .map(|b| format!(r#"<span class="badge">{}</span>"#, b))
        .collect();
    format!(
        r#"<html><body><h1><span style="font-weight:bold;">{title}</span><span style="font-size:14px;">{artist}</span></h1>{badges}</body></html>"#
    )
}

pub fn song_url(id: &str) -> String {
    format!("https://tabs.test/song.php?data={}", id)
}

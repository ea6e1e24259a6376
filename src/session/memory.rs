//! In-memory [`PageSource`] for tests.

use super::PageSource;
use crate::error::SessionError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Serves fabricated pages and images keyed by URL and records every fetch.
#[derive(Debug, Default)]
pub struct MemorySource {
    pages: HashMap<String, String>,
    bytes: HashMap<String, Vec<u8>>,
    fetched: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(normalize(url), html.into());
        self
    }

    pub fn with_bytes(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.bytes.insert(normalize(url), bytes);
        self
    }

    /// Page URLs requested so far, in order.
    pub fn fetched_pages(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).map(String::from).unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl PageSource for MemorySource {
    async fn fetch_text(&self, url: &Url) -> Result<String, SessionError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| SessionError::NotFound(url.to_string()))
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, SessionError> {
        self.bytes
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| SessionError::NotFound(url.to_string()))
    }
}

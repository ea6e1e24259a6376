//! `reqwest`-backed page source.

use super::PageSource;
use crate::error::SessionError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches pages and images over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Build a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, SessionError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response, SessionError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success response");
            return Err(SessionError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PageSource for HttpSource {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch_text(&self, url: &Url) -> Result<String, SessionError> {
        let body = self.get(url).await?.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, SessionError> {
        let bytes = self.get(url).await?.bytes().await?;
        debug!(bytes = bytes.len(), "Fetched image");
        Ok(bytes.to_vec())
    }
}

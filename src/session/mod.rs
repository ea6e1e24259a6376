//! Browser session collaborator.
//!
//! The scraping core never talks to a browser directly. It drives anything that
//! implements [`BrowserSession`]: navigation, CSS lookups scoped to the page or
//! to a previously found element, text and attribute reads, element image
//! capture and clicks.
//!
//! # Implementations
//!
//! | Type | Module | Notes |
//! |------|--------|-------|
//! | [`StaticSession`] | [`static_page`] | Server-rendered HTML queried with `scraper` |
//! | [`HttpSource`] | [`http`] | `reqwest` page source for [`StaticSession`] |
//!
//! # Cancellation
//!
//! There is no cancellation token. Calling [`BrowserSession::close`] makes
//! every later call fail with [`SessionError::Closed`], which the engine
//! treats as fatal.

use crate::error::SessionError;
use async_trait::async_trait;
use std::fmt;
use url::Url;

pub mod http;
#[cfg(test)]
pub mod memory;
pub mod static_page;

pub use http::HttpSource;
pub use static_page::{PageSource, StaticElement, StaticSession};

/// Capability set the engine and adapters need from a browser.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Handle to an element on the current page.
    type Element: Clone + fmt::Debug + Send + Sync;

    /// Load `url` as the current page.
    async fn navigate(&mut self, url: &Url) -> Result<(), SessionError>;

    /// URL of the current page, if any.
    fn current_url(&self) -> Option<Url>;

    /// First element matching `selector` within `scope` (or the whole page).
    async fn find_element(
        &self,
        scope: Option<&Self::Element>,
        selector: &str,
    ) -> Result<Option<Self::Element>, SessionError>;

    /// All elements matching `selector` within `scope`, in document order.
    async fn find_elements(
        &self,
        scope: Option<&Self::Element>,
        selector: &str,
    ) -> Result<Vec<Self::Element>, SessionError>;

    /// Human-readable text of the element with whitespace collapsed.
    async fn inner_text(&self, element: &Self::Element) -> Result<String, SessionError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, SessionError>;

    /// Image bytes representing the element.
    async fn screenshot(&self, element: &Self::Element) -> Result<Vec<u8>, SessionError>;

    /// Activate the element, possibly navigating to another page.
    async fn click(&mut self, element: &Self::Element) -> Result<(), SessionError>;

    /// End the session; later calls fail with [`SessionError::Closed`].
    fn close(&mut self);
}

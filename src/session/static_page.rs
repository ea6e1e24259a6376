//! Browser session over server-rendered HTML.
//!
//! [`StaticSession`] fetches pages through a [`PageSource`] and answers element
//! queries with `scraper` CSS selectors. Element handles are snapshots of the
//! element's outer HTML, so lookups scoped to an element only see its
//! descendants.
//!
//! Behaviour that needs a live browser is approximated:
//! - `screenshot` downloads the image referenced by the element (`src` or
//!   `data-src` on the element itself or on its first `img` descendant).
//! - `click` follows anchors with an `href`; anything else is unsupported.

use super::BrowserSession;
use crate::error::SessionError;
use async_trait::async_trait;
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Where a [`StaticSession`] gets its pages and images from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_text(&self, url: &Url) -> Result<String, SessionError>;

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, SessionError>;
}

/// Snapshot of one element of a loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticElement {
    html: String,
}

#[derive(Debug)]
struct LoadedPage {
    url: Url,
    html: String,
}

/// A [`BrowserSession`] that never executes scripts.
#[derive(Debug)]
pub struct StaticSession<P> {
    source: P,
    page: Option<LoadedPage>,
    closed: bool,
}

impl<P: PageSource> StaticSession<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            page: None,
            closed: false,
        }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn page(&self) -> Result<&LoadedPage, SessionError> {
        self.ensure_open()?;
        self.page.as_ref().ok_or(SessionError::NoPage)
    }

    fn select(
        &self,
        scope: Option<&StaticElement>,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<StaticElement>, SessionError> {
        let page = self.page()?;
        let selector = parse_selector(selector)?;
        Ok(match scope {
            None => {
                let document = Html::parse_document(&page.html);
                document.select(&selector).take(limit).map(snapshot).collect()
            }
            Some(scope) => {
                let fragment = Html::parse_fragment(&scope.html);
                match fragment_root(&fragment) {
                    Some(root) => root.select(&selector).take(limit).map(snapshot).collect(),
                    None => Vec::new(),
                }
            }
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, SessionError> {
    Selector::parse(selector).map_err(|e| SessionError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn snapshot(element: ElementRef<'_>) -> StaticElement {
    StaticElement {
        html: element.html(),
    }
}

/// The element a fragment was parsed from.
fn fragment_root(fragment: &Html) -> Option<ElementRef<'_>> {
    fragment.root_element().children().find_map(ElementRef::wrap)
}

fn collapsed_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment_root(&fragment)
        .map(|root| root.text().collect::<String>().split_whitespace().join(" "))
        .unwrap_or_default()
}

fn attribute_of(html: &str, name: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    fragment_root(&fragment).and_then(|root| root.value().attr(name).map(str::to_string))
}

fn image_source(html: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let root = fragment_root(&fragment)?;
    let img = if root.value().name() == "img" {
        root
    } else {
        let selector = Selector::parse("img").ok()?;
        root.select(&selector).next()?
    };
    img.value()
        .attr("src")
        .or_else(|| img.value().attr("data-src"))
        .filter(|src| !src.trim().is_empty())
        .map(str::to_string)
}

/// Link target of an anchor element, or a description of why there is none.
fn link_target(html: &str) -> Result<String, String> {
    let fragment = Html::parse_fragment(html);
    let root = fragment_root(&fragment).ok_or_else(|| "empty element".to_string())?;
    let name = root.value().name();
    if name != "a" {
        return Err(format!("<{name}> needs script execution"));
    }
    root.value()
        .attr("href")
        .map(str::to_string)
        .ok_or_else(|| "anchor has no href".to_string())
}

#[async_trait]
impl<P: PageSource> BrowserSession for StaticSession<P> {
    type Element = StaticElement;

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn navigate(&mut self, url: &Url) -> Result<(), SessionError> {
        self.ensure_open()?;
        let html = self.source.fetch_text(url).await?;
        debug!(bytes = html.len(), "Loaded page");
        self.page = Some(LoadedPage {
            url: url.clone(),
            html,
        });
        Ok(())
    }

    fn current_url(&self) -> Option<Url> {
        self.page.as_ref().map(|p| p.url.clone())
    }

    async fn find_element(
        &self,
        scope: Option<&StaticElement>,
        selector: &str,
    ) -> Result<Option<StaticElement>, SessionError> {
        Ok(self.select(scope, selector, 1)?.into_iter().next())
    }

    async fn find_elements(
        &self,
        scope: Option<&StaticElement>,
        selector: &str,
    ) -> Result<Vec<StaticElement>, SessionError> {
        self.select(scope, selector, usize::MAX)
    }

    async fn inner_text(&self, element: &StaticElement) -> Result<String, SessionError> {
        self.ensure_open()?;
        Ok(collapsed_text(&element.html))
    }

    async fn attribute(
        &self,
        element: &StaticElement,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        self.ensure_open()?;
        Ok(attribute_of(&element.html, name))
    }

    async fn screenshot(&self, element: &StaticElement) -> Result<Vec<u8>, SessionError> {
        let base = self.page()?.url.clone();
        let src = image_source(&element.html).ok_or_else(|| SessionError::Unsupported {
            action: "capture",
            reason: "element has no image source".to_string(),
        })?;
        let url = base.join(&src).map_err(|e| SessionError::Unsupported {
            action: "capture",
            reason: format!("bad image URL '{src}': {e}"),
        })?;
        self.source.fetch_bytes(&url).await
    }

    async fn click(&mut self, element: &StaticElement) -> Result<(), SessionError> {
        let base = self.page()?.url.clone();
        let href = link_target(&element.html).map_err(|reason| SessionError::Unsupported {
            action: "click",
            reason,
        })?;
        let target = base.join(&href).map_err(|e| SessionError::Unsupported {
            action: "click",
            reason: format!("bad link '{href}': {e}"),
        })?;
        self.navigate(&target).await
    }

    fn close(&mut self) {
        self.closed = true;
        self.page = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::memory::MemorySource;

    const PAGE: &str = r#"
        <html><body>
          <div class="results"><span>2 results</span> for <b>cats</b></div>
          <ul>
            <li class="item"><h3 class="title">First <em>cat</em></h3>
              <img src="/img/first.png"></li>
            <li class="item" data-id="2"><h3 class="title">Second</h3></li>
          </ul>
          <a class="next" href="/search?page=2">Next</a>
          <button class="more" disabled>More</button>
        </body></html>"#;

    fn session() -> StaticSession<MemorySource> {
        let source = MemorySource::new()
            .with_page("https://news.test/search?page=1", PAGE)
            .with_page("https://news.test/search?page=2", "<html><body></body></html>")
            .with_bytes("https://news.test/img/first.png", b"png-bytes".to_vec());
        StaticSession::new(source)
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_lookups_before_navigation_fail() {
        let s = session();
        let err = s.find_element(None, "li").await.unwrap_err();
        assert!(matches!(err, SessionError::NoPage));
    }

    #[tokio::test]
    async fn test_find_and_read_text() {
        let mut s = session();
        s.navigate(&url("https://news.test/search?page=1")).await.unwrap();

        let container = s.find_element(None, "div.results").await.unwrap().unwrap();
        assert_eq!(s.inner_text(&container).await.unwrap(), "2 results for cats");

        let items = s.find_elements(None, "li.item").await.unwrap();
        assert_eq!(items.len(), 2);
        let title = s.find_element(Some(&items[0]), ".title").await.unwrap().unwrap();
        assert_eq!(s.inner_text(&title).await.unwrap(), "First cat");
        assert_eq!(
            s.attribute(&items[1], "data-id").await.unwrap().as_deref(),
            Some("2")
        );
        assert!(s.find_element(Some(&items[1]), "img").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scoped_lookup_excludes_scope_itself() {
        let mut s = session();
        s.navigate(&url("https://news.test/search?page=1")).await.unwrap();
        let item = s.find_element(None, "li.item").await.unwrap().unwrap();
        assert!(s.find_element(Some(&item), "li").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_selector() {
        let mut s = session();
        s.navigate(&url("https://news.test/search?page=1")).await.unwrap();
        let err = s.find_elements(None, "li[").await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_screenshot_downloads_image_source() {
        let mut s = session();
        s.navigate(&url("https://news.test/search?page=1")).await.unwrap();
        let items = s.find_elements(None, "li.item").await.unwrap();
        assert_eq!(s.screenshot(&items[0]).await.unwrap(), b"png-bytes".to_vec());
        let err = s.screenshot(&items[1]).await.unwrap_err();
        assert!(matches!(err, SessionError::Unsupported { action: "capture", .. }));
    }

    #[tokio::test]
    async fn test_click_follows_anchor_only() {
        let mut s = session();
        s.navigate(&url("https://news.test/search?page=1")).await.unwrap();

        let button = s.find_element(None, "button.more").await.unwrap().unwrap();
        assert!(s.attribute(&button, "disabled").await.unwrap().is_some());
        let err = s.click(&button).await.unwrap_err();
        assert!(matches!(err, SessionError::Unsupported { action: "click", .. }));

        let next = s.find_element(None, "a.next").await.unwrap().unwrap();
        s.click(&next).await.unwrap();
        assert_eq!(
            s.current_url().unwrap().as_str(),
            "https://news.test/search?page=2"
        );
        assert!(s.find_elements(None, "li.item").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_session_is_fatal() {
        let mut s = session();
        s.navigate(&url("https://news.test/search?page=1")).await.unwrap();
        let item = s.find_element(None, "li.item").await.unwrap().unwrap();
        s.close();
        assert!(matches!(s.inner_text(&item).await, Err(SessionError::Closed)));
        let err = s
            .navigate(&url("https://news.test/search?page=2"))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}

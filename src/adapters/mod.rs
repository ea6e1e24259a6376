//! Site adapters: what the engine needs to know about one news site.
//!
//! An adapter supplies the search URL, the accepted sections and a set of
//! [`Locators`]. The behaviour shared by every site (waiting for results,
//! reading item fields, finding and following the next page) is provided by
//! default methods of [`SiteAdapter`] driven by those locators, so a concrete
//! adapter is mostly data.
//!
//! # Supported Sites
//!
//! | Site | Module | Sections | Date | Pagination | Image-less items |
//! |------|--------|----------|------|------------|------------------|
//! | Los Angeles Times | [`latimes`] | none | epoch milliseconds | anchor | kept |
//! | Reuters | [`reuters`] | enumerated | `Month Day, Year` | button | discarded |
//!
//! # Ordering Precondition
//!
//! Search results must be listed newest first. The engine stops at the first
//! item older than the window; on an unsorted listing it under-collects.

use crate::error::{ScrapeError, SessionError};
use crate::session::BrowserSession;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use itertools::Itertools;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub mod latimes;
pub mod reuters;

pub use latimes::LaTimes;
pub use reuters::Reuters;

/// Default bound on every results-readiness wait.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How an item's publish date is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// Epoch milliseconds in an attribute of the date element.
    TimestampMillis { attribute: &'static str },
    /// Visible text of the date element, parsed with a chrono pattern.
    Formatted { pattern: &'static str },
}

/// How the "next page" affordance works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPageRule {
    /// A link whose `href` is the next page.
    Anchor(&'static str),
    /// A button that must be clicked and may be disabled.
    Button(&'static str),
}

impl NextPageRule {
    pub fn selector(&self) -> &'static str {
        match self {
            NextPageRule::Anchor(s) | NextPageRule::Button(s) => s,
        }
    }
}

/// CSS locators for a search results page.
///
/// Item field selectors are evaluated inside the result item.
#[derive(Debug, Clone)]
pub struct Locators {
    pub results_container: &'static str,
    /// Text the container shows once results are rendered.
    pub confirmation_text: &'static str,
    pub result_item: &'static str,
    pub title: &'static str,
    pub description: Option<&'static str>,
    pub date: &'static str,
    pub date_rule: DateRule,
    pub image: &'static str,
    pub next_page: NextPageRule,
}

/// Why a single item field could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    #[error("not found")]
    Missing,
    #[error("could not parse '{0}'")]
    Unparsable(String),
    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Fields read from one result item, each with its own outcome.
#[derive(Debug, Clone)]
pub struct ItemFields<E> {
    /// Date as displayed, for diagnostics.
    pub date_text: Option<String>,
    pub date: Result<NaiveDate, FieldIssue>,
    pub title: Result<String, FieldIssue>,
    pub description: Result<String, FieldIssue>,
    pub image: Result<E, FieldIssue>,
}

/// The "next page" affordance found on the current page.
#[derive(Debug, Clone)]
pub struct NextPage<E> {
    pub element: E,
    pub disabled: bool,
    /// Page the affordance leads to when known; `None` means the element is clicked.
    pub target: Option<Url>,
}

/// Site-specific knowledge plugged into the [`ScrapeEngine`](crate::engine::ScrapeEngine).
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Short identifier, e.g. `"latimes"`.
    fn name(&self) -> &'static str;

    /// Accepted section names and their route tokens; `None` when the site
    /// has no sections.
    fn sections(&self) -> Option<&'static [(&'static str, &'static str)]>;

    /// First results page for a search, sorted newest first.
    ///
    /// # Arguments
    ///
    /// * `search_phrase` - Trimmed, non-empty phrase
    /// * `section_token` - Route token from [`resolve_section`](Self::resolve_section)
    ///
    /// # Returns
    ///
    /// The URL the engine navigates to first.
    fn build_search_url(
        &self,
        search_phrase: &str,
        section_token: Option<&str>,
    ) -> Result<Url, ScrapeError>;

    fn locators(&self) -> &Locators;

    fn wait_timeout(&self) -> Duration {
        DEFAULT_WAIT_TIMEOUT
    }

    /// Whether items without an image are dropped instead of kept image-less.
    fn discard_if_no_image(&self) -> bool;

    /// Address of the page an enabled next-page button shows.
    ///
    /// # Arguments
    ///
    /// * `current` - URL of the page carrying the button
    ///
    /// # Returns
    ///
    /// `None` when the page can only be reached by clicking, which is the
    /// default.
    fn button_target(&self, _current: &Url) -> Option<Url> {
        None
    }

    /// Route token for `section`.
    ///
    /// Names match case-insensitively. Sites without sections ignore the
    /// argument and return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::UnknownSection`] listing the accepted names.
    fn resolve_section(&self, section: &str) -> Result<Option<&'static str>, ScrapeError> {
        let Some(table) = self.sections() else {
            return Ok(None);
        };
        table
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(section.trim()))
            .map(|(_, token)| Some(*token))
            .ok_or_else(|| ScrapeError::UnknownSection {
                section: section.to_string(),
                accepted: table.iter().map(|(name, _)| name).join(", "),
            })
    }

    /// Block until the results container shows the confirmation text.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::ResultsNotReady`] once [`wait_timeout`](Self::wait_timeout)
    /// elapses, or the session error if the session itself failed.
    async fn wait_for_results_ready<S: BrowserSession>(&self, session: &S) -> Result<(), ScrapeError> {
        let locators = self.locators();
        let timeout = self.wait_timeout();
        let start = Instant::now();

        loop {
            match container_text(session, locators.results_container).await {
                Ok(Some(text)) if text.contains(locators.confirmation_text) => {
                    debug!(site = self.name(), elapsed = ?start.elapsed(), "Results ready");
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => debug!(error = %e, "Results container not readable yet"),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                let url = session
                    .current_url()
                    .map(String::from)
                    .unwrap_or_else(|| "about:blank".to_string());
                return Err(ScrapeError::ResultsNotReady { url, waited: timeout });
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout - elapsed)).await;
        }
    }

    /// Read every field of a result item.
    ///
    /// # Arguments
    ///
    /// * `session` - Session showing the page `item` was found on
    /// * `item` - One element matched by [`Locators::result_item`]
    ///
    /// # Returns
    ///
    /// Per-field outcomes in an [`ItemFields`]. Only session-level failures
    /// are returned as errors.
    async fn extract_item_fields<S: BrowserSession>(
        &self,
        session: &S,
        item: &S::Element,
    ) -> Result<ItemFields<S::Element>, ScrapeError> {
        let locators = self.locators();

        let (date_text, date) = read_date(session, item, locators).await?;
        let title = read_text(session, item, locators.title).await?;
        let description = match locators.description {
            Some(selector) => read_text(session, item, selector).await?,
            None => Err(FieldIssue::Missing),
        };
        let image = recoverable(session.find_element(Some(item), locators.image).await)?
            .and_then(|found| found.ok_or(FieldIssue::Missing));

        Ok(ItemFields {
            date_text,
            date,
            title,
            description,
            image,
        })
    }

    /// Find the next-page affordance and whether it can be used.
    ///
    /// Anchors without an `href` and buttons marked `disabled` or
    /// `aria-disabled="true"` are reported disabled.
    ///
    /// # Returns
    ///
    /// `None` when the page has no affordance.
    async fn locate_next_page<S: BrowserSession>(
        &self,
        session: &S,
    ) -> Result<Option<NextPage<S::Element>>, ScrapeError> {
        let rule = self.locators().next_page;
        let Some(element) = session.find_element(None, rule.selector()).await? else {
            return Ok(None);
        };

        let next = match rule {
            NextPageRule::Anchor(_) => {
                let href = session
                    .attribute(&element, "href")
                    .await?
                    .filter(|h| !h.trim().is_empty());
                let target = match (href, session.current_url()) {
                    (Some(href), Some(base)) => base.join(&href).ok(),
                    (Some(href), None) => Url::parse(&href).ok(),
                    (None, _) => None,
                };
                NextPage {
                    element,
                    disabled: target.is_none(),
                    target,
                }
            }
            NextPageRule::Button(_) => {
                let disabled = session.attribute(&element, "disabled").await?.is_some()
                    || session
                        .attribute(&element, "aria-disabled")
                        .await?
                        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
                let target = if disabled {
                    None
                } else {
                    session.current_url().and_then(|current| self.button_target(&current))
                };
                NextPage {
                    element,
                    disabled,
                    target,
                }
            }
        };
        Ok(Some(next))
    }

    /// Follow the affordance and wait for the new results.
    async fn advance_to_next_page<S: BrowserSession>(
        &self,
        session: &mut S,
        next: &NextPage<S::Element>,
    ) -> Result<(), ScrapeError> {
        match &next.target {
            Some(url) => session
                .navigate(url)
                .await
                .map_err(|source| ScrapeError::Navigation {
                    url: url.to_string(),
                    source,
                })?,
            None => {
                let from = session
                    .current_url()
                    .map(String::from)
                    .unwrap_or_else(|| "about:blank".to_string());
                session
                    .click(&next.element)
                    .await
                    .map_err(|source| ScrapeError::Navigation { url: from, source })?
            }
        }
        self.wait_for_results_ready(&*session).await
    }
}

/// Split a session result into fatal errors and per-field issues.
fn recoverable<T>(result: Result<T, SessionError>) -> Result<Result<T, FieldIssue>, ScrapeError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => Ok(Err(FieldIssue::Lookup(e.to_string()))),
    }
}

async fn container_text<S: BrowserSession>(
    session: &S,
    selector: &str,
) -> Result<Option<String>, SessionError> {
    match session.find_element(None, selector).await? {
        Some(container) => Ok(Some(session.inner_text(&container).await?)),
        None => Ok(None),
    }
}

async fn read_text<S: BrowserSession>(
    session: &S,
    scope: &S::Element,
    selector: &str,
) -> Result<Result<String, FieldIssue>, ScrapeError> {
    let element = match recoverable(session.find_element(Some(scope), selector).await)? {
        Ok(Some(element)) => element,
        Ok(None) => return Ok(Err(FieldIssue::Missing)),
        Err(issue) => return Ok(Err(issue)),
    };
    Ok(recoverable(session.inner_text(&element).await)?.and_then(|text| {
        let text = text.trim();
        if text.is_empty() {
            Err(FieldIssue::Missing)
        } else {
            Ok(text.to_string())
        }
    }))
}

async fn read_date<S: BrowserSession>(
    session: &S,
    scope: &S::Element,
    locators: &Locators,
) -> Result<(Option<String>, Result<NaiveDate, FieldIssue>), ScrapeError> {
    let element = match recoverable(session.find_element(Some(scope), locators.date).await)? {
        Ok(Some(element)) => element,
        Ok(None) => return Ok((None, Err(FieldIssue::Missing))),
        Err(issue) => return Ok((None, Err(issue))),
    };
    let text = recoverable(session.inner_text(&element).await)?;

    let date = match locators.date_rule {
        DateRule::TimestampMillis { attribute } => {
            match recoverable(session.attribute(&element, attribute).await)? {
                Ok(Some(raw)) => parse_timestamp_millis(&raw),
                Ok(None) => Err(FieldIssue::Missing),
                Err(issue) => Err(issue),
            }
        }
        DateRule::Formatted { pattern } => match &text {
            Ok(text) => parse_formatted(text, pattern),
            Err(issue) => Err(issue.clone()),
        },
    };
    Ok((text.ok(), date))
}

/// Local calendar date of an epoch-milliseconds timestamp.
pub fn parse_timestamp_millis(raw: &str) -> Result<NaiveDate, FieldIssue> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .ok_or_else(|| FieldIssue::Unparsable(raw.to_string()))
}

pub fn parse_formatted(text: &str, pattern: &str) -> Result<NaiveDate, FieldIssue> {
    NaiveDate::parse_from_str(text.trim(), pattern)
        .map_err(|_| FieldIssue::Unparsable(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    #[test]
    fn test_parse_timestamp_millis() {
        let noon = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let millis = Local
            .from_local_datetime(&noon)
            .single()
            .unwrap()
            .timestamp_millis();
        assert_eq!(
            parse_timestamp_millis(&millis.to_string()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
        assert!(matches!(
            parse_timestamp_millis("yesterday"),
            Err(FieldIssue::Unparsable(_))
        ));
        assert!(parse_timestamp_millis("").is_err());
    }

    #[test]
    fn test_parse_formatted() {
        let pattern = "%B %d, %Y";
        assert_eq!(
            parse_formatted("May 1, 2024", pattern).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(
            parse_formatted(" December 25, 2023 ", pattern).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()
        );
        assert!(parse_formatted("5 min ago", pattern).is_err());
    }

    #[test]
    fn test_next_page_rule_selector() {
        assert_eq!(NextPageRule::Anchor("a.next").selector(), "a.next");
        assert_eq!(NextPageRule::Button("button.next").selector(), "button.next");
    }
}

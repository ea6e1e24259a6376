//! Error types for the scraping core.
//!
//! Two layers are distinguished:
//! - [`SessionError`]: failures reported by the browser session collaborator.
//! - [`ScrapeError`]: terminal failures of a scrape, either configuration
//!   problems caught before any navigation or fatal navigation problems.
//!
//! Per-item problems are not errors at this level; see
//! [`FieldIssue`](crate::adapters::FieldIssue).

use std::time::Duration;
use thiserror::Error;

/// Failures raised by a [`BrowserSession`](crate::session::BrowserSession).
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("browser session is closed")]
    Closed,

    #[error("no page has been loaded yet")]
    NoPage,

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("cannot {action} element: {reason}")]
    Unsupported { action: &'static str, reason: String },
}

impl SessionError {
    /// Whether the error invalidates the whole session rather than one lookup.
    ///
    /// A closed session, a missing page or a broken selector will fail every
    /// subsequent call the same way, so the engine aborts on them even when
    /// they surface while reading a single field.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Closed | SessionError::NoPage | SessionError::InvalidSelector { .. }
        )
    }
}

/// Terminal failure of a scrape invocation.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("search phrase must not be empty")]
    EmptySearchPhrase,

    #[error("months must be zero or positive, got {0}")]
    NegativeMonths(i32),

    #[error("unknown section '{section}'; accepted sections: {accepted}")]
    UnknownSection { section: String, accepted: String },

    #[error("date window of {months} months back from {reference} is out of range")]
    DateOutOfRange { reference: chrono::NaiveDate, months: u32 },

    #[error("invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("results at {url} were not ready after {waited:?}")]
    ResultsNotReady { url: String, waited: Duration },

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: SessionError,
    },

    #[error("browser session error: {0}")]
    Session(#[from] SessionError),
}

impl ScrapeError {
    /// Errors detected from the request alone, before touching the browser.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScrapeError::EmptySearchPhrase
                | ScrapeError::NegativeMonths(_)
                | ScrapeError::UnknownSection { .. }
                | ScrapeError::DateOutOfRange { .. }
                | ScrapeError::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_fatality() {
        assert!(SessionError::Closed.is_fatal());
        assert!(SessionError::NoPage.is_fatal());
        assert!(
            SessionError::InvalidSelector {
                selector: "[".into(),
                reason: "unexpected end".into()
            }
            .is_fatal()
        );
        assert!(!SessionError::NotFound("https://example.com/a.png".into()).is_fatal());
        assert!(
            !SessionError::Unsupported {
                action: "click",
                reason: "button".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_configuration_classification() {
        assert!(ScrapeError::NegativeMonths(-1).is_configuration());
        assert!(ScrapeError::EmptySearchPhrase.is_configuration());
        assert!(
            !ScrapeError::ResultsNotReady {
                url: "https://example.com".into(),
                waited: Duration::from_secs(10)
            }
            .is_configuration()
        );
        assert!(!ScrapeError::Session(SessionError::Closed).is_configuration());
    }

    #[test]
    fn test_unknown_section_lists_accepted() {
        let err = ScrapeError::UnknownSection {
            section: "Politics".into(),
            accepted: "World, Business".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Politics"));
        assert!(msg.contains("World, Business"));
    }
}

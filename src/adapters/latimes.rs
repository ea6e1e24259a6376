//! Los Angeles Times search adapter.
//!
//! Search results live at `https://www.latimes.com/search?q=<words>&s=1`, where
//! `s=1` sorts newest first. The site has no sections, dates are exposed as
//! epoch milliseconds in `data-timestamp`, and further pages are plain links.
//! Items without an image are kept.

use super::{DEFAULT_WAIT_TIMEOUT, DateRule, Locators, NextPageRule, SiteAdapter};
use crate::error::ScrapeError;
use itertools::Itertools;
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://www.latimes.com/search";

const LOCATORS: Locators = Locators {
    results_container: "div.search-results-module-wrapper",
    confirmation_text: "result",
    result_item: "li div.promo-wrapper",
    title: ".promo-content .promo-title-container .promo-title",
    description: Some(".promo-content .promo-description"),
    date: ".promo-content .promo-timestamp",
    date_rule: DateRule::TimestampMillis {
        attribute: "data-timestamp",
    },
    image: ".promo-media img",
    next_page: NextPageRule::Anchor("div.search-results-module-next-page a"),
};

#[derive(Debug, Clone)]
pub struct LaTimes {
    locators: Locators,
    wait_timeout: Duration,
}

impl Default for LaTimes {
    fn default() -> Self {
        Self {
            locators: LOCATORS,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl LaTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }
}

impl SiteAdapter for LaTimes {
    fn name(&self) -> &'static str {
        "latimes"
    }

    fn sections(&self) -> Option<&'static [(&'static str, &'static str)]> {
        None
    }

    /// Words are percent-encoded individually and joined with `+`.
    fn build_search_url(
        &self,
        search_phrase: &str,
        _section_token: Option<&str>,
    ) -> Result<Url, ScrapeError> {
        let query = search_phrase
            .split_whitespace()
            .map(urlencoding::encode)
            .join("+");
        Ok(Url::parse(&format!("{SEARCH_URL}?q={query}&s=1"))?)
    }

    fn locators(&self) -> &Locators {
        &self.locators
    }

    fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    fn discard_if_no_image(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let url = LaTimes::new().build_search_url("climate change", None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.latimes.com/search?q=climate+change&s=1"
        );
    }

    #[test]
    fn test_search_url_encodes_words() {
        let url = LaTimes::new().build_search_url("AT&T  deal", None).unwrap();
        assert_eq!(url.as_str(), "https://www.latimes.com/search?q=AT%26T+deal&s=1");
    }

    #[test]
    fn test_sections_are_ignored() {
        let adapter = LaTimes::new();
        assert_eq!(adapter.resolve_section("Politics").unwrap(), None);
        assert_eq!(adapter.resolve_section("").unwrap(), None);
    }

    #[test]
    fn test_keeps_imageless_items() {
        assert!(!LaTimes::new().discard_if_no_image());
        assert_eq!(LaTimes::new().wait_timeout(), Duration::from_secs(10));
    }
}

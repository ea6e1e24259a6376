//! Reuters search adapter.
//!
//! Reuters exposes named sections that map to a `section` query parameter.
//! Result dates are shown as `Month Day, Year` text and the next page is a
//! button that becomes disabled on the last page. The button only moves the
//! `offset` query parameter forward by one page, so its target is computed
//! from the current URL. Items without an image are discarded.

use super::{DEFAULT_WAIT_TIMEOUT, DateRule, Locators, NextPageRule, SiteAdapter};
use crate::error::ScrapeError;
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://www.reuters.com/site-search/";
/// Results shown per search page.
const PAGE_SIZE: u32 = 20;

/// Section names as shown on the site and their route tokens.
pub const SECTIONS: &[(&str, &str)] = &[
    ("All", "all"),
    ("World", "world"),
    ("Business", "business"),
    ("Markets", "markets"),
    ("Sustainability", "sustainability"),
    ("Legal", "legal"),
    ("Breakingviews", "breakingviews"),
    ("Technology", "technology"),
    ("Sports", "sports"),
    ("Science", "science"),
    ("Lifestyle", "lifestyle"),
];

const LOCATORS: Locators = Locators {
    results_container: "div.search-results__sectionContainer",
    confirmation_text: "result",
    result_item: "li.search-results__item",
    title: "[data-testid=\"Heading\"]",
    description: Some("[data-testid=\"Body\"]"),
    date: "time[data-testid=\"Label\"]",
    date_rule: DateRule::Formatted {
        pattern: "%B %d, %Y",
    },
    image: "[data-testid=\"Image\"] img",
    next_page: NextPageRule::Button("button[aria-label^=\"Next stories\"]"),
};

#[derive(Debug, Clone)]
pub struct Reuters {
    locators: Locators,
    wait_timeout: Duration,
}

impl Default for Reuters {
    fn default() -> Self {
        Self {
            locators: LOCATORS,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl Reuters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }
}

impl SiteAdapter for Reuters {
    fn name(&self) -> &'static str {
        "reuters"
    }

    fn sections(&self) -> Option<&'static [(&'static str, &'static str)]> {
        Some(SECTIONS)
    }

    fn build_search_url(
        &self,
        search_phrase: &str,
        section_token: Option<&str>,
    ) -> Result<Url, ScrapeError> {
        let mut url = Url::parse(SEARCH_URL)?;
        url.query_pairs_mut()
            .append_pair("query", search_phrase.trim())
            .append_pair("section", section_token.unwrap_or("all"))
            .append_pair("offset", "0")
            .append_pair("sort", "newest");
        Ok(url)
    }

    fn locators(&self) -> &Locators {
        &self.locators
    }

    fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    fn discard_if_no_image(&self) -> bool {
        true
    }

    fn button_target(&self, current: &Url) -> Option<Url> {
        let offset: u32 = current
            .query_pairs()
            .find(|(key, _)| key == "offset")?
            .1
            .parse()
            .ok()?;
        let pairs: Vec<(String, String)> = current
            .query_pairs()
            .map(|(key, value)| {
                let value = if key == "offset" {
                    (offset + PAGE_SIZE).to_string()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();

        let mut next = current.clone();
        next.query_pairs_mut().clear().extend_pairs(pairs);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_section() {
        let adapter = Reuters::new();
        assert_eq!(adapter.resolve_section("World").unwrap(), Some("world"));
        assert_eq!(adapter.resolve_section("business").unwrap(), Some("business"));
    }

    #[test]
    fn test_resolve_unknown_section() {
        let err = Reuters::new().resolve_section("Politics").unwrap_err();
        assert!(err.is_configuration());
        match err {
            ScrapeError::UnknownSection { section, accepted } => {
                assert_eq!(section, "Politics");
                assert!(accepted.starts_with("All, World, Business"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_search_url() {
        let url = Reuters::new()
            .build_search_url("climate change", Some("world"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.reuters.com/site-search/?query=climate+change&section=world&offset=0&sort=newest"
        );
    }

    #[test]
    fn test_button_target_advances_offset() {
        let adapter = Reuters::new();
        let first = adapter
            .build_search_url("climate change", Some("world"))
            .unwrap();
        let second = adapter.button_target(&first).unwrap();
        assert_eq!(
            second.as_str(),
            "https://www.reuters.com/site-search/?query=climate+change&section=world&offset=20&sort=newest"
        );
        assert!(adapter.button_target(&second).unwrap().as_str().contains("offset=40"));

        let no_offset = Url::parse("https://www.reuters.com/site-search/?query=cat").unwrap();
        assert_eq!(adapter.button_target(&no_offset), None);
    }

    #[test]
    fn test_discards_imageless_items() {
        assert!(Reuters::new().discard_if_no_image());
    }
}

//! Data models for extracted articles and search reports.
//!
//! - [`ArticleRecord`]: one accepted search result, immutable once built
//! - [`SearchReport`]: the records of one scrape plus the parameters that
//!   produced them, as handed to the output writers

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Currency-symbol amounts (`$11.1`, `$1,200.50`) or bare amounts followed by
/// a currency word (`500 dollars`, `11 USD`).
static MONEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    const NUMBER: &str = r"(?:\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";
    const WORD: &str = r"(?i:dollars?|usd|euros?|eur|pounds?|gbp)";
    Regex::new(&format!(r"[$€£¥]\s?{NUMBER}|\b{NUMBER}\s*{WORD}\b"))
        .expect("money pattern is valid")
});

/// Whether `text` mentions an amount of money.
pub fn contains_money_amount(text: &str) -> bool {
    MONEY_PATTERN.is_match(text)
}

/// Case-sensitive, non-overlapping occurrences of `phrase` in the title and
/// the description.
///
/// Both fields are searched separately so a match can never straddle them.
/// An empty phrase counts as zero.
pub fn count_phrase(phrase: &str, title: &str, description: Option<&str>) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    title.matches(phrase).count() + description.map_or(0, |d| d.matches(phrase).count())
}

/// A news article extracted from a search result item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    title: String,
    publish_date: NaiveDate,
    image_path: Option<PathBuf>,
    search_phrase_count: usize,
    description: Option<String>,
    contains_money_amount: bool,
}

impl ArticleRecord {
    /// Build a record, deriving `contains_money_amount` from title and
    /// description.
    pub fn new(
        title: String,
        publish_date: NaiveDate,
        image_path: Option<PathBuf>,
        search_phrase_count: usize,
        description: Option<String>,
    ) -> Self {
        let contains_money_amount = contains_money_amount(&title)
            || description.as_deref().is_some_and(contains_money_amount);
        Self {
            title,
            publish_date,
            image_path,
            search_phrase_count,
            description,
            contains_money_amount,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn publish_date(&self) -> NaiveDate {
        self.publish_date
    }

    /// Saved image, if one was captured.
    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn search_phrase_count(&self) -> usize {
        self.search_phrase_count
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn contains_money_amount(&self) -> bool {
        self.contains_money_amount
    }
}

/// The outcome of one scrape, ready to be written out.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchReport {
    /// Adapter name, e.g. `"latimes"`.
    pub site: String,
    pub search_phrase: String,
    pub section: String,
    pub months: i32,
    /// Date in `YYYY-MM-DD` format the window was computed from.
    pub reference_date: NaiveDate,
    /// Local time of generation in RFC 3339 format.
    pub generated_at: String,
    pub articles: Vec<ArticleRecord>,
}

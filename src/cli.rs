//! Command-line interface definitions for Awful News Search.
//!
//! Every option can also be provided through an environment variable, and the
//! search parameters can come from a YAML work item (see [`crate::config`]).
//! Flags given on the command line win over the work item.

use crate::config::Site;
use clap::Parser;

/// Command-line arguments for the Awful News Search application.
///
/// # Examples
///
/// ```sh
/// # Last three months of Los Angeles Times coverage
/// awful_news_search -q "climate change" -n 3
///
/// # Reuters, World section, parameters from a work item
/// awful_news_search --site reuters -w work_item.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Phrase to search for
    #[arg(short = 'q', long, env = "SEARCH_PHRASE")]
    pub search_phrase: Option<String>,

    /// Site section to search (ignored by sites without sections)
    #[arg(short, long, env = "SEARCH_SECTION")]
    pub section: Option<String>,

    /// Number of months back to collect; 0 means the current month only
    #[arg(short = 'n', long, env = "SEARCH_MONTHS", allow_negative_numbers = true)]
    pub months: Option<i32>,

    /// News site to scrape
    #[arg(long, value_enum, env = "NEWS_SITE")]
    pub site: Option<Site>,

    /// Optional path to a YAML work item with the search parameters
    #[arg(short, long, env = "WORK_ITEM")]
    pub work_item: Option<String>,

    /// Directory for captured article images
    #[arg(short, long, env = "IMAGE_DIR", default_value = "output/imgs")]
    pub image_dir: String,

    /// Directory for the JSON and Markdown reports
    #[arg(short, long, env = "OUTPUT_DIR", default_value = "output")]
    pub output_dir: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["awful_news_search", "--search-phrase", "cat"]);

        assert_eq!(cli.search_phrase.as_deref(), Some("cat"));
        assert_eq!(cli.image_dir, "output/imgs");
        assert_eq!(cli.output_dir, "output");
        assert_eq!(cli.request_timeout_secs, 10);
        assert!(cli.work_item.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "awful_news_search",
            "-q",
            "climate change",
            "-s",
            "World",
            "-n",
            "3",
            "--site",
            "reuters",
        ]);

        assert_eq!(cli.search_phrase.as_deref(), Some("climate change"));
        assert_eq!(cli.section.as_deref(), Some("World"));
        assert_eq!(cli.months, Some(3));
        assert_eq!(cli.site, Some(Site::Reuters));
    }

    #[test]
    fn test_cli_accepts_negative_months_for_validation() {
        let cli = Cli::parse_from(["awful_news_search", "-q", "cat", "-n", "-1"]);
        assert_eq!(cli.months, Some(-1));
    }
}

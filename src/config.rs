//! Search parameters: YAML work items merged with command-line flags.
//!
//! A work item looks like:
//!
//! ```yaml
//! search_phrase: climate change
//! section: World
//! months: 2
//! site: reuters
//! ```
//!
//! Every key is optional in the file; missing values fall back to the command
//! line and then to defaults (`section: ""`, `months: 1`, `site: latimes`).

use crate::cli::Cli;
use crate::engine::ScrapeRequest;
use clap::ValueEnum;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use tokio::fs;
use tracing::{info, instrument};

/// Supported news sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    #[default]
    Latimes,
    Reuters,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Latimes => f.write_str("latimes"),
            Site::Reuters => f.write_str("reuters"),
        }
    }
}

/// Parameters as read from a work item file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct WorkItem {
    pub search_phrase: Option<String>,
    pub section: Option<String>,
    pub months: Option<i32>,
    pub site: Option<Site>,
}

impl WorkItem {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    #[instrument(level = "info", skip_all, fields(%path))]
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let yaml = fs::read_to_string(path).await?;
        let item = Self::from_yaml(&yaml)?;
        info!(?item, "Loaded work item");
        Ok(item)
    }
}

/// Fully resolved search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub search_phrase: String,
    pub section: String,
    pub months: i32,
    pub site: Site,
}

impl SearchParams {
    /// Merge command-line flags over a work item.
    pub fn resolve(cli: &Cli, item: WorkItem) -> Result<Self, Box<dyn Error>> {
        let search_phrase = cli
            .search_phrase
            .clone()
            .or(item.search_phrase)
            .ok_or("no search phrase given (use --search-phrase or a work item)")?;
        Ok(Self {
            search_phrase,
            section: cli.section.clone().or(item.section).unwrap_or_default(),
            months: cli.months.or(item.months).unwrap_or(1),
            site: cli.site.or(item.site).unwrap_or_default(),
        })
    }

    pub fn to_request(&self) -> ScrapeRequest {
        ScrapeRequest::new(self.search_phrase.clone(), self.section.clone(), self.months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_work_item_from_yaml() {
        let item = WorkItem::from_yaml(
            "search_phrase: climate change\nsection: World\nmonths: 2\nsite: reuters\n",
        )
        .unwrap();
        assert_eq!(
            item,
            WorkItem {
                search_phrase: Some("climate change".into()),
                section: Some("World".into()),
                months: Some(2),
                site: Some(Site::Reuters),
            }
        );
    }

    #[test]
    fn test_work_item_rejects_unknown_site() {
        assert!(WorkItem::from_yaml("site: nytimes\n").is_err());
    }

    #[test]
    fn test_cli_overrides_work_item() {
        let cli = Cli::parse_from(["awful_news_search", "-n", "4"]);
        let item = WorkItem {
            search_phrase: Some("cat".into()),
            section: Some("Sports".into()),
            months: Some(1),
            site: Some(Site::Reuters),
        };
        let params = SearchParams::resolve(&cli, item).unwrap();
        assert_eq!(params.search_phrase, "cat");
        assert_eq!(params.section, "Sports");
        assert_eq!(params.months, 4);
        assert_eq!(params.site, Site::Reuters);
    }

    #[test]
    fn test_defaults_and_missing_phrase() {
        let cli = Cli::parse_from(["awful_news_search", "-q", "dog"]);
        let params = SearchParams::resolve(&cli, WorkItem::default()).unwrap();
        assert_eq!(params.section, "");
        assert_eq!(params.months, 1);
        assert_eq!(params.site, Site::Latimes);

        let cli = Cli::parse_from(["awful_news_search"]);
        assert!(SearchParams::resolve(&cli, WorkItem::default()).is_err());
    }

    #[tokio::test]
    async fn test_load_work_item_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("item.yaml");
        std::fs::write(&path, "search_phrase: cat\nmonths: 0\n").unwrap();

        let item = WorkItem::load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(item.search_phrase.as_deref(), Some("cat"));
        assert_eq!(item.months, Some(0));
        assert_eq!(item.site, None);
    }
}

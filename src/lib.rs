//! # Awful News Search
//!
//! Extracts news-article records from the paginated search results of news
//! websites, bounded by a recency window.
//!
//! ## Modules
//!
//! - [`window`]: "N months back" window computation
//! - [`models`]: [`models::ArticleRecord`] and the report model
//! - [`adapters`]: per-site URLs, sections and locators
//! - [`engine`]: the pagination state machine shared by every site
//! - [`session`]: the browser session collaborator and its static implementation
//! - [`images`]: persistence of captured article images
//! - [`observer`]: diagnostic events emitted by the engine
//! - [`outputs`]: JSON and Markdown reports
//!
//! ## Example
//!
//! ```ignore
//! let mut session = StaticSession::new(HttpSource::new(Duration::from_secs(10))?);
//! let images = ImageStore::new("output/imgs");
//! let request = ScrapeRequest::new("climate change", "World", 2);
//! let records = ScrapeEngine::new(&mut session, &Reuters::new(), &images)
//!     .run(&request)
//!     .await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod images;
pub mod models;
pub mod observer;
pub mod outputs;
pub mod session;
pub mod utils;
pub mod window;

//! # Awful News Search
//!
//! Collects recent news articles matching a search phrase from the paginated
//! search results of a news site, saves their images and writes JSON and
//! Markdown reports.
//!
//! ## Usage
//!
//! ```sh
//! awful_news_search -q "climate change" -n 2 --site latimes
//! ```
//!
//! ## Architecture
//!
//! 1. **Parameters**: command-line flags merged over an optional YAML work item
//! 2. **Scraping**: `ScrapeEngine` walks the search results through a
//!    `SiteAdapter` until the results run out or get too old
//! 3. **Output**: JSON and Markdown reports of the collected records

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use awful_news_search::adapters::{LaTimes, Reuters, SiteAdapter};
use awful_news_search::cli::Cli;
use awful_news_search::config::{SearchParams, Site, WorkItem};
use awful_news_search::engine::{ScrapeEngine, ScrapeRequest};
use awful_news_search::images::ImageStore;
use awful_news_search::models::{ArticleRecord, SearchReport};
use awful_news_search::outputs::{json, markdown, report_dir, report_stem};
use awful_news_search::session::{HttpSource, StaticSession};
use awful_news_search::utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news search starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let work_item = match &args.work_item {
        Some(path) => WorkItem::load(path).await?,
        None => WorkItem::default(),
    };
    let params = SearchParams::resolve(&args, work_item)?;
    info!(
        search_phrase = %params.search_phrase,
        section = %params.section,
        months = params.months,
        site = %params.site,
        "Resolved search parameters"
    );

    for dir in [&args.image_dir, &args.output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Directory is not writable (fix perms or choose a different path)");
            return Err(e);
        }
    }

    let source = HttpSource::new(Duration::from_secs(args.request_timeout_secs))?;
    let mut session = StaticSession::new(source);
    let images = ImageStore::new(&args.image_dir);

    let request = params.to_request();
    let records = match params.site {
        Site::Latimes => scrape(&mut session, &LaTimes::new(), &images, &request).await?,
        Site::Reuters => scrape(&mut session, &Reuters::new(), &images, &request).await?,
    };

    let report = SearchReport {
        site: params.site.to_string(),
        search_phrase: params.search_phrase.clone(),
        section: params.section.clone(),
        months: params.months,
        reference_date: request.reference_date,
        generated_at: Local::now().to_rfc3339(),
        articles: records,
    };

    // ---- Reports ----
    if let Err(e) = json::write_report(&report, &args.output_dir).await {
        error!(error = %e, "Failed to write JSON report");
    }

    let md = markdown::report_to_markdown(&report);
    let md_path = format!("{}/{}.md", report_dir(&report, &args.output_dir), report_stem(&report));
    info!(path = %md_path, "Writing Markdown");
    if let Err(e) = tokio::fs::write(&md_path, md).await {
        error!(path = %md_path, error = %e, "Failed writing Markdown");
    } else {
        info!(path = %md_path, "Wrote Markdown report");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = report.articles.len(),
        "Execution complete"
    );

    Ok(())
}

/// Run one scrape with `adapter`, logging the outcome.
#[instrument(level = "info", skip_all, fields(site = adapter.name()))]
async fn scrape<A: SiteAdapter>(
    session: &mut StaticSession<HttpSource>,
    adapter: &A,
    images: &ImageStore,
    request: &ScrapeRequest,
) -> Result<Vec<ArticleRecord>, Box<dyn Error>> {
    match ScrapeEngine::new(session, adapter, images).run(request).await {
        Ok(records) => {
            for record in &records {
                debug!(
                    title = %truncate_for_log(record.title(), 120),
                    date = %record.publish_date(),
                    "Collected article"
                );
            }
            Ok(records)
        }
        Err(e) if e.is_configuration() => {
            error!(error = %e, "Invalid search parameters");
            Err(e.into())
        }
        Err(e) => {
            error!(error = %e, "Scrape aborted");
            Err(e.into())
        }
    }
}

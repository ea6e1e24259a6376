//! Diagnostic events emitted by the scrape engine.
//!
//! The engine reports what it does through an injected [`ScrapeObserver`]
//! instead of logging directly. [`TracingObserver`] forwards events to
//! `tracing`; tests record them.

use chrono::NaiveDate;
use tracing::{info, warn};

/// Why a result item was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    MissingDate,
    UnparsableDate(String),
    MissingTitle,
    MissingImage,
    /// A lookup for a required field failed without ending the session.
    LookupFailed(String),
}

/// Why pagination ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EmptyPage,
    StaleItem,
    NoNextPage,
    NextPageDisabled,
    /// The next page leads back to a page already processed.
    RevisitedPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeEvent {
    SearchStarted {
        site: String,
        url: String,
        window_start: NaiveDate,
    },
    PageLoaded {
        page: usize,
        items: usize,
    },
    ItemDiscarded {
        page: usize,
        index: usize,
        reason: DiscardReason,
    },
    /// Item kept without a description.
    DescriptionMissing {
        page: usize,
        index: usize,
    },
    /// Item kept without an image because capture or saving failed.
    ImageDegraded {
        page: usize,
        index: usize,
        reason: String,
    },
    ItemAccepted {
        page: usize,
        index: usize,
        title: String,
    },
    StaleItemReached {
        page: usize,
        index: usize,
        date: NaiveDate,
    },
    PageAdvanced {
        page: usize,
    },
    Finished {
        records: usize,
        pages: usize,
        reason: StopReason,
    },
}

pub trait ScrapeObserver: Send + Sync {
    fn on_event(&self, event: &ScrapeEvent);
}

/// Logs every event with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScrapeObserver for TracingObserver {
    fn on_event(&self, event: &ScrapeEvent) {
        match event {
            ScrapeEvent::SearchStarted {
                site,
                url,
                window_start,
            } => info!(%site, %url, %window_start, "Starting search"),
            ScrapeEvent::PageLoaded { page, items } => {
                info!(page, items, "Processing results page")
            }
            ScrapeEvent::ItemDiscarded {
                page,
                index,
                reason,
            } => warn!(page, index, ?reason, "Discarding result item"),
            ScrapeEvent::DescriptionMissing { page, index } => {
                warn!(page, index, "No description found; keeping item")
            }
            ScrapeEvent::ImageDegraded {
                page,
                index,
                reason,
            } => warn!(page, index, %reason, "Image not saved; keeping item without image"),
            ScrapeEvent::ItemAccepted { page, index, title } => {
                info!(page, index, %title, "Processed article")
            }
            ScrapeEvent::StaleItemReached { page, index, date } => {
                info!(page, index, %date, "Reached item older than window; stopping")
            }
            ScrapeEvent::PageAdvanced { page } => info!(page, "Advanced to next page"),
            ScrapeEvent::Finished {
                records,
                pages,
                reason,
            } => info!(records, pages, ?reason, "Search finished"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every event for later assertions.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        events: Mutex<Vec<ScrapeEvent>>,
    }

    impl RecordingObserver {
        pub fn events(&self) -> Vec<ScrapeEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ScrapeObserver for RecordingObserver {
        fn on_event(&self, event: &ScrapeEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}

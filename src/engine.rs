//! The pagination engine shared by every site.
//!
//! # State Machine
//!
//! ```text
//! Searching -> ProcessingPage <-> Paginating -> Done
//! ```
//!
//! 1. **Searching**: navigate to the adapter's search URL and wait for results.
//! 2. **ProcessingPage**: walk the result items in document order. An item with
//!    a missing or unparsable date is skipped; the first item older than the
//!    window ends the scrape; items without a title are skipped; everything
//!    else becomes an [`ArticleRecord`].
//! 3. **Paginating**: follow the next-page affordance unless it is absent,
//!    disabled or leads back to a page already visited.
//! 4. **Done**: return the records gathered so far.
//!
//! Request validation happens before any navigation. Navigation and readiness
//! failures abort the scrape and no partial results are returned.

use crate::adapters::{FieldIssue, SiteAdapter};
use crate::error::ScrapeError;
use crate::images::ImageStore;
use crate::models::{ArticleRecord, count_phrase};
use crate::observer::{DiscardReason, ScrapeEvent, ScrapeObserver, StopReason, TracingObserver};
use crate::session::BrowserSession;
use crate::window::DateWindow;
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::instrument;
use url::Url;

/// Parameters of one scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub search_phrase: String,
    /// Section name; ignored by sites without sections.
    pub section: String,
    /// Months back to collect; `0` means the current month only.
    pub months: i32,
    /// Date the window is computed from.
    pub reference_date: NaiveDate,
}

impl ScrapeRequest {
    /// Request with today's local date as reference.
    pub fn new(search_phrase: impl Into<String>, section: impl Into<String>, months: i32) -> Self {
        Self {
            search_phrase: search_phrase.into(),
            section: section.into(),
            months,
            reference_date: Local::now().date_naive(),
        }
    }

    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrapeState {
    Searching,
    ProcessingPage,
    Paginating,
    Done(StopReason),
}

/// A validated request: trimmed phrase, window and first page.
struct Search {
    phrase: String,
    window: DateWindow,
    url: Url,
}

enum ItemOutcome {
    Accepted(ArticleRecord),
    Discarded,
    Stale,
}

/// Drives one [`BrowserSession`] through a site's search results.
pub struct ScrapeEngine<'a, S, A> {
    session: &'a mut S,
    adapter: &'a A,
    images: &'a ImageStore,
    observer: &'a dyn ScrapeObserver,
}

impl<'a, S, A> ScrapeEngine<'a, S, A>
where
    S: BrowserSession,
    A: SiteAdapter,
{
    /// Engine reporting through [`TracingObserver`].
    pub fn new(session: &'a mut S, adapter: &'a A, images: &'a ImageStore) -> Self {
        Self {
            session,
            adapter,
            images,
            observer: &TracingObserver,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn ScrapeObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Collect the records matching `request`, newest first.
    ///
    /// # Errors
    ///
    /// Configuration errors (empty phrase, negative months, unknown section)
    /// before any navigation; navigation, readiness and session errors once
    /// the scrape is under way.
    #[instrument(
        level = "info",
        skip_all,
        fields(site = self.adapter.name(), search_phrase = %request.search_phrase)
    )]
    pub async fn run(&mut self, request: &ScrapeRequest) -> Result<Vec<ArticleRecord>, ScrapeError> {
        let Search { phrase, window, url } = self.prepare(request)?;

        let mut records = Vec::new();
        let mut visited = HashSet::new();
        let mut page = 0usize;
        let mut state = ScrapeState::Searching;

        loop {
            state = match state {
                ScrapeState::Searching => {
                    self.emit(ScrapeEvent::SearchStarted {
                        site: self.adapter.name().to_string(),
                        url: url.to_string(),
                        window_start: window.start(),
                    });
                    self.session
                        .navigate(&url)
                        .await
                        .map_err(|source| ScrapeError::Navigation {
                            url: url.to_string(),
                            source,
                        })?;
                    self.adapter.wait_for_results_ready(&*self.session).await?;
                    visited.insert(self.session.current_url().unwrap_or_else(|| url.clone()));
                    page = 1;
                    ScrapeState::ProcessingPage
                }
                ScrapeState::ProcessingPage => {
                    self.process_page(&phrase, &window, page, &mut records).await?
                }
                ScrapeState::Paginating => match self.adapter.locate_next_page(&*self.session).await? {
                    None => ScrapeState::Done(StopReason::NoNextPage),
                    Some(next) if next.disabled => ScrapeState::Done(StopReason::NextPageDisabled),
                    Some(next) if next.target.as_ref().is_some_and(|t| visited.contains(t)) => {
                        ScrapeState::Done(StopReason::RevisitedPage)
                    }
                    Some(next) => {
                        self.adapter
                            .advance_to_next_page(&mut *self.session, &next)
                            .await?;
                        match self.session.current_url() {
                            Some(current) if !visited.insert(current.clone()) => {
                                ScrapeState::Done(StopReason::RevisitedPage)
                            }
                            _ => {
                                page += 1;
                                self.emit(ScrapeEvent::PageAdvanced { page });
                                ScrapeState::ProcessingPage
                            }
                        }
                    }
                },
                ScrapeState::Done(reason) => {
                    self.emit(ScrapeEvent::Finished {
                        records: records.len(),
                        pages: page,
                        reason,
                    });
                    return Ok(records);
                }
            };
        }
    }

    fn prepare(&self, request: &ScrapeRequest) -> Result<Search, ScrapeError> {
        let phrase = request.search_phrase.trim();
        if phrase.is_empty() {
            return Err(ScrapeError::EmptySearchPhrase);
        }
        let window = DateWindow::new(request.reference_date, request.months)?;
        let token = self.adapter.resolve_section(&request.section)?;
        let url = self.adapter.build_search_url(phrase, token)?;
        Ok(Search {
            phrase: phrase.to_string(),
            window,
            url,
        })
    }

    async fn process_page(
        &self,
        phrase: &str,
        window: &DateWindow,
        page: usize,
        records: &mut Vec<ArticleRecord>,
    ) -> Result<ScrapeState, ScrapeError> {
        let items = self
            .session
            .find_elements(None, self.adapter.locators().result_item)
            .await?;
        self.emit(ScrapeEvent::PageLoaded {
            page,
            items: items.len(),
        });
        if items.is_empty() {
            return Ok(ScrapeState::Done(StopReason::EmptyPage));
        }

        for (index, item) in items.iter().enumerate() {
            match self.process_item(phrase, window, page, index, item).await? {
                ItemOutcome::Accepted(record) => records.push(record),
                ItemOutcome::Discarded => {}
                ItemOutcome::Stale => return Ok(ScrapeState::Done(StopReason::StaleItem)),
            }
        }
        Ok(ScrapeState::Paginating)
    }

    async fn process_item(
        &self,
        phrase: &str,
        window: &DateWindow,
        page: usize,
        index: usize,
        item: &S::Element,
    ) -> Result<ItemOutcome, ScrapeError> {
        let fields = self.adapter.extract_item_fields(&*self.session, item).await?;

        let date = match fields.date {
            Ok(date) => date,
            Err(issue) => {
                let reason = match issue {
                    FieldIssue::Missing => DiscardReason::MissingDate,
                    FieldIssue::Unparsable(text) => DiscardReason::UnparsableDate(text),
                    FieldIssue::Lookup(e) => DiscardReason::LookupFailed(e),
                };
                return Ok(self.discard(page, index, reason));
            }
        };

        if window.is_stale(date) {
            self.emit(ScrapeEvent::StaleItemReached { page, index, date });
            return Ok(ItemOutcome::Stale);
        }

        let title = match fields.title {
            Ok(title) => title,
            Err(FieldIssue::Lookup(e)) => {
                return Ok(self.discard(page, index, DiscardReason::LookupFailed(e)));
            }
            Err(_) => return Ok(self.discard(page, index, DiscardReason::MissingTitle)),
        };

        let description = match fields.description {
            Ok(description) => Some(description),
            Err(_) => {
                self.emit(ScrapeEvent::DescriptionMissing { page, index });
                None
            }
        };

        let search_phrase_count = count_phrase(phrase, &title, description.as_deref());

        let image_path = match &fields.image {
            Ok(element) => self.save_image(page, index, element).await?,
            Err(_) if self.adapter.discard_if_no_image() => {
                return Ok(self.discard(page, index, DiscardReason::MissingImage));
            }
            Err(_) => None,
        };

        self.emit(ScrapeEvent::ItemAccepted {
            page,
            index,
            title: title.clone(),
        });
        Ok(ItemOutcome::Accepted(ArticleRecord::new(
            title,
            date,
            image_path,
            search_phrase_count,
            description,
        )))
    }

    /// Capture and store an item image; failures leave the item image-less.
    async fn save_image(
        &self,
        page: usize,
        index: usize,
        element: &S::Element,
    ) -> Result<Option<PathBuf>, ScrapeError> {
        let bytes = match self.session.screenshot(element).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                self.emit(ScrapeEvent::ImageDegraded {
                    page,
                    index,
                    reason: e.to_string(),
                });
                return Ok(None);
            }
        };

        match self.images.save(&bytes).await {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                self.emit(ScrapeEvent::ImageDegraded {
                    page,
                    index,
                    reason: e.to_string(),
                });
                Ok(None)
            }
        }
    }

    fn discard(&self, page: usize, index: usize, reason: DiscardReason) -> ItemOutcome {
        self.emit(ScrapeEvent::ItemDiscarded {
            page,
            index,
            reason,
        });
        ItemOutcome::Discarded
    }

    fn emit(&self, event: ScrapeEvent) {
        self.observer.on_event(&event);
    }
}

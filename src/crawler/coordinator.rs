//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the page loop that drives a crawl:
//! - fetching listing pages one at a time
//! - extracting candidates and enriching each from its detail page
//! - reporting progress after every page
//! - deciding when to stop (404, empty page, page cap, cancellation, failure)
//!
//! Pages are strictly sequential: whether page N+1 exists is only known once
//! page N has been looked at.

use crate::config::{CatalogConfig, Config};
use crate::crawler::enricher::enrich;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchOutcome};
use crate::crawler::handle::CrawlHandle;
use crate::crawler::pagination::page_url;
use crate::crawler::parser::{extract_listing, extract_product, CatalogSelectors};
use crate::crawler::request::{CrawlMode, CrawlProgress, CrawlRequest, CrawlResult, CrawlStatus};
use crate::HarvestError;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

/// Main crawler coordinator structure
pub struct Coordinator {
    client: Client,
    catalog: CatalogConfig,
    selectors: CatalogSelectors,
    listing_timeout: Duration,
    detail_timeout: Duration,
    progress: Option<UnboundedSender<CrawlProgress>>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - HTTP client built and selectors compiled
    /// * `Err(HarvestError)` - Invalid selectors or client setup failure
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.crawler)?;
        let selectors = CatalogSelectors::from_config(&config.catalog)?;

        Ok(Self {
            client,
            catalog: config.catalog.clone(),
            selectors,
            listing_timeout: config.crawler.listing_timeout(),
            detail_timeout: config.crawler.detail_timeout(),
            progress: None,
        })
    }

    /// Sends a [`CrawlProgress`] on `sender` after every finished page
    pub fn with_progress(mut self, sender: UnboundedSender<CrawlProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Runs the crawl on a background task and returns its handle
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self, request: CrawlRequest, mode: CrawlMode) -> CrawlHandle {
        CrawlHandle::spawn(self, request, mode)
    }

    /// Runs a crawl to completion on the current task
    pub async fn run(&self, request: CrawlRequest, mode: CrawlMode) -> CrawlResult {
        match mode.resolve(request.start_url(), &self.catalog) {
            CrawlMode::Item => self.crawl_single_item(&request).await,
            _ => self.crawl_pages(&request).await,
        }
    }

    /// Walks the listing pages starting at the request's URL
    ///
    /// # Termination
    ///
    /// | Condition | Status |
    /// |-----------|--------|
    /// | Listing page returns 404 | Completed |
    /// | Listing page has no items | Completed |
    /// | Next page would exceed the page cap | Completed |
    /// | Cancelled when a page has been finished | Cancelled |
    /// | Listing page fetch fails otherwise | Failed |
    ///
    /// Records gathered before the stop are always returned.
    pub async fn crawl_pages(&self, request: &CrawlRequest) -> CrawlResult {
        let start_time = Instant::now();
        let start = request.start_url();
        let mut records = Vec::new();
        let mut page: u32 = 1;

        tracing::info!("Starting catalog crawl at {}", start);

        let status = loop {
            let url = page_url(start, page, &self.catalog);
            tracing::info!("Fetching listing page {}: {}", page, url);

            let (body, final_url) = match fetch_page(&self.client, &url, self.listing_timeout).await
            {
                FetchOutcome::Body { text, final_url } => (text, final_url),
                FetchOutcome::NotFound => {
                    tracing::info!("Page {} not found, end of catalog", page);
                    break CrawlStatus::Completed;
                }
                FetchOutcome::TransportError { detail } => {
                    tracing::error!("Failed to fetch page {} ({}): {}", page, url, detail);
                    break CrawlStatus::Failed(format!(
                        "Failed to fetch page {} ({}): {}",
                        page, url, detail
                    ));
                }
            };

            let candidates = extract_listing(&body, &final_url, page, &self.selectors);
            if candidates.is_empty() {
                tracing::info!("Page {} has no items, end of catalog", page);
                break CrawlStatus::Completed;
            }

            tracing::debug!("Page {} lists {} items", page, candidates.len());
            for candidate in candidates {
                let record =
                    enrich(&self.client, &self.selectors, candidate, self.detail_timeout).await;
                tracing::debug!("Scraped '{}'", record.title());
                records.push(record);
            }

            self.report(CrawlProgress {
                page,
                items_so_far: records.len(),
            });

            page = match page.checked_add(1) {
                Some(next) => next,
                None => break CrawlStatus::Completed,
            };

            if request.max_pages().is_some_and(|max| page > max) {
                tracing::info!("Reached page cap of {}", page - 1);
                break CrawlStatus::Completed;
            }

            if request.cancel_token().is_cancelled() {
                tracing::info!("Crawl cancelled after page {}", page - 1);
                break CrawlStatus::Cancelled;
            }
        };

        tracing::info!(
            "Crawl {}: {} items in {:?}",
            status,
            records.len(),
            start_time.elapsed()
        );

        CrawlResult::new(records, status)
    }

    /// Scrapes one product page without entering the page loop
    ///
    /// The single record is reported as page 1.
    pub async fn crawl_single_item(&self, request: &CrawlRequest) -> CrawlResult {
        let url = request.start_url();
        tracing::info!("Fetching single item page {}", url);

        match fetch_page(&self.client, url, self.listing_timeout).await {
            FetchOutcome::Body { text, .. } => {
                let record = extract_product(&text, url, &self.selectors);
                tracing::info!("Scraped '{}'", record.title());
                self.report(CrawlProgress {
                    page: 1,
                    items_so_far: 1,
                });
                CrawlResult::new(vec![record], CrawlStatus::Completed)
            }
            FetchOutcome::NotFound => {
                tracing::error!("Item page {} not found", url);
                CrawlResult::new(
                    Vec::new(),
                    CrawlStatus::Failed(format!("Item page {} not found", url)),
                )
            }
            FetchOutcome::TransportError { detail } => {
                tracing::error!("Failed to fetch item page {}: {}", url, detail);
                CrawlResult::new(
                    Vec::new(),
                    CrawlStatus::Failed(format!("Failed to fetch item page {}: {}", url, detail)),
                )
            }
        }
    }

    fn report(&self, progress: CrawlProgress) {
        if let Some(sender) = &self.progress {
            // A caller that stopped listening does not stop the crawl.
            let _ = sender.send(progress);
        }
    }
}

/// Runs a crawl with the given configuration on a background task
///
/// This is the main entry point for callers that do not need to reuse a
/// [`Coordinator`].
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::Config;
/// use catalog_harvest::crawler::{start_crawl, CrawlMode, CrawlRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let request = CrawlRequest::new(
///     "http://books.toscrape.com/catalogue/category/books/science_22/index.html",
///     Some(2),
/// )?;
/// let handle = start_crawl(&Config::default(), request, CrawlMode::Category)?;
/// let result = handle
///     .wait_with_progress(|p| println!("page {} done, {} items", p.page, p.items_so_far))
///     .await;
/// println!("{} records, {}", result.records.len(), result.status);
/// # Ok(())
/// # }
/// ```
pub fn start_crawl(
    config: &Config,
    request: CrawlRequest,
    mode: CrawlMode,
) -> Result<CrawlHandle, HarvestError> {
    Ok(Coordinator::new(config)?.start(request, mode))
}

//! Crawl request and result types

use crate::config::CatalogConfig;
use crate::model::Record;
use crate::HarvestError;
use std::fmt;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How the start URL should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CrawlMode {
    /// Decide from the shape of the URL
    #[default]
    Auto,
    /// A paginated category listing
    Category,
    /// A single product page
    Item,
}

impl CrawlMode {
    /// Resolves `Auto` against a start URL; other modes are returned as is
    ///
    /// A URL is taken to address a single item when its path lies under
    /// `/catalogue/` but outside `/category/`, and its file is an `.html`
    /// page other than a numbered listing page built from the catalog's
    /// page template (`page-N.html` by default).
    pub fn resolve(self, start_url: &Url, catalog: &CatalogConfig) -> Self {
        match self {
            Self::Auto => Self::detect(start_url, catalog),
            mode => mode,
        }
    }

    /// Guesses the entry mode from the URL path
    pub fn detect(start_url: &Url, catalog: &CatalogConfig) -> Self {
        let path = start_url.path();
        let file_name = path.rsplit('/').next().unwrap_or_default();
        if path.contains("/catalogue/")
            && !path.contains("/category/")
            && file_name.ends_with(".html")
            && !is_listing_page(file_name, &catalog.page_template)
        {
            Self::Item
        } else {
            Self::Category
        }
    }
}

/// Returns true if `file_name` is the page template with a page number filled in
fn is_listing_page(file_name: &str, page_template: &str) -> bool {
    let Some((prefix, suffix)) = page_template.split_once("{}") else {
        return false;
    };
    file_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(suffix))
        .is_some_and(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
}

/// One crawl invocation
///
/// Built by the caller, consumed by exactly one crawl.
#[derive(Debug)]
pub struct CrawlRequest {
    start_url: Url,
    max_pages: Option<u32>,
    cancel: CancellationToken,
}

impl CrawlRequest {
    /// Validates and builds a request
    ///
    /// # Arguments
    ///
    /// * `start_url` - Absolute http(s) URL of the first listing page or the item page
    /// * `max_pages` - Optional page cap; must be positive when given
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRequest)` - Request with a fresh cancellation token
    /// * `Err(HarvestError::InvalidRequest)` - Malformed URL or a zero page cap
    pub fn new(start_url: &str, max_pages: Option<u32>) -> Result<Self, HarvestError> {
        let start_url = Url::parse(start_url.trim()).map_err(|e| {
            HarvestError::InvalidRequest(format!("malformed start URL '{}': {}", start_url, e))
        })?;

        if start_url.scheme() != "http" && start_url.scheme() != "https" {
            return Err(HarvestError::InvalidRequest(format!(
                "start URL must use http or https, got '{}'",
                start_url.scheme()
            )));
        }

        if start_url.host_str().is_none() {
            return Err(HarvestError::InvalidRequest(
                "start URL has no host".to_string(),
            ));
        }

        if max_pages == Some(0) {
            return Err(HarvestError::InvalidRequest(
                "max pages must be a positive number".to_string(),
            ));
        }

        Ok(Self {
            start_url,
            max_pages,
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the request's cancellation token with one the caller holds
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    pub fn max_pages(&self) -> Option<u32> {
        self.max_pages
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Terminal status of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlStatus {
    /// Ran out of pages, hit the page cap, or scraped the single item
    Completed,
    /// Stopped at a page boundary after cancellation
    Cancelled,
    /// A listing page could not be fetched
    Failed(String),
}

impl CrawlStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Records gathered by one crawl, in discovery order, plus how it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    pub records: Vec<Record>,
    pub status: CrawlStatus,
}

impl CrawlResult {
    pub fn new(records: Vec<Record>, status: CrawlStatus) -> Self {
        Self { records, status }
    }
}

/// Progress notification sent after each listing page is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    /// 1-based index of the page just finished
    pub page: u32,
    /// Records accumulated so far, this page included
    pub items_so_far: usize,
}

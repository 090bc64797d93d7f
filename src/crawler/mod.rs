//! Crawler module for catalog page fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-request timeouts
//! - Listing and detail page parsing
//! - Best-effort detail page enrichment
//! - Page URL derivation
//! - The page loop and its background task handle

mod coordinator;
mod enricher;
mod fetcher;
mod handle;
mod pagination;
mod parser;
mod request;

pub use coordinator::{start_crawl, Coordinator};
pub use enricher::enrich;
pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub use handle::CrawlHandle;
pub use pagination::page_url;
pub use parser::{extract_availability, extract_listing, extract_product, CatalogSelectors};
pub use request::{CrawlMode, CrawlProgress, CrawlRequest, CrawlResult, CrawlStatus};

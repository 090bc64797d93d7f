//! Detail page enrichment
//!
//! Enrichment is best effort. Whatever happens while fetching or reading a
//! detail page, the listing fields of the candidate survive and only the
//! availability is left empty.

use crate::crawler::fetcher::{fetch_page, FetchOutcome};
use crate::crawler::parser::{extract_availability, CatalogSelectors};
use crate::model::{CandidateRecord, Record};
use reqwest::Client;
use std::time::Duration;

/// Completes a candidate with the availability read from its detail page
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `selectors` - The compiled catalog selectors
/// * `candidate` - The listing-page item to complete
/// * `timeout` - Detail page request timeout
pub async fn enrich(
    client: &Client,
    selectors: &CatalogSelectors,
    candidate: CandidateRecord,
    timeout: Duration,
) -> Record {
    let Some(link) = candidate.detail_link.clone() else {
        tracing::debug!("Item '{}' has no detail link", candidate.title);
        return candidate.into_record("");
    };

    match fetch_page(client, &link, timeout).await {
        FetchOutcome::Body { text, .. } => {
            let availability = extract_availability(&text, selectors).unwrap_or_else(|| {
                tracing::debug!("No availability on {}", link);
                String::new()
            });
            candidate.into_record(&availability)
        }
        FetchOutcome::NotFound => {
            tracing::warn!("Detail page {} not found, keeping listing fields", link);
            candidate.into_record("")
        }
        FetchOutcome::TransportError { detail } => {
            tracing::warn!("Detail page {} failed: {}, keeping listing fields", link, detail);
            candidate.into_record("")
        }
    }
}

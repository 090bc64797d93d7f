//! HTML parser for listing and detail pages
//!
//! This module turns page markup into typed values:
//! - listing pages into [`CandidateRecord`]s (title, price, rating, detail link)
//! - detail pages into an availability string
//! - a standalone product page into a complete [`Record`]
//!
//! Every field lookup has an explicit fallback. A missing element never
//! aborts extraction of the other fields on the same item.

use crate::config::CatalogConfig;
use crate::model::{normalize_whitespace, CandidateRecord, Rating, Record};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled selectors for one catalog layout
#[derive(Debug, Clone)]
pub struct CatalogSelectors {
    item: Selector,
    title_link: Selector,
    price: Selector,
    rating: Selector,
    availability: Selector,
    product: Selector,
    product_title: Selector,
}

impl CatalogSelectors {
    /// Compiles the selectors named in the catalog configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CatalogSelectors)` - Every selector parsed
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that did not
    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            item: compile(&config.item_selector)?,
            title_link: compile(&config.title_link_selector)?,
            price: compile(&config.price_selector)?,
            rating: compile(&config.rating_selector)?,
            availability: compile(&config.availability_selector)?,
            product: compile(&config.product_selector)?,
            product_title: compile(&config.product_title_selector)?,
        })
    }
}

impl Default for CatalogSelectors {
    /// Selectors for the books.toscrape.com markup
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default()).expect("default selectors are valid")
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Extracts every item on a listing page
///
/// An empty result means the page holds no item containers, which the
/// crawler treats as the end of the catalog.
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `page_url` - URL the body was served from, for resolving detail links
/// * `source_page` - 1-based index of the page
/// * `selectors` - The compiled catalog selectors
///
/// # Example
///
/// ```
/// use catalog_harvest::crawler::{extract_listing, CatalogSelectors};
/// use url::Url;
///
/// let html = r#"<article class="product_pod">
///   <p class="star-rating Three"></p>
///   <h3><a href="../item_1/index.html" title="A Book">A Book</a></h3>
///   <p class="price_color">£10.00</p>
/// </article>"#;
/// let page = Url::parse("https://books.example/catalogue/category/x/index.html").unwrap();
/// let items = extract_listing(html, &page, 1, &CatalogSelectors::default());
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].title, "A Book");
/// ```
pub fn extract_listing(
    html: &str,
    page_url: &Url,
    source_page: u32,
    selectors: &CatalogSelectors,
) -> Vec<CandidateRecord> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.item)
        .map(|item| {
            let link = item.select(&selectors.title_link).next();

            // The listing truncates long titles in the link text; the title
            // attribute carries the full one.
            let title = link
                .and_then(|a| a.value().attr("title"))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .or_else(|| link.map(element_text))
                .unwrap_or_default();

            let price = first_text(item, &selectors.price).unwrap_or_default();
            let rating = item.select(&selectors.rating).next().and_then(rating_of);
            let detail_link = link
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve_link(href, page_url));

            CandidateRecord {
                title,
                price,
                rating,
                detail_link,
                page_url: page_url.clone(),
                source_page,
            }
        })
        .collect()
}

/// Extracts the availability text from a detail page
///
/// Returns None when the page has no availability element.
pub fn extract_availability(html: &str, selectors: &CatalogSelectors) -> Option<String> {
    let document = Html::parse_document(html);
    first_text(document.root_element(), &selectors.availability)
}

/// Extracts a complete record from a standalone product page
///
/// Fields are read inside the product block when the page has one, and from
/// the whole document otherwise.
///
/// # Arguments
///
/// * `html` - The product page body
/// * `page_url` - The product page URL, stored as the record link
/// * `selectors` - The compiled catalog selectors
pub fn extract_product(html: &str, page_url: &Url, selectors: &CatalogSelectors) -> Record {
    let document = Html::parse_document(html);
    let scope = document
        .select(&selectors.product)
        .next()
        .unwrap_or_else(|| document.root_element());

    let title = first_text(scope, &selectors.product_title).unwrap_or_default();
    let price = first_text(scope, &selectors.price).unwrap_or_default();
    let rating = scope.select(&selectors.rating).next().and_then(rating_of);
    let availability = first_text(scope, &selectors.availability)
        .or_else(|| first_text(document.root_element(), &selectors.availability))
        .unwrap_or_default();

    Record::new(&title, &price, rating, &availability, 1, page_url.clone())
}

/// Reads the rating word out of an element's class list
fn rating_of(element: ElementRef<'_>) -> Option<Rating> {
    element.value().classes().find_map(Rating::from_label)
}

/// Text of the first match under `scope`, whitespace-normalized
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only and empty hrefs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
}

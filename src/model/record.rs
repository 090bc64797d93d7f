//! Record types produced by the extractors

use crate::model::Rating;
use url::Url;

/// Sentinel stored when a title or price could not be read from the markup
pub const NOT_AVAILABLE: &str = "N/A";

/// Column names shared by every sink, in field declaration order
pub const COLUMNS: [&str; 6] = [
    "title",
    "price",
    "rating",
    "availability",
    "source_page",
    "link",
];

/// One extracted catalog item
///
/// Records are immutable once built. `title` and `price` are never empty
/// (they fall back to [`NOT_AVAILABLE`]) and `link` is always absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    title: String,
    price: String,
    rating: Option<Rating>,
    availability: String,
    source_page: u32,
    link: Url,
}

impl Record {
    /// Builds a record, applying the sentinel and whitespace rules
    ///
    /// # Arguments
    ///
    /// * `title` - Item title; blank becomes `N/A`
    /// * `price` - Price exactly as displayed; blank becomes `N/A`
    /// * `rating` - Star rating, if one was recognised
    /// * `availability` - Stock text; whitespace runs are collapsed
    /// * `source_page` - 1-based listing page the item was found on
    /// * `link` - Absolute detail-page URL
    pub fn new(
        title: &str,
        price: &str,
        rating: Option<Rating>,
        availability: &str,
        source_page: u32,
        link: Url,
    ) -> Self {
        debug_assert!(source_page >= 1, "source pages are 1-based");
        Self {
            title: or_sentinel(title),
            price: or_sentinel(price),
            rating,
            availability: normalize_whitespace(availability),
            source_page,
            link,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    pub fn availability(&self) -> &str {
        &self.availability
    }

    pub fn source_page(&self) -> u32 {
        self.source_page
    }

    pub fn link(&self) -> &Url {
        &self.link
    }

    /// Returns the canonical string form of every field, in column order
    ///
    /// An absent rating is an empty string.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.title.clone(),
            self.price.clone(),
            self.rating.map(|r| r.to_string()).unwrap_or_default(),
            self.availability.clone(),
            self.source_page.to_string(),
            self.link.to_string(),
        ]
    }
}

/// A listing-page item awaiting detail-page enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    /// Item title from the listing markup
    pub title: String,

    /// Displayed price from the listing markup
    pub price: String,

    /// Star rating from the listing markup
    pub rating: Option<Rating>,

    /// Absolute detail-page URL, if the item carried a usable link
    pub detail_link: Option<Url>,

    /// The listing page this candidate was found on
    pub page_url: Url,

    /// 1-based index of that listing page
    pub source_page: u32,
}

impl CandidateRecord {
    /// Returns the URL stored as the record's link
    ///
    /// Falls back to the listing page when the item had no detail link.
    pub fn link(&self) -> &Url {
        self.detail_link.as_ref().unwrap_or(&self.page_url)
    }

    /// Finishes the candidate with the given availability text
    pub fn into_record(self, availability: &str) -> Record {
        let link = self.link().clone();
        Record::new(
            &self.title,
            &self.price,
            self.rating,
            availability,
            self.source_page,
            link,
        )
    }
}

/// Collapses every whitespace run into a single space and trims the ends
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn or_sentinel(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

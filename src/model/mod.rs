//! Record model for extracted catalog items
//!
//! This module defines the normalized shape of one scraped product and the
//! star-rating lookup used by both the listing and detail extractors.

mod rating;
mod record;

pub use rating::Rating;
pub use record::{CandidateRecord, Record, COLUMNS, NOT_AVAILABLE};
pub(crate) use record::normalize_whitespace;

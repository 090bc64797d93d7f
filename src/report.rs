//! Console reporting for a finished crawl
//!
//! This module summarises a crawl's records and renders a short preview
//! table for the terminal.

use crate::crawler::CrawlResult;
use crate::model::{Rating, Record};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Longest title shown in the preview before it is cut
const TITLE_WIDTH: usize = 40;

/// Aggregate figures for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of records gathered
    pub total_records: usize,

    /// Highest listing page any record came from
    pub last_page: u32,

    /// Records per star rating; unrated records are counted under `None`
    pub by_rating: BTreeMap<Option<Rating>, usize>,

    /// Records whose detail page yielded no availability
    pub missing_availability: usize,
}

impl RunSummary {
    /// Computes the summary of a set of records
    pub fn from_records(records: &[Record]) -> Self {
        let mut summary = Self {
            total_records: records.len(),
            ..Self::default()
        };

        for record in records {
            summary.last_page = summary.last_page.max(record.source_page());
            *summary.by_rating.entry(record.rating()).or_insert(0) += 1;
            if record.availability().is_empty() {
                summary.missing_availability += 1;
            }
        }

        summary
    }
}

/// Prints the crawl outcome and its summary to stdout
pub fn print_summary(result: &CrawlResult) {
    let summary = RunSummary::from_records(&result.records);

    println!("=== Crawl {} ===\n", result.status);
    println!("  Records: {}", summary.total_records);
    println!("  Listing pages: {}", summary.last_page);
    println!(
        "  Without availability: {}",
        summary.missing_availability
    );

    if !summary.by_rating.is_empty() {
        println!("\nBy rating:");
        for (rating, count) in &summary.by_rating {
            match rating {
                Some(r) => println!("  {} star: {}", r, count),
                None => println!("  unrated: {}", count),
            }
        }
    }
    println!();
}

/// Renders the first `limit` records as a fixed-width table
///
/// Titles longer than the column are cut and marked with `...`.
pub fn render_preview(records: &[Record], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>10}  {:>6}  {:>4}  availability",
        "title",
        "price",
        "rating",
        "page",
        width = TITLE_WIDTH
    );

    for record in records.iter().take(limit) {
        let rating = record.rating().map(|r| r.to_string()).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<width$}  {:>10}  {:>6}  {:>4}  {}",
            truncate(record.title(), TITLE_WIDTH),
            record.price(),
            rating,
            record.source_page(),
            record.availability(),
            width = TITLE_WIDTH
        );
    }

    if records.len() > limit {
        let _ = writeln!(out, "... and {} more", records.len() - limit);
    }

    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

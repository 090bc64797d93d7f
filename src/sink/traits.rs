//! Sink traits and error types
//!
//! This module defines the trait interface shared by the file-backed sinks
//! and the error type every sink reports.

use crate::model::Record;
use thiserror::Error;

/// Errors that can occur while writing records to a destination
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    Mysql(#[from] sqlx::Error),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

impl SinkError {
    /// Returns true for errors caused by the request rather than the write
    ///
    /// These are raised before the destination is touched.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::InvalidDestination(_))
    }
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Trait for synchronous, file-backed sinks
///
/// A write replaces whatever the destination held before. When it fails the
/// destination is left as it was.
pub trait RecordSink {
    /// Replaces the destination's contents with `records`
    ///
    /// Rows are written in slice order, columns in [`crate::model::COLUMNS`] order.
    fn replace_all(&self, records: &[Record]) -> SinkResult<()>;

    /// Human-readable destination, for logs
    fn describe(&self) -> String;
}

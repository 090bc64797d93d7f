//! Sinks that persist a finished crawl's records
//!
//! Every sink replaces the destination's previous contents and writes the
//! same six columns in the same order:
//! - `csv`: comma-separated text with a header row
//! - `xlsx`: a single worksheet named after the table
//! - `sqlite`: one table in a local database file
//! - `mysql`: one table in a database on an external server (feature `mysql`)

mod csv_sink;
#[cfg(feature = "mysql")]
mod mysql;
mod sqlite;
mod traits;
mod xlsx;

pub use csv_sink::CsvSink;
#[cfg(feature = "mysql")]
pub use mysql::MySqlSink;
pub use sqlite::SqliteSink;
pub use traits::{RecordSink, SinkError, SinkResult};
pub use xlsx::XlsxSink;

use crate::config::{MySqlConfig, OutputConfig};
use crate::model::Record;
use serde::Deserialize;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Output format a crawl can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    Csv,
    Xlsx,
    Sqlite,
    Mysql,
}

impl SinkFormat {
    /// File extension used when no output path is configured
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Sqlite => "db",
            Self::Mysql => "mysql",
        }
    }

    /// Returns true for formats written to a local file
    pub fn is_file(self) -> bool {
        !matches!(self, Self::Mysql)
    }
}

impl fmt::Display for SinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
        };
        write!(f, "{}", name)
    }
}

/// Connection settings and table for the external database sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDbOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table: String,
}

/// Where, and in which format, records are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Csv { path: PathBuf },
    Xlsx { path: PathBuf, sheet: String },
    Sqlite { path: PathBuf, table: String },
    Mysql(ExternalDbOptions),
}

impl SinkTarget {
    /// Builds the target described by the output and mysql settings
    pub fn from_config(output: &OutputConfig, mysql: &MySqlConfig) -> Self {
        match output.format {
            SinkFormat::Csv => Self::Csv {
                path: output.resolved_path(),
            },
            SinkFormat::Xlsx => Self::Xlsx {
                path: output.resolved_path(),
                sheet: output.table.clone(),
            },
            SinkFormat::Sqlite => Self::Sqlite {
                path: output.resolved_path(),
                table: output.table.clone(),
            },
            SinkFormat::Mysql => Self::Mysql(ExternalDbOptions {
                host: mysql.host.clone(),
                port: mysql.port,
                user: mysql.user.clone(),
                password: mysql.password.clone(),
                database: mysql.database.clone(),
                table: output.table.clone(),
            }),
        }
    }

    pub fn format(&self) -> SinkFormat {
        match self {
            Self::Csv { .. } => SinkFormat::Csv,
            Self::Xlsx { .. } => SinkFormat::Xlsx,
            Self::Sqlite { .. } => SinkFormat::Sqlite,
            Self::Mysql(_) => SinkFormat::Mysql,
        }
    }
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv { path } => write!(f, "{}", path.display()),
            Self::Xlsx { path, sheet } => write!(f, "{} (sheet {})", path.display(), sheet),
            Self::Sqlite { path, table } => write!(f, "{} (table {})", path.display(), table),
            Self::Mysql(db) => write!(
                f,
                "mysql://{}@{}:{}/{} (table {})",
                db.user, db.host, db.port, db.database, db.table
            ),
        }
    }
}

/// Sink dispatcher
///
/// Knows which formats this build can write. The external database sink is
/// only available when the crate is built with the `mysql` feature.
#[derive(Debug, Clone, Copy)]
pub struct Sinks {
    external_db: bool,
}

impl Sinks {
    /// Detects the sinks compiled into this build
    pub fn detect() -> Self {
        Self {
            external_db: cfg!(feature = "mysql"),
        }
    }

    /// Dispatcher restricted to the local file formats
    pub fn files_only() -> Self {
        Self { external_db: false }
    }

    /// Returns true if `format` can be written by this dispatcher
    pub fn supports(&self, format: SinkFormat) -> bool {
        format.is_file() || self.external_db
    }

    /// Writes `records` to `target`, replacing what it held before
    ///
    /// # Arguments
    ///
    /// * `records` - Records in crawl order; may be empty
    /// * `target` - Destination and format
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The destination now holds exactly `records`
    /// * `Err(SinkError::Unavailable)` - The format is not supported by this build
    /// * `Err(SinkError)` - The write failed; the destination is unchanged
    pub async fn write(&self, records: &[Record], target: &SinkTarget) -> SinkResult<()> {
        if !self.supports(target.format()) {
            return Err(SinkError::Unavailable(format!(
                "the {} sink is not available in this build",
                target.format()
            )));
        }

        tracing::info!("Writing {} records to {}", records.len(), target);

        match target {
            SinkTarget::Csv { path } => CsvSink::new(path).replace_all(records),
            SinkTarget::Xlsx { path, sheet } => XlsxSink::new(path, sheet).replace_all(records),
            SinkTarget::Sqlite { path, table } => SqliteSink::new(path, table).replace_all(records),
            SinkTarget::Mysql(options) => write_external(records, options).await,
        }
    }
}

#[cfg(feature = "mysql")]
async fn write_external(records: &[Record], options: &ExternalDbOptions) -> SinkResult<()> {
    MySqlSink::new(options.clone()).replace_all(records).await
}

#[cfg(not(feature = "mysql"))]
async fn write_external(_records: &[Record], _options: &ExternalDbOptions) -> SinkResult<()> {
    Err(SinkError::Unavailable(
        "built without the mysql feature".to_string(),
    ))
}

/// Writes a file through a hidden sibling and renames it over `dest`
///
/// `write` receives the temporary path. If it fails, the temporary file is
/// removed and `dest` is left untouched.
pub(crate) fn replace_file<F>(dest: &Path, write: F) -> SinkResult<()>
where
    F: FnOnce(&Path) -> SinkResult<()>,
{
    let file_name = dest.file_name().ok_or_else(|| {
        SinkError::InvalidDestination(format!("{} does not name a file", dest.display()))
    })?;

    let mut temp_name = OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(format!(".{}.tmp", std::process::id()));
    let temp_path = dest.with_file_name(temp_name);

    let outcome = write(&temp_path).and_then(|()| Ok(std::fs::rename(&temp_path, dest)?));
    if outcome.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    outcome
}

/// Checks a table name before it is spliced into SQL
pub(crate) fn check_table_name(table: &str) -> SinkResult<()> {
    if table.trim().is_empty() {
        return Err(SinkError::InvalidDestination(
            "table name must not be empty".to_string(),
        ));
    }
    if table.contains('\0') {
        return Err(SinkError::InvalidDestination(format!(
            "table name {:?} contains a NUL byte",
            table
        )));
    }
    Ok(())
}

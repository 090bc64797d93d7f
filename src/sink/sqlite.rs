//! SQLite sink
//!
//! This module writes records into one table of a local SQLite database.
//! The table is dropped and recreated inside a single transaction, so a
//! failed write rolls back to the previous contents.

use crate::model::Record;
use crate::sink::check_table_name;
use crate::sink::traits::{RecordSink, SinkResult};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQLite sink
pub struct SqliteSink {
    path: PathBuf,
    table: String,
}

impl SqliteSink {
    /// Creates a sink for `table` in the database file at `path`
    ///
    /// The file is created on first write if it does not exist.
    pub fn new(path: &Path, table: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            table: table.to_string(),
        }
    }

    /// Writes `records` into an already open connection
    ///
    /// # Arguments
    ///
    /// * `conn` - Database to write to
    /// * `records` - Rows to store, in order
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Table replaced and committed
    /// * `Err(SinkError)` - Transaction rolled back
    pub fn replace_in(&self, conn: &mut Connection, records: &[Record]) -> SinkResult<()> {
        check_table_name(&self.table)?;
        let table = quote_ident(&self.table);

        let tx = conn.transaction()?;
        tx.execute_batch(&format!(
            "
            DROP TABLE IF EXISTS {table};
            CREATE TABLE {table} (
                title TEXT NOT NULL,
                price TEXT NOT NULL,
                rating INTEGER,
                availability TEXT NOT NULL,
                source_page INTEGER NOT NULL,
                link TEXT NOT NULL
            );
            ",
            table = table
        ))?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (title, price, rating, availability, source_page, link)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                table
            ))?;

            for record in records {
                stmt.execute(params![
                    record.title(),
                    record.price(),
                    record.rating().map(|r| r.value()),
                    record.availability(),
                    record.source_page(),
                    record.link().as_str(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

impl RecordSink for SqliteSink {
    fn replace_all(&self, records: &[Record]) -> SinkResult<()> {
        // Checked before opening, which would create the file.
        check_table_name(&self.table)?;
        let mut conn = Connection::open(&self.path)?;
        self.replace_in(&mut conn, records)?;

        tracing::debug!("Wrote {} rows to {}", records.len(), self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} (table {})", self.path.display(), self.table)
    }
}

/// Quotes an SQLite identifier
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

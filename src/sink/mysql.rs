//! MySQL sink
//!
//! Records are loaded into a staging table which then replaces the target
//! in a single `RENAME TABLE`, so readers never see a half-written table
//! and a failed load leaves the previous contents in place. The database
//! is created if it does not exist.

use crate::model::{Record, COLUMNS};
use crate::sink::traits::SinkResult;
use crate::sink::{check_table_name, ExternalDbOptions};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, MySql, QueryBuilder};

/// Rows sent per INSERT statement
///
/// Six placeholders per row keeps a full batch under the server's limit of
/// 65535 placeholders per prepared statement.
const ROWS_PER_INSERT: usize = 10_000;

/// Writes records to a table on a MySQL server
pub struct MySqlSink {
    options: ExternalDbOptions,
}

impl MySqlSink {
    pub fn new(options: ExternalDbOptions) -> Self {
        Self { options }
    }

    /// Replaces the target table's contents with `records`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Target table swapped for the freshly loaded one
    /// * `Err(SinkError::Mysql)` - Connection or statement failure
    pub async fn replace_all(&self, records: &[Record]) -> SinkResult<()> {
        let db = &self.options;
        check_table_name(&db.table)?;
        check_table_name(&db.database)?;

        let connect = MySqlConnectOptions::new()
            .host(&db.host)
            .port(db.port)
            .username(&db.user)
            .password(&db.password);
        let mut conn = MySqlConnection::connect_with(&connect).await?;

        let database = quote_ident(&db.database);
        let table = quote_ident(&db.table);
        let staging = quote_ident(&format!("{}__staging", db.table));
        let previous = quote_ident(&format!("{}__previous", db.table));

        let prepare = format!(
            "CREATE DATABASE IF NOT EXISTS {database};
             USE {database};
             DROP TABLE IF EXISTS {staging}, {previous};
             {create_staging};
             {create_target};",
            database = database,
            staging = staging,
            previous = previous,
            create_staging = create_table_sql(&staging, false),
            create_target = create_table_sql(&table, true),
        );
        sqlx::raw_sql(&prepare).execute(&mut conn).await?;

        if let Err(e) = load_and_swap(&mut conn, &table, &staging, &previous, records).await {
            // The target is untouched; only the scratch tables need to go.
            if let Err(cleanup) = sqlx::raw_sql(&cleanup_sql(&staging, &previous))
                .execute(&mut conn)
                .await
            {
                tracing::warn!("Failed to drop staging table {}: {}", staging, cleanup);
            }
            return Err(e);
        }

        conn.close().await?;
        tracing::debug!(
            "Wrote {} rows to {}.{} on {}",
            records.len(),
            db.database,
            db.table,
            db.host
        );
        Ok(())
    }
}

/// Fills the staging table and swaps it in place of the target
async fn load_and_swap(
    conn: &mut MySqlConnection,
    table: &str,
    staging: &str,
    previous: &str,
    records: &[Record],
) -> SinkResult<()> {
    for chunk in records.chunks(ROWS_PER_INSERT) {
        insert_query(staging, chunk)
            .build()
            .execute(&mut *conn)
            .await?;
    }

    let swap = format!(
        "RENAME TABLE {table} TO {previous}, {staging} TO {table};
         DROP TABLE {previous};",
        table = table,
        previous = previous,
        staging = staging,
    );
    sqlx::raw_sql(&swap).execute(&mut *conn).await?;
    Ok(())
}

/// Drops the scratch tables a failed write may leave behind
fn cleanup_sql(staging: &str, previous: &str) -> String {
    format!("DROP TABLE IF EXISTS {}, {}", staging, previous)
}

/// Quotes a MySQL identifier with backticks
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Every column is stored as text; an absent rating is NULL.
fn create_table_sql(table: &str, if_not_exists: bool) -> String {
    let columns = COLUMNS
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE {}{} ({})",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        table,
        columns
    )
}

fn insert_query(table: &str, records: &[Record]) -> QueryBuilder<'static, MySql> {
    let columns = COLUMNS
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut query = QueryBuilder::new(format!("INSERT INTO {} ({}) ", table, columns));
    query.push_values(records, |mut row, record| {
        let [title, price, rating, availability, source_page, link] = record.to_row();
        row.push_bind(title)
            .push_bind(price)
            .push_bind(Some(rating).filter(|r| !r.is_empty()))
            .push_bind(availability)
            .push_bind(source_page)
            .push_bind(link);
    });
    query
}

//! Integration tests for the sinks
//!
//! Each file-backed sink is written through the public dispatcher and read
//! back with an independent reader to check row counts, column order, and
//! replace-not-append semantics.

use calamine::{open_workbook, Reader, Xlsx};
use catalog_harvest::model::{Rating, Record, COLUMNS};
use catalog_harvest::sink::{ExternalDbOptions, SinkError, SinkTarget, Sinks};
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;
use url::Url;

fn record(title: &str, rating: Option<Rating>, availability: &str, page: u32) -> Record {
    let slug = title.to_lowercase().replace(' ', "-");
    Record::new(
        title,
        "£12.50",
        rating,
        availability,
        page,
        Url::parse(&format!("http://books.example/catalogue/{}_1/index.html", slug)).unwrap(),
    )
}

fn sample() -> Vec<Record> {
    vec![
        record("Tipping the Velvet", Some(Rating::One), "In stock (20 available)", 1),
        record("Soumission, Vol. 2", None, "", 1),
        record("Sharp Objects", Some(Rating::Four), "Out of stock", 2),
    ]
}

fn expected_rows(records: &[Record]) -> Vec<Vec<String>> {
    records.iter().map(|r| r.to_row().to_vec()).collect()
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|row| row.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

fn read_xlsx(path: &Path, sheet: &str) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range
        .rows()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            cells.resize(COLUMNS.len(), String::new());
            cells
        })
        .collect()
}

fn read_sqlite(path: &Path, table: &str) -> Vec<Vec<String>> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare(&format!(
            "SELECT title, price, rating, availability, source_page, link FROM \"{}\" ORDER BY rowid",
            table
        ))
        .unwrap();
    let rows = stmt
        .query_map([], |row| {
            let rating: Option<i64> = row.get(2)?;
            let page: i64 = row.get(4)?;
            Ok(vec![
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                rating.map(|r| r.to_string()).unwrap_or_default(),
                row.get::<_, String>(3)?,
                page.to_string(),
                row.get::<_, String>(5)?,
            ])
        })
        .unwrap();
    rows.map(Result::unwrap).collect()
}

#[tokio::test]
async fn test_csv_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("products.csv");
    let records = sample();

    Sinks::detect()
        .write(&records, &SinkTarget::Csv { path: path.clone() })
        .await
        .unwrap();

    let (header, rows) = read_csv(&path);
    assert_eq!(header, COLUMNS);
    assert_eq!(rows, expected_rows(&records));
}

#[tokio::test]
async fn test_csv_replaces_previous_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("products.csv");
    let target = SinkTarget::Csv { path: path.clone() };
    let sinks = Sinks::detect();

    sinks.write(&sample(), &target).await.unwrap();
    let second = vec![record("Only One", Some(Rating::Two), "In stock", 1)];
    sinks.write(&second, &target).await.unwrap();

    let (_, rows) = read_csv(&path);
    assert_eq!(rows, expected_rows(&second));
}

#[tokio::test]
async fn test_xlsx_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("products.xlsx");
    let records = sample();

    Sinks::detect()
        .write(
            &records,
            &SinkTarget::Xlsx {
                path: path.clone(),
                sheet: "products".to_string(),
            },
        )
        .await
        .unwrap();

    let rows = read_xlsx(&path, "products");
    assert_eq!(rows.len(), records.len() + 1);
    assert_eq!(rows[0], COLUMNS);
    assert_eq!(rows[1..].to_vec(), expected_rows(&records));
}

#[tokio::test]
async fn test_xlsx_replaces_previous_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("products.xlsx");
    let target = SinkTarget::Xlsx {
        path: path.clone(),
        sheet: "books".to_string(),
    };
    let sinks = Sinks::detect();

    sinks.write(&sample(), &target).await.unwrap();
    sinks.write(&sample()[..1], &target).await.unwrap();

    let rows = read_xlsx(&path, "books");
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_sqlite_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("products.db");
    let records = sample();

    Sinks::detect()
        .write(
            &records,
            &SinkTarget::Sqlite {
                path: path.clone(),
                table: "products".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(read_sqlite(&path, "products"), expected_rows(&records));
}

#[tokio::test]
async fn test_sqlite_replaces_table_and_keeps_others() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("products.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE notes (body TEXT); INSERT INTO notes VALUES ('keep');")
            .unwrap();
    }

    let target = SinkTarget::Sqlite {
        path: path.clone(),
        table: "products".to_string(),
    };
    let sinks = Sinks::detect();
    sinks.write(&sample(), &target).await.unwrap();
    sinks.write(&[], &target).await.unwrap();

    assert!(read_sqlite(&path, "products").is_empty());

    let conn = Connection::open(&path).unwrap();
    let notes: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(notes, 1);
}

#[tokio::test]
async fn test_failed_write_leaves_destination_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("products.xlsx");
    std::fs::write(&path, b"previous").unwrap();

    let result = Sinks::detect()
        .write(
            &sample(),
            &SinkTarget::Xlsx {
                path: path.clone(),
                sheet: "no/slashes".to_string(),
            },
        )
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
}

#[tokio::test]
async fn test_external_db_unavailable_without_capability() {
    let target = SinkTarget::Mysql(ExternalDbOptions {
        host: "localhost".to_string(),
        port: 3306,
        user: "root".to_string(),
        password: String::new(),
        database: "scraper_db".to_string(),
        table: "products".to_string(),
    });

    let result = Sinks::files_only().write(&sample(), &target).await;

    assert!(matches!(result, Err(SinkError::Unavailable(_))));
}

//! Spreadsheet sink
//!
//! Writes a workbook with a single worksheet: a bold header row followed by
//! one row per record. Every value is stored as a text cell; an absent
//! rating leaves its cell blank.

use crate::model::{Record, COLUMNS};
use crate::sink::replace_file;
use crate::sink::traits::{RecordSink, SinkError, SinkResult};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// Last row index a worksheet can hold; row 0 is the header
const MAX_ROW: u32 = 1_048_575;

/// Writes records to an `.xlsx` workbook
pub struct XlsxSink {
    path: PathBuf,
    sheet: String,
}

impl XlsxSink {
    /// Creates a sink for `path`, naming the worksheet `sheet`
    pub fn new(path: &Path, sheet: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        }
    }

    fn build_workbook(&self, records: &[Record]) -> SinkResult<Workbook> {
        check_capacity(records.len())?;

        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet)?;

        for (col, name) in COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *name, &header)?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = index as u32 + 1;
            for (col, value) in record.to_row().into_iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(row, col as u16, value)?;
                }
            }
        }

        Ok(workbook)
    }
}

/// Data rows go in 1..=MAX_ROW, below the header
fn check_capacity(count: usize) -> SinkResult<()> {
    if count > MAX_ROW as usize {
        return Err(SinkError::InvalidDestination(format!(
            "{} records do not fit in one worksheet",
            count
        )));
    }
    Ok(())
}

impl RecordSink for XlsxSink {
    fn replace_all(&self, records: &[Record]) -> SinkResult<()> {
        // Sheet name and size problems surface before any file is created.
        let mut workbook = self.build_workbook(records)?;

        replace_file(&self.path, |temp_path| {
            workbook.save(temp_path)?;
            Ok(())
        })?;

        tracing::debug!("Wrote {} rows to {}", records.len(), self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} (sheet {})", self.path.display(), self.sheet)
    }
}

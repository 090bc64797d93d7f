//! CSV sink

use crate::model::{Record, COLUMNS};
use crate::sink::replace_file;
use crate::sink::traits::{RecordSink, SinkResult};
use std::path::{Path, PathBuf};

/// Writes records as comma-separated text with a header row
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl RecordSink for CsvSink {
    fn replace_all(&self, records: &[Record]) -> SinkResult<()> {
        replace_file(&self.path, |temp_path| {
            let mut writer = csv::Writer::from_path(temp_path)?;
            writer.write_record(COLUMNS)?;
            for record in records {
                writer.write_record(record.to_row())?;
            }
            writer.flush()?;
            Ok(())
        })?;

        tracing::debug!("Wrote {} rows to {}", records.len(), self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

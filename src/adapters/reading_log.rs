//! CSV reading-log adapter.
//!
//! Append-only sink with the fixed schema
//! `Year,Month,Day,Hour,Minute,InternalTemp,InternalHI,InternalRH,ExternalTemp,ExternalHI,ExternalRH`.
//! When the first row of a new day arrives, the previous day's file is
//! renamed to a dated archive (`dataLog-2024-08-03.csv`) and a fresh file
//! with a header is started.

use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::app::ports::{LogError, LogRow, ReadingLogPort};

const HEADER: &str =
    "Year,Month,Day,Hour,Minute,InternalTemp,InternalHI,InternalRH,ExternalTemp,ExternalHI,ExternalRH";

pub struct CsvReadingLog {
    path: PathBuf,
    /// Date of the rows currently in `path`; lazily recovered from the
    /// file on the first append after startup.
    current_day: Option<NaiveDate>,
}

impl CsvReadingLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current_day: None,
        }
    }

    /// Date of the last data row already on disk, if any.
    fn day_on_disk(&self) -> Option<NaiveDate> {
        let text = fs::read_to_string(&self.path).ok()?;
        let last = text.lines().skip(1).filter(|l| !l.trim().is_empty()).last()?;
        let mut fields = last.split(',');
        let year: i32 = fields.next()?.trim().parse().ok()?;
        let month: u32 = fields.next()?.trim().parse().ok()?;
        let day: u32 = fields.next()?.trim().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn archive_path(&self, day: NaiveDate) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataLog");
        self.path
            .with_file_name(format!("{stem}-{}.csv", day.format("%Y-%m-%d")))
    }
}

impl ReadingLogPort for CsvReadingLog {
    fn append(&mut self, row: &LogRow) -> Result<(), LogError> {
        let row_day = NaiveDate::from_ymd_opt(row.year, row.month, row.day)
            .ok_or_else(|| LogError::Io(std::io::Error::other("row has an invalid date")))?;

        if self.path.exists() {
            let file_day = self.current_day.or_else(|| self.day_on_disk());
            if let Some(prev) = file_day {
                if prev != row_day {
                    fs::rename(&self.path, self.archive_path(prev))?;
                }
            }
        }

        let fresh = !self.path.exists();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh {
            writeln!(file, "{HEADER}")?;
        }
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{}",
            row.year,
            row.month,
            row.day,
            row.hour,
            row.minute,
            row.internal_temp,
            row.internal_hi,
            row.internal_rh,
            row.external_temp,
            row.external_hi,
            row.external_rh
        )?;

        self.current_day = Some(row_day);
        Ok(())
    }
}

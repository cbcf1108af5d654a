//! CSV contact store adapter.
//!
//! One row per contact with flag columns per role:
//!
//! ```text
//! Contact,Recipient,Malfunction
//! 5551234567@vtext.com,1,0
//! ```
//!
//! The table is small and rewritten in full on every mutation; the write
//! goes to a sibling temp file first and is renamed over the original, so
//! a crash mid-save can lose the update but never corrupt the table.

use std::fs;
use std::path::PathBuf;

use crate::app::ports::{ContactStorePort, StoreError};
use crate::contacts::ContactEntry;

const HEADER: &str = "Contact,Recipient,Malfunction";

pub struct CsvContactStore {
    path: PathBuf,
}

impl CsvContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_flag(field: &str) -> Result<bool, StoreError> {
        match field.trim() {
            "1" | "1.0" => Ok(true),
            "0" | "0.0" | "" => Ok(false),
            other => Err(StoreError::Corrupted(format!("bad role flag '{other}'"))),
        }
    }
}

impl ContactStorePort for CsvContactStore {
    fn load(&self) -> Result<Vec<ContactEntry>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for line in text.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split(',');
            let (Some(address), Some(recipient), Some(malfunction)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(StoreError::Corrupted(format!("short row '{line}'")));
            };
            entries.push(ContactEntry {
                address: address.trim().to_string(),
                recipient: Self::parse_flag(recipient)?,
                malfunction: Self::parse_flag(malfunction)?,
            });
        }
        Ok(entries)
    }

    fn save(&self, entries: &[ContactEntry]) -> Result<(), StoreError> {
        let mut text = String::from(HEADER);
        text.push('\n');
        for e in entries {
            text.push_str(&format!(
                "{},{},{}\n",
                e.address,
                u8::from(e.recipient),
                u8::from(e.malfunction)
            ));
        }

        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, &text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

//! File-spool mail adapter.
//!
//! A store-and-forward channel over the filesystem, in the spirit of a
//! classic maildir. The mail bridge (fetchmail hook, IMAP poller, or a
//! human with scp) drops inbound messages into `inbox/` as `*.msg` files:
//!
//! ```text
//! 5551234567@vzwpix.com        <- first line: sender identity
//! set target: 70               <- remainder: attachment text
//! get interval
//! ```
//!
//! Fetching moves a message into `processed/`, so each one is handed to
//! the domain at most once and nothing is destroyed on a crash between
//! fetch and dispatch — at worst a message is re-processed after restart.
//! Outbound mail is appended to `outbox.txt` for the bridge to drain.

use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::ports::{InboundMessage, MailError, MailboxPort};

pub struct SpoolMailbox {
    inbox: PathBuf,
    processed: PathBuf,
    outbox: PathBuf,
}

impl SpoolMailbox {
    /// Open a spool rooted at `dir`, creating `inbox/` and `processed/`
    /// if absent.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, MailError> {
        let dir = dir.as_ref();
        let inbox = dir.join("inbox");
        let processed = dir.join("processed");
        fs::create_dir_all(&inbox)?;
        fs::create_dir_all(&processed)?;
        Ok(Self {
            inbox,
            processed,
            outbox: dir.join("outbox.txt"),
        })
    }

    fn parse_message(text: &str) -> Option<InboundMessage> {
        let (sender, body) = text.split_once('\n')?;
        let sender = sender.trim();
        if sender.is_empty() {
            return None;
        }
        Some(InboundMessage {
            sender: sender.to_string(),
            attachments: vec![body.to_string()],
        })
    }
}

impl MailboxPort for SpoolMailbox {
    fn fetch_unseen(&mut self) -> Result<Vec<InboundMessage>, MailError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.inbox)?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "msg"))
            .collect();
        paths.sort();

        let mut messages = Vec::new();
        for path in paths {
            let text = fs::read_to_string(&path)?;

            // Move before handing over, so a crash mid-dispatch cannot
            // replay the whole backlog forever.
            let name = path.file_name().unwrap_or_default().to_owned();
            fs::rename(&path, self.processed.join(name))?;

            match Self::parse_message(&text) {
                Some(msg) => messages.push(msg),
                None => warn!("discarding malformed spool message {}", path.display()),
            }
        }
        Ok(messages)
    }

    fn send(&mut self, subject: &str, body: &str, to: &[String]) -> Result<(), MailError> {
        use std::io::Write;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.outbox)?;
        writeln!(file, "To: {}", to.join(", "))?;
        writeln!(file, "Subject: {subject}")?;
        writeln!(file)?;
        writeln!(file, "{body}")?;
        writeln!(file)?;
        Ok(())
    }
}

//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! Each adapter owns exactly one boundary: the driver handoff file for
//! sensors, the mail spool directories, the contacts CSV, the reading-log
//! CSV, and the process clocks. The domain core never sees any of these
//! details; swap an adapter (e.g. the file spool for a real IMAP/SMTP
//! bridge) and the core is untouched.

pub mod clock;
pub mod contact_store;
pub mod mail_spool;
pub mod reading_log;
pub mod sensor;

pub use clock::SystemClock;
pub use contact_store::CsvContactStore;
pub use mail_spool::SpoolMailbox;
pub use reading_log::CsvReadingLog;
pub use sensor::FileSensor;

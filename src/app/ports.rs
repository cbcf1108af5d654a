//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ThermostatService (domain)
//! ```
//!
//! Driven adapters (sensor driver, mail spool, contact store, reading log,
//! clock) implement these traits. The service consumes them via generics, so
//! the domain core never touches a file, socket, or GPIO pin directly.
//!
//! All port errors are typed — callers must handle every variant explicitly.

use chrono::{DateTime, Local};
use std::time::Duration;

use crate::sensors::RawSample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One physical humidity/temperature sensor.
///
/// `None` means the driver produced no data this attempt (the DHT family
/// fails a sizeable fraction of reads under normal operation). Retry policy
/// belongs to the caller, not to implementations.
pub trait SensorPort {
    fn sample(&mut self) -> Option<RawSample>;
}

// ───────────────────────────────────────────────────────────────
// Mailbox port (driven adapter: domain ↔ store-and-forward channel)
// ───────────────────────────────────────────────────────────────

/// One inbound message: the sender identity and its attachments decoded
/// as text. Command tokens live inside the attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: String,
    pub attachments: Vec<String>,
}

/// The store-and-forward mail channel.
///
/// Implementations own all mailbox state (seen flags, cleanup); the domain
/// only ever asks for unseen messages and hands over outbound mail.
pub trait MailboxPort {
    /// Fetch messages not yet handed to the domain. Each message is
    /// returned at most once.
    fn fetch_unseen(&mut self) -> Result<Vec<InboundMessage>, MailError>;

    /// Send one message to the given addresses.
    fn send(&mut self, subject: &str, body: &str, to: &[String]) -> Result<(), MailError>;
}

// ───────────────────────────────────────────────────────────────
// Contact store port (driven adapter: domain ↔ persisted contacts)
// ───────────────────────────────────────────────────────────────

/// Persisted contact table, rewritten in full on every mutation.
///
/// `save` MUST be atomic — a crash mid-write may lose the update but must
/// never leave a half-written table behind.
pub trait ContactStorePort {
    /// Load all entries. An absent table is an empty table, not an error.
    fn load(&self) -> Result<Vec<crate::contacts::ContactEntry>, StoreError>;

    /// Replace the persisted table with `entries`.
    fn save(&self, entries: &[crate::contacts::ContactEntry]) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Reading log port (driven adapter: domain → append-only sink)
// ───────────────────────────────────────────────────────────────

/// One appended row of the reading log. All values are rounded to whole
/// units before they reach this struct; a row is only built from two
/// nominal sensor readings, never from a failure placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub internal_temp: i64,
    pub internal_hi: i64,
    pub internal_rh: i64,
    pub external_temp: i64,
    pub external_hi: i64,
    pub external_rh: i64,
}

/// Append-only reading log, rotated to a dated archive at the end-of-day
/// boundary by the implementation.
pub trait ReadingLogPort {
    fn append(&mut self, row: &LogRow) -> Result<(), LogError>;
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: domain ↔ clocks)
// ───────────────────────────────────────────────────────────────

/// Wall-clock and monotonic time, plus the retry delay primitive.
///
/// Cooldown deadlines are tracked against `uptime` (monotonic) so a
/// wall-clock step cannot shorten or extend a sensor cooldown. Tests drive
/// virtual time by advancing `uptime` inside `sleep`.
pub trait TimePort {
    /// Current wall-clock time, for message bodies and log rows.
    fn now(&self) -> DateTime<Local>;

    /// Monotonic time since process start.
    fn uptime(&self) -> Duration;

    /// Block the control thread for `d`.
    fn sleep(&self, d: Duration);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`MailboxPort`] operations.
#[derive(Debug)]
pub enum MailError {
    /// The channel cannot be reached right now; retry next tick.
    Unreachable(String),
    /// An inbound message could not be decoded as text.
    Malformed(String),
    /// Generic I/O failure from the transport backend.
    Io(std::io::Error),
}

/// Errors from [`ContactStorePort`] operations.
#[derive(Debug)]
pub enum StoreError {
    /// Stored table failed to parse.
    Corrupted(String),
    /// Generic I/O failure from the storage backend.
    Io(std::io::Error),
}

/// Errors from [`ReadingLogPort`] operations.
#[derive(Debug)]
pub enum LogError {
    /// Generic I/O failure from the log backend.
    Io(std::io::Error),
}

impl std::fmt::Display for MailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable(msg) => write!(f, "mail channel unreachable: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed inbound message: {msg}"),
            Self::Io(e) => write!(f, "mail I/O error: {e}"),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "contact store corrupted: {msg}"),
            Self::Io(e) => write!(f, "contact store I/O error: {e}"),
        }
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "reading log I/O error: {e}"),
        }
    }
}

impl std::error::Error for MailError {}
impl std::error::Error for StoreError {}
impl std::error::Error for LogError {}

impl From<std::io::Error> for MailError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<std::io::Error> for LogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

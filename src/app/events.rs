//! Outbound notifications.
//!
//! The core components queue [`Notification`]s; the service resolves each
//! audience against the contact registry and hands the result to the
//! [`MailboxPort`](super::ports::MailboxPort) adapter. The core never sees
//! concrete addresses at emission time.

use chrono::{DateTime, Local};

/// Which contact list a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Routine traffic: window advice, confirmations, command errors.
    Recipients,
    /// Hardware trouble: sensor-failure alerts.
    MalfunctionContacts,
}

/// One outbound message, audience still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub audience: Audience,
}

impl Notification {
    pub fn to_recipients(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            audience: Audience::Recipients,
        }
    }

    pub fn to_malfunction_contacts(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            audience: Audience::MalfunctionContacts,
        }
    }
}

/// Human-readable timestamp used in notification bodies,
/// e.g. "03:47 PM Aug 04".
pub fn clock_stamp(now: &DateTime<Local>) -> String {
    now.format("%I:%M %p %b %d").to_string()
}

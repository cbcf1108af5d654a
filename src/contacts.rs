//! Contact registry — who gets notified, and who may send commands.
//!
//! Two roles exist per address: `recipient` (routine notifications, and
//! implicitly the command allow-list) and `malfunction` (sensor-failure
//! alerts go here so the person maintaining the hardware is reached
//! directly). An address holding neither role is removed outright, never
//! kept as a flagged-off row.
//!
//! Addresses are restricted to the phone-gateway form used for email→SMS
//! bridging: exactly ten digits, `@`, then a mail domain (e.g.
//! `5551234567@vtext.com`).

/// A role an address can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Recipient,
    Malfunction,
}

/// One registered contact and the roles it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEntry {
    pub address: String,
    pub recipient: bool,
    pub malfunction: bool,
}

impl ContactEntry {
    fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Recipient => self.recipient,
            Role::Malfunction => self.malfunction,
        }
    }

    fn set_role(&mut self, role: Role, held: bool) {
        match role {
            Role::Recipient => self.recipient = held,
            Role::Malfunction => self.malfunction = held,
        }
    }

    fn is_empty(&self) -> bool {
        !self.recipient && !self.malfunction
    }
}

/// Validate a phone-gateway address: ten digits, `@`, then a domain of the
/// form `label.rest` (alphanumerics, `-`, `.`).
pub fn is_gateway_address(addr: &str) -> bool {
    let Some((local, domain)) = addr.split_once('@') else {
        return false;
    };
    if local.len() != 10 || !local.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Some((head, tail)) = domain.split_once('.') else {
        return false;
    };
    !head.is_empty()
        && !tail.is_empty()
        && head.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && tail
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
}

/// In-memory contact registry. Mutations report whether anything changed so
/// the caller can decide whether persistence is needed.
#[derive(Debug, Clone, Default)]
pub struct ContactRegistry {
    entries: Vec<ContactEntry>,
}

impl ContactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted entries, discarding any role-less rows.
    pub fn from_entries(entries: Vec<ContactEntry>) -> Self {
        Self {
            entries: entries.into_iter().filter(|e| !e.is_empty()).collect(),
        }
    }

    /// All entries, in registration order (the order persisted to disk).
    pub fn entries(&self) -> &[ContactEntry] {
        &self.entries
    }

    /// Addresses holding the recipient role.
    pub fn recipients(&self) -> Vec<String> {
        self.role_holders(Role::Recipient)
    }

    /// Addresses holding the malfunction role.
    pub fn malfunction_contacts(&self) -> Vec<String> {
        self.role_holders(Role::Malfunction)
    }

    fn role_holders(&self, role: Role) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.has_role(role))
            .map(|e| e.address.clone())
            .collect()
    }

    /// Whether `address` currently holds `role`.
    pub fn holds(&self, address: &str, role: Role) -> bool {
        self.entries
            .iter()
            .any(|e| e.address == address && e.has_role(role))
    }

    /// Grant `role` to `address`, creating the entry if needed.
    /// Returns `false` if the address already held the role (no-op).
    pub fn grant(&mut self, address: &str, role: Role) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.address == address) {
            if entry.has_role(role) {
                return false;
            }
            entry.set_role(role, true);
            return true;
        }
        let mut entry = ContactEntry {
            address: address.to_string(),
            recipient: false,
            malfunction: false,
        };
        entry.set_role(role, true);
        self.entries.push(entry);
        true
    }

    /// Revoke `role` from `address`, removing the entry if it ends up with
    /// no roles. Returns `false` if the address did not hold the role.
    pub fn revoke(&mut self, address: &str, role: Role) -> bool {
        let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.address == address && e.has_role(role))
        else {
            return false;
        };
        self.entries[idx].set_role(role, false);
        if self.entries[idx].is_empty() {
            self.entries.remove(idx);
        }
        true
    }

    /// Command allow-list check.
    ///
    /// Replies from phone gateways often arrive from a sibling domain of
    /// the one messages were sent to (e.g. `@mms.att.net` vs
    /// `@txt.att.net`), so authorization matches on the local part of the
    /// sender against the local parts of registered recipients.
    pub fn is_authorized_sender(&self, sender: &str) -> bool {
        let sender_local = sender.split('@').next().unwrap_or(sender);
        self.entries
            .iter()
            .filter(|e| e.recipient)
            .any(|e| e.address.split('@').next() == Some(sender_local))
    }
}

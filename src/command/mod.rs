//! Remote command protocol: vocabulary, parsing, and dispatch.
//!
//! Inbound mail attachments are tokenized by [`parser`] into a batch of
//! `name -> optional argument` pairs, then validated and applied by
//! [`dispatch`]. The vocabulary is a closed enum with an exact-match
//! lookup table — `"set target"` matches, `"reset targets"` does not, and
//! no future command can collide by substring.

pub mod dispatch;
pub mod parser;

pub use dispatch::{CommandDispatcher, DispatchResult, LoopControl};
pub use parser::{parse_batch, CommandBatch};

/// Every command the loop understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandName {
    SetTarget,
    SetInterval,
    GetTarget,
    GetCurrent,
    GetCommands,
    GetInterval,
    GetFeelsLike,
    GetDewPoint,
    AddRecipient,
    AddMalfunction,
    DropRecipient,
    DropMalfunction,
    Kill,
    KillConfirm,
}

impl CommandName {
    /// Commands advertised by `get commands`. The `kill` pair is reserved
    /// and deliberately not listed.
    pub const LISTED: [CommandName; 12] = [
        Self::SetTarget,
        Self::SetInterval,
        Self::GetTarget,
        Self::GetCurrent,
        Self::GetCommands,
        Self::GetInterval,
        Self::GetFeelsLike,
        Self::GetDewPoint,
        Self::AddRecipient,
        Self::AddMalfunction,
        Self::DropRecipient,
        Self::DropMalfunction,
    ];

    /// Exact, lowercased wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetTarget => "set target",
            Self::SetInterval => "set interval",
            Self::GetTarget => "get target",
            Self::GetCurrent => "get current",
            Self::GetCommands => "get commands",
            Self::GetInterval => "get interval",
            Self::GetFeelsLike => "get feels like",
            Self::GetDewPoint => "get dew point",
            Self::AddRecipient => "add recipient",
            Self::AddMalfunction => "add malfunction",
            Self::DropRecipient => "drop recipient",
            Self::DropMalfunction => "drop malfunction",
            Self::Kill => "kill",
            Self::KillConfirm => "kill confirm",
        }
    }

    /// Resolve an already-lowercased token name. Anything that is not an
    /// exact match is unrecognized.
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "set target" => Some(Self::SetTarget),
            "set interval" => Some(Self::SetInterval),
            "get target" => Some(Self::GetTarget),
            "get current" => Some(Self::GetCurrent),
            "get commands" => Some(Self::GetCommands),
            "get interval" => Some(Self::GetInterval),
            "get feels like" => Some(Self::GetFeelsLike),
            "get dew point" => Some(Self::GetDewPoint),
            "add recipient" => Some(Self::AddRecipient),
            "add malfunction" => Some(Self::AddMalfunction),
            "drop recipient" => Some(Self::DropRecipient),
            "drop malfunction" => Some(Self::DropMalfunction),
            "kill" => Some(Self::Kill),
            "kill confirm" => Some(Self::KillConfirm),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_roundtrips_every_wire_name() {
        for cmd in CommandName::LISTED {
            assert_eq!(CommandName::lookup(cmd.as_str()), Some(cmd));
        }
        assert_eq!(CommandName::lookup("kill"), Some(CommandName::Kill));
        assert_eq!(
            CommandName::lookup("kill confirm"),
            Some(CommandName::KillConfirm)
        );
    }

    #[test]
    fn lookup_is_exact_not_substring() {
        assert_eq!(CommandName::lookup("set"), None);
        assert_eq!(CommandName::lookup("set target temperature"), None);
        assert_eq!(CommandName::lookup("reset target"), None);
        assert_eq!(CommandName::lookup("Set Target"), None); // caller lowercases
    }

    #[test]
    fn kill_pair_is_not_advertised() {
        assert!(!CommandName::LISTED.contains(&CommandName::Kill));
        assert!(!CommandName::LISTED.contains(&CommandName::KillConfirm));
    }
}

//! System configuration parameters
//!
//! All tunable parameters for the passivestat loop. Values can be
//! overridden at startup via a JSON config file, or at runtime through
//! `set target` / `set interval` mail commands.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Accepted `set target` values (degrees Fahrenheit, half-open).
/// 45–89 covers most normal home temperatures.
pub const TARGET_TEMP_RANGE: Range<i32> = 45..90;

/// Accepted `set interval` values (seconds, half-open).
/// Between once per second and once per hour.
pub const POLL_INTERVAL_RANGE: Range<u32> = 1..3600;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Target indoor temperature (Fahrenheit)
    pub target_temp_f: i32,
    /// Seconds between control-loop ticks
    pub poll_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            target_temp_f: 68,
            poll_interval_secs: 30,
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Returns the name of the first field that
    /// is out of range, for error reporting at load time.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !TARGET_TEMP_RANGE.contains(&self.target_temp_f) {
            return Err("target_temp_f");
        }
        if !POLL_INTERVAL_RANGE.contains(&self.poll_interval_secs) {
            return Err("poll_interval_secs");
        }
        Ok(())
    }
}

//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the passivestat loop:
//! tick orchestration, sensor supervision, window advice, and command
//! handling. All interaction with the outside world happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without sensors, mail, or a filesystem.

pub mod events;
pub mod ports;
pub mod service;

//! Passivestat library.
//!
//! Exposes the domain modules for integration testing and external
//! inspection. Everything that touches the filesystem or the mail
//! channel lives behind the port traits in [`app::ports`]; the concrete
//! implementations are in [`adapters`].

#![deny(unused_must_use)]

pub mod app;
pub mod climate;
pub mod command;
pub mod config;
pub mod contacts;
pub mod sensors;
pub mod windows;

pub mod adapters;

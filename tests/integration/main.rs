//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters. All tests run on the host with no sensors,
//! mail bridge, or data files required.

mod mocks;
mod service_tests;

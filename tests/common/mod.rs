//! Common test infrastructure
//!
//! Builds a throwaway data tree (song and log files) plus a warehouse
//! database inside a temp dir. Tests should only import from this module.

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::TestWarehouse;

//! Shared types for pitwall.
//!
//! Holds the error type, lap and derived-table models, CLI settings, numeric
//! helpers, timedelta parsing and text formatting used by the data, runtime
//! and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod stats;
pub mod time_utils;

pub use error::{PitwallError, Result};

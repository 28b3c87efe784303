//! # extsync-core
//!
//! Core library for extsync providing:
//! - Settings file parsing (extsync.yaml) and display strings
//! - Type definitions for feed entries, ledger records, and host versions
//! - The shared error taxonomy, including persistence failures

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::{HostSettings, Messages, Settings};
pub use error::{Error, Result};
pub use utils::get_home_dir;

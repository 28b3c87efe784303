//! Shared utility functions for extsync crates

use anyhow::anyhow;
use std::path::PathBuf;

/// Get the user's home directory
///
/// `HOME` wins over `dirs::home_dir()` so state can be redirected per
/// process (tests, sandboxed hosts) without touching the passwd database.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

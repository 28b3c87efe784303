//! Type definitions for feed entries, ledger records, and versions

mod extension_types;
mod ledger_types;
mod version_types;

pub use extension_types::*;
pub use ledger_types::*;
pub use version_types::*;

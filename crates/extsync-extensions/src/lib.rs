//! Extension reconciliation for extsync
//!
//! This crate handles:
//! - Feed fetching, change detection and parsing
//! - The installation ledger and its disable-list
//! - Version-gated install/uninstall reconciliation
//! - Progress reporting and cooperative cancellation
//! - Host collaborator traits plus filesystem/HTTP adapters
//! - The per-bundle orchestration service

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod feed;
pub mod fetch;
pub mod host;
pub mod installer;
pub mod ledger;
pub mod progress;
pub mod service;

pub use feed::FeedCache;
pub use host::{
    ConfigStore, GalleryRepository, HostShell, HostVersionProvider, LocalExtensionManager, LogSink,
};
pub use installer::{InstallOutcome, InstallPlan, InstallResult, Installer, RunContext};
pub use ledger::{DisableListTarget, InstallLedger};
pub use progress::{CancelFlag, Progress, ProgressCallback, RunPhase};
pub use service::{InstallerService, RunOutcome};

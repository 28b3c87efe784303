//! Collaborator capabilities the reconciler drives
//!
//! The host application owns the extension manager, the gallery, the
//! config store and the output pane. The reconciler only sees these traits.
//! Bundled adapters (directory manager, HTTP gallery, JSON config store,
//! tracing log sink) make the engine usable from the `extsync` CLI.

mod config_store;
mod directory;
mod gallery;
mod log_sink;

pub use config_store::FileConfigStore;
pub use directory::DirectoryExtensionManager;
pub use gallery::{GalleryIndexEntry, HttpGallery};
pub use log_sink::TracingLogSink;

use anyhow::Result;
use async_trait::async_trait;
use extsync_core::types::{ProductVersion, RestartReason};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::progress::Progress;

/// Gallery listing for an extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub id: String,
    pub name: String,
    pub version: ProductVersion,
    #[serde(default)]
    pub author: Option<String>,
    /// Where the package can be downloaded from
    #[serde(default)]
    pub download_url: Option<String>,
}

/// A downloaded package ready to hand to the extension manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallablePackage {
    pub id: String,
    pub name: String,
    pub version: ProductVersion,
    pub author: Option<String>,
    /// Local path of the downloaded payload
    pub path: PathBuf,
}

/// An extension the host reports as installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledExtension {
    pub id: String,
    pub version: ProductVersion,
    #[serde(default)]
    pub author: Option<String>,
}

/// Remote gallery: lookup, latest-version query, download
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    /// Latest published version of an extension
    async fn query_latest_version(&self, id: &str) -> Result<ProductVersion>;

    /// Gallery entry for an id, if the gallery lists it
    async fn find_by_id(&self, id: &str, locale: u32) -> Result<Option<GalleryEntry>>;

    /// Download the package behind a gallery entry
    async fn download(&self, entry: &GalleryEntry) -> Result<InstallablePackage>;
}

/// Local extension manager: enumerate, install, uninstall
#[async_trait]
pub trait LocalExtensionManager: Send + Sync {
    /// Every extension currently installed
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>>;

    /// The installed copy of an extension, if any
    async fn try_get_installed(&self, id: &str) -> Result<Option<InstalledExtension>> {
        Ok(self
            .list_installed()
            .await?
            .into_iter()
            .find(|ext| ext.id == id))
    }

    /// Install a downloaded package
    async fn install(
        &self,
        package: &InstallablePackage,
        requires_elevation: bool,
    ) -> Result<RestartReason>;

    /// Remove an installed extension
    async fn uninstall(&self, extension: &InstalledExtension) -> Result<()>;
}

/// Supplies the running host's version
pub trait HostVersionProvider: Send + Sync {
    fn current_version(&self) -> Result<ProductVersion>;
}

/// A fixed host version, typically read from settings
#[derive(Debug, Clone)]
pub struct StaticHostVersion(pub ProductVersion);

impl HostVersionProvider for StaticHostVersion {
    fn current_version(&self) -> Result<ProductVersion> {
        Ok(self.0.clone())
    }
}

/// Hierarchical key/value store the disable-list is published to
pub trait ConfigStore: Send + Sync {
    /// Open (creating if needed) a child key
    fn create_sub_key(&self, name: &str) -> Result<Box<dyn ConfigStore>>;

    /// Set a string value on this key
    fn set_value(&self, name: &str, value: &str) -> Result<()>;

    /// Read a string value from this key
    fn get_value(&self, name: &str) -> Result<Option<String>>;
}

/// User-facing output pane
///
/// Implementations must tolerate calls from the run's worker task and
/// marshal to any UI thread themselves.
pub trait LogSink: Send + Sync {
    /// Write a message, optionally ending the line
    fn log(&self, message: &str, add_newline: bool);

    /// Bring the output pane to the front
    fn show_pane(&self);
}

/// Host application shell consumed by the orchestration service
#[async_trait]
pub trait HostShell: Send + Sync {
    /// Gallery handle (may wait for host services to come up)
    async fn gallery(&self) -> Result<Arc<dyn GalleryRepository>>;

    /// Extension manager handle
    async fn extension_manager(&self) -> Result<Arc<dyn LocalExtensionManager>>;

    /// Host version used for eligibility
    fn host_version(&self) -> Result<ProductVersion>;

    /// Render progress for a running reconciliation
    fn show_progress(&self, title: &str, progress: &Progress);

    /// Reveal the output pane; called once per run on first progress
    fn show_output(&self);

    /// Ask the user to restart the host
    fn prompt_for_restart(&self, title: &str);
}

//! Terminal host shell
//!
//! Backs the reconciler with the bundled adapters (directory extension
//! manager, HTTP gallery, JSON config store) and renders progress with
//! indicatif.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use extsync_core::types::ProductVersion;
use extsync_core::Settings;
use extsync_extensions::host::{
    DirectoryExtensionManager, FileConfigStore, GalleryRepository, HostShell, HostVersionProvider,
    HttpGallery, LocalExtensionManager, LogSink, StaticHostVersion, TracingLogSink,
};
use extsync_extensions::{InstallerService, Progress};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::output;

/// Host shell for the `extsync` CLI
pub struct CliShell {
    gallery: Option<Arc<HttpGallery>>,
    manager: Arc<DirectoryExtensionManager>,
    version: Option<StaticHostVersion>,
    log: Arc<TracingLogSink>,
    bar: Mutex<Option<ProgressBar>>,
}

impl CliShell {
    /// Build the shell from the `host` section of the settings
    pub fn from_settings(settings: &Settings, log: Arc<TracingLogSink>) -> Result<Self> {
        let gallery = match &settings.host.gallery_url {
            Some(url) => Some(Arc::new(HttpGallery::new(
                url.clone(),
                settings.download_dir()?,
            )?)),
            None => None,
        };

        Ok(Self {
            gallery,
            manager: Arc::new(DirectoryExtensionManager::new(settings.extensions_dir()?)),
            version: settings.host.version.clone().map(StaticHostVersion),
            log,
            bar: Mutex::new(None),
        })
    }

    /// Directory extensions are installed into
    pub fn extensions_dir(&self) -> &Path {
        self.manager.root()
    }

    /// Finish and remove the progress bar, if one was shown
    pub fn finish(&self) {
        let mut bar = match self.bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(pb) = bar.take() {
            pb.finish_and_clear();
        }
        self.log.flush();
    }
}

#[async_trait]
impl HostShell for CliShell {
    async fn gallery(&self) -> Result<Arc<dyn GalleryRepository>> {
        match &self.gallery {
            Some(gallery) => Ok(gallery.clone()),
            None => Err(anyhow!("host.gallery_url is not configured")),
        }
    }

    async fn extension_manager(&self) -> Result<Arc<dyn LocalExtensionManager>> {
        Ok(self.manager.clone())
    }

    fn host_version(&self) -> Result<ProductVersion> {
        self.version
            .as_ref()
            .ok_or_else(|| anyhow!("host.version is not configured"))?
            .current_version()
    }

    fn show_progress(&self, title: &str, progress: &Progress) {
        let mut bar = match self.bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let pb = bar.get_or_insert_with(|| output::progress_bar(progress.total as u64, title));
        pb.set_position(progress.current as u64);
        pb.set_message(progress.text.clone());
    }

    fn show_output(&self) {
        self.log.show_pane();
    }

    fn prompt_for_restart(&self, title: &str) {
        self.finish();
        output::warning(&format!(
            "{}: restart the host application to finish installing extensions",
            title
        ));
    }
}

/// Load settings and wire up the service with the terminal shell
pub fn open_service(config: Option<&Path>) -> Result<(InstallerService, Arc<CliShell>)> {
    let settings = Settings::load(config).context("Failed to load settings")?;
    let log = Arc::new(TracingLogSink::new());
    let shell = Arc::new(CliShell::from_settings(&settings, log.clone())?);
    let store = Arc::new(FileConfigStore::open(settings.config_store_path()?));

    let service = InstallerService::initialize(settings, shell.clone(), log, store)?;
    Ok((service, shell))
}

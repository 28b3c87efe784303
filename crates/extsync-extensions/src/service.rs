//! Orchestration service
//!
//! Owns the feed cache, ledger and reconciler for one bundle, decides
//! whether a run is due, and wires progress, output and restart prompts to
//! the host shell.

use anyhow::{Context, Result};
use extsync_core::Settings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::feed::FeedCache;
use crate::host::{ConfigStore, HostShell, LogSink};
use crate::installer::{InstallResult, Installer, RunContext};
use crate::ledger::{DisableListTarget, InstallLedger};
use crate::progress::{CancelFlag, Progress};

/// What a service run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The feed had not changed; nothing was reconciled
    UpToDate,

    /// The reconciler ran
    Completed {
        result: InstallResult,
        cancelled: bool,
    },
}

impl RunOutcome {
    /// Install outcomes, if the reconciler ran
    pub fn result(&self) -> Option<&InstallResult> {
        match self {
            RunOutcome::UpToDate => None,
            RunOutcome::Completed { result, .. } => Some(result),
        }
    }
}

/// Per-bundle context object replacing process-wide installer state
pub struct InstallerService {
    settings: Settings,
    host: Arc<dyn HostShell>,
    feed: FeedCache,
    ledger: InstallLedger,
    installer: Installer,
}

impl InstallerService {
    /// Build the feed cache, ledger and reconciler from settings
    pub fn initialize(
        settings: Settings,
        host: Arc<dyn HostShell>,
        log: Arc<dyn LogSink>,
        config_store: Arc<dyn ConfigStore>,
    ) -> Result<Self> {
        settings.validate().context("Invalid settings")?;
        debug!("Initializing installer service for {}", settings.name);

        let feed = FeedCache::new(&settings.feed_url, settings.feed_cache_path()?)?;
        let ledger = InstallLedger::load(
            settings.ledger_path()?,
            DisableListTarget::new(
                config_store,
                settings.registry_sub_key(),
                &settings.disable_value_name,
            ),
        );
        let installer = Installer::new(settings.messages.clone(), settings.gallery_locale, log);

        Ok(Self {
            settings,
            host,
            feed,
            ledger,
            installer,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn feed(&self) -> &FeedCache {
        &self.feed
    }

    pub fn ledger(&self) -> &InstallLedger {
        &self.ledger
    }

    pub fn installer(&self) -> &Installer {
        &self.installer
    }

    /// Refresh the feed if the cache is older than the update interval,
    /// otherwise just re-parse it. Returns whether the feed changed.
    pub async fn check_for_updates(&mut self) -> Result<bool> {
        let interval = self.settings.update_interval();
        if self.feed.is_stale(interval) {
            debug!("Feed cache is stale, fetching");
            Ok(self.feed.update().await?)
        } else {
            debug!("Feed cache is fresh, parsing local copy");
            self.feed.parse();
            Ok(false)
        }
    }

    /// Reconcile if the feed changed since it was last fetched
    pub async fn run_if_due(&mut self, cancel: &CancelFlag) -> Result<RunOutcome> {
        if !self.check_for_updates().await? {
            debug!("No feed updates");
            return Ok(RunOutcome::UpToDate);
        }
        self.reconcile(cancel).await
    }

    /// Fetch the feed regardless of its age and reconcile unconditionally
    pub async fn run_forced(&mut self, cancel: &CancelFlag) -> Result<RunOutcome> {
        self.feed.update().await?;
        self.reconcile(cancel).await
    }

    /// Forget the ledger and the feed cache, then run
    pub async fn reset(&mut self, cancel: &CancelFlag) -> Result<RunOutcome> {
        info!("Resetting {}", self.settings.name);
        self.ledger.reset();
        self.feed.reset();
        self.run_if_due(cancel).await
    }

    async fn reconcile(&mut self, cancel: &CancelFlag) -> Result<RunOutcome> {
        let gallery = self
            .host
            .gallery()
            .await
            .context("Gallery is not available")?;
        let manager = self
            .host
            .extension_manager()
            .await
            .context("Extension manager is not available")?;
        let host_version = self
            .host
            .host_version()
            .context("Failed to determine host version")?;
        debug!("Host version {}", host_version);

        let host = Arc::clone(&self.host);
        let title = self.settings.name.clone();
        let shown = AtomicBool::new(false);
        let forward: &(dyn Fn(&Progress) + Send + Sync) = &|progress: &Progress| {
            host.show_progress(&title, progress);
            if !shown.swap(true, Ordering::SeqCst) {
                host.show_output();
            }
        };

        let ctx = RunContext {
            host_version: &host_version,
            gallery: gallery.as_ref(),
            manager: manager.as_ref(),
            cancel,
        };

        let result = self
            .installer
            .run(self.feed.extensions(), &mut self.ledger, ctx, Some(forward))
            .await?;

        let cancelled = cancel.is_cancelled();
        if !cancelled && result.must_restart() {
            info!("Restart required to finish installation");
            self.host.prompt_for_restart(&self.settings.name);
        }

        Ok(RunOutcome::Completed { result, cancelled })
    }
}

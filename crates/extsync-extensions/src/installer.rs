//! Reconciler
//!
//! Computes the delta between the feed, the ledger and the host's installed
//! set, then runs an uninstall pass followed by an install pass. Items are
//! processed one at a time; a failing item is logged and the batch moves on.
//! Cancellation is polled before every item, and whatever the ledger gained
//! before cancellation is still saved.

use anyhow::Result as AnyResult;
use extsync_core::config::Messages;
use extsync_core::error::Result;
use extsync_core::types::{ExtensionDescriptor, ProductVersion, RestartReason};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::host::{
    GalleryEntry, GalleryRepository, InstalledExtension, LocalExtensionManager, LogSink,
};
use crate::ledger::InstallLedger;
use crate::progress::{CancelFlag, Progress, ProgressCallback, RunPhase};

/// Outcome of one install attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub id: String,
    pub name: String,
    pub restart: RestartReason,
}

/// Aggregated outcomes of an install pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallResult {
    outcomes: Vec<InstallOutcome>,
}

impl InstallResult {
    /// An empty result
    pub fn nothing_to_do() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, extension: &ExtensionDescriptor, restart: RestartReason) {
        self.outcomes.push(InstallOutcome {
            id: extension.id.clone(),
            name: extension.name.clone(),
            restart,
        });
    }

    /// Whether any install was attempted
    pub fn any(&self) -> bool {
        !self.outcomes.is_empty()
    }

    /// Whether any outcome asks for a host restart
    pub fn must_restart(&self) -> bool {
        self.outcomes.iter().any(|o| o.restart.requires_restart())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[InstallOutcome] {
        &self.outcomes
    }
}

/// Uninstall and install candidates for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub to_uninstall: Vec<ExtensionDescriptor>,
    pub to_install: Vec<ExtensionDescriptor>,
}

impl InstallPlan {
    /// Classify feed descriptors against the host version, installed set and ledger.
    ///
    /// Anything outside its version window is uninstalled whether or not it
    /// is present. Install candidates are in-window descriptors the host
    /// does not report and the ledger never marked installed.
    pub fn compute(
        feed: &[ExtensionDescriptor],
        ledger: &InstallLedger,
        installed: &[InstalledExtension],
        host_version: &ProductVersion,
    ) -> Self {
        let (to_uninstall, eligible): (Vec<_>, Vec<_>) = feed
            .iter()
            .cloned()
            .partition(|ext| !ext.supports(host_version));

        let to_install = eligible
            .into_iter()
            .filter(|ext| !installed.iter().any(|i| i.id == ext.id))
            .filter(|ext| !ledger.has_been_installed(&ext.id))
            .collect();

        Self {
            to_uninstall,
            to_install,
        }
    }

    /// Planned uninstalls plus installs
    pub fn action_count(&self) -> usize {
        self.to_uninstall.len() + self.to_install.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_count() == 0
    }
}

/// Host capabilities and signals for one run
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub host_version: &'a ProductVersion,
    pub gallery: &'a dyn GalleryRepository,
    pub manager: &'a dyn LocalExtensionManager,
    pub cancel: &'a CancelFlag,
}

/// The reconciliation engine
pub struct Installer {
    messages: Messages,
    locale: u32,
    log: Arc<dyn LogSink>,
    phase: RunPhase,
}

impl Installer {
    pub fn new(messages: Messages, locale: u32, log: Arc<dyn LogSink>) -> Self {
        Self {
            messages,
            locale,
            log,
            phase: RunPhase::Idle,
        }
    }

    /// Phase the last (or current) run reached
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!("Reconciler phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Reconcile the host against `feed`.
    ///
    /// Returns the install outcomes. Per-item failures are logged and never
    /// returned; only a failure to persist the ledger is an error.
    pub async fn run(
        &mut self,
        feed: &[ExtensionDescriptor],
        ledger: &mut InstallLedger,
        ctx: RunContext<'_>,
        on_progress: ProgressCallback<'_>,
    ) -> Result<InstallResult> {
        self.enter(RunPhase::ComputingDelta);

        let installed = match ctx.manager.list_installed().await {
            Ok(installed) => installed,
            Err(e) => {
                warn!("Failed to list installed extensions, skipping run: {:#}", e);
                self.enter(RunPhase::NoOp);
                return Ok(InstallResult::nothing_to_do());
            }
        };

        let plan = InstallPlan::compute(feed, ledger, &installed, ctx.host_version);
        if plan.is_empty() {
            debug!("Nothing to reconcile");
            self.enter(RunPhase::NoOp);
            return Ok(InstallResult::nothing_to_do());
        }

        info!(
            "Reconciling: {} to uninstall, {} to install",
            plan.to_uninstall.len(),
            plan.to_install.len()
        );
        self.enter(RunPhase::Running);

        let mut progress = Progress::new(plan.action_count());

        self.enter(RunPhase::Uninstalling);
        self.uninstall_pass(&plan.to_uninstall, ledger, ctx, &mut progress, on_progress)
            .await?;

        self.enter(RunPhase::Installing);
        let result = self
            .install_pass(&plan.to_install, ledger, ctx, &mut progress, on_progress)
            .await?;

        self.log.log("", true);
        self.log.log(&self.messages.installation_complete, true);
        self.enter(RunPhase::Completed);

        Ok(result)
    }

    async fn uninstall_pass(
        &self,
        extensions: &[ExtensionDescriptor],
        ledger: &mut InstallLedger,
        ctx: RunContext<'_>,
        progress: &mut Progress,
        on_progress: ProgressCallback<'_>,
    ) -> Result<()> {
        if extensions.is_empty() {
            return Ok(());
        }

        for extension in extensions {
            if ctx.cancel.is_cancelled() {
                info!("Uninstall pass cancelled");
                break;
            }

            let text = self.messages.uninstalling(&extension.name);
            report(progress, text.clone(), on_progress);
            self.log.log(&text, false);

            match uninstall_one(extension, ctx.manager).await {
                Ok(true) => {
                    ledger.mark_uninstalled(extension);
                    self.log.log(&self.messages.ok, true);
                }
                Ok(false) => {
                    debug!("{} is not installed, nothing to uninstall", extension.id);
                    self.log.log("", true);
                }
                Err(e) => {
                    warn!("Failed to uninstall {}: {:#}", extension.id, e);
                    self.log.log(&self.messages.failed, true);
                }
            }
        }

        ledger.save()
    }

    async fn install_pass(
        &self,
        extensions: &[ExtensionDescriptor],
        ledger: &mut InstallLedger,
        ctx: RunContext<'_>,
        progress: &mut Progress,
        on_progress: ProgressCallback<'_>,
    ) -> Result<InstallResult> {
        let mut result = InstallResult::nothing_to_do();
        if extensions.is_empty() {
            return Ok(result);
        }

        for extension in extensions {
            if ctx.cancel.is_cancelled() {
                info!("Install pass cancelled");
                break;
            }

            report(
                progress,
                self.messages.installing_named(&extension.name),
                on_progress,
            );

            let restart = self.install_one(extension, ledger, ctx).await;
            result.add_result(extension, restart);
        }

        ledger.save()?;
        Ok(result)
    }

    /// Verify, download and install one extension.
    ///
    /// Once the gallery lists the extension it is marked installed, even if
    /// the download or install then fails.
    async fn install_one(
        &self,
        extension: &ExtensionDescriptor,
        ledger: &mut InstallLedger,
        ctx: RunContext<'_>,
    ) -> RestartReason {
        self.log.log("", true);
        self.log.log(&extension.name, true);
        self.log
            .log(&format!("  {}", self.messages.verifying), false);

        let entry = match ctx.gallery.find_by_id(&extension.id, self.locale).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                warn!("{} is not listed in the gallery", extension.id);
                self.log.log(&self.messages.failed, true);
                return RestartReason::None;
            }
            Err(e) => {
                warn!("Gallery lookup for {} failed: {:#}", extension.id, e);
                self.log.log(&self.messages.failed, true);
                return RestartReason::None;
            }
        };
        self.log.log(&self.messages.ok, true);

        let restart = match self.fetch_and_install(extension, &entry, ctx).await {
            Ok(restart) => restart,
            Err(e) => {
                warn!("Failed to install {}: {:#}", extension.id, e);
                self.log.log(&self.messages.failed, true);
                RestartReason::None
            }
        };

        ledger.mark_installed(extension);
        restart
    }

    async fn fetch_and_install(
        &self,
        extension: &ExtensionDescriptor,
        entry: &GalleryEntry,
        ctx: RunContext<'_>,
    ) -> AnyResult<RestartReason> {
        let installed = ctx.manager.try_get_installed(&extension.id).await?;

        self.log
            .log(&format!("  {}", self.messages.downloading), false);

        let package = match installed {
            None => Some(ctx.gallery.download(entry).await?),
            Some(current) => {
                let latest = ctx.gallery.query_latest_version(&extension.id).await?;
                if latest > current.version {
                    debug!(
                        "{} {} is newer than installed {}",
                        extension.id, latest, current.version
                    );
                    Some(ctx.gallery.download(entry).await?)
                } else {
                    None
                }
            }
        };

        let Some(package) = package else {
            self.log.log(&self.messages.nothing_to_do, true);
            return Ok(RestartReason::None);
        };

        self.log.log(&self.messages.ok, true);
        self.log
            .log(&format!("  {}", self.messages.installing), false);

        let restart = ctx.manager.install(&package, false).await?;
        self.log.log(&self.messages.ok, true);

        info!("Installed {} {}", extension.id, package.version);
        Ok(restart)
    }
}

/// Uninstall if the host has it; `Ok(false)` when it is not installed
async fn uninstall_one(
    extension: &ExtensionDescriptor,
    manager: &dyn LocalExtensionManager,
) -> AnyResult<bool> {
    match manager.try_get_installed(&extension.id).await? {
        Some(installed) => {
            manager.uninstall(&installed).await?;
            info!("Uninstalled {}", extension.id);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn report(progress: &mut Progress, text: String, on_progress: ProgressCallback<'_>) {
    progress.advance(text);
    if let Some(callback) = on_progress {
        callback(&*progress);
    }
}

//! Installation ledger
//!
//! Durable, append-only history of install/uninstall actions. The ledger is
//! rewritten wholesale on every save and, after each save, the ids that
//! were ever uninstalled are published to the host config store as a
//! `;`-separated disable-list.

use anyhow::Context;
use extsync_core::error::{Error, Result};
use extsync_core::types::{ExtensionDescriptor, LedgerAction, LedgerEntry};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::host::ConfigStore;

/// Separator used when joining the disable-list
pub const DISABLE_LIST_SEPARATOR: &str = ";";

/// Where the disable-list is published
#[derive(Clone)]
pub struct DisableListTarget {
    pub store: Arc<dyn ConfigStore>,
    pub sub_key: String,
    pub value_name: String,
}

impl DisableListTarget {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        sub_key: impl Into<String>,
        value_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sub_key: sub_key.into(),
            value_name: value_name.into(),
        }
    }

    fn publish(&self, value: &str) -> anyhow::Result<()> {
        self.store
            .create_sub_key(&self.sub_key)
            .with_context(|| format!("Failed to open config key {}", self.sub_key))?
            .set_value(&self.value_name, value)
            .with_context(|| format!("Failed to set {}\\{}", self.sub_key, self.value_name))
    }
}

/// Persisted installation ledger
pub struct InstallLedger {
    path: PathBuf,
    entries: Vec<LedgerEntry>,
    target: DisableListTarget,
}

impl InstallLedger {
    /// Load the ledger at `path`.
    ///
    /// A missing file yields an empty ledger. A file that cannot be parsed is
    /// deleted and the ledger starts empty. The disable-list is re-published
    /// after loading; a failure there is only logged.
    pub fn load(path: impl Into<PathBuf>, target: DisableListTarget) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);

        let ledger = Self {
            path,
            entries,
            target,
        };

        if let Err(e) = ledger.publish_disable_list() {
            warn!("Failed to publish disable list after load: {:#}", e);
        }

        ledger
    }

    fn read_entries(path: &Path) -> Vec<LedgerEntry> {
        if !path.exists() {
            debug!("No ledger at {}, starting empty", path.display());
            return Vec::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read ledger {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<LedgerEntry>>(&content) {
            Ok(entries) => {
                debug!(
                    "Loaded {} ledger entries from {}",
                    entries.len(),
                    path.display()
                );
                entries
            }
            Err(e) => {
                warn!(
                    "Ledger {} is corrupt ({}); discarding it and starting empty",
                    path.display(),
                    e
                );
                if let Err(e) = fs::remove_file(path) {
                    warn!("Failed to delete corrupt ledger {}: {}", path.display(), e);
                }
                Vec::new()
            }
        }
    }

    /// Ledger file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every recorded action, oldest first
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record that an extension was installed (appends, never deduplicates)
    pub fn mark_installed(&mut self, extension: &ExtensionDescriptor) {
        self.record(extension, LedgerAction::Installed);
    }

    /// Record that an extension was uninstalled (appends, never deduplicates)
    pub fn mark_uninstalled(&mut self, extension: &ExtensionDescriptor) {
        self.record(extension, LedgerAction::Uninstalled);
    }

    fn record(&mut self, extension: &ExtensionDescriptor, action: LedgerAction) {
        debug!("Ledger: {} {}", action, extension.id);
        self.entries.push(LedgerEntry::new(extension, action));
    }

    /// Whether the id was ever marked installed.
    ///
    /// Stays true after a later uninstall: an id marked installed is never
    /// offered for installation again.
    pub fn has_been_installed(&self, id: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.id == id && e.action == LedgerAction::Installed)
    }

    /// Ids with at least one uninstall record, first-seen order, no repeats
    pub fn disabled_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| e.action == LedgerAction::Uninstalled)
            .filter(|e| seen.insert(e.id.as_str()))
            .map(|e| e.id.as_str())
            .collect()
    }

    /// Disable-list value as written to the config store
    pub fn disable_list(&self) -> String {
        self.disabled_ids().join(DISABLE_LIST_SEPARATOR)
    }

    /// Rewrite the ledger file and publish the disable-list
    pub fn save(&self) -> Result<()> {
        self.write_file()
            .map_err(|e| Error::persistence("ledger", &self.path, e))?;

        self.publish_disable_list()
            .map_err(|e| Error::persistence("disable list", &self.target.sub_key, e))?;

        debug!(
            "Saved {} ledger entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn write_file(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create ledger directory")?;
        }

        let json =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize ledger")?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).context("Failed to write ledger")?;
        fs::rename(&temp_path, &self.path).context("Failed to replace ledger")?;
        Ok(())
    }

    fn publish_disable_list(&self) -> anyhow::Result<()> {
        self.target.publish(&self.disable_list())
    }

    /// Delete the ledger file and forget all history.
    ///
    /// Returns false if the file could not be deleted; the in-memory history
    /// is cleared either way.
    pub fn reset(&mut self) -> bool {
        self.entries.clear();

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Ledger {} reset", self.path.display());
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("Failed to delete ledger {}: {}", self.path.display(), e);
                false
            }
        }
    }
}

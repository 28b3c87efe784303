//! Mock implementations for testing
//!
//! Provides in-memory host collaborators that record every call, so tests
//! can assert on the exact sequence of gallery, manager and config store
//! interactions without touching the network or a real host.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use extsync_core::types::{ProductVersion, RestartReason};
use extsync_extensions::host::{
    ConfigStore, GalleryEntry, GalleryRepository, HostShell, InstallablePackage,
    InstalledExtension, LocalExtensionManager, LogSink,
};
use extsync_extensions::progress::{CancelFlag, Progress};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Config store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    values: Mutex<HashMap<(String, String), String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

/// In-memory config store; sub keys share the same backing map
#[derive(Clone, Default)]
pub struct MemoryConfigStore {
    key: String,
    state: Arc<StoreState>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key\name`
    pub fn value(&self, key: &str, name: &str) -> Option<String> {
        self.state
            .values
            .lock()
            .unwrap()
            .get(&(key.to_string(), name.to_string()))
            .cloned()
    }

    /// Number of successful `set_value` calls across all keys
    pub fn write_count(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self, fail: bool) {
        self.state.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl ConfigStore for MemoryConfigStore {
    fn create_sub_key(&self, name: &str) -> Result<Box<dyn ConfigStore>> {
        let key = if self.key.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.key, name)
        };
        Ok(Box::new(MemoryConfigStore {
            key,
            state: Arc::clone(&self.state),
        }))
    }

    fn set_value(&self, name: &str, value: &str) -> Result<()> {
        if self.state.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("config store is read-only"));
        }
        self.state
            .values
            .lock()
            .unwrap()
            .insert((self.key.clone(), name.to_string()), value.to_string());
        self.state.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get_value(&self, name: &str) -> Result<Option<String>> {
        Ok(self.value(&self.key, name))
    }
}

// ---------------------------------------------------------------------------
// Log sink
// ---------------------------------------------------------------------------

/// Log sink capturing the output pane transcript
#[derive(Default)]
pub struct RecordingLogSink {
    transcript: Mutex<String>,
    panes_shown: AtomicUsize,
}

impl RecordingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> String {
        self.transcript.lock().unwrap().clone()
    }

    /// Transcript split into lines, blank lines removed
    pub fn lines(&self) -> Vec<String> {
        self.transcript()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn panes_shown(&self) -> usize {
        self.panes_shown.load(Ordering::SeqCst)
    }
}

impl LogSink for RecordingLogSink {
    fn log(&self, message: &str, add_newline: bool) {
        let mut transcript = self.transcript.lock().unwrap();
        transcript.push_str(message);
        if add_newline {
            transcript.push('\n');
        }
    }

    fn show_pane(&self) {
        self.panes_shown.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

/// Gallery serving a fixed set of listings
#[derive(Default)]
pub struct MockGallery {
    listings: Mutex<HashMap<String, GalleryEntry>>,
    failing_downloads: Mutex<HashSet<String>>,
    failing_lookups: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockGallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gallery listing each id at version 1.0.0
    pub fn listing(ids: &[&str]) -> Self {
        let gallery = Self::new();
        for id in ids {
            gallery.publish(id, "1.0.0");
        }
        gallery
    }

    /// List (or re-list) an id at `version`
    pub fn publish(&self, id: &str, version: &str) {
        self.listings.lock().unwrap().insert(
            id.to_string(),
            GalleryEntry {
                id: id.to_string(),
                name: format!("{} (gallery)", id),
                version: ProductVersion::parse(version).unwrap(),
                author: Some("Mock Author".to_string()),
                download_url: Some(format!("https://gallery.test/{}.vsix", id)),
            },
        );
    }

    pub fn fail_download(&self, id: &str) {
        self.failing_downloads
            .lock()
            .unwrap()
            .insert(id.to_string());
    }

    pub fn fail_lookup(&self, id: &str) {
        self.failing_lookups.lock().unwrap().insert(id.to_string());
    }

    /// Recorded calls as `op:id`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls touching `id`
    pub fn calls_for(&self, id: &str) -> Vec<String> {
        let suffix = format!(":{}", id);
        self.calls()
            .into_iter()
            .filter(|c| c.ends_with(&suffix))
            .collect()
    }

    fn record(&self, op: &str, id: &str) {
        self.calls.lock().unwrap().push(format!("{}:{}", op, id));
    }
}

#[async_trait]
impl GalleryRepository for MockGallery {
    async fn query_latest_version(&self, id: &str) -> Result<ProductVersion> {
        self.record("latest", id);
        self.listings
            .lock()
            .unwrap()
            .get(id)
            .map(|e| e.version.clone())
            .ok_or_else(|| anyhow!("{} not listed", id))
    }

    async fn find_by_id(&self, id: &str, _locale: u32) -> Result<Option<GalleryEntry>> {
        self.record("find", id);
        if self.failing_lookups.lock().unwrap().contains(id) {
            return Err(anyhow!("gallery timeout for {}", id));
        }
        Ok(self.listings.lock().unwrap().get(id).cloned())
    }

    async fn download(&self, entry: &GalleryEntry) -> Result<InstallablePackage> {
        self.record("download", &entry.id);
        if self.failing_downloads.lock().unwrap().contains(&entry.id) {
            return Err(anyhow!("download of {} failed", entry.id));
        }
        Ok(InstallablePackage {
            id: entry.id.clone(),
            name: entry.name.clone(),
            version: entry.version.clone(),
            author: entry.author.clone(),
            path: PathBuf::from(format!("/mock/downloads/{}.vsix", entry.id)),
        })
    }
}

// ---------------------------------------------------------------------------
// Extension manager
// ---------------------------------------------------------------------------

/// Extension manager keeping its installed set in memory
#[derive(Default)]
pub struct MockManager {
    installed: Mutex<Vec<InstalledExtension>>,
    failing_installs: Mutex<HashSet<String>>,
    failing_uninstalls: Mutex<HashSet<String>>,
    restart_reasons: Mutex<HashMap<String, RestartReason>>,
    cancel_after_install: Mutex<Option<(String, CancelFlag)>>,
    fail_listing: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `id` is already installed at `version`
    pub fn with_installed(self, id: &str, version: &str) -> Self {
        self.installed.lock().unwrap().push(InstalledExtension {
            id: id.to_string(),
            version: ProductVersion::parse(version).unwrap(),
            author: None,
        });
        self
    }

    pub fn fail_install(&self, id: &str) {
        self.failing_installs.lock().unwrap().insert(id.to_string());
    }

    pub fn fail_uninstall(&self, id: &str) {
        self.failing_uninstalls
            .lock()
            .unwrap()
            .insert(id.to_string());
    }

    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    /// Report a restart reason when `id` is installed
    pub fn require_restart(&self, id: &str, reason: &str) {
        self.restart_reasons
            .lock()
            .unwrap()
            .insert(id.to_string(), RestartReason::Required(reason.to_string()));
    }

    /// Trip `flag` once `id` has been installed
    pub fn cancel_after_install(&self, id: &str, flag: CancelFlag) {
        *self.cancel_after_install.lock().unwrap() = Some((id.to_string(), flag));
    }

    pub fn installed_ids(&self) -> Vec<String> {
        self.installed
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.id.clone())
            .collect()
    }

    /// Recorded install/uninstall calls as `op:id`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, id: &str) {
        self.calls.lock().unwrap().push(format!("{}:{}", op, id));
    }
}

#[async_trait]
impl LocalExtensionManager for MockManager {
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(anyhow!("extension manager unavailable"));
        }
        Ok(self.installed.lock().unwrap().clone())
    }

    async fn install(
        &self,
        package: &InstallablePackage,
        _requires_elevation: bool,
    ) -> Result<RestartReason> {
        self.record("install", &package.id);

        let outcome = if self.failing_installs.lock().unwrap().contains(&package.id) {
            Err(anyhow!("install of {} failed", package.id))
        } else {
            let mut installed = self.installed.lock().unwrap();
            installed.retain(|e| e.id != package.id);
            installed.push(InstalledExtension {
                id: package.id.clone(),
                version: package.version.clone(),
                author: package.author.clone(),
            });
            Ok(self
                .restart_reasons
                .lock()
                .unwrap()
                .get(&package.id)
                .cloned()
                .unwrap_or_default())
        };

        if let Some((id, flag)) = self.cancel_after_install.lock().unwrap().as_ref() {
            if *id == package.id {
                flag.cancel();
            }
        }

        outcome
    }

    async fn uninstall(&self, extension: &InstalledExtension) -> Result<()> {
        self.record("uninstall", &extension.id);
        if self
            .failing_uninstalls
            .lock()
            .unwrap()
            .contains(&extension.id)
        {
            return Err(anyhow!("uninstall of {} failed", extension.id));
        }
        self.installed
            .lock()
            .unwrap()
            .retain(|e| e.id != extension.id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Host shell
// ---------------------------------------------------------------------------

/// Host shell handing out the mocks and recording UI calls
pub struct MockShell {
    pub gallery: Arc<MockGallery>,
    pub manager: Arc<MockManager>,
    pub version: ProductVersion,
    progress: Mutex<Vec<Progress>>,
    outputs_shown: AtomicUsize,
    restart_prompts: AtomicUsize,
}

impl MockShell {
    pub fn new(gallery: MockGallery, manager: MockManager, version: &str) -> Self {
        Self {
            gallery: Arc::new(gallery),
            manager: Arc::new(manager),
            version: ProductVersion::parse(version).unwrap(),
            progress: Mutex::new(Vec::new()),
            outputs_shown: AtomicUsize::new(0),
            restart_prompts: AtomicUsize::new(0),
        }
    }

    pub fn progress_updates(&self) -> Vec<Progress> {
        self.progress.lock().unwrap().clone()
    }

    pub fn outputs_shown(&self) -> usize {
        self.outputs_shown.load(Ordering::SeqCst)
    }

    pub fn restart_prompts(&self) -> usize {
        self.restart_prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostShell for MockShell {
    async fn gallery(&self) -> Result<Arc<dyn GalleryRepository>> {
        Ok(self.gallery.clone())
    }

    async fn extension_manager(&self) -> Result<Arc<dyn LocalExtensionManager>> {
        Ok(self.manager.clone())
    }

    fn host_version(&self) -> Result<ProductVersion> {
        Ok(self.version.clone())
    }

    fn show_progress(&self, _title: &str, progress: &Progress) {
        self.progress.lock().unwrap().push(progress.clone());
    }

    fn show_output(&self) {
        self.outputs_shown.fetch_add(1, Ordering::SeqCst);
    }

    fn prompt_for_restart(&self, _title: &str) {
        self.restart_prompts.fetch_add(1, Ordering::SeqCst);
    }
}

//! Builders for descriptors, feeds and ledgers used as test fixtures

#![allow(dead_code)]

use extsync_core::types::{ExtensionDescriptor, ProductVersion};
use extsync_extensions::host::ConfigStore;
use extsync_extensions::ledger::{DisableListTarget, InstallLedger};
use std::path::Path;
use std::sync::Arc;

use super::constants::{TEST_DISABLE_VALUE, TEST_SUB_KEY};
use super::mocks::MemoryConfigStore;

/// Parse a version literal
pub fn version(s: &str) -> ProductVersion {
    ProductVersion::parse(s).unwrap()
}

/// Builder for ExtensionDescriptor fixtures
pub struct DescriptorBuilder {
    id: String,
    name: String,
    min_version: String,
    max_version: String,
}

impl DescriptorBuilder {
    /// Descriptor with the default 15.0..=16.0 window
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("{} extension", id),
            min_version: "15.0".to_string(),
            max_version: "16.0".to_string(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_range(mut self, min: &str, max: &str) -> Self {
        self.min_version = min.to_string();
        self.max_version = max.to_string();
        self
    }

    pub fn build(self) -> ExtensionDescriptor {
        ExtensionDescriptor::new(
            self.id,
            self.name,
            version(&self.min_version),
            version(&self.max_version),
        )
    }
}

/// Descriptors with default windows for each id
pub fn descriptors(ids: &[&str]) -> Vec<ExtensionDescriptor> {
    ids.iter().map(|id| DescriptorBuilder::new(id).build()).collect()
}

/// Serialize descriptors as a feed document
pub fn feed_json(extensions: &[ExtensionDescriptor]) -> String {
    let mut document = serde_json::Map::new();
    for ext in extensions {
        document.insert(
            ext.name.clone(),
            serde_json::json!({
                "id": ext.id,
                "minVersion": ext.min_version.to_string(),
                "maxVersion": ext.max_version.to_string(),
            }),
        );
    }
    serde_json::Value::Object(document).to_string()
}

/// Ledger at `dir/installer.log` publishing to `store`
pub fn ledger_in(dir: &Path, store: &Arc<MemoryConfigStore>) -> InstallLedger {
    let store: Arc<dyn ConfigStore> = store.clone();
    InstallLedger::load(
        dir.join("installer.log"),
        DisableListTarget::new(store, TEST_SUB_KEY, TEST_DISABLE_VALUE),
    )
}

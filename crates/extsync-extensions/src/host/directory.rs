//! Extension manager that installs packages into a plain directory

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use extsync_core::types::RestartReason;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{InstallablePackage, InstalledExtension, LocalExtensionManager};

/// Index of installed extensions inside the managed directory
const INSTALLED_FILE: &str = "installed.json";

/// Installs each extension into `<root>/<id>/` and tracks them in `installed.json`
#[derive(Debug, Clone)]
pub struct DirectoryExtensionManager {
    root: PathBuf,
}

impl DirectoryExtensionManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Managed directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory an extension id is installed into.
    ///
    /// Characters outside `[A-Za-z0-9._-]` become `_`. Ids that are empty or
    /// made only of dots would resolve outside the managed directory and are
    /// rejected.
    pub fn extension_dir(&self, id: &str) -> Result<PathBuf> {
        let safe: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if safe.chars().all(|c| c == '.') {
            return Err(anyhow!("Invalid extension id '{}'", id));
        }
        Ok(self.root.join(safe))
    }

    async fn read_index(&self) -> Result<Vec<InstalledExtension>> {
        let path = self.root.join(INSTALLED_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    async fn write_index(&self, installed: &[InstalledExtension]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .context("Failed to create extensions directory")?;
        let json = serde_json::to_string_pretty(installed)
            .context("Failed to serialize installed extensions")?;
        let path = self.root.join(INSTALLED_FILE);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .await
            .context("Failed to write installed extensions")?;
        fs::rename(&temp_path, &path)
            .await
            .context("Failed to replace installed extensions index")?;
        Ok(())
    }
}

#[async_trait]
impl LocalExtensionManager for DirectoryExtensionManager {
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>> {
        self.read_index().await
    }

    async fn install(
        &self,
        package: &InstallablePackage,
        requires_elevation: bool,
    ) -> Result<RestartReason> {
        if requires_elevation {
            return Err(anyhow!(
                "Elevated installs are not supported for {}",
                package.id
            ));
        }

        let dest = self.extension_dir(&package.id)?;
        fs::create_dir_all(&dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        let file_name = package
            .path
            .file_name()
            .ok_or_else(|| anyhow!("Package path has no file name: {}", package.path.display()))?;
        fs::copy(&package.path, dest.join(file_name))
            .await
            .with_context(|| format!("Failed to copy package for {}", package.id))?;

        let mut installed = self.read_index().await?;
        installed.retain(|ext| ext.id != package.id);
        installed.push(InstalledExtension {
            id: package.id.clone(),
            version: package.version.clone(),
            author: package.author.clone(),
        });
        self.write_index(&installed).await?;

        info!(
            "Installed {} {} into {}",
            package.id,
            package.version,
            dest.display()
        );
        Ok(RestartReason::None)
    }

    async fn uninstall(&self, extension: &InstalledExtension) -> Result<()> {
        let dir = self.extension_dir(&extension.id)?;
        let mut installed = self.read_index().await?;
        let before = installed.len();
        installed.retain(|ext| ext.id != extension.id);
        if installed.len() == before {
            return Err(anyhow!("Extension {} is not installed", extension.id));
        }

        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
        }
        self.write_index(&installed).await?;

        debug!("Uninstalled {}", extension.id);
        Ok(())
    }
}

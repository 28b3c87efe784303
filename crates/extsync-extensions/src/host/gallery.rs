//! Gallery backed by a JSON index published over HTTP(S) or on disk
//!
//! Index format:
//! ```json
//! { "web.tools": { "name": "Web Tools", "version": "1.4.2", "url": "packages/web-tools.vsix" } }
//! ```
//! Relative package URLs resolve against the index location.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use extsync_core::types::ProductVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use super::{GalleryEntry, GalleryRepository, InstallablePackage};
use crate::fetch::{fetch_bytes, fetch_text, http_client};

/// One extension listing in the gallery index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryIndexEntry {
    pub name: String,
    pub version: ProductVersion,
    #[serde(default)]
    pub author: Option<String>,
    pub url: String,
}

/// HTTP/file gallery; the index is fetched once per instance
pub struct HttpGallery {
    index_url: String,
    download_dir: PathBuf,
    client: reqwest::Client,
    index: OnceCell<HashMap<String, GalleryIndexEntry>>,
}

impl HttpGallery {
    pub fn new(index_url: impl Into<String>, download_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            index_url: index_url.into(),
            download_dir: download_dir.into(),
            client: http_client()?,
            index: OnceCell::new(),
        })
    }

    async fn index(&self) -> Result<&HashMap<String, GalleryIndexEntry>> {
        self.index
            .get_or_try_init(|| async {
                let text = fetch_text(&self.client, &self.index_url).await?;
                let index: HashMap<String, GalleryIndexEntry> = serde_json::from_str(&text)
                    .with_context(|| format!("Invalid gallery index at {}", self.index_url))?;
                debug!("Loaded gallery index with {} entries", index.len());
                Ok::<_, anyhow::Error>(index)
            })
            .await
    }

    /// Resolve a package URL relative to the index location
    fn resolve_package_url(&self, url: &str) -> String {
        if Url::parse(url).is_ok() {
            return url.to_string();
        }
        if let Ok(base) = Url::parse(&self.index_url) {
            if let Ok(joined) = base.join(url) {
                return joined.to_string();
            }
        }
        Path::new(&self.index_url)
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(url)
            .display()
            .to_string()
    }

    fn package_file_name(entry: &GalleryEntry, url: &str) -> String {
        let last = url
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains('?'));
        match last {
            Some(segment) => format!("{}-{}", entry.version, segment),
            None => format!("{}-{}.vsix", entry.id, entry.version),
        }
    }
}

#[async_trait]
impl GalleryRepository for HttpGallery {
    async fn query_latest_version(&self, id: &str) -> Result<ProductVersion> {
        self.index()
            .await?
            .get(id)
            .map(|entry| entry.version.clone())
            .ok_or_else(|| anyhow!("Extension {} is not listed in the gallery", id))
    }

    async fn find_by_id(&self, id: &str, locale: u32) -> Result<Option<GalleryEntry>> {
        debug!("Gallery lookup for {} (locale {})", id, locale);
        Ok(self.index().await?.get(id).map(|entry| GalleryEntry {
            id: id.to_string(),
            name: entry.name.clone(),
            version: entry.version.clone(),
            author: entry.author.clone(),
            download_url: Some(entry.url.clone()),
        }))
    }

    async fn download(&self, entry: &GalleryEntry) -> Result<InstallablePackage> {
        let url = entry
            .download_url
            .as_deref()
            .ok_or_else(|| anyhow!("Gallery entry {} has no download URL", entry.id))?;
        let resolved = self.resolve_package_url(url);

        let bytes = fetch_bytes(&self.client, &resolved).await?;

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .context("Failed to create download directory")?;
        let path = self
            .download_dir
            .join(Self::package_file_name(entry, &resolved));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write package {}", path.display()))?;

        info!(
            "Downloaded {} {} ({} bytes)",
            entry.id,
            entry.version,
            bytes.len()
        );
        Ok(InstallablePackage {
            id: entry.id.clone(),
            name: entry.name.clone(),
            version: entry.version.clone(),
            author: entry.author.clone(),
            path,
        })
    }
}

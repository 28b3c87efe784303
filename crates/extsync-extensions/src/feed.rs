//! Feed cache
//!
//! Fetches the published extension manifest, keeps a local copy that is only
//! rewritten when the remote content changes, and parses the local copy into
//! extension descriptors.
//!
//! Manifest format (object keyed by display name, key order preserved):
//! ```json
//! {
//!   "Web Tools": { "id": "web.tools", "minVersion": "15.0", "maxVersion": "16.0" },
//!   "Markdown Editor": { "id": "md.editor" }
//! }
//! ```

use anyhow::{anyhow, Context};
use extsync_core::error::{Error, Result};
use extsync_core::types::{
    ExtensionDescriptor, ProductVersion, DEFAULT_MAX_VERSION, DEFAULT_MIN_VERSION,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use crate::fetch::{fetch_bytes, http_client};

/// One manifest value as published
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedEntry {
    id: String,
    #[serde(default)]
    min_version: Option<String>,
    #[serde(default)]
    max_version: Option<String>,
}

type FeedDocument = serde_json::Map<String, serde_json::Value>;

/// Local cache of the remote extension feed
pub struct FeedCache {
    url: String,
    cache_path: PathBuf,
    extensions: Vec<ExtensionDescriptor>,
    client: reqwest::Client,
}

impl FeedCache {
    /// Create a cache for `url` stored at `cache_path`
    pub fn new(url: impl Into<String>, cache_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Ok(Self::with_client(url, cache_path, http_client()?))
    }

    /// Create a cache sharing an existing HTTP client
    pub fn with_client(
        url: impl Into<String>,
        cache_path: impl Into<PathBuf>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            url: url.into(),
            cache_path: cache_path.into(),
            extensions: Vec::new(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Descriptors from the last successful parse, in feed order
    pub fn extensions(&self) -> &[ExtensionDescriptor] {
        &self.extensions
    }

    /// Download the feed and replace the local cache if its content differs.
    ///
    /// Network failures and malformed content leave the cache untouched and
    /// return `Ok(false)`. Only a failure to write the new cache is an error.
    /// An unchanged fetch bumps the cache mtime so the fetch throttle
    /// restarts without rewriting the content.
    pub async fn fetch_if_changed(&self) -> Result<bool> {
        let remote = match fetch_bytes(&self.client, &self.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to fetch extension feed: {:#}", e);
                return Ok(false);
            }
        };

        let current = match fs::read(&self.cache_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                debug!(
                    "Could not read feed cache {}: {}",
                    self.cache_path.display(),
                    e
                );
                Vec::new()
            }
        };

        if remote == current {
            debug!("Extension feed unchanged");
            if !current.is_empty() {
                self.touch_cache();
            }
            return Ok(false);
        }

        if let Err(e) = serde_json::from_slice::<FeedDocument>(&remote) {
            warn!("Ignoring malformed extension feed from {}: {}", self.url, e);
            return Ok(false);
        }

        self.write_cache(&remote)
            .map_err(|e| Error::persistence("feed cache", &self.cache_path, e))?;

        info!("Extension feed updated ({} bytes)", remote.len());
        Ok(true)
    }

    fn write_cache(&self, content: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).context("Failed to create feed cache directory")?;
        }
        let temp_path = self.cache_path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write feed cache")?;
        fs::rename(&temp_path, &self.cache_path).context("Failed to replace feed cache")?;
        Ok(())
    }

    /// Mark the cache as just fetched without touching its content
    fn touch_cache(&self) {
        let touched = fs::File::options()
            .write(true)
            .open(&self.cache_path)
            .and_then(|file| file.set_modified(SystemTime::now()));
        if let Err(e) = touched {
            warn!(
                "Failed to update feed cache timestamp {}: {}",
                self.cache_path.display(),
                e
            );
        }
    }

    /// Re-read the local cache into descriptors.
    ///
    /// With no cache file the sequence is emptied. If the file cannot be
    /// read or parsed the previous sequence is kept.
    pub fn parse(&mut self) {
        if !self.cache_path.exists() {
            debug!("No feed cache at {}", self.cache_path.display());
            self.extensions.clear();
            return;
        }

        match self.read_descriptors() {
            Ok(extensions) => {
                debug!("Parsed {} extensions from feed cache", extensions.len());
                self.extensions = extensions;
            }
            Err(e) => warn!(
                "Failed to parse feed cache {}: {:#}",
                self.cache_path.display(),
                e
            ),
        }
    }

    fn read_descriptors(&self) -> anyhow::Result<Vec<ExtensionDescriptor>> {
        let content = fs::read_to_string(&self.cache_path).context("Failed to read feed cache")?;
        parse_feed(&content)
    }

    /// Fetch if changed, then parse
    pub async fn update(&mut self) -> Result<bool> {
        let changed = self.fetch_if_changed().await?;
        self.parse();
        Ok(changed)
    }

    /// Delete the local cache file; failures are logged
    pub fn reset(&self) {
        match fs::remove_file(&self.cache_path) {
            Ok(()) => info!("Feed cache {} reset", self.cache_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to delete feed cache {}: {}",
                self.cache_path.display(),
                e
            ),
        }
    }

    /// Whether the cache is missing or was last fetched longer than `max_age` ago
    pub fn is_stale(&self, max_age: Duration) -> bool {
        let modified = match fs::metadata(&self.cache_path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return true,
        };

        match SystemTime::now().duration_since(modified) {
            Ok(age) => age >= max_age,
            // Modified in the future (clock skew): treat as fresh
            Err(_) => false,
        }
    }
}

/// Parse manifest text into descriptors
pub fn parse_feed(content: &str) -> anyhow::Result<Vec<ExtensionDescriptor>> {
    let document: FeedDocument =
        serde_json::from_str(content).context("Feed is not a JSON object")?;

    let default_min = ProductVersion::parse(DEFAULT_MIN_VERSION)?;
    let default_max = ProductVersion::parse(DEFAULT_MAX_VERSION)?;

    let mut seen = HashSet::new();
    let mut extensions = Vec::with_capacity(document.len());

    for (name, value) in document {
        let entry: FeedEntry = serde_json::from_value(value)
            .with_context(|| format!("Invalid feed entry '{}'", name))?;

        let min_version = match entry.min_version.as_deref() {
            Some(v) => ProductVersion::parse(v)
                .map_err(|e| anyhow!("Invalid minVersion for '{}': {}", name, e))?,
            None => default_min.clone(),
        };
        let max_version = match entry.max_version.as_deref() {
            Some(v) => ProductVersion::parse(v)
                .map_err(|e| anyhow!("Invalid maxVersion for '{}': {}", name, e))?,
            None => default_max.clone(),
        };

        if !seen.insert(entry.id.clone()) {
            warn!(
                "Duplicate extension id {} ('{}') in feed, skipping",
                entry.id, name
            );
            continue;
        }

        let descriptor = ExtensionDescriptor::new(entry.id, name, min_version, max_version);
        if descriptor.has_inverted_range() {
            warn!(
                "Extension {} has minVersion {} above maxVersion {}; it will never be eligible",
                descriptor.id, descriptor.min_version, descriptor.max_version
            );
        }
        extensions.push(descriptor);
    }

    Ok(extensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_feed_defaults_and_order() {
        let json = r#"{
            "Zeta": { "id": "z" },
            "Alpha": { "id": "a", "minVersion": "15.5", "maxVersion": "17.0" }
        }"#;

        let extensions = parse_feed(json).unwrap();
        assert_eq!(extensions.len(), 2);
        assert_eq!(extensions[0].name, "Zeta");
        assert_eq!(
            extensions[0].min_version,
            ProductVersion::parse("15.0").unwrap()
        );
        assert_eq!(
            extensions[0].max_version,
            ProductVersion::parse("16.0").unwrap()
        );
        assert_eq!(extensions[1].id, "a");
        assert_eq!(
            extensions[1].min_version,
            ProductVersion::parse("15.5").unwrap()
        );
    }

    #[test]
    fn test_parse_feed_duplicate_id_first_wins() {
        let json = r#"{ "One": { "id": "x" }, "Two": { "id": "x" } }"#;
        let extensions = parse_feed(json).unwrap();
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions[0].name, "One");
    }

    #[test]
    fn test_parse_feed_keeps_inverted_range() {
        let json = r#"{ "Odd": { "id": "o", "minVersion": "17.0", "maxVersion": "15.0" } }"#;
        let extensions = parse_feed(json).unwrap();
        assert!(extensions[0].has_inverted_range());
    }

    #[test]
    fn test_parse_feed_rejects_bad_version() {
        let json = r#"{ "Bad": { "id": "b", "minVersion": "fifteen" } }"#;
        assert!(parse_feed(json).is_err());
    }

    #[test]
    fn test_parse_feed_rejects_non_object() {
        assert!(parse_feed("[1, 2]").is_err());
        assert!(parse_feed(r#"{ "NoId": { "minVersion": "15.0" } }"#).is_err());
    }

    #[test]
    fn test_parse_without_cache_is_empty() {
        let temp = TempDir::new().unwrap();
        let mut feed =
            FeedCache::new("file:///nowhere.json", temp.path().join("feed.json")).unwrap();
        feed.parse();
        assert!(feed.extensions().is_empty());
    }

    #[test]
    fn test_parse_keeps_previous_on_corrupt_cache() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("feed.json");
        fs::write(&path, r#"{ "A": { "id": "a" } }"#).unwrap();

        let mut feed = FeedCache::new("file:///nowhere.json", &path).unwrap();
        feed.parse();
        assert_eq!(feed.extensions().len(), 1);

        fs::write(&path, "{ not json").unwrap();
        feed.parse();
        assert_eq!(feed.extensions().len(), 1);
    }

    #[test]
    fn test_is_stale() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("feed.json");
        let feed = FeedCache::new("file:///nowhere.json", &path).unwrap();

        assert!(feed.is_stale(Duration::from_secs(3600)));

        fs::write(&path, "{}").unwrap();
        assert!(!feed.is_stale(Duration::from_secs(3600)));
        assert!(feed.is_stale(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_fetch_from_missing_file_is_no_change() {
        let temp = TempDir::new().unwrap();
        let feed = FeedCache::new(
            temp.path().join("absent.json").to_str().unwrap(),
            temp.path().join("feed.json"),
        )
        .unwrap();

        assert!(!feed.fetch_if_changed().await.unwrap());
        assert!(!feed.cache_path().exists());
    }
}

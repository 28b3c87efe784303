//! Remote content retrieval over HTTP(S) or from `file://` locations

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Request timeout for feed and gallery traffic
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by the feed cache and the gallery
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("extsync/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Where a location string points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Http(Url),
    File(PathBuf),
}

impl Location {
    /// Classify a URL or bare filesystem path
    pub fn parse(location: &str) -> Result<Self> {
        match Url::parse(location) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Location::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(Location::File)
                    .map_err(|_| anyhow!("Invalid file URL: {}", location)),
                other => Err(anyhow!(
                    "Unsupported URL scheme '{}' in {}",
                    other,
                    location
                )),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Location::File(PathBuf::from(location)))
            }
            Err(e) => Err(anyhow!("Invalid URL {}: {}", location, e)),
        }
    }
}

/// Fetch the raw bytes at `location`
pub async fn fetch_bytes(client: &reqwest::Client, location: &str) -> Result<Vec<u8>> {
    match Location::parse(location)? {
        Location::Http(url) => {
            debug!("Fetching {}", url);
            let response = client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("Failed to fetch {}", url))?;

            if !response.status().is_success() {
                return Err(anyhow!(
                    "Failed to fetch {}: HTTP {}",
                    url,
                    response.status()
                ));
            }

            let bytes = response
                .bytes()
                .await
                .with_context(|| format!("Failed to read response body from {}", url))?;
            Ok(bytes.to_vec())
        }
        Location::File(path) => {
            debug!("Reading {}", path.display());
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))
        }
    }
}

/// Fetch `location` as UTF-8 text
pub async fn fetch_text(client: &reqwest::Client, location: &str) -> Result<String> {
    let bytes = fetch_bytes(client, location).await?;
    String::from_utf8(bytes).with_context(|| format!("Content at {} is not UTF-8", location))
}

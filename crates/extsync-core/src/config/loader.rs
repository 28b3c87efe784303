//! Settings file loading and path resolution

use crate::error::{Error, Result};
use crate::types::ProductVersion;
use crate::utils::get_home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::messages::Messages;

/// Settings file names to search for in the working directory and its parents
const CONFIG_FILE_NAMES: &[&str] = &["extsync.yaml", "extsync.yml"];

/// Per-user settings file, relative to the home directory
const USER_CONFIG_PATH: &str = ".extsync/config.yaml";

/// Directory under the home directory holding per-bundle state
const STATE_DIR: &str = ".extsync";

/// Default bundle name
const DEFAULT_NAME: &str = "Bundler";

/// Seconds in one update interval day
const SECS_PER_DAY: f64 = 86_400.0;

/// Default gallery locale (en-US LCID)
const DEFAULT_GALLERY_LOCALE: u32 = 1033;

/// Registry value name the disable-list is written under
const DEFAULT_DISABLE_VALUE_NAME: &str = "disable";

/// Bundle settings: where the feed lives, where state is kept, what to show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    /// Bundle name; used as the state directory and UI title
    pub name: String,

    /// Remote manifest URL (http, https or file)
    pub feed_url: String,

    /// Local feed cache file; defaults to `<state>/feed.json`
    pub feed_cache_path: Option<PathBuf>,

    /// Ledger file; defaults to `<state>/installer.log`
    pub ledger_path: Option<PathBuf>,

    /// Minimum age of the feed cache before it is fetched again
    pub update_interval_days: f64,

    /// Config-store sub key the disable-list is published under; defaults to `name`
    pub registry_sub_key: Option<String>,

    /// Value name of the disable-list inside the sub key
    pub disable_value_name: String,

    /// Locale passed to gallery lookups
    pub gallery_locale: u32,

    /// Display strings
    pub messages: Messages,

    /// Settings for the bundled host adapters
    pub host: HostSettings,
}

/// Settings consumed by the filesystem/HTTP host adapters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct HostSettings {
    /// Host version used for eligibility checks
    pub version: Option<ProductVersion>,

    /// Directory extensions are installed into; defaults to `<state>/extensions`
    pub extensions_dir: Option<PathBuf>,

    /// Gallery index URL
    pub gallery_url: Option<String>,

    /// Package download directory; defaults to `<state>/downloads`
    pub download_dir: Option<PathBuf>,

    /// Config store file; defaults to `<state>/config-store.json`
    pub config_store_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            feed_url: String::new(),
            feed_cache_path: None,
            ledger_path: None,
            update_interval_days: 1.0,
            registry_sub_key: None,
            disable_value_name: DEFAULT_DISABLE_VALUE_NAME.to_string(),
            gallery_locale: DEFAULT_GALLERY_LOCALE,
            messages: Messages::default(),
            host: HostSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the given path, or search for a settings file.
    ///
    /// Search order: `extsync.yaml`/`extsync.yml` in the current directory
    /// and its parents, then `~/.extsync/config.yaml`. Defaults are used
    /// when nothing is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let found = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::config_not_found(p.display().to_string())
                    } else {
                        Error::Io(e)
                    }
                })?;
                Some((p.to_path_buf(), content))
            }
            None => Self::find_config()?,
        };

        match found {
            Some((config_path, content)) => {
                debug!("Loading settings from {}", config_path.display());
                Self::from_yaml(&content)
            }
            None => {
                debug!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml_ng::from_str(content)?;
        Ok(settings)
    }

    /// Check the fields a reconciliation run cannot do without
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_config("name must not be empty"));
        }
        if self.feed_url.trim().is_empty() {
            return Err(Error::invalid_config("feed_url must not be empty"));
        }
        if !self.update_interval_days.is_finite() || self.update_interval_days < 0.0 {
            return Err(Error::invalid_config(format!(
                "update_interval_days must be a non-negative number, got {}",
                self.update_interval_days
            )));
        }
        Ok(())
    }

    /// Per-bundle state directory (`~/.extsync/<name>`)
    pub fn state_dir(&self) -> Result<PathBuf> {
        let home = get_home_dir().map_err(|e| Error::invalid_config(e.to_string()))?;
        Ok(home.join(STATE_DIR).join(&self.name))
    }

    /// Resolved feed cache path
    pub fn feed_cache_path(&self) -> Result<PathBuf> {
        self.resolve(self.feed_cache_path.as_deref(), "feed.json")
    }

    /// Resolved ledger path
    pub fn ledger_path(&self) -> Result<PathBuf> {
        self.resolve(self.ledger_path.as_deref(), "installer.log")
    }

    /// Resolved extensions directory for the directory host
    pub fn extensions_dir(&self) -> Result<PathBuf> {
        self.resolve(self.host.extensions_dir.as_deref(), "extensions")
    }

    /// Resolved download directory for the HTTP gallery
    pub fn download_dir(&self) -> Result<PathBuf> {
        self.resolve(self.host.download_dir.as_deref(), "downloads")
    }

    /// Resolved config store file
    pub fn config_store_path(&self) -> Result<PathBuf> {
        self.resolve(self.host.config_store_path.as_deref(), "config-store.json")
    }

    /// Sub key the disable-list is published under
    pub fn registry_sub_key(&self) -> &str {
        self.registry_sub_key.as_deref().unwrap_or(&self.name)
    }

    /// Throttle interval as a duration; saturates at `Duration::MAX`
    pub fn update_interval(&self) -> Duration {
        let secs = self.update_interval_days.max(0.0) * SECS_PER_DAY;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    fn resolve(&self, explicit: Option<&Path>, file_name: &str) -> Result<PathBuf> {
        match explicit {
            Some(p) => Ok(p.to_path_buf()),
            None => Ok(self.state_dir()?.join(file_name)),
        }
    }

    /// Search the working directory upwards, then the user settings file
    fn find_config() -> Result<Option<(PathBuf, String)>> {
        let cwd = std::env::current_dir().map_err(Error::Io)?;
        let mut current = Some(cwd.as_path());

        while let Some(dir) = current {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    return Ok(Some((path, content)));
                }
            }
            current = dir.parent();
        }

        if let Ok(home) = get_home_dir() {
            let user_path = home.join(USER_CONFIG_PATH);
            if user_path.exists() {
                let content = fs::read_to_string(&user_path)?;
                return Ok(Some((user_path, content)));
            }
        }

        Ok(None)
    }
}

//! Extension type definitions matching the published feed

use serde::{Deserialize, Serialize};
use std::fmt;

use super::version_types::ProductVersion;

/// An extension the feed says should exist, with its host-version window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescriptor {
    /// Stable unique identifier
    pub id: String,

    /// Display name (the feed object key)
    pub name: String,

    /// Lowest host version the extension supports (inclusive)
    pub min_version: ProductVersion,

    /// Highest host version the extension supports (inclusive)
    pub max_version: ProductVersion,
}

impl ExtensionDescriptor {
    /// Create a new descriptor
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        min_version: ProductVersion,
        max_version: ProductVersion,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            min_version,
            max_version,
        }
    }

    /// Whether the extension may stay installed on the given host version
    pub fn supports(&self, host_version: &ProductVersion) -> bool {
        host_version.is_within(&self.min_version, &self.max_version)
    }

    /// Whether the bounds are inverted (min above max)
    pub fn has_inverted_range(&self) -> bool {
        self.min_version > self.max_version
    }
}

/// Why the host needs a restart after an install, if at all
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum RestartReason {
    /// Change takes effect without a restart
    #[default]
    None,

    /// Host-specific reason a restart is required
    Required(String),
}

impl RestartReason {
    /// Whether this outcome requires a restart
    pub fn requires_restart(&self) -> bool {
        !matches!(self, RestartReason::None)
    }
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartReason::None => write!(f, "none"),
            RestartReason::Required(reason) => write!(f, "restart required: {}", reason),
        }
    }
}

//! Host and extension version numbers
//!
//! Hosts publish versions with anywhere from one to four numeric components
//! ("15", "15.0", "16.0.28315.86"). The first three map onto a semver
//! triple; a fourth component is kept as a revision that takes part in
//! ordering. Missing components compare as zero, so "15.0" == "15.0.0".

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Default lower eligibility bound when a feed entry omits `minVersion`
pub const DEFAULT_MIN_VERSION: &str = "15.0";

/// Default upper eligibility bound when a feed entry omits `maxVersion`
pub const DEFAULT_MAX_VERSION: &str = "16.0";

/// A dotted numeric version with 1-4 components
#[derive(Debug, Clone)]
pub struct ProductVersion {
    version: semver::Version,
    revision: Option<u64>,
    components: usize,
}

impl ProductVersion {
    /// Create a three-component version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            version: semver::Version::new(major, minor, patch),
            revision: None,
            components: 3,
        }
    }

    /// Parse a version string, returning an error for anything non-numeric
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// The semver triple (revision dropped)
    pub fn as_semver(&self) -> &semver::Version {
        &self.version
    }

    /// Fourth component, if one was given
    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Whether `self` lies within the inclusive range `[min, max]`
    pub fn is_within(&self, min: &ProductVersion, max: &ProductVersion) -> bool {
        self >= min && self <= max
    }

    fn sort_key(&self) -> (&semver::Version, u64) {
        (&self.version, self.revision.unwrap_or(0))
    }
}

impl FromStr for ProductVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();

        if trimmed.is_empty() || parts.len() > 4 {
            return Err(Error::invalid_version(s));
        }

        let mut numbers = Vec::with_capacity(parts.len());
        for part in &parts {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_version(s));
            }
            let n: u64 = part.parse().map_err(|_| Error::invalid_version(s))?;
            numbers.push(n);
        }

        let component = |i: usize| numbers.get(i).copied().unwrap_or(0);

        Ok(Self {
            version: semver::Version::new(component(0), component(1), component(2)),
            revision: numbers.get(3).copied(),
            components: numbers.len(),
        })
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all = [
            self.version.major,
            self.version.minor,
            self.version.patch,
            self.revision.unwrap_or(0),
        ];
        let shown: Vec<String> = all[..self.components.clamp(1, 4)]
            .iter()
            .map(|n| n.to_string())
            .collect();
        write!(f, "{}", shown.join("."))
    }
}

impl PartialEq for ProductVersion {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for ProductVersion {}

impl PartialOrd for ProductVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProductVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl From<semver::Version> for ProductVersion {
    fn from(version: semver::Version) -> Self {
        Self {
            version,
            revision: None,
            components: 3,
        }
    }
}

impl Serialize for ProductVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProductVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

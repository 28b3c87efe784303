//! Installation ledger record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::extension_types::ExtensionDescriptor;

/// What the reconciler did to an extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerAction {
    Installed,
    Uninstalled,
}

impl fmt::Display for LedgerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerAction::Installed => write!(f, "Installed"),
            LedgerAction::Uninstalled => write!(f, "Uninstalled"),
        }
    }
}

/// One historical install/uninstall record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Extension id at action time
    pub id: String,

    /// Extension display name at action time
    pub name: String,

    /// Action taken
    pub action: LedgerAction,

    /// When the action was recorded (UTC)
    pub date: DateTime<Utc>,
}

impl LedgerEntry {
    /// Record an action for a descriptor, stamped with the current time
    pub fn new(extension: &ExtensionDescriptor, action: LedgerAction) -> Self {
        Self::at(extension, action, Utc::now())
    }

    /// Record an action with an explicit timestamp
    pub fn at(extension: &ExtensionDescriptor, action: LedgerAction, date: DateTime<Utc>) -> Self {
        Self {
            id: extension.id.clone(),
            name: extension.name.clone(),
            action,
            date,
        }
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.action,
            self.name
        )
    }
}

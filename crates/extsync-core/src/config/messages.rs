//! User-facing status strings shown in progress and output panes

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the extension name in templated messages
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Every display string the reconciler emits, one named field each
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Messages {
    pub installed: String,
    pub uninstalled: String,
    pub installation_complete: String,
    /// Template; `{name}` is replaced with the extension name
    pub uninstalling_extension: String,
    pub ok: String,
    pub failed: String,
    pub installing_extension: String,
    pub verifying: String,
    pub downloading: String,
    pub installing: String,
    pub nothing_to_do: String,
}

impl Messages {
    /// Progress text for an uninstall
    pub fn uninstalling(&self, name: &str) -> String {
        if self.uninstalling_extension.contains(NAME_PLACEHOLDER) {
            self.uninstalling_extension.replace(NAME_PLACEHOLDER, name)
        } else {
            format!("{} {}", self.uninstalling_extension, name)
        }
    }

    /// Progress text for an install
    pub fn installing_named(&self, name: &str) -> String {
        format!("{} ({})", self.installing_extension, name)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            installed: "Installed".to_string(),
            uninstalled: "Uninstalled".to_string(),
            installation_complete: "Installation complete".to_string(),
            uninstalling_extension: "Uninstalling {name}... ".to_string(),
            ok: "OK".to_string(),
            failed: "Failed".to_string(),
            installing_extension: "Installing extension".to_string(),
            verifying: "Verifying... ".to_string(),
            downloading: "Downloading... ".to_string(),
            installing: "Installing... ".to_string(),
            nothing_to_do: "nothing to do".to_string(),
        }
    }
}

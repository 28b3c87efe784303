//! Test constants for extsync-extensions tests

#![allow(dead_code)]

/// Host version inside the default 15.0..=16.0 window
pub const HOST_IN_RANGE: &str = "15.5";

/// Host version below the default window
pub const HOST_TOO_OLD: &str = "14.9";

/// Host version above the default window
pub const HOST_TOO_NEW: &str = "16.1";

/// Sub key the disable-list is published under
pub const TEST_SUB_KEY: &str = "Bundler";

/// Value name of the disable-list
pub const TEST_DISABLE_VALUE: &str = "disable";

/// Locale passed to gallery lookups
pub const TEST_LOCALE: u32 = 1033;

/// Feed with three in-window extensions
pub const THREE_EXTENSION_FEED: &str = r#"{
  "Alpha Tools": { "id": "alpha" },
  "Beta Tools": { "id": "beta" },
  "Gamma Tools": { "id": "gamma" }
}"#;

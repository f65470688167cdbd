//! Global constants for appdex
//!
//! Centralized location for application-wide constants

/// Application subsystem identifier for macOS Unified Logging System
pub const APP_SUBSYSTEM: &str = "io.appdex.browser";

/// Directory under the source root holding the collected snapshot
pub const DATA_DIR: &str = "data";

/// Top-level index listing every collected application
pub const INDEX_FILE: &str = "index.json";

/// Per-application resource file names
pub const MANIFEST_FILE: &str = "manifest.json";
pub const ENTITLEMENTS_FILE: &str = "entitlements.plist";
pub const INFO_PLIST_FILE: &str = "info.plist";
pub const SANDBOX_FILE: &str = "sandbox.txt";
pub const SDEF_INDEX_FILE: &str = "sdef_index.json";
pub const SDEF_DIR: &str = "sdef";

/// Substituted for a detail resource that could not be fetched
pub const NOT_AVAILABLE: &str = "Not available";

/// Substituted for every detail text field when resolution fails outright
pub const ERROR_LOADING_ENTITLEMENTS: &str = "Error loading entitlements";
pub const ERROR_LOADING_INFO_PLIST: &str = "Error loading Info.plist";
pub const ERROR_LOADING_SANDBOX: &str = "Error loading sandbox info";

/// Maximum match score (0.0 = perfect) for an entry to be included in search results
pub const SEARCH_THRESHOLD: f64 = 0.3;

/// Characters of match offset that cost one full point of score
pub const SEARCH_LOCATION_DISTANCE: f64 = 100.0;

/// Default config file name under the user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

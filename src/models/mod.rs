//! Data models module
//!
//! Defines core data structures:
//! - AppIndex: root listing of collected application identifiers
//! - Manifest: per-application metadata (code signing, sandbox summary, SDEF count)
//! - Catalog: ordered set of successfully loaded manifests
//! - CatalogStats: aggregate counts derived from a catalog
//! - SdefIndex / SdefFile: scripting-dictionary listing and contents
//! - DetailBundle: on-demand auxiliary resources for one application
//!
//! Manifests are semi-structured: every field is optional and a field of the
//! wrong JSON type is read as absent rather than failing the whole manifest.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::constants::{
    ERROR_LOADING_ENTITLEMENTS, ERROR_LOADING_INFO_PLIST, ERROR_LOADING_SANDBOX,
};


/// Root index of the collected snapshot (`data/index.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppIndex {
    /// Application identifiers, in display order
    pub apps: Vec<String>,
    /// Collection timestamp as written by the collector
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_apps: Option<u64>,
}

/// Code signing summary captured by the collector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodesignInfo {
    /// Bundle identifier as reported by codesign
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub team_identifier: Option<String>,
    /// Free-form status, e.g. "Valid" or "Invalid or Unsigned"
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub signature_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
}

/// Sandbox analysis summary captured by the collector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SandboxSummary {
    /// "Yes", "No" or "Unknown"
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub sandboxed: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub sandbox_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub hardened_runtime: Option<String>,
    /// Collector writes this as a string; numbers are accepted too
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub entitlements_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub library_validation: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub analysis_notes: Vec<String>,
}

/// Tri-state sandbox classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxStatus {
    Yes,
    No,
    Unknown,
}

impl fmt::Display for SandboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxStatus::Yes => write!(f, "Yes"),
            SandboxStatus::No => write!(f, "No"),
            SandboxStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Metadata record for one collected application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Catalog key: the identifier the manifest was fetched under.
    /// Never read from the payload; attached by [`Manifest::with_id`].
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filesystem path of the bundle on the collecting machine
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_icon: bool,
    /// Icon location relative to the application's data directory
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub codesign: Option<CodesignInfo>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxSummary>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub sdef_count: Option<u64>,
    /// Fields this crate does not interpret, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Attach the catalog key, replacing any `id` carried in the payload
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.extra.remove("id");
        self.id = id.into();
        self
    }

    /// Name to show for this entry, falling back to its identifier
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn bundle_identifier(&self) -> Option<&str> {
        self.codesign.as_ref().and_then(|c| c.identifier.as_deref())
    }

    pub fn team_identifier(&self) -> Option<&str> {
        self.codesign.as_ref().and_then(|c| c.team_identifier.as_deref())
    }

    pub fn hardened_runtime(&self) -> Option<&str> {
        self.sandbox.as_ref().and_then(|s| s.hardened_runtime.as_deref())
    }

    pub fn entitlements_count(&self) -> u64 {
        self.sandbox
            .as_ref()
            .and_then(|s| s.entitlements_count)
            .unwrap_or(0)
    }

    pub fn sandbox_status(&self) -> SandboxStatus {
        match self.sandbox.as_ref().and_then(|s| s.sandboxed.as_deref()) {
            Some("Yes") => SandboxStatus::Yes,
            Some("No") => SandboxStatus::No,
            _ => SandboxStatus::Unknown,
        }
    }

    pub fn is_sandboxed(&self) -> bool {
        self.sandbox_status() == SandboxStatus::Yes
    }

    /// Signed when the recorded signature status mentions "Valid" (case-sensitive,
    /// so "Invalid or Unsigned" does not count)
    pub fn is_signed(&self) -> bool {
        self.codesign
            .as_ref()
            .and_then(|c| c.signature_status.as_deref())
            .is_some_and(|status| status.contains("Valid"))
    }

    pub fn has_sdef(&self) -> bool {
        self.sdef_count.unwrap_or(0) > 0
    }

    /// Icon path, only when the manifest declares an icon
    pub fn icon(&self) -> Option<&str> {
        if self.has_icon {
            self.icon_path.as_deref().filter(|p| !p.is_empty())
        } else {
            None
        }
    }
}

/// Ordered collection of successfully loaded manifests for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub apps: Vec<Manifest>,
    /// Collection timestamp copied from the index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
}

impl Catalog {
    pub fn new(apps: Vec<Manifest>, generated: Option<String>) -> Self {
        Self { apps, generated }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Manifest> {
        self.apps.iter()
    }

    /// Look up an entry by catalog key
    pub fn get(&self, id: &str) -> Option<&Manifest> {
        self.apps.iter().find(|app| app.id == id)
    }
}

/// Aggregate counts over a catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: usize,
    pub sandboxed: usize,
    pub signed: usize,
    pub with_sdef: usize,
}

/// Per-application scripting-dictionary listing (`sdef_index.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdefIndex {
    pub files: Vec<String>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// One fetched scripting-dictionary file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdefFile {
    pub name: String,
    pub content: String,
}

/// Fully populated detail view for one application.
///
/// Text fields always hold either fetched content or a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailBundle {
    pub app: Manifest,
    pub entitlements: String,
    pub info_plist: String,
    pub sandbox_report: String,
    pub sdef_files: Vec<SdefFile>,
}

impl DetailBundle {
    /// Bundle used when resolution fails before any resource could be read
    pub fn unavailable(app: Manifest) -> Self {
        Self {
            app,
            entitlements: ERROR_LOADING_ENTITLEMENTS.to_string(),
            info_plist: ERROR_LOADING_INFO_PLIST.to_string(),
            sandbox_report: ERROR_LOADING_SANDBOX.to_string(),
            sdef_files: Vec::new(),
        }
    }

    /// Sorted top-level entitlement keys, empty when the text is not a plist
    pub fn entitlement_keys(&self) -> Vec<String> {
        let document = skip_xml_preamble(&self.entitlements);
        let value: plist::Value = match plist::from_bytes(document.as_bytes()) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("Entitlements for {} are not a plist: {}", self.app.id, err);
                return Vec::new();
            }
        };

        let mut keys: Vec<String> = match value.into_dictionary() {
            Some(dict) => dict.keys().cloned().collect(),
            None => Vec::new(),
        };
        keys.sort();
        keys
    }
}

/// The collector prefixes entitlement dumps with XML comments ahead of the
/// XML declaration, which plist parsers reject
fn skip_xml_preamble(text: &str) -> &str {
    ["<?xml", "<!DOCTYPE", "<plist"]
        .iter()
        .filter_map(|marker| text.find(marker))
        .min()
        .map_or(text, |start| &text[start..])
}

/// Deserializers that read mistyped fields as absent
pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Non-negative count given as a number or a numeric string
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            Value::Array(_) | Value::Object(_) => true,
        })
    }

    pub fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => T::deserialize(value).ok(),
            _ => None,
        })
    }
}

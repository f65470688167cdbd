#![allow(dead_code)]

use appdex::fetch::{FetchError, ResourceFetcher};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Canned outcome for one locator
#[derive(Debug, Clone)]
pub enum Scripted {
    Body(Vec<u8>),
    NotFound,
    Status(u16),
    /// No response at all (connection refused)
    Unreachable,
}

#[derive(Debug, Clone)]
struct Entry {
    outcome: Scripted,
    delay: Option<Duration>,
}

/// In-memory fetcher answering from a script. Unscripted locators are
/// reported as not found; every request is recorded.
#[derive(Debug, Default)]
pub struct MockFetcher {
    script: Mutex<HashMap<String, Entry>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, locator: &str, outcome: Scripted) -> &Self {
        self.script.lock().unwrap().insert(
            locator.to_string(),
            Entry { outcome, delay: None },
        );
        self
    }

    pub fn json(&self, locator: &str, value: &Value) -> &Self {
        self.respond(locator, Scripted::Body(value.to_string().into_bytes()))
    }

    pub fn text(&self, locator: &str, text: &str) -> &Self {
        self.respond(locator, Scripted::Body(text.as_bytes().to_vec()))
    }

    /// Hold the response for `locator` back by `delay`
    pub fn delay(&self, locator: &str, delay: Duration) -> &Self {
        if let Some(entry) = self.script.lock().unwrap().get_mut(locator) {
            entry.delay = Some(delay);
        }
        self
    }

    pub fn index(&self, ids: &[&str]) -> &Self {
        self.json("data/index.json", &json!({ "apps": ids, "total_apps": ids.len() }))
    }

    pub fn manifest(&self, id: &str, value: &Value) -> &Self {
        self.json(&format!("data/{}/manifest.json", id), value)
    }

    /// A minimal manifest named after its identifier
    pub fn app(&self, id: &str) -> &Self {
        self.manifest(id, &json!({ "name": id, "path": format!("/Applications/{}.app", id) }))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, locator: &str) -> bool {
        self.requests.lock().unwrap().iter().any(|r| r == locator)
    }
}

#[async_trait]
impl ResourceFetcher for MockFetcher {
    async fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(locator.to_string());
        let entry = self.script.lock().unwrap().get(locator).cloned();
        let Some(entry) = entry else {
            return Err(FetchError::NotFound { locator: locator.to_string() });
        };

        if let Some(delay) = entry.delay {
            tokio::time::sleep(delay).await;
        }

        match entry.outcome {
            Scripted::Body(bytes) => Ok(bytes),
            Scripted::NotFound => Err(FetchError::NotFound { locator: locator.to_string() }),
            Scripted::Status(status) => Err(FetchError::Status { locator: locator.to_string(), status }),
            Scripted::Unreachable => Err(FetchError::Io {
                locator: locator.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            }),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

pub const SAFARI_ENTITLEMENTS: &str = r#"<!-- Entitlements for Safari.app -->
<!-- Extracted with codesign -d --entitlements -->
<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>com.apple.security.app-sandbox</key>
    <true/>
    <key>com.apple.security.network.client</key>
    <true/>
    <key>com.apple.developer.web-browser</key>
    <true/>
</dict>
</plist>
"#;

pub const ICON_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

/// On-disk snapshot in the static-hosting layout
pub struct TestDataset {
    pub temp_dir: TempDir,
}

impl TestDataset {
    pub fn empty() -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        fs::create_dir_all(temp_dir.path().join("data"))?;
        Ok(Self { temp_dir })
    }

    /// Safari, Xcode and Notes load; Broken has a malformed manifest.
    ///
    /// Stats: 3 total, 2 sandboxed, 3 signed, 2 with SDEF.
    pub fn sample() -> anyhow::Result<Self> {
        let dataset = Self::empty()?;
        dataset.write_index(&["Safari", "Xcode", "Notes", "Broken"])?;

        dataset.write_manifest(
            "Safari",
            &json!({
                "name": "Safari",
                "path": "/Applications/Safari.app",
                "has_icon": true,
                "icon_path": "icon.png",
                "codesign": {
                    "identifier": "com.apple.Safari",
                    "team_identifier": "",
                    "signature_status": "Valid on disk",
                    "authority": "Software Signing"
                },
                "sandbox": {
                    "sandboxed": "Yes",
                    "hardened_runtime": "Yes",
                    "entitlements_count": 3
                },
                "sdef_count": 1,
                "bundle_version": "18.0"
            }),
        )?;
        dataset.write_file("Safari", "entitlements.plist", SAFARI_ENTITLEMENTS.as_bytes())?;
        dataset.write_file("Safari", "info.plist", b"CFBundleIdentifier = com.apple.Safari")?;
        dataset.write_file("Safari", "sandbox.txt", b"Sandboxed: Yes")?;
        dataset.write_file("Safari", "sdef_index.json", br#"{"files": ["Safari.sdef"], "count": 1}"#)?;
        dataset.write_file("Safari", "sdef/Safari.sdef", b"<dictionary title=\"Safari Terminology\"/>")?;
        dataset.write_file("Safari", "icon.png", ICON_BYTES)?;

        dataset.write_manifest(
            "Xcode",
            &json!({
                "name": "Xcode",
                "path": "/Applications/Xcode.app",
                "codesign": {
                    "identifier": "com.apple.dt.Xcode",
                    "team_identifier": "59GAB85EFG",
                    "signature_status": "Valid on disk"
                },
                "sandbox": { "sandboxed": "No", "hardened_runtime": "Yes", "entitlements_count": "12" },
                "sdef_count": 0
            }),
        )?;
        dataset.write_file("Xcode", "entitlements.plist", b"<plist version=\"1.0\"><dict/></plist>")?;

        dataset.write_manifest(
            "Notes",
            &json!({
                "name": "Notes",
                "path": "/System/Applications/Notes.app",
                "codesign": { "identifier": "com.apple.Notes", "signature_status": "Valid on disk" },
                "sandbox": { "sandboxed": "Yes" },
                "sdef_count": "2"
            }),
        )?;
        dataset.write_file("Notes", "entitlements.plist", b"Not a plist")?;
        dataset.write_file("Notes", "info.plist", b"CFBundleIdentifier = com.apple.Notes")?;
        dataset.write_file("Notes", "sandbox.txt", b"Sandboxed: Yes")?;
        dataset.write_file(
            "Notes",
            "sdef_index.json",
            br#"{"files": ["Notes.sdef", "Missing.sdef", "Extra.sdef"], "count": 3}"#,
        )?;
        dataset.write_file("Notes", "sdef/Notes.sdef", b"<dictionary title=\"Notes\"/>")?;
        dataset.write_file("Notes", "sdef/Extra.sdef", b"<dictionary title=\"Extra\"/>")?;

        dataset.write_file("Broken", "manifest.json", b"this is not json")?;

        Ok(dataset)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_index(&self, ids: &[&str]) -> anyhow::Result<()> {
        let index = json!({
            "generated": "2025-01-15T10:00:00",
            "total_apps": ids.len(),
            "apps": ids,
        });
        fs::write(self.path().join("data/index.json"), index.to_string())?;
        Ok(())
    }

    pub fn write_manifest(&self, id: &str, manifest: &Value) -> anyhow::Result<()> {
        self.write_file(id, "manifest.json", manifest.to_string().as_bytes())
    }

    pub fn write_file(&self, id: &str, relative: &str, content: &[u8]) -> anyhow::Result<()> {
        let path = self.path().join("data").join(id).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// A config file that pins logging so the user's own config is never read
    pub fn write_config(&self) -> anyhow::Result<PathBuf> {
        let path = self.path().join("config.toml");
        fs::write(&path, "[logging]\nlevel = \"warn\"\nbackend = \"stderr\"\n")?;
        Ok(path)
    }
}

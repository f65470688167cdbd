//! Output formatting module
//!
//! Handles:
//! - Human-readable catalog statistics, result cards and detail sections
//! - JSON payloads for every command
//! - The blocking load-failure message

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::catalog::LoadError;
use crate::models::{CatalogStats, DetailBundle, Manifest, SandboxStatus};

pub mod progress;

pub use progress::LoadingIndicator;

/// Which part of a detail bundle to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSection {
    Info,
    Entitlements,
    Sandbox,
    Sdef,
}

impl DetailSection {
    pub const NAMES: [&'static str; 4] = ["info", "entitlements", "sandbox", "sdef"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "info" => Some(DetailSection::Info),
            "entitlements" => Some(DetailSection::Entitlements),
            "sandbox" => Some(DetailSection::Sandbox),
            "sdef" => Some(DetailSection::Sdef),
            _ => None,
        }
    }

    fn title(self) -> &'static str {
        match self {
            DetailSection::Info => "Info.plist",
            DetailSection::Entitlements => "Entitlements",
            DetailSection::Sandbox => "Sandbox",
            DetailSection::Sdef => "SDEF Files",
        }
    }
}

/// JSON shape of a search
#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    pub query: &'a str,
    pub total: usize,
    pub results: Vec<&'a Manifest>,
}

/// JSON shape of a detail bundle
#[derive(Debug, Serialize)]
pub struct DetailOutput<'a> {
    #[serde(flatten)]
    pub bundle: &'a DetailBundle,
    pub entitlement_keys: Vec<String>,
}

impl<'a> DetailOutput<'a> {
    pub fn new(bundle: &'a DetailBundle) -> Self {
        Self {
            bundle,
            entitlement_keys: bundle.entitlement_keys(),
        }
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "Unknown",
    }
}

pub fn format_stats(stats: &CatalogStats) -> String {
    format!(
        "Total Apps:  {}\nSandboxed:   {}\nCode Signed: {}\nWith SDEF:   {}\n",
        stats.total, stats.sandboxed, stats.signed, stats.with_sdef
    )
}

fn badges(app: &Manifest) -> Vec<String> {
    let mut badges = Vec::new();
    match app.sandbox_status() {
        SandboxStatus::Yes => badges.push("Sandboxed".to_string()),
        SandboxStatus::No => badges.push("Not Sandboxed".to_string()),
        SandboxStatus::Unknown => {}
    }
    if app.is_signed() {
        badges.push("Signed".to_string());
    }
    if let Some(count) = app.sdef_count.filter(|count| *count > 0) {
        badges.push(format!("{} SDEF", count));
    }
    badges
}

/// One result card: name, path, badges and the key identity fields
pub fn format_card(app: &Manifest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", app.display_name());
    if let Some(path) = &app.path {
        let _ = writeln!(out, "  {}", path);
    }

    let badges = badges(app);
    if !badges.is_empty() {
        let _ = writeln!(out, "  [{}]", badges.join("] ["));
    }

    let _ = writeln!(out, "  Bundle ID:    {}", or_unknown(app.bundle_identifier()));
    let _ = writeln!(out, "  Team ID:      {}", or_unknown(app.team_identifier()));
    let _ = writeln!(out, "  Hardened:     {}", or_unknown(app.hardened_runtime()));
    let _ = writeln!(out, "  Entitlements: {}", app.entitlements_count());
    out
}

/// Cards for every result, or the no-match message
pub fn format_results(term: &str, results: &[&Manifest]) -> String {
    let term = term.trim();
    if results.is_empty() {
        return if term.is_empty() {
            "No applications found.\n".to_string()
        } else {
            format!("No applications found matching \"{}\"\n", term)
        };
    }

    let mut out = String::new();
    let noun = if results.len() == 1 { "application" } else { "applications" };
    if term.is_empty() {
        let _ = writeln!(out, "{} {}:\n", results.len(), noun);
    } else {
        let _ = writeln!(out, "Found {} {} matching \"{}\":\n", results.len(), noun, term);
    }

    for app in results {
        let _ = writeln!(out, "[{}] {}", app.id, format_card(app));
    }
    out
}

fn section_body(bundle: &DetailBundle, section: DetailSection) -> String {
    match section {
        DetailSection::Info => bundle.info_plist.clone(),
        DetailSection::Entitlements => {
            let keys = bundle.entitlement_keys();
            if keys.is_empty() {
                bundle.entitlements.clone()
            } else {
                let mut out = String::from("Keys:\n");
                for key in keys {
                    let _ = writeln!(out, "  {}", key);
                }
                let _ = write!(out, "\n{}", bundle.entitlements);
                out
            }
        }
        DetailSection::Sandbox => bundle.sandbox_report.clone(),
        DetailSection::Sdef => {
            let mut out = String::new();
            for file in &bundle.sdef_files {
                let _ = writeln!(out, "--- {} ---\n{}", file.name, file.content);
            }
            out
        }
    }
}

/// A detail bundle, either one section or all of them. The SDEF section is
/// left out of the full view when the bundle has no files.
pub fn format_detail(bundle: &DetailBundle, section: Option<DetailSection>) -> String {
    let sections: Vec<DetailSection> = match section {
        Some(section) => vec![section],
        None => {
            let mut all = vec![
                DetailSection::Info,
                DetailSection::Entitlements,
                DetailSection::Sandbox,
            ];
            if !bundle.sdef_files.is_empty() {
                all.push(DetailSection::Sdef);
            }
            all
        }
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", bundle.app.display_name());
    let _ = writeln!(out, "{}", "=".repeat(bundle.app.display_name().chars().count()));

    for section in sections {
        let body = section_body(bundle, section);
        let _ = writeln!(out, "\n== {} ==", section.title());
        let _ = write!(out, "{}", body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Message shown when the catalog could not be loaded at all
pub fn format_load_error(err: &LoadError) -> String {
    let cause = match err {
        LoadError::IndexUnavailable(source) => source.to_string(),
    };
    format!(
        "Failed to load application data: {}\nMake sure the data directory is properly populated and accessible.",
        cause
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::models::SdefFile;
    use serde_json::json;

    fn app(value: serde_json::Value, id: &str) -> Manifest {
        serde_json::from_value::<Manifest>(value).unwrap().with_id(id)
    }

    #[test]
    fn test_format_stats() {
        let stats = CatalogStats { total: 10, sandboxed: 4, signed: 6, with_sdef: 3 };
        let text = format_stats(&stats);
        assert!(text.contains("Total Apps:  10"));
        assert!(text.contains("Sandboxed:   4"));
        assert!(text.contains("Code Signed: 6"));
        assert!(text.contains("With SDEF:   3"));
    }

    #[test]
    fn test_card_with_full_manifest() {
        let safari = app(
            json!({
                "name": "Safari",
                "path": "/Applications/Safari.app",
                "codesign": {
                    "identifier": "com.apple.Safari",
                    "team_identifier": "APPLE",
                    "signature_status": "Valid on disk"
                },
                "sandbox": { "sandboxed": "Yes", "hardened_runtime": "Yes", "entitlements_count": 42 },
                "sdef_count": 2
            }),
            "Safari",
        );

        let card = format_card(&safari);
        assert!(card.starts_with("Safari\n  /Applications/Safari.app\n"));
        assert!(card.contains("[Sandboxed] [Signed] [2 SDEF]"));
        assert!(card.contains("Bundle ID:    com.apple.Safari"));
        assert!(card.contains("Team ID:      APPLE"));
        assert!(card.contains("Hardened:     Yes"));
        assert!(card.contains("Entitlements: 42"));
    }

    #[test]
    fn test_card_fallbacks() {
        let bare = app(json!({ "sandbox": { "sandboxed": "No" } }), "Mystery");
        let card = format_card(&bare);
        assert!(card.starts_with("Mystery\n"));
        assert!(card.contains("[Not Sandboxed]"));
        assert!(!card.contains("Signed]"));
        assert!(card.contains("Bundle ID:    Unknown"));
        assert!(card.contains("Team ID:      Unknown"));
        assert!(card.contains("Hardened:     Unknown"));
        assert!(card.contains("Entitlements: 0"));
    }

    #[test]
    fn test_no_results_message() {
        assert_eq!(
            format_results("zzqqy", &[]),
            "No applications found matching \"zzqqy\"\n"
        );
    }

    #[test]
    fn test_results_list_ids() {
        let notes = app(json!({ "name": "Notes" }), "Notes");
        let text = format_results("note", &[&notes]);
        assert!(text.starts_with("Found 1 application matching \"note\""));
        assert!(text.contains("[Notes] Notes"));
    }

    #[test]
    fn test_detail_sections() {
        let mut bundle = DetailBundle::unavailable(Manifest::default().with_id("Notes"));
        bundle.info_plist = "<plist/>".to_string();
        let text = format_detail(&bundle, None);
        assert!(text.contains("== Info.plist ==\n<plist/>\n"));
        assert!(text.contains("== Entitlements =="));
        assert!(text.contains("== Sandbox =="));
        assert!(!text.contains("SDEF Files"));

        bundle.sdef_files.push(SdefFile {
            name: "Notes.sdef".to_string(),
            content: "<dictionary/>".to_string(),
        });
        let text = format_detail(&bundle, Some(DetailSection::Sdef));
        assert!(text.contains("== SDEF Files ==\n--- Notes.sdef ---\n<dictionary/>"));
        assert!(!text.contains("Info.plist"));
    }

    #[test]
    fn test_detail_json_includes_keys() {
        let mut bundle = DetailBundle::unavailable(Manifest::default().with_id("Notes"));
        bundle.entitlements = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict><key>com.apple.security.app-sandbox</key><true/></dict></plist>"#
            .to_string();

        let value: serde_json::Value = serde_json::from_str(&to_json(&DetailOutput::new(&bundle)).unwrap()).unwrap();
        assert_eq!(value["app"]["id"], "Notes");
        assert_eq!(value["entitlement_keys"], json!(["com.apple.security.app-sandbox"]));
        assert!(value["sdef_files"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_section_names_parse() {
        for name in DetailSection::NAMES {
            assert!(DetailSection::parse(name).is_some());
        }
        assert!(DetailSection::parse("icons").is_none());
    }

    #[test]
    fn test_load_error_message() {
        let err = LoadError::IndexUnavailable(FetchError::NotFound {
            locator: "data/index.json".to_string(),
        });
        let text = format_load_error(&err);
        assert!(text.starts_with("Failed to load application data: "));
        assert!(text.contains("data/index.json"));
        assert!(text.contains("properly populated"));
    }
}

//! Resource locators for the snapshot layout
//!
//! ```text
//! data/index.json
//! data/<id>/manifest.json
//! data/<id>/{entitlements.plist,info.plist,sandbox.txt,sdef_index.json}
//! data/<id>/sdef/<file>
//! data/<id>/<icon_path>
//! ```
//!
//! Names coming from the snapshot itself are validated so that they cannot
//! escape their application's directory.

use super::FetchError;
use crate::constants::{
    DATA_DIR, ENTITLEMENTS_FILE, INDEX_FILE, INFO_PLIST_FILE, MANIFEST_FILE, SANDBOX_FILE,
    SDEF_DIR, SDEF_INDEX_FILE,
};

pub fn index() -> String {
    format!("{}/{}", DATA_DIR, INDEX_FILE)
}

pub fn manifest(id: &str) -> Result<String, FetchError> {
    app_file(id, MANIFEST_FILE)
}

pub fn entitlements(id: &str) -> Result<String, FetchError> {
    app_file(id, ENTITLEMENTS_FILE)
}

pub fn info_plist(id: &str) -> Result<String, FetchError> {
    app_file(id, INFO_PLIST_FILE)
}

pub fn sandbox_report(id: &str) -> Result<String, FetchError> {
    app_file(id, SANDBOX_FILE)
}

pub fn sdef_index(id: &str) -> Result<String, FetchError> {
    app_file(id, SDEF_INDEX_FILE)
}

pub fn sdef_file(id: &str, file_name: &str) -> Result<String, FetchError> {
    Ok(format!(
        "{}/{}/{}/{}",
        DATA_DIR,
        segment(id)?,
        SDEF_DIR,
        segment(file_name)?
    ))
}

/// Icon paths may point into a subdirectory of the application's data directory
pub fn icon(id: &str, icon_path: &str) -> Result<String, FetchError> {
    let parts = icon_path
        .split('/')
        .map(segment)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| FetchError::InvalidLocator(icon_path.to_string()))?;
    Ok(format!("{}/{}/{}", DATA_DIR, segment(id)?, parts.join("/")))
}

fn app_file(id: &str, file_name: &str) -> Result<String, FetchError> {
    Ok(format!("{}/{}/{}", DATA_DIR, segment(id)?, file_name))
}

/// A single path component: non-empty, no separators, not `.` or `..`
fn segment(name: &str) -> Result<&str, FetchError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(|c: char| c == '/' || c == '\\') {
        return Err(FetchError::InvalidLocator(name.to_string()));
    }
    Ok(name)
}

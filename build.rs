//! Stamps the binary with `GIT_HASH` and `APPDEX_VERSION` for `--version`

use std::env;
use std::process::Command;

/// Short hash of the checked-out commit, if this is a git checkout
fn git_hash() -> Option<String> {
    let output = Command::new("git").args(["rev-parse", "--short", "HEAD"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

/// `VERSION` pins the reported version for release packaging
fn reported_version() -> String {
    env::var("VERSION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env::var("CARGO_PKG_VERSION").ok())
        .unwrap_or_default()
}

fn main() {
    let hash = git_hash().unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={hash}");
    println!("cargo:rustc-env=APPDEX_VERSION={}", reported_version());

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=VERSION");
}

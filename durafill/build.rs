//! Build script for durafill
//!
//! Composes the text shown by `durafill --version` and exports it as
//! `DURAFILL_LONG_VERSION`:
//!
//! ```text
//! 0.1.0 (v0.1.0-3-g1a2b3c4d-dirty, x86_64-unknown-linux-gnu release, built 2025-01-31)
//! ```

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let commit = git(&["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| "unknown".to_string());
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let built = chrono::Utc::now().format("%Y-%m-%d");

    // rustc-env values must stay on one line
    println!(
        "cargo:rustc-env=DURAFILL_LONG_VERSION={} ({}, {} {}, built {})",
        version, commit, target, profile, built
    );

    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        println!("cargo:rerun-if-changed={}/HEAD", git_dir);
        println!("cargo:rerun-if-changed={}/index", git_dir);
    }
    println!("cargo:rerun-if-changed=build.rs");
}

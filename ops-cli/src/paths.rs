//! Monorepo locations.
//!
//! The root is `$MONOREPO_PATH` when set, otherwise
//! `$GOPATH/src/github.com/$MONOREPO_ORG/monorepo`.

use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_ORG: &str = "wallester";

pub fn monorepo_path() -> PathBuf {
    resolve_monorepo_path(
        env::var("MONOREPO_PATH").ok(),
        env::var("GOPATH").ok(),
        env::var("MONOREPO_ORG").ok(),
    )
}

pub fn resolve_monorepo_path(monorepo: Option<String>, gopath: Option<String>, org: Option<String>) -> PathBuf {
    if let Some(path) = monorepo.filter(|path| !path.is_empty()) {
        return PathBuf::from(path);
    }

    let org = org.filter(|org| !org.is_empty()).unwrap_or_else(|| DEFAULT_ORG.to_string());
    PathBuf::from(gopath.unwrap_or_default())
        .join("src")
        .join("github.com")
        .join(org)
        .join("monorepo")
}

pub fn automation_path(root: &Path) -> PathBuf {
    root.join("automation")
}

pub fn coverage_path(root: &Path) -> PathBuf {
    automation_path(root).join(".coverage")
}

pub fn integration_coverage_path(root: &Path) -> PathBuf {
    coverage_path(root).join("integration")
}

pub fn merged_coverage_path(root: &Path) -> PathBuf {
    coverage_path(root).join("merged")
}

//! Implementation of `extbuild clean`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::ops::extbuild_build::{resolve_build_dir, BuildOptions};
use crate::util::config::Config;
use crate::util::fs::{normalize_path, remove_dir_all_if_exists};

/// Options for the clean command.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Build directory override
    pub build_dir: Option<PathBuf>,

    /// Only remove intermediates (`temp/`), keeping built modules
    pub temp_only: bool,
}

/// Outcome of a clean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanResult {
    /// Directory targeted for removal
    pub path: PathBuf,
    /// False when there was nothing on disk to remove
    pub removed: bool,
}

/// Remove build outputs for the project rooted at `manifest_dir`.
pub fn clean(manifest_dir: &Path, config: &Config, opts: &CleanOptions) -> Result<CleanResult> {
    let build_opts = BuildOptions {
        build_dir: opts.build_dir.clone(),
        ..Default::default()
    };
    let build_dir = resolve_build_dir(manifest_dir, config, &build_opts);

    if contains_project(&build_dir, manifest_dir) {
        bail!(
            "refusing to remove `{}`: it contains the project itself",
            build_dir.display()
        );
    }

    let target = if opts.temp_only {
        build_dir.join("temp")
    } else {
        build_dir
    };

    let removed = target.exists();
    remove_dir_all_if_exists(&target)?;
    tracing::debug!("Removed {}", target.display());
    Ok(CleanResult {
        path: target,
        removed,
    })
}

/// Whether removing `build_dir` would remove `manifest_dir` too.
///
/// Compared lexically, then canonicalized when both paths exist.
fn contains_project(build_dir: &Path, manifest_dir: &Path) -> bool {
    if normalize_path(manifest_dir).starts_with(normalize_path(build_dir)) {
        return true;
    }
    match (build_dir.canonicalize(), manifest_dir.canonicalize()) {
        (Ok(build), Ok(project)) => project.starts_with(build),
        _ => false,
    }
}

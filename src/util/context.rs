//! Global context for extbuild operations.
//!
//! Provides centralized access to the working directory, manifest lookup
//! and configuration paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::MANIFEST_NAME;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::diagnostic::suggestions;

/// Global context containing paths and output preferences.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            verbose: false,
            color: true,
        }
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Resolve the manifest to use.
    ///
    /// An explicit path wins (relative paths are taken from cwd). Otherwise
    /// `ExtBuild.toml` is searched for from cwd upward.
    pub fn find_manifest(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            let path = crate::util::fs::resolve_against(&self.cwd, path);
            if !path.is_file() {
                anyhow::bail!("manifest not found: {}", path.display());
            }
            return Ok(path);
        }

        let mut dir = Some(self.cwd.as_path());
        while let Some(current) = dir {
            let candidate = current.join(MANIFEST_NAME);
            if candidate.is_file() {
                tracing::debug!("Found manifest at {}", candidate.display());
                return Ok(candidate);
            }
            dir = current.parent();
        }

        anyhow::bail!(
            "could not find `{}` in `{}` or any parent directory\n{}",
            MANIFEST_NAME,
            self.cwd.display(),
            suggestions::NO_MANIFEST
        )
    }

    /// Load the merged global and project configuration for a project root.
    pub fn load_config(&self, project_root: &Path) -> Config {
        let global = global_config_path();
        load_config(global.as_deref(), &project_config_path(project_root))
    }
}

//! Configuration file support for extbuild.
//!
//! Two configuration file locations are read:
//! - Global: `~/.extbuild/config.toml` - User-wide defaults
//! - Project: `.extbuild/config.toml` next to `ExtBuild.toml` - Project overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".extbuild";

/// extbuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Compiler overrides
    pub toolchain: ToolchainSettings,

    /// Host interpreter settings
    pub python: PythonConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Build directory, relative to the manifest directory (default: `build`)
    pub build_dir: Option<PathBuf>,

    /// Output format for build messages (`human` or `json`)
    pub message_format: Option<String>,
}

/// Toolchain settings for C/C++ compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler, used as given (e.g. `clang` or `/usr/bin/gcc-13`)
    pub cc: Option<PathBuf>,

    /// C++ compiler; inferred from `cc` when absent
    pub cxx: Option<PathBuf>,

    /// Additional compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

impl ToolchainSettings {
    /// Check if any toolchain settings are configured.
    pub fn has_overrides(&self) -> bool {
        self.cc.is_some()
            || self.cxx.is_some()
            || !self.cflags.is_empty()
            || !self.ldflags.is_empty()
    }
}

/// Settings for the interpreter the extension modules are built for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PythonConfig {
    /// Interpreter used to probe include paths and the module suffix
    pub interpreter: Option<PathBuf>,

    /// Interpreter header directories (skips probing when set with `ext-suffix`)
    pub include_dirs: Option<Vec<PathBuf>>,

    /// Extension module suffix, e.g. `.cpython-312-x86_64-linux-gnu.so`
    pub ext_suffix: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.build.message_format.is_some() {
            self.build.message_format = other.build.message_format;
        }

        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.cxx.is_some() {
            self.toolchain.cxx = other.toolchain.cxx;
        }
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if !other.toolchain.ldflags.is_empty() {
            self.toolchain.ldflags = other.toolchain.ldflags;
        }

        if other.python.interpreter.is_some() {
            self.python.interpreter = other.python.interpreter;
        }
        if other.python.include_dirs.is_some() {
            self.python.include_dirs = other.python.include_dirs;
        }
        if other.python.ext_suffix.is_some() {
            self.python.ext_suffix = other.python.ext_suffix;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.extbuild/config.toml)
/// 2. Global config (~/.extbuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global extbuild config directory (~/.extbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (~/.extbuild/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.extbuild/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}

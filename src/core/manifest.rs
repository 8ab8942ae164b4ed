//! ExtBuild.toml manifest parsing and schema.
//!
//! The manifest is the extension build descriptor: package identity, the
//! generator to run, and the ordered list of extension targets. It is read
//! once per invocation and never mutated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;
use crate::core::extension::ExtensionTarget;
use crate::core::module_name::validate_module_name;
use crate::util::fs::normalize_path;

/// File name of the descriptor.
pub const MANIFEST_NAME: &str = "ExtBuild.toml";

/// Default source generator.
pub const DEFAULT_GENERATOR: &str = "cython";

/// Package metadata from the [package] section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageMetadata {
    /// Package name
    pub name: String,

    /// Package version (informational)
    pub version: String,

    /// Package description
    #[serde(default)]
    pub description: Option<String>,

    /// License identifier
    #[serde(default)]
    pub license: Option<String>,

    /// Authors
    #[serde(default)]
    pub authors: Vec<String>,
}

impl PackageMetadata {
    /// Create package metadata with only a name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        PackageMetadata {
            name: name.into(),
            version: version.into(),
            description: None,
            license: None,
            authors: Vec::new(),
        }
    }

    /// Parse the version string as semver, if it is one.
    pub fn semver(&self) -> Option<Version> {
        self.version.parse().ok()
    }

    /// Identifier used in build messages, e.g. `cvsu v0.0.1`.
    pub fn package_id(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }
}

/// The [generator] section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Generator executable
    pub program: PathBuf,

    /// Extra arguments placed before the interface source
    pub args: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            program: PathBuf::from(DEFAULT_GENERATOR),
            args: Vec::new(),
        }
    }
}

/// The parsed ExtBuild.toml manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Package metadata
    pub package: PackageMetadata,

    /// Source generator settings
    pub generator: GeneratorConfig,

    /// Extension targets in declaration order
    pub extensions: Vec<ExtensionTarget>,

    /// The base directory: the directory containing this manifest
    pub manifest_dir: PathBuf,
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    package: PackageMetadata,

    #[serde(default)]
    generator: GeneratorConfig,

    #[serde(default)]
    extension: Vec<ExtensionTarget>,
}

impl Manifest {
    /// Build a manifest in memory.
    pub fn new(
        package: PackageMetadata,
        extensions: Vec<ExtensionTarget>,
        manifest_dir: impl Into<PathBuf>,
    ) -> Self {
        Manifest {
            package,
            generator: GeneratorConfig::default(),
            extensions,
            manifest_dir: manifest_dir.into(),
        }
    }

    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildError::config_at(format!("failed to read manifest: {}", e), path)
        })?;

        Self::parse(&content, path)
    }

    /// Parse and validate manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self, BuildError> {
        let raw: RawManifest = toml::from_str(content).map_err(|e| {
            BuildError::config_at(format!("failed to parse manifest: {}", e.message()), path)
        })?;

        let manifest_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let manifest = Manifest {
            package: raw.package,
            generator: raw.generator,
            extensions: raw.extension,
            manifest_dir,
        };

        manifest.validate().map_err(|e| match e {
            BuildError::Configuration { message, path: None } => {
                BuildError::config_at(message, path)
            }
            other => other,
        })?;

        Ok(manifest)
    }

    /// Check the whole descriptor.
    ///
    /// Target names must be unique, and no two targets may share an
    /// interface source since their generated sources would collide.
    pub fn validate(&self) -> Result<(), BuildError> {
        validate_module_name(&self.package.name).map_err(|e| {
            BuildError::config(format!(
                "invalid package name `{}`: {}",
                self.package.name, e
            ))
        })?;

        if self.package.version.trim().is_empty() {
            return Err(BuildError::config(format!(
                "package `{}` has an empty version",
                self.package.name
            )));
        }
        if self.package.semver().is_none() {
            tracing::warn!(
                "version `{}` of package `{}` is not semver",
                self.package.version,
                self.package.name
            );
        }

        if self.generator.program.as_os_str().is_empty() {
            return Err(BuildError::config("generator program is empty"));
        }

        let mut names: HashMap<&str, usize> = HashMap::new();
        let mut sources: HashMap<PathBuf, &str> = HashMap::new();

        for (index, ext) in self.extensions.iter().enumerate() {
            ext.validate()?;

            if let Some(first) = names.insert(&ext.name, index) {
                return Err(BuildError::config(format!(
                    "extension `{}` is declared twice (entries {} and {})",
                    ext.name,
                    first + 1,
                    index + 1
                )));
            }

            let source = normalize_path(&ext.interface_source_in(&self.manifest_dir));
            if let Some(other) = sources.insert(source, &ext.name) {
                return Err(BuildError::config(format!(
                    "extensions `{}` and `{}` share the interface source `{}`",
                    other,
                    ext.name,
                    ext.interface_source.display()
                )));
            }
        }

        Ok(())
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// Look up a target by name.
    pub fn extension(&self, name: &str) -> Option<&ExtensionTarget> {
        self.extensions.iter().find(|e| e.name == name)
    }
}

/// Generate a starter manifest for a new project.
pub fn generate_default_manifest(name: &str) -> String {
    format!(
        r#"[package]
name = "{name}"
version = "0.1.0"

[generator]
program = "{DEFAULT_GENERATOR}"

[[extension]]
name = "{name}"
interface-source = "{name}.pyx"
libraries = ["{name}"]
include-dirs = ["."]
"#
    )
}

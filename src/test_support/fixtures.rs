//! Test fixtures for common test scenarios.
//!
//! This module provides on-disk project layouts and descriptor templates for
//! tests that exercise loading and building.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::manifest::MANIFEST_NAME;
use crate::util::config::{project_config_path, CONFIG_DIR_NAME};

/// A temporary project directory.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Create an empty project directory.
    pub fn new() -> Self {
        ProjectFixture {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Create a project holding the cvsu descriptor and interface source.
    pub fn cvsu() -> Self {
        ProjectFixture::new()
            .manifest(manifests::CVSU)
            .file("cvsu.pyx", sources::CVSU_PYX)
    }

    /// Write a file relative to the project root.
    pub fn file(self, path: impl AsRef<Path>, content: &str) -> Self {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        std::fs::write(&path, content).expect("failed to write fixture file");
        self
    }

    /// Write the build descriptor.
    pub fn manifest(self, content: &str) -> Self {
        self.file(MANIFEST_NAME, content)
    }

    /// Write the project config file.
    pub fn config(self, content: &str) -> Self {
        self.file(Path::new(CONFIG_DIR_NAME).join("config.toml"), content)
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the build descriptor.
    pub fn manifest_path(&self) -> PathBuf {
        self.root().join(MANIFEST_NAME)
    }

    /// Path of the project config file.
    pub fn config_path(&self) -> PathBuf {
        project_config_path(self.root())
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor templates.
pub mod manifests {
    /// The cvsu extension descriptor.
    pub const CVSU: &str = r#"[package]
name = "cvsu"
version = "0.0.1"

[[extension]]
name = "cvsu"
interface-source = "cvsu.pyx"
libraries = ["cvsu"]
include-dirs = ["."]
"#;

    /// A descriptor with no extension targets.
    pub fn empty(name: &str) -> String {
        format!(
            r#"[package]
name = "{name}"
version = "0.0.1"
"#
        )
    }

    /// A descriptor declaring one target per `(name, interface source)` pair.
    pub fn with_targets(name: &str, targets: &[(&str, &str)]) -> String {
        let mut out = empty(name);
        for (target, source) in targets {
            out.push_str(&format!(
                "\n[[extension]]\nname = \"{target}\"\ninterface-source = \"{source}\"\n"
            ));
        }
        out
    }
}

/// Interface-source templates.
pub mod sources {
    /// A small interface source wrapping one native function.
    pub const CVSU_PYX: &str = r#"cdef extern from "cvsu.h":
    int cvsu_version()

def version():
    return cvsu_version()
"#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::Manifest;

    #[test]
    fn test_cvsu_fixture_loads() {
        let fixture = ProjectFixture::cvsu();
        let manifest = Manifest::load(&fixture.manifest_path()).unwrap();
        assert_eq!(manifest.name(), "cvsu");
        assert_eq!(manifest.manifest_dir, fixture.root());
        assert!(fixture.root().join("cvsu.pyx").is_file());
    }

    #[test]
    fn test_with_targets_template() {
        let content = manifests::with_targets("demo", &[("a", "a.pyx"), ("b", "b.pyx")]);
        let manifest = Manifest::parse(&content, Path::new("/p/ExtBuild.toml")).unwrap();
        let names: Vec<_> = manifest.extensions.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_config_file_location() {
        let fixture = ProjectFixture::new().config("[toolchain]\ncc = \"cc\"\n");
        assert!(fixture.config_path().is_file());
    }
}

//! Extension target declarations.
//!
//! An extension target is one unit of work producing exactly one loadable
//! module: an interface source to generate from, plus the native libraries
//! and header directories the generated code needs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;
use crate::core::module_name::validate_module_name;

/// Language of the generated native source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C language (default)
    #[default]
    C,
    /// C++ language
    #[serde(rename = "c++", alias = "cpp", alias = "cxx")]
    Cxx,
}

impl Language {
    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }

    /// File extension of generated sources in this language.
    pub fn source_extension(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "cpp",
        }
    }
}

fn default_include_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

/// One `[[extension]]` entry of the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExtensionTarget {
    /// Module name; also the output artifact name
    pub name: String,

    /// Interface-source file, relative to the base directory
    pub interface_source: PathBuf,

    /// Native libraries to link, in link order
    #[serde(default)]
    pub libraries: Vec<String>,

    /// Header search directories, in search order
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<PathBuf>,

    /// Library search directories
    #[serde(default)]
    pub library_dirs: Vec<PathBuf>,

    /// Preprocessor macros as `NAME` or `NAME=VALUE`
    #[serde(default)]
    pub define_macros: Vec<String>,

    /// Extra arguments passed to the compiler
    #[serde(default)]
    pub extra_compile_args: Vec<String>,

    /// Extra arguments passed to the linker
    #[serde(default)]
    pub extra_link_args: Vec<String>,

    /// Language the generator emits
    #[serde(default)]
    pub language: Language,
}

impl ExtensionTarget {
    /// Create a target with default include directories and no libraries.
    pub fn new(name: impl Into<String>, interface_source: impl Into<PathBuf>) -> Self {
        ExtensionTarget {
            name: name.into(),
            interface_source: interface_source.into(),
            libraries: Vec::new(),
            include_dirs: default_include_dirs(),
            library_dirs: Vec::new(),
            define_macros: Vec::new(),
            extra_compile_args: Vec::new(),
            extra_link_args: Vec::new(),
            language: Language::C,
        }
    }

    /// Set the libraries to link against.
    pub fn with_libraries<I, S>(mut self, libs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.libraries = libs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the header search directories.
    pub fn with_include_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.include_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the generated language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Parsed preprocessor defines as `(name, value)` pairs.
    pub fn defines(&self) -> Vec<(String, Option<String>)> {
        self.define_macros
            .iter()
            .map(|d| match d.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (d.clone(), None),
            })
            .collect()
    }

    /// The interface source resolved against the base directory.
    pub fn interface_source_in(&self, base: &Path) -> PathBuf {
        crate::util::fs::resolve_against(base, &self.interface_source)
    }

    /// Check the target's own fields.
    pub fn validate(&self) -> Result<(), BuildError> {
        validate_module_name(&self.name).map_err(|e| {
            BuildError::config(format!("invalid extension name `{}`: {}", self.name, e))
        })?;

        if self.interface_source.as_os_str().is_empty() {
            return Err(BuildError::config(format!(
                "extension `{}` must specify an interface source",
                self.name
            )));
        }

        for lib in &self.libraries {
            if lib.is_empty() {
                return Err(BuildError::config(format!(
                    "extension `{}` declares an empty library name",
                    self.name
                )));
            }
            if lib.chars().any(char::is_whitespace) {
                return Err(BuildError::config(format!(
                    "extension `{}` declares library `{}` containing whitespace",
                    self.name, lib
                )));
            }
        }

        for (name, _) in self.defines() {
            if name.is_empty() {
                return Err(BuildError::config(format!(
                    "extension `{}` declares a macro without a name",
                    self.name
                )));
            }
        }

        Ok(())
    }
}

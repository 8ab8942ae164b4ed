//! Build error taxonomy.
//!
//! Every variant is fatal to the current invocation. Tool failures keep the
//! originating tool's output untouched so it can be shown verbatim.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// A failed external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    /// The command line that was run
    pub command: String,
    /// Exit code, `None` if the tool could not be spawned or was killed
    pub status: Option<i32>,
    /// Captured stdout followed by stderr, unmodified
    pub output: Vec<u8>,
}

impl ToolFailure {
    /// The captured output as text, with invalid UTF-8 replaced.
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "`{}` exited with status {}", self.command, code),
            None => write!(f, "`{}` terminated without an exit status", self.command),
        }
    }
}

/// The stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Generation,
    Compile,
    Link,
}

/// Error raised while configuring or building extension targets.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum BuildError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(extbuild::config))]
    Configuration {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("source generation failed for target `{target}`: {reason}")]
    #[diagnostic(code(extbuild::generate))]
    Generation {
        target: String,
        interface_source: PathBuf,
        reason: String,
        failure: Option<ToolFailure>,
    },

    #[error("compilation failed for target `{target}`: {reason}")]
    #[diagnostic(code(extbuild::compile))]
    Compile {
        target: String,
        generated_source: PathBuf,
        reason: String,
        failure: Option<ToolFailure>,
    },

    #[error("linking failed for target `{target}`: {reason}")]
    #[diagnostic(code(extbuild::link))]
    Link {
        target: String,
        module: PathBuf,
        reason: String,
        failure: Option<ToolFailure>,
    },
}

impl BuildError {
    /// Create a configuration error without a file location.
    pub fn config(message: impl Into<String>) -> Self {
        BuildError::Configuration {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error attached to a file.
    pub fn config_at(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        BuildError::Configuration {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// The stage this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Configuration { .. } => ErrorKind::Configuration,
            BuildError::Generation { .. } => ErrorKind::Generation,
            BuildError::Compile { .. } => ErrorKind::Compile,
            BuildError::Link { .. } => ErrorKind::Link,
        }
    }

    /// The target that failed, if the error is tied to one.
    pub fn target(&self) -> Option<&str> {
        match self {
            BuildError::Configuration { .. } => None,
            BuildError::Generation { target, .. }
            | BuildError::Compile { target, .. }
            | BuildError::Link { target, .. } => Some(target),
        }
    }

    /// The failed tool invocation, if any.
    pub fn tool_failure(&self) -> Option<&ToolFailure> {
        match self {
            BuildError::Configuration { .. } => None,
            BuildError::Generation { failure, .. }
            | BuildError::Compile { failure, .. }
            | BuildError::Link { failure, .. } => failure.as_ref(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        match self {
            BuildError::Configuration { path, .. } => {
                if let Some(path) = path {
                    diag = diag.with_location(path);
                }
                diag = diag.with_suggestion(suggestions::FIX_MANIFEST);
            }
            BuildError::Generation {
                interface_source,
                failure,
                ..
            } => {
                diag = diag.with_location(interface_source);
                diag = match failure {
                    Some(f) if f.status.is_none() => {
                        diag.with_suggestion(suggestions::GENERATOR_NOT_FOUND)
                    }
                    Some(_) => diag,
                    None => diag.with_suggestion(suggestions::MISSING_INTERFACE_SOURCE),
                };
            }
            BuildError::Compile {
                generated_source, ..
            } => {
                diag = diag
                    .with_location(generated_source)
                    .with_suggestion(suggestions::COMPILE_FAILED);
            }
            BuildError::Link { module, .. } => {
                diag = diag
                    .with_location(module)
                    .with_suggestion(suggestions::LINK_FAILED);
            }
        }

        if let Some(failure) = self.tool_failure() {
            diag = diag.with_context(format!("command: {}", failure.command));
        }

        if self.kind() != ErrorKind::Configuration {
            diag = diag.with_suggestion(suggestions::BUILD_FAILED);
        }

        diag
    }
}

//! Build event types for JSON output.
//!
//! These events are emitted one JSON object per line when using
//! `--message-format=json`.
//!
//! # Event Types
//!
//! - `build-started`: Build is about to process the declared targets
//! - `compiler-artifact`: A loadable module was produced
//! - `target-failed`: A target failed; no later target is attempted
//! - `build-finished`: Build completed (success or failure)

use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

/// Output format for build messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    /// Human-readable status lines on stderr
    #[default]
    Human,
    /// JSON events on stdout
    Json,
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(MessageFormat::Human),
            "json" => Ok(MessageFormat::Json),
            other => Err(format!(
                "unknown message format `{}` (expected `human` or `json`)",
                other
            )),
        }
    }
}

/// A build event emitted during the build process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// Build started.
    #[serde(rename = "build-started")]
    BuildStarted {
        /// Package identifier (e.g., "cvsu v0.0.1")
        package_id: String,
        /// Number of declared targets
        targets: u64,
    },

    /// A loadable module was produced.
    #[serde(rename = "compiler-artifact")]
    CompilerArtifact {
        /// Package identifier
        package_id: String,
        /// Target name
        target: String,
        /// Output filenames
        filenames: Vec<PathBuf>,
        /// SHA-256 of the module
        #[serde(skip_serializing_if = "Option::is_none")]
        digest: Option<String>,
    },

    /// A target failed.
    #[serde(rename = "target-failed")]
    TargetFailed {
        /// Package identifier
        package_id: String,
        /// Target name
        target: String,
        /// Failing stage ("generate", "compile", "link")
        stage: String,
        /// Error message
        message: String,
        /// Tool output, verbatim
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },

    /// Build completed (success or failure).
    #[serde(rename = "build-finished")]
    BuildFinished {
        /// Whether the build succeeded
        success: bool,
        /// Total build duration in milliseconds
        duration_ms: u64,
        /// Number of targets built
        targets_built: u64,
    },
}

impl BuildEvent {
    /// Create a build started event.
    pub fn started(package_id: impl Into<String>, targets: usize) -> Self {
        BuildEvent::BuildStarted {
            package_id: package_id.into(),
            targets: targets as u64,
        }
    }

    /// Create a compiler artifact event.
    pub fn artifact(
        package_id: impl Into<String>,
        target: impl Into<String>,
        filenames: Vec<PathBuf>,
        digest: Option<String>,
    ) -> Self {
        BuildEvent::CompilerArtifact {
            package_id: package_id.into(),
            target: target.into(),
            filenames,
            digest,
        }
    }

    /// Create a build finished event.
    pub fn finished(success: bool, duration_ms: u64, targets_built: usize) -> Self {
        BuildEvent::BuildFinished {
            success,
            duration_ms,
            targets_built: targets_built as u64,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

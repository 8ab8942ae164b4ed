//! External tool invocation.
//!
//! The generator, compiler and linker are all opaque collaborators. The build
//! sequencing only ever talks to them through [`ToolRunner`], so it can be
//! driven by a fake runner in tests.

use std::path::Path;

use anyhow::Result;

use crate::builder::toolchain::CommandSpec;
use crate::util::process::ProcessBuilder;

/// Result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if terminated by a signal
    pub status: Option<i32>,
    /// Captured stdout
    pub stdout: Vec<u8>,
    /// Captured stderr
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// A successful run with no output.
    pub fn success() -> Self {
        ToolOutput {
            status: Some(0),
            ..Default::default()
        }
    }

    /// A failed run with the given exit code and stderr.
    pub fn failure(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        ToolOutput {
            status: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the tool exited with status 0.
    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Stdout followed by stderr, byte for byte.
    pub fn combined(&self) -> Vec<u8> {
        let mut bytes = self.stdout.clone();
        bytes.extend_from_slice(&self.stderr);
        bytes
    }
}

/// Capability to run an external tool to completion.
pub trait ToolRunner {
    /// Run `cmd` in `cwd` and wait for it.
    ///
    /// Returns `Err` only when the tool could not be started; a tool that ran
    /// and failed is reported through [`ToolOutput::status`].
    fn run(&self, cmd: &CommandSpec, cwd: &Path) -> Result<ToolOutput>;
}

/// Runs tools as real subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, cmd: &CommandSpec, cwd: &Path) -> Result<ToolOutput> {
        let mut builder = ProcessBuilder::new(&cmd.program)
            .args(&cmd.args)
            .cwd(cwd);
        for (key, value) in &cmd.env {
            builder = builder.env(key, value);
        }

        let output = builder.exec()?;
        Ok(ToolOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

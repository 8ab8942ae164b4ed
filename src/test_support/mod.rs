//! Test utilities and mocks for extbuild unit tests.
//!
//! [`RecordingRunner`] stands in for the generator, compiler and linker. By
//! default every tool succeeds and writes the file named after its `-o`
//! argument with deterministic content, so the executor's output checks and
//! digests behave as they would with real tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use extbuild::test_support::{ProjectFixture, RecordingRunner};
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ProjectFixture::new().file("cvsu.pyx", "");
//!     let runner = RecordingRunner::new().fail("cython", 1, "syntax error");
//!
//!     // Build with `runner`, then inspect `runner.invocations()`...
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

pub use fixtures::*;

use crate::builder::context::BuildContext;
use crate::builder::generator::CythonGenerator;
use crate::builder::python::HostPython;
use crate::builder::runner::{ToolOutput, ToolRunner};
use crate::builder::toolchain::{CommandSpec, GccToolchain, ToolchainPlatform};

/// One recorded tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program as given in the command
    pub program: PathBuf,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
}

impl Invocation {
    /// File name of the program (`cc` for `/usr/bin/cc`).
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// What a matched expectation does.
#[derive(Debug, Clone)]
enum Response {
    /// Return this output without writing anything
    Output(ToolOutput),
    /// Fail to start, as if the program were not installed
    Missing,
}

#[derive(Debug, Clone)]
struct Expectation {
    program: String,
    /// Only match invocations carrying this exact argument
    with_arg: Option<String>,
    response: Response,
}

impl Expectation {
    fn matches(&self, cmd: &CommandSpec) -> bool {
        let name = cmd
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let program_matches =
            cmd.program == Path::new(&self.program) || name == self.program;

        program_matches
            && self
                .with_arg
                .as_ref()
                .map_or(true, |arg| cmd.args.iter().any(|a| a == arg))
    }
}

/// Fake tool runner that records every invocation.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    expectations: Vec<Expectation>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl RecordingRunner {
    /// A runner where every tool succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` whenever `program` runs.
    pub fn respond(mut self, program: &str, output: ToolOutput) -> Self {
        self.expectations.push(Expectation {
            program: program.to_string(),
            with_arg: None,
            response: Response::Output(output),
        });
        self
    }

    /// Make `program` exit with `code`, printing `stderr`.
    pub fn fail(self, program: &str, code: i32, stderr: &str) -> Self {
        self.respond(program, ToolOutput::failure(code, stderr))
    }

    /// Make `program` fail only when invoked with `arg`.
    pub fn fail_matching(mut self, program: &str, arg: &str, code: i32, stderr: &str) -> Self {
        self.expectations.push(Expectation {
            program: program.to_string(),
            with_arg: Some(arg.to_string()),
            response: Response::Output(ToolOutput::failure(code, stderr)),
        });
        self
    }

    /// Make `program` impossible to start.
    pub fn missing(mut self, program: &str) -> Self {
        self.expectations.push(Expectation {
            program: program.to_string(),
            with_arg: None,
            response: Response::Missing,
        });
        self
    }

    /// All invocations so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Program file names of all invocations, in order.
    pub fn programs(&self) -> Vec<String> {
        self.invocations().iter().map(Invocation::program_name).collect()
    }

    fn write_output(cmd: &CommandSpec, cwd: &Path) -> Result<()> {
        let Some(output) = cmd.output_arg() else {
            return Ok(());
        };
        let path = cwd.join(output);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        std::fs::write(&path, format!("{} -> {}\n", cmd.program.display(), name))?;
        Ok(())
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, cmd: &CommandSpec, cwd: &Path) -> Result<ToolOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Invocation {
                program: cmd.program.clone(),
                args: cmd.args.clone(),
                cwd: cwd.to_path_buf(),
            });
        }

        match self.expectations.iter().find(|e| e.matches(cmd)) {
            Some(exp) => match &exp.response {
                Response::Output(output) => Ok(output.clone()),
                Response::Missing => bail!(
                    "failed to execute `{}`: No such file or directory",
                    cmd.program.display()
                ),
            },
            None => {
                Self::write_output(cmd, cwd)?;
                Ok(ToolOutput::success())
            }
        }
    }
}

/// A build context with fixed tools: `cc`/`c++` (GCC), `cython`, and a
/// `.so` suffix with no interpreter headers.
pub fn test_context(base_dir: &Path) -> BuildContext {
    BuildContext::new(
        Arc::new(GccToolchain::new(
            PathBuf::from("cc"),
            PathBuf::from("c++"),
            ToolchainPlatform::Gcc,
        )),
        Arc::new(CythonGenerator::new("cython", Vec::new())),
        HostPython::new(Vec::new(), ".so"),
        base_dir,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_writes_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let cmd = CommandSpec::new("cc").args(["-c", "x.c", "-o", "obj/x.o"]);

        let out = runner.run(&cmd, tmp.path()).unwrap();
        assert!(out.is_success());
        assert!(tmp.path().join("obj/x.o").is_file());
        assert_eq!(runner.programs(), vec!["cc"]);
    }

    #[test]
    fn test_expectation_matches_file_name() {
        let runner = RecordingRunner::new().fail("cc", 1, "boom");
        let cmd = CommandSpec::new("/usr/bin/cc").arg("-shared");

        let out = runner.run(&cmd, Path::new(".")).unwrap();
        assert_eq!(out.status, Some(1));
    }

    #[test]
    fn test_fail_matching_needs_arg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let runner = RecordingRunner::new().fail_matching("cc", "-lcvsu", 1, "cannot find -lcvsu");

        let compile = CommandSpec::new("cc").args(["-c", "a.c", "-o", "a.o"]);
        assert!(runner.run(&compile, tmp.path()).unwrap().is_success());

        let link = CommandSpec::new("cc").args(["-shared", "-o", "a.so", "a.o", "-lcvsu"]);
        assert!(!runner.run(&link, tmp.path()).unwrap().is_success());
    }

    #[test]
    fn test_missing_is_spawn_error() {
        let runner = RecordingRunner::new().missing("cython");
        assert!(runner.run(&CommandSpec::new("cython"), Path::new(".")).is_err());
        assert_eq!(runner.invocations().len(), 1);
    }
}

//! Build executor.
//!
//! Runs a [`BuildPlan`] one target at a time, in declaration order. Each
//! target moves `Declared -> Generated -> Built`; the first failure marks that
//! target `Failed` and stops the loop, so later targets stay `Declared` and
//! none of their tools are run. Artifacts already built are left on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::builder::events::BuildEvent;
use crate::builder::plan::{BuildPlan, TargetPlan};
use crate::builder::runner::{ToolOutput, ToolRunner};
use crate::builder::toolchain::CommandSpec;
use crate::core::errors::{BuildError, ErrorKind, ToolFailure};
use crate::util::fs::{check_readable_file, ensure_parent};
use crate::util::hash::sha256_file;

/// Lifecycle state of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    Declared,
    Generated,
    Built,
    Failed,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetState::Declared => "declared",
            TargetState::Generated => "generated",
            TargetState::Built => "built",
            TargetState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A finished loadable module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Target name
    pub target: String,
    /// Module path
    pub path: PathBuf,
    /// SHA-256 of the module contents
    pub digest: String,
}

/// Final state of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub name: String,
    pub state: TargetState,
}

/// Outcome of executing a plan.
#[derive(Debug)]
pub struct BuildReport {
    /// Every planned target with its final state, in declaration order
    pub targets: Vec<TargetReport>,
    /// Modules built, in declaration order
    pub artifacts: Vec<Artifact>,
    /// The error that stopped the build, if any
    pub error: Option<BuildError>,
    /// Wall time spent
    pub duration: Duration,
}

impl BuildReport {
    /// Whether every target was built.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// State of a target by name.
    pub fn state(&self, name: &str) -> Option<TargetState> {
        self.targets.iter().find(|t| t.name == name).map(|t| t.state)
    }

    /// The artifacts, or the error that stopped the build.
    pub fn into_result(self) -> Result<Vec<Artifact>, BuildError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.artifacts),
        }
    }
}

/// Sequential build executor.
pub struct BuildExecutor<'a> {
    runner: &'a dyn ToolRunner,
    events: Option<&'a dyn Fn(&BuildEvent)>,
    progress: bool,
}

impl<'a> BuildExecutor<'a> {
    /// Create a new build executor.
    pub fn new(runner: &'a dyn ToolRunner) -> Self {
        BuildExecutor {
            runner,
            events: None,
            progress: false,
        }
    }

    /// Send build events to `sink`.
    pub fn with_events(mut self, sink: &'a dyn Fn(&BuildEvent)) -> Self {
        self.events = Some(sink);
        self
    }

    /// Show a progress bar for multi-target builds.
    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(sink) = self.events {
            sink(&event);
        }
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.progress || total <= 1 {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }

    /// Execute a build plan.
    pub fn execute(&self, plan: &BuildPlan) -> BuildReport {
        let start = Instant::now();
        self.emit(BuildEvent::started(&plan.package_id, plan.target_count()));

        let mut report = BuildReport {
            targets: plan
                .targets
                .iter()
                .map(|t| TargetReport {
                    name: t.name.clone(),
                    state: TargetState::Declared,
                })
                .collect(),
            artifacts: Vec::new(),
            error: None,
            duration: Duration::ZERO,
        };

        let pb = self.progress_bar(plan.target_count());

        for (target, slot) in plan.targets.iter().zip(report.targets.iter_mut()) {
            pb.set_message(target.name.clone());

            match self.build_target(plan, target, &mut slot.state) {
                Ok(artifact) => {
                    self.emit(BuildEvent::artifact(
                        &plan.package_id,
                        &artifact.target,
                        vec![artifact.path.clone()],
                        Some(artifact.digest.clone()),
                    ));
                    report.artifacts.push(artifact);
                    pb.inc(1);
                }
                Err(err) => {
                    slot.state = TargetState::Failed;
                    tracing::debug!("Target `{}` failed: {}", target.name, err);
                    self.emit(BuildEvent::TargetFailed {
                        package_id: plan.package_id.clone(),
                        target: target.name.clone(),
                        stage: stage_name(err.kind()).to_string(),
                        message: err.to_string(),
                        output: err.tool_failure().map(ToolFailure::output_lossy),
                    });
                    report.error = Some(err);
                    break;
                }
            }
        }

        if report.is_success() {
            pb.finish_with_message("done");
        } else {
            pb.abandon();
        }

        report.duration = start.elapsed();
        self.emit(BuildEvent::finished(
            report.is_success(),
            report.duration.as_millis() as u64,
            report.artifacts.len(),
        ));

        report
    }

    fn build_target(
        &self,
        plan: &BuildPlan,
        target: &TargetPlan,
        state: &mut TargetState,
    ) -> Result<Artifact, BuildError> {
        let cwd = plan.base_dir.as_path();

        self.generate(target, cwd)?;
        *state = TargetState::Generated;

        self.compile(target, cwd)?;

        let artifact = self.link(target, cwd)?;
        *state = TargetState::Built;

        Ok(artifact)
    }

    fn generate(&self, target: &TargetPlan, cwd: &Path) -> Result<(), BuildError> {
        let fail = |reason: String, failure: Option<ToolFailure>| BuildError::Generation {
            target: target.name.clone(),
            interface_source: target.interface_source.clone(),
            reason,
            failure,
        };

        check_readable_file(&target.interface_source).map_err(|e| {
            fail(
                format!(
                    "interface source `{}` cannot be read: {}",
                    target.interface_source.display(),
                    e
                ),
                None,
            )
        })?;
        ensure_parent(&target.generated_source).map_err(|e| fail(format!("{:#}", e), None))?;

        tracing::info!("  Generating {}", target.name);
        self.run_tool(&target.generate, cwd)
            .map_err(|(reason, failure)| fail(format!("generator {}", reason), Some(failure)))?;

        if !target.generated_source.is_file() {
            return Err(fail(
                format!(
                    "generator reported success but did not write `{}`",
                    target.generated_source.display()
                ),
                None,
            ));
        }
        Ok(())
    }

    fn compile(&self, target: &TargetPlan, cwd: &Path) -> Result<(), BuildError> {
        let fail = |reason: String, failure: Option<ToolFailure>| BuildError::Compile {
            target: target.name.clone(),
            generated_source: target.generated_source.clone(),
            reason,
            failure,
        };

        ensure_parent(&target.object).map_err(|e| fail(format!("{:#}", e), None))?;

        tracing::info!("   Compiling {}", target.name);
        self.run_tool(&target.compile, cwd)
            .map_err(|(reason, failure)| fail(format!("compiler {}", reason), Some(failure)))?;

        if !target.object.is_file() {
            return Err(fail(
                format!(
                    "compiler reported success but did not write `{}`",
                    target.object.display()
                ),
                None,
            ));
        }
        Ok(())
    }

    fn link(&self, target: &TargetPlan, cwd: &Path) -> Result<Artifact, BuildError> {
        let fail = |reason: String, failure: Option<ToolFailure>| BuildError::Link {
            target: target.name.clone(),
            module: target.module.clone(),
            reason,
            failure,
        };

        ensure_parent(&target.module).map_err(|e| fail(format!("{:#}", e), None))?;

        tracing::info!("     Linking {}", target.name);
        self.run_tool(&target.link, cwd)
            .map_err(|(reason, failure)| fail(format!("linker {}", reason), Some(failure)))?;

        if !target.module.is_file() {
            return Err(fail(
                format!(
                    "linker reported success but did not write `{}`",
                    target.module.display()
                ),
                None,
            ));
        }

        let digest = sha256_file(&target.module).map_err(|e| fail(format!("{:#}", e), None))?;

        Ok(Artifact {
            target: target.name.clone(),
            path: target.module.clone(),
            digest,
        })
    }

    /// Run one tool; on failure return a short reason and the verbatim failure.
    fn run_tool(&self, cmd: &CommandSpec, cwd: &Path) -> Result<ToolOutput, (String, ToolFailure)> {
        tracing::debug!("Running `{}`", cmd);

        match self.runner.run(cmd, cwd) {
            Ok(output) if output.is_success() => {
                let text = output.combined();
                if !text.is_empty() {
                    tracing::debug!("{}", String::from_utf8_lossy(&text).trim_end());
                }
                Ok(output)
            }
            Ok(output) => {
                let reason = match output.status {
                    Some(code) => format!("exited with status {}", code),
                    None => "was terminated by a signal".to_string(),
                };
                Err((
                    reason,
                    ToolFailure {
                        command: cmd.to_string(),
                        status: output.status,
                        output: output.combined(),
                    },
                ))
            }
            Err(e) => Err((
                format!("could not be started: {:#}", e),
                ToolFailure {
                    command: cmd.to_string(),
                    status: None,
                    output: Vec::new(),
                },
            )),
        }
    }
}

fn stage_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Configuration => "configure",
        ErrorKind::Generation => "generate",
        ErrorKind::Compile => "compile",
        ErrorKind::Link => "link",
    }
}

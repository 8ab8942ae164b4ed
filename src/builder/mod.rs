//! Extension module build system.
//!
//! This module turns a descriptor into a [`BuildPlan`] and executes it:
//! source generation, compilation and linking, one target at a time.

pub mod context;
pub mod events;
pub mod executor;
pub mod generator;
pub mod plan;
pub mod python;
pub mod runner;
pub mod toolchain;

pub use context::BuildContext;
pub use events::{BuildEvent, MessageFormat};
pub use executor::{Artifact, BuildExecutor, BuildReport, TargetState};
pub use generator::{CythonGenerator, Generator};
pub use plan::{BuildPlan, TargetPlan};
pub use python::HostPython;
pub use runner::{ProcessRunner, ToolOutput, ToolRunner};
pub use toolchain::{detect_toolchain, CommandSpec, GccToolchain, Toolchain, ToolchainPlatform};

//! extbuild - Build Python extension modules from Cython interface sources
//!
//! This crate provides the core library functionality for extbuild:
//! descriptor loading, build planning, and sequential execution of the
//! generate, compile and link steps.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for extbuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording tool runner and on-disk
/// project fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildPlan, BuildReport};
pub use core::{BuildError, ExtensionTarget, Manifest};
pub use util::context::GlobalContext;

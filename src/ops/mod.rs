//! High-level operations.
//!
//! This module contains the implementation of extbuild commands.

pub mod extbuild_build;
pub mod extbuild_clean;
pub mod extbuild_init;

pub use extbuild_build::{build, build_context, plan, resolve_build_dir, BuildOptions};
pub use extbuild_clean::{clean, CleanOptions, CleanResult};
pub use extbuild_init::{init_project, InitOptions, InitResult};

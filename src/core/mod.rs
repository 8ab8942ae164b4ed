//! Core data structures for extbuild.
//!
//! This module contains the descriptor types used throughout the crate:
//! - The manifest (package identity, generator, extension targets)
//! - Module name validation
//! - The build error taxonomy

pub mod errors;
pub mod extension;
pub mod manifest;
pub mod module_name;

pub use errors::{BuildError, ErrorKind, ToolFailure};
pub use extension::{ExtensionTarget, Language};
pub use manifest::{GeneratorConfig, Manifest, PackageMetadata, MANIFEST_NAME};

//! Build context - toolchain, generator, interpreter and directory layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::generator::Generator;
use crate::builder::python::HostPython;
use crate::builder::toolchain::Toolchain;

/// Default build directory, relative to the base directory.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Build context shared by planning and execution.
///
/// Scoped to a single invocation and passed explicitly; nothing here is
/// global or persisted.
#[derive(Clone)]
pub struct BuildContext {
    /// Toolchain implementation
    pub toolchain: Arc<dyn Toolchain>,

    /// Source generator
    pub generator: Arc<dyn Generator>,

    /// Host interpreter settings
    pub python: HostPython,

    /// Base directory that relative descriptor paths are resolved against
    pub base_dir: PathBuf,

    /// Root of intermediates and outputs
    pub build_dir: PathBuf,

    /// Extra compiler flags from config and environment
    pub cflags: Vec<String>,

    /// Extra linker flags from config and environment
    pub ldflags: Vec<String>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("toolchain", &self.toolchain.platform())
            .field("cc", &self.toolchain.compiler_path())
            .field("cxx", &self.toolchain.cxx_compiler_path())
            .field("generator", &self.generator.program())
            .field("python", &self.python)
            .field("base_dir", &self.base_dir)
            .field("build_dir", &self.build_dir)
            .field("cflags", &self.cflags)
            .field("ldflags", &self.ldflags)
            .finish()
    }
}

impl BuildContext {
    /// Create a context building under `<base_dir>/build`.
    pub fn new(
        toolchain: Arc<dyn Toolchain>,
        generator: Arc<dyn Generator>,
        python: HostPython,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        let base_dir = base_dir.into();
        BuildContext {
            toolchain,
            generator,
            python,
            build_dir: base_dir.join(DEFAULT_BUILD_DIR),
            base_dir,
            cflags: Vec::new(),
            ldflags: Vec::new(),
        }
    }

    /// Override the build directory; relative paths are taken from the base directory.
    pub fn with_build_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.build_dir = crate::util::fs::resolve_against(&self.base_dir, dir.as_ref());
        self
    }

    /// Append extra compiler and linker flags.
    pub fn with_flags(mut self, cflags: Vec<String>, ldflags: Vec<String>) -> Self {
        self.cflags.extend(cflags);
        self.ldflags.extend(ldflags);
        self
    }

    /// Get the toolchain.
    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }

    /// Get the generator.
    pub fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    /// Directory for generated native sources.
    pub fn gen_dir(&self) -> PathBuf {
        self.build_dir.join("temp").join("gen")
    }

    /// Directory for object files.
    pub fn obj_dir(&self) -> PathBuf {
        self.build_dir.join("temp").join("obj")
    }

    /// Directory for finished modules.
    pub fn lib_dir(&self) -> PathBuf {
        self.build_dir.join("lib")
    }
}

//! Source generation commands.
//!
//! A generator translates one interface-source file into one compilable
//! native source file. Only its command line is known here; how it does the
//! translation is its own business.

use std::path::{Path, PathBuf};

use crate::builder::toolchain::CommandSpec;
use crate::core::extension::Language;
use crate::core::manifest::GeneratorConfig;

/// Input for a generation step.
#[derive(Debug, Clone)]
pub struct GenerateInput {
    /// Interface-source file
    pub interface_source: PathBuf,
    /// Generated native source file
    pub output: PathBuf,
    /// Fully qualified name of the module being built
    pub module_name: String,
    /// Directories searched for included interface declarations
    pub include_dirs: Vec<PathBuf>,
    /// Language to emit
    pub language: Language,
}

/// Trait for source generators.
pub trait Generator: Send + Sync {
    /// Executable name or path.
    fn program(&self) -> &Path;

    /// Generate the command that produces `input.output`.
    fn generate_command(&self, input: &GenerateInput) -> CommandSpec;
}

/// Cython-compatible generator:
/// `cython [args] [--cplus] -I<dir>... --module-name <name> <src> -o <out>`.
///
/// Without `--module-name`, Cython derives the init symbol from the source
/// file name.
#[derive(Debug, Clone)]
pub struct CythonGenerator {
    program: PathBuf,
    args: Vec<String>,
}

impl CythonGenerator {
    /// Create a generator for the given executable.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        CythonGenerator {
            program: program.into(),
            args,
        }
    }

    /// Create a generator from the manifest's `[generator]` section.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

impl Generator for CythonGenerator {
    fn program(&self) -> &Path {
        &self.program
    }

    fn generate_command(&self, input: &GenerateInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.program).args(self.args.iter().cloned());

        if input.language == Language::Cxx {
            cmd = cmd.arg("--cplus");
        }

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd.arg("--module-name")
            .arg(&input.module_name)
            .arg(input.interface_source.display().to_string())
            .arg("-o")
            .arg(input.output.display().to_string())
    }
}

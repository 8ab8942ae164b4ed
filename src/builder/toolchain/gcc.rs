//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::extension::Language;

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainPlatform};

/// GCC/Clang toolchain (Unix-like systems).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler
    pub cc: PathBuf,
    /// Path to the C++ compiler
    pub cxx: PathBuf,
    /// Compiler family (gcc, clang, apple-clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, cxx: PathBuf, family: ToolchainPlatform) -> Self {
        GccToolchain { cc, cxx, family }
    }

    /// Infer C++ compiler path from C compiler path.
    ///
    /// Handles common patterns:
    /// - gcc, x86_64-linux-gnu-gcc -> g++, x86_64-linux-gnu-g++
    /// - clang -> clang++
    /// - cc, /usr/bin/cc -> c++, /usr/bin/c++
    pub fn infer_cxx(cc: &Path) -> PathBuf {
        let cc_str = cc.to_string_lossy();

        if let Some(prefix) = cc_str.strip_suffix("gcc") {
            return PathBuf::from(format!("{}g++", prefix));
        }

        if cc_str.ends_with("clang") {
            return PathBuf::from(format!("{}++", cc_str));
        }

        // Only a complete "cc" basename maps to "c++" ("mycc" does not).
        let is_standalone_cc = cc_str == "cc"
            || cc_str.ends_with("/cc")
            || cc_str.ends_with("\\cc")
            || cc_str.ends_with("-cc");

        if let Some(prefix) = cc_str.strip_suffix("cc").filter(|_| is_standalone_cc) {
            return PathBuf::from(format!("{}c++", prefix));
        }

        PathBuf::from(format!("{}++", cc_str))
    }

    fn driver(&self, lang: Language) -> &Path {
        match lang {
            Language::C => &self.cc,
            Language::Cxx => &self.cxx,
        }
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn cxx_compiler_path(&self) -> &Path {
        &self.cxx
    }

    fn compile_command(&self, input: &CompileInput, lang: Language) -> CommandSpec {
        let mut cmd = CommandSpec::new(self.driver(lang)).arg("-c");

        // Extension modules are always loaded as shared objects.
        if !cfg!(target_os = "windows") {
            cmd = cmd.arg("-fPIC");
        }

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        for (name, value) in &input.defines {
            match value {
                Some(v) => cmd = cmd.arg(format!("-D{}={}", name, v)),
                None => cmd = cmd.arg(format!("-D{}", name)),
            }
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd.arg(input.source.display().to_string())
            .arg("-o")
            .arg(input.output.display().to_string())
    }

    fn link_module_command(&self, input: &LinkInput, driver: Language) -> CommandSpec {
        let mut cmd = CommandSpec::new(self.driver(driver));

        // Interpreter symbols are resolved at load time.
        cmd = if self.family == ToolchainPlatform::AppleClang {
            cmd.args(["-bundle", "-undefined", "dynamic_lookup"])
        } else {
            cmd.arg("-shared")
        };

        cmd = cmd.arg("-o").arg(input.output.display().to_string());

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        // Order is significant for single-pass linkers.
        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd.args(input.ldflags.iter().cloned())
    }

    fn object_extension(&self) -> &str {
        "o"
    }
}

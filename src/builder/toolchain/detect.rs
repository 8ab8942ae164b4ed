//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::util::config::ToolchainSettings;
use crate::util::process::{find_c_compiler, find_executable};

use super::{GccToolchain, Toolchain, ToolchainPlatform};

/// Detect the toolchain to build with.
///
/// A configured `cc` is used as given, so a missing compiler surfaces as a
/// compile failure of the first target rather than a detection error.
/// Otherwise `CC`/`CXX` and then PATH are consulted.
pub fn detect_toolchain(settings: &ToolchainSettings) -> Result<Box<dyn Toolchain>> {
    if let Some(cc) = &settings.cc {
        let cxx = settings
            .cxx
            .clone()
            .unwrap_or_else(|| GccToolchain::infer_cxx(cc));
        let family = detect_compiler_family(cc);

        tracing::info!(
            "Using toolchain from config: cc={}, cxx={}",
            cc.display(),
            cxx.display()
        );
        return Ok(Box::new(GccToolchain::new(cc.clone(), cxx, family)));
    }

    if let Some(cc) = find_c_compiler() {
        let cxx = settings
            .cxx
            .clone()
            .or_else(|| std::env::var("CXX").ok().map(PathBuf::from))
            .or_else(|| find_executable(&GccToolchain::infer_cxx(&cc).to_string_lossy()))
            .unwrap_or_else(|| GccToolchain::infer_cxx(&cc));
        let family = detect_compiler_family(&cc);

        tracing::debug!(
            "Detected {} toolchain: cc={}",
            family.as_str(),
            cc.display()
        );
        return Ok(Box::new(GccToolchain::new(cc, cxx, family)));
    }

    bail!(
        "no C compiler found\n\
         \n\
         extbuild requires a C compiler (gcc or clang).\n\
         Set the CC environment variable, set `[toolchain] cc` in .extbuild/config.toml,\n\
         or install a compiler."
    )
}

/// Detect the compiler family from its name, falling back to `--version`.
pub fn detect_compiler_family(cc: &Path) -> ToolchainPlatform {
    let name = cc
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name.contains("gcc") || name.contains("g++") {
        return ToolchainPlatform::Gcc;
    }

    let version = std::process::Command::new(cc)
        .arg("--version")
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).to_lowercase())
        .unwrap_or_default();

    if version.contains("apple") && version.contains("clang") {
        ToolchainPlatform::AppleClang
    } else if version.contains("clang") || name.contains("clang") {
        ToolchainPlatform::Clang
    } else {
        ToolchainPlatform::Gcc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_name() {
        assert_eq!(
            detect_compiler_family(Path::new("x86_64-linux-gnu-gcc")),
            ToolchainPlatform::Gcc
        );
    }

    #[test]
    fn test_unknown_compiler_defaults_to_gcc() {
        assert_eq!(
            detect_compiler_family(Path::new("/nonexistent/compiler-7f3a")),
            ToolchainPlatform::Gcc
        );
    }

    #[test]
    fn test_configured_cc_is_used_as_given() {
        let settings = ToolchainSettings {
            cc: Some(PathBuf::from("/nonexistent/gcc")),
            ..Default::default()
        };
        let tc = detect_toolchain(&settings).unwrap();
        assert_eq!(tc.compiler_path(), Path::new("/nonexistent/gcc"));
        assert_eq!(tc.cxx_compiler_path(), Path::new("/nonexistent/g++"));
        assert_eq!(tc.platform(), ToolchainPlatform::Gcc);
    }

    #[test]
    fn test_configured_cxx_wins() {
        let settings = ToolchainSettings {
            cc: Some(PathBuf::from("/nonexistent/gcc")),
            cxx: Some(PathBuf::from("/opt/g++-13")),
            ..Default::default()
        };
        let tc = detect_toolchain(&settings).unwrap();
        assert_eq!(tc.cxx_compiler_path(), Path::new("/opt/g++-13"));
    }
}

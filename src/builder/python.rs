//! Host interpreter settings for extension modules.
//!
//! The loadable module needs the interpreter's headers at compile time and
//! the interpreter's extension suffix in its file name.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::runner::ToolRunner;
use crate::builder::toolchain::CommandSpec;
use crate::util::config::PythonConfig;
use crate::util::process::find_executable;

/// Prints the include directory, then the extension suffix.
const PROBE_SCRIPT: &str = "import sysconfig; \
print(sysconfig.get_paths()['include']); \
print(sysconfig.get_config_var('EXT_SUFFIX') or '')";

/// Resolved interpreter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostPython {
    /// Header directories appended after each target's own include dirs
    pub include_dirs: Vec<PathBuf>,
    /// Module file suffix, including the leading dot
    pub ext_suffix: String,
}

impl Default for HostPython {
    fn default() -> Self {
        HostPython {
            include_dirs: Vec::new(),
            ext_suffix: default_ext_suffix().to_string(),
        }
    }
}

/// Platform fallback for the module suffix.
pub fn default_ext_suffix() -> &'static str {
    if cfg!(target_os = "windows") {
        ".pyd"
    } else {
        ".so"
    }
}

impl HostPython {
    /// Create settings from explicit values.
    pub fn new(include_dirs: Vec<PathBuf>, ext_suffix: impl Into<String>) -> Self {
        HostPython {
            include_dirs,
            ext_suffix: ext_suffix.into(),
        }
    }

    /// Resolve settings from config, probing the interpreter for missing values.
    ///
    /// A failed probe is not fatal: the build continues with no extra include
    /// directory and the platform default suffix.
    pub fn resolve(config: &PythonConfig, runner: &dyn ToolRunner, cwd: &Path) -> Self {
        if let (Some(include_dirs), Some(ext_suffix)) = (&config.include_dirs, &config.ext_suffix)
        {
            return HostPython::new(include_dirs.clone(), ext_suffix.clone());
        }

        let probed = Self::probe(config, runner, cwd).unwrap_or_else(|reason| {
            tracing::warn!(
                "Could not query the Python interpreter ({}); using defaults",
                reason
            );
            HostPython::default()
        });

        HostPython {
            include_dirs: config
                .include_dirs
                .clone()
                .unwrap_or(probed.include_dirs),
            ext_suffix: config.ext_suffix.clone().unwrap_or(probed.ext_suffix),
        }
    }

    fn probe(config: &PythonConfig, runner: &dyn ToolRunner, cwd: &Path) -> Result<Self, String> {
        let interpreter = config
            .interpreter
            .clone()
            .or_else(|| find_executable("python3"))
            .or_else(|| find_executable("python"))
            .ok_or_else(|| "no python3 or python in PATH".to_string())?;

        let cmd = CommandSpec::new(&interpreter).arg("-c").arg(PROBE_SCRIPT);
        let output = runner.run(&cmd, cwd).map_err(|e| format!("{:#}", e))?;
        if !output.is_success() {
            return Err(format!("`{}` exited with {:?}", interpreter.display(), output.status));
        }

        Ok(parse_probe_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_probe_output(stdout: &str) -> HostPython {
    let mut lines = stdout.lines().map(str::trim);
    let include = lines.next().filter(|l| !l.is_empty());
    let suffix = lines.next().filter(|l| !l.is_empty());

    HostPython {
        include_dirs: include.map(PathBuf::from).into_iter().collect(),
        ext_suffix: suffix.unwrap_or(default_ext_suffix()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::runner::ToolOutput;
    use crate::test_support::RecordingRunner;

    #[test]
    fn test_parse_probe_output() {
        let host = parse_probe_output(
            "/usr/include/python3.12\n.cpython-312-x86_64-linux-gnu.so\n",
        );
        assert_eq!(host.include_dirs, vec![PathBuf::from("/usr/include/python3.12")]);
        assert_eq!(host.ext_suffix, ".cpython-312-x86_64-linux-gnu.so");
    }

    #[test]
    fn test_parse_probe_output_missing_suffix() {
        let host = parse_probe_output("/usr/include/python3.12\n\n");
        assert_eq!(host.ext_suffix, default_ext_suffix());
    }

    #[test]
    fn test_configured_values_skip_probe() {
        let runner = RecordingRunner::new();
        let config = PythonConfig {
            interpreter: None,
            include_dirs: Some(vec![PathBuf::from("/inc")]),
            ext_suffix: Some(".abi3.so".to_string()),
        };

        let host = HostPython::resolve(&config, &runner, Path::new("."));
        assert_eq!(host, HostPython::new(vec![PathBuf::from("/inc")], ".abi3.so"));
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn test_probe_through_runner() {
        let runner = RecordingRunner::new().respond(
            "python-test",
            ToolOutput {
                status: Some(0),
                stdout: b"/opt/py/include\n.cpython-311-darwin.so\n".to_vec(),
                stderr: Vec::new(),
            },
        );
        let config = PythonConfig {
            interpreter: Some(PathBuf::from("python-test")),
            include_dirs: None,
            ext_suffix: Some(".so".to_string()),
        };

        let host = HostPython::resolve(&config, &runner, Path::new("."));
        assert_eq!(host.include_dirs, vec![PathBuf::from("/opt/py/include")]);
        // Configured suffix beats the probed one.
        assert_eq!(host.ext_suffix, ".so");
        assert_eq!(runner.invocations().len(), 1);
    }

    #[test]
    fn test_failed_probe_falls_back() {
        let runner = RecordingRunner::new().fail("python-test", 1, "no sysconfig");
        let config = PythonConfig {
            interpreter: Some(PathBuf::from("python-test")),
            ..Default::default()
        };

        let host = HostPython::resolve(&config, &runner, Path::new("."));
        assert_eq!(host, HostPython::default());
    }
}

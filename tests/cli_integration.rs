//! CLI integration tests for extbuild.
//!
//! These tests drive the binary end to end. Real compilers are never needed:
//! the project config pins the compiler and interpreter settings, and on unix
//! the tools themselves are replaced by small shell scripts.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Config that avoids compiler detection and the interpreter probe.
const PINNED_CONFIG: &str = r#"[toolchain]
cc = "cc"
cxx = "c++"

[python]
include-dirs = []
ext-suffix = ".so"
"#;

const CVSU_MANIFEST: &str = r#"[package]
name = "cvsu"
version = "0.0.1"

[[extension]]
name = "cvsu"
interface-source = "cvsu.pyx"
libraries = ["cvsu"]
include-dirs = ["."]
"#;

/// Get the extbuild binary command, isolated from the user's global config.
fn extbuild(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("extbuild").unwrap();
    cmd.env("HOME", home)
        .env_remove("CFLAGS")
        .env_remove("LDFLAGS")
        .env_remove("EXTBUILD_BUILD_DIR");
    cmd
}

/// A project directory with pinned config.
fn project(manifest: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("ExtBuild.toml"), manifest).unwrap();
    write_config(tmp.path(), PINNED_CONFIG);
    tmp
}

fn write_config(root: &Path, content: &str) {
    fs::create_dir_all(root.join(".extbuild")).unwrap();
    fs::write(root.join(".extbuild/config.toml"), content).unwrap();
}

// ============================================================================
// extbuild build
// ============================================================================

#[test]
fn test_build_without_manifest_fails() {
    let tmp = TempDir::new().unwrap();

    extbuild(tmp.path())
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find `ExtBuild.toml`"));
}

#[test]
fn test_build_zero_targets_succeeds() {
    let tmp = project("[package]\nname = \"empty\"\nversion = \"0.0.1\"\n");

    extbuild(tmp.path())
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished 0 extensions"));
}

#[test]
fn test_build_missing_interface_source() {
    let tmp = project(CVSU_MANIFEST);

    extbuild(tmp.path())
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "source generation failed for target `cvsu`",
        ))
        .stderr(predicate::str::contains("cvsu.pyx"));

    assert!(!tmp.path().join("build/lib").exists());
}

#[test]
fn test_build_invalid_extension_name() {
    let tmp = project(
        r#"[package]
name = "cvsu"
version = "0.0.1"

[[extension]]
name = "not-a-module"
interface-source = "cvsu.pyx"
"#,
    );

    extbuild(tmp.path())
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"))
        .stderr(predicate::str::contains("not-a-module"));
}

#[test]
fn test_build_duplicate_targets() {
    let tmp = project(
        r#"[package]
name = "cvsu"
version = "0.0.1"

[[extension]]
name = "cvsu"
interface-source = "a.pyx"

[[extension]]
name = "cvsu"
interface-source = "b.pyx"
"#,
    );

    extbuild(tmp.path())
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("declared twice"));
}

#[test]
fn test_build_plan_is_json() {
    let tmp = project(CVSU_MANIFEST);

    let output = extbuild(tmp.path())
        .args(["build", "--plan"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["package_id"], "cvsu v0.0.1");
    assert_eq!(plan["targets"][0]["name"], "cvsu");
    assert!(plan["targets"][0]["link"]["args"]
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a == "-lcvsu"));

    // Planning never touches the build directory
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_build_manifest_path_from_elsewhere() {
    let tmp = project("[package]\nname = \"empty\"\nversion = \"0.0.1\"\n");
    let elsewhere = TempDir::new().unwrap();

    extbuild(tmp.path())
        .args(["build", "--plan", "--manifest-path"])
        .arg(tmp.path().join("ExtBuild.toml"))
        .current_dir(elsewhere.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"package_id\": \"empty v0.0.1\""));
}

#[test]
fn test_unknown_message_format() {
    let tmp = project(CVSU_MANIFEST);

    extbuild(tmp.path())
        .args(["build", "--message-format", "xml"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown message format"));
}

// ============================================================================
// extbuild build with stand-in tools
// ============================================================================

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Writes a placeholder to the path following `-o`.
    const WRITE_OUTPUT: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
[ -z "$out" ] && exit 0
mkdir -p "$(dirname "$out")"
echo "stand-in output" > "$out"
"#;

    const FAIL_COMPILE: &str = r#"#!/bin/sh
for arg in "$@"; do
  if [ "$arg" = "-c" ]; then
    echo "cvsu.c:4:10: fatal error: cvsu.h: No such file or directory" >&2
    exit 1
  fi
done
exit 0
"#;

    fn script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    /// A cvsu project whose generator and compiler are shell scripts.
    fn fake_project(cc_body: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let cython = script(tmp.path(), "fake-cython", WRITE_OUTPUT);
        let cc = script(tmp.path(), "fake-cc", cc_body);

        fs::write(
            tmp.path().join("ExtBuild.toml"),
            format!("{CVSU_MANIFEST}\n[generator]\nprogram = \"{cython}\"\n"),
        )
        .unwrap();
        fs::write(tmp.path().join("cvsu.pyx"), "def version():\n    return 1\n").unwrap();
        write_config(
            tmp.path(),
            &format!(
                "[toolchain]\ncc = \"{cc}\"\ncxx = \"{cc}\"\n\n[python]\ninclude-dirs = []\next-suffix = \".so\"\n"
            ),
        );
        tmp
    }

    #[test]
    fn test_build_produces_module() {
        let tmp = fake_project(WRITE_OUTPUT);

        extbuild(tmp.path())
            .arg("build")
            .current_dir(tmp.path())
            .assert()
            .success()
            .stderr(predicate::str::contains("Finished `cvsu`"));

        assert!(tmp.path().join("build/temp/gen/cvsu.c").is_file());
        assert!(tmp.path().join("build/temp/obj/cvsu.o").is_file());
        assert!(tmp.path().join("build/lib/cvsu.so").is_file());
    }

    #[test]
    fn test_verbose_build_prints_digest_once_per_command() {
        let tmp = fake_project(WRITE_OUTPUT);

        let output = extbuild(tmp.path())
            .args(["-v", "build"])
            .current_dir(tmp.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("sha256 "));
        let link_lines = stderr
            .lines()
            .filter(|l| l.contains("Running") && l.contains("cvsu.so"))
            .count();
        assert_eq!(link_lines, 1);
    }

    #[test]
    fn test_build_json_events() {
        let tmp = fake_project(WRITE_OUTPUT);

        let output = extbuild(tmp.path())
            .args(["build", "--message-format", "json"])
            .current_dir(tmp.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let reasons: Vec<String> = stdout
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["reason"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(
            reasons,
            vec!["build-started", "compiler-artifact", "build-finished"]
        );
    }

    #[test]
    fn test_compile_failure_shows_tool_output() {
        let tmp = fake_project(FAIL_COMPILE);

        extbuild(tmp.path())
            .arg("build")
            .current_dir(tmp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("compilation failed for target `cvsu`"))
            .stderr(predicate::str::contains(
                "cvsu.c:4:10: fatal error: cvsu.h: No such file or directory",
            ));

        assert!(tmp.path().join("build/temp/gen/cvsu.c").is_file());
        assert!(!tmp.path().join("build/lib/cvsu.so").exists());
    }

    #[test]
    fn test_rebuild_is_stable() {
        let tmp = fake_project(WRITE_OUTPUT);
        let module = tmp.path().join("build/lib/cvsu.so");

        extbuild(tmp.path())
            .arg("build")
            .current_dir(tmp.path())
            .assert()
            .success();
        let first = fs::read(&module).unwrap();

        extbuild(tmp.path())
            .arg("build")
            .current_dir(tmp.path())
            .assert()
            .success();
        assert_eq!(first, fs::read(&module).unwrap());
    }
}

// ============================================================================
// extbuild clean
// ============================================================================

#[test]
fn test_clean_without_build_dir_warns() {
    let tmp = project(CVSU_MANIFEST);

    extbuild(tmp.path())
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: nothing to clean"));
}

#[test]
fn test_clean_refuses_parent_build_dir() {
    let outer = TempDir::new().unwrap();
    let proj = outer.path().join("proj");
    fs::create_dir_all(&proj).unwrap();
    fs::write(proj.join("ExtBuild.toml"), CVSU_MANIFEST).unwrap();
    write_config(&proj, PINNED_CONFIG);

    extbuild(outer.path())
        .args(["clean", "--build-dir", ".."])
        .current_dir(&proj)
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to remove"));

    assert!(proj.join("ExtBuild.toml").exists());
}

#[test]
fn test_clean_removes_build_dir() {
    let tmp = project(CVSU_MANIFEST);
    fs::create_dir_all(tmp.path().join("build/lib")).unwrap();
    fs::write(tmp.path().join("build/lib/cvsu.so"), "").unwrap();

    extbuild(tmp.path())
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed"));

    assert!(!tmp.path().join("build").exists());
    assert!(tmp.path().join("ExtBuild.toml").exists());
}

// ============================================================================
// extbuild init
// ============================================================================

#[test]
fn test_init_creates_manifest() {
    let tmp = TempDir::new().unwrap();

    extbuild(tmp.path())
        .args(["init", "cvsu"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Initialized extension package `cvsu`"));

    let manifest = fs::read_to_string(tmp.path().join("cvsu/ExtBuild.toml")).unwrap();
    assert!(manifest.contains("name = \"cvsu\""));
    assert!(manifest.contains("interface-source = \"cvsu.pyx\""));
    assert!(tmp.path().join("cvsu/cvsu.pyx").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = TempDir::new().unwrap();

    extbuild(tmp.path())
        .args(["init", "--name", "cvsu"])
        .current_dir(tmp.path())
        .assert()
        .success();

    extbuild(tmp.path())
        .args(["init", "--name", "cvsu"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_then_plan() {
    let tmp = TempDir::new().unwrap();

    extbuild(tmp.path())
        .args(["init", "--name", "cvsu"])
        .current_dir(tmp.path())
        .assert()
        .success();
    write_config(tmp.path(), PINNED_CONFIG);

    extbuild(tmp.path())
        .args(["build", "--plan"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"package_id\": \"cvsu v0.1.0\""));
}

// ============================================================================
// extbuild completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    extbuild(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extbuild"));
}

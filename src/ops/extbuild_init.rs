//! Implementation of `extbuild init`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::manifest::{generate_default_manifest, MANIFEST_NAME};
use crate::core::module_name::validate_module_name;
use crate::util::fs::{ensure_dir, write_string};

/// Options for initializing a project.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Package and extension name; defaults to the directory name
    pub name: Option<String>,
}

/// Files written by `init`.
#[derive(Debug, Clone)]
pub struct InitResult {
    /// Package name used
    pub name: String,
    /// Path of the new descriptor
    pub manifest_path: PathBuf,
    /// Interface source stub, if one was created
    pub interface_source: Option<PathBuf>,
}

/// Initialize an extension project in `path`, creating the directory if needed.
pub fn init_project(path: &Path, opts: &InitOptions) -> Result<InitResult> {
    let name = match &opts.name {
        Some(name) => name.clone(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().replace('-', "_"))
            .context("cannot infer a package name from the path; pass --name")?,
    };

    if let Err(reason) = validate_module_name(&name) {
        bail!("invalid package name `{}`: {}", name, reason);
    }

    let manifest_path = path.join(MANIFEST_NAME);
    if manifest_path.exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_NAME, path.display());
    }

    ensure_dir(path)?;
    write_string(&manifest_path, &generate_default_manifest(&name))?;

    // Keep an existing interface source untouched.
    let source_path = path.join(format!("{}.pyx", name));
    let interface_source = if source_path.exists() {
        None
    } else {
        let stub = format!(
            r#"cdef extern from "{name}.h":
    pass
"#
        );
        write_string(&source_path, &stub)?;
        Some(source_path)
    };

    Ok(InitResult {
        name,
        manifest_path,
        interface_source,
    })
}

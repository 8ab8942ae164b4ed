//! `extbuild init` command

use std::path::Path;

use anyhow::Result;

use crate::cli::InitArgs;
use extbuild::ops::extbuild_init::{init_project, InitOptions};
use extbuild::util::fs::resolve_against;
use extbuild::util::GlobalContext;

pub fn execute(args: InitArgs, gctx: &GlobalContext) -> Result<()> {
    let path = args.path.as_deref().unwrap_or(Path::new("."));
    let path = resolve_against(gctx.cwd(), path);

    let opts = InitOptions { name: args.name };
    let result = init_project(&path, &opts)?;

    eprintln!("     Created {}", result.manifest_path.display());
    if let Some(source) = &result.interface_source {
        eprintln!("     Created {}", source.display());
    }
    eprintln!("     Initialized extension package `{}`", result.name);

    Ok(())
}

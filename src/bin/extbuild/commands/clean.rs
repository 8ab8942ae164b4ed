//! `extbuild clean` command

use anyhow::{anyhow, Result};

use crate::cli::CleanArgs;
use extbuild::ops::extbuild_clean::{clean, CleanOptions};
use extbuild::util::diagnostic::{emit, Diagnostic};
use extbuild::util::GlobalContext;

pub fn execute(args: CleanArgs, gctx: &GlobalContext) -> Result<()> {
    let manifest_path = gctx.find_manifest(args.manifest_path.as_deref())?;
    let project_root = manifest_path
        .parent()
        .ok_or_else(|| anyhow!("manifest path has no parent directory"))?;
    let config = gctx.load_config(project_root);

    let opts = CleanOptions {
        build_dir: args.build_dir,
        temp_only: args.temp,
    };
    let result = clean(project_root, &config, &opts)?;
    if result.removed {
        eprintln!("     Removed {}", result.path.display());
    } else {
        emit(
            &Diagnostic::warning(format!(
                "nothing to clean: `{}` does not exist",
                result.path.display()
            )),
            gctx.color(),
        );
    }

    Ok(())
}

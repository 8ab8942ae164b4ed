//! `extbuild build` command

use std::io::{self, Write};

use anyhow::{anyhow, bail, Context, Result};

use crate::cli::BuildArgs;
use extbuild::builder::{BuildEvent, MessageFormat, ProcessRunner};
use extbuild::core::BuildError;
use extbuild::ops::extbuild_build::{build, plan, BuildOptions};
use extbuild::util::diagnostic::emit;
use extbuild::util::GlobalContext;

pub fn execute(args: BuildArgs, gctx: &GlobalContext) -> Result<()> {
    let manifest_path = gctx.find_manifest(args.manifest_path.as_deref())?;
    let project_root = manifest_path
        .parent()
        .ok_or_else(|| anyhow!("manifest path has no parent directory"))?;

    // Load configuration (global + project)
    let config = gctx.load_config(project_root);

    // Message format: CLI overrides config
    let format = args
        .message_format
        .as_deref()
        .or(config.build.message_format.as_deref())
        .map(|s| s.parse::<MessageFormat>())
        .transpose()
        .map_err(|e| anyhow!("{}", e))?
        .unwrap_or_default();

    let opts = BuildOptions {
        build_dir: args.build_dir,
        progress: format == MessageFormat::Human && gctx.color(),
    };
    let runner = ProcessRunner;

    if args.plan {
        let plan = match plan(&manifest_path, &config, &opts, &runner) {
            Ok(plan) => plan,
            Err(err) => return fail(&err, gctx),
        };
        let json = plan
            .to_json_pretty()
            .context("failed to serialize the build plan")?;
        println!("{}", json);
        return Ok(());
    }

    let print_json = |event: &BuildEvent| println!("{}", event.to_json());
    let events: Option<&dyn Fn(&BuildEvent)> = match format {
        MessageFormat::Json => Some(&print_json),
        MessageFormat::Human => None,
    };

    let report = match build(&manifest_path, &config, &opts, &runner, events) {
        Ok(report) => report,
        Err(err) => return fail(&err, gctx),
    };

    let duration = report.duration;
    match report.into_result() {
        Ok(artifacts) => {
            if format == MessageFormat::Human {
                for artifact in &artifacts {
                    eprintln!(
                        "    Finished `{}` -> {}",
                        artifact.target,
                        artifact.path.display()
                    );
                    if gctx.is_verbose() {
                        eprintln!("             sha256 {}", artifact.digest);
                    }
                }
                eprintln!(
                    "    Finished {} extension{} in {:.2}s",
                    artifacts.len(),
                    if artifacts.len() == 1 { "" } else { "s" },
                    duration.as_secs_f64()
                );
            }
            Ok(())
        }
        Err(err) => fail(&err, gctx),
    }
}

/// Report a build error, then the failing tool's output exactly as it printed it.
fn fail(err: &BuildError, gctx: &GlobalContext) -> Result<()> {
    emit(&err.to_diagnostic(), gctx.color());

    if let Some(failure) = err.tool_failure() {
        if !failure.output.is_empty() {
            let mut stderr = io::stderr().lock();
            stderr.write_all(b"\n")?;
            stderr.write_all(&failure.output)?;
            if !failure.output.ends_with(b"\n") {
                stderr.write_all(b"\n")?;
            }
            stderr.flush()?;
        }
    }

    match err.target() {
        Some(target) => bail!("could not build extension `{}`", target),
        None => bail!("could not configure the build"),
    }
}

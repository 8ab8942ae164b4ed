//! Implementation of `extbuild build`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::{
    detect_toolchain, BuildContext, BuildEvent, BuildExecutor, BuildPlan, BuildReport,
    CythonGenerator, HostPython, ToolRunner,
};
use crate::core::{BuildError, Manifest};
use crate::util::config::Config;
use crate::util::fs::{normalize_path, resolve_against};
use crate::util::process::env_flags;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build directory override (beats config)
    pub build_dir: Option<PathBuf>,

    /// Show a progress bar
    pub progress: bool,
}

/// Build directory for a project: CLI flag, then config, then `<root>/build`.
/// The result is lexically normalized.
pub fn resolve_build_dir(manifest_dir: &Path, config: &Config, opts: &BuildOptions) -> PathBuf {
    let dir = match opts.build_dir.as_ref().or(config.build.build_dir.as_ref()) {
        Some(dir) => resolve_against(manifest_dir, dir),
        None => manifest_dir.join(crate::builder::context::DEFAULT_BUILD_DIR),
    };
    normalize_path(&dir)
}

/// Assemble the build context for a loaded descriptor.
///
/// `runner` is only used to query the host interpreter.
pub fn build_context(
    manifest: &Manifest,
    config: &Config,
    opts: &BuildOptions,
    runner: &dyn ToolRunner,
) -> Result<BuildContext, BuildError> {
    if config.toolchain.has_overrides() {
        tracing::debug!("Toolchain overrides from config: {:?}", config.toolchain);
    }
    let toolchain =
        detect_toolchain(&config.toolchain).map_err(|e| BuildError::config(format!("{:#}", e)))?;
    let generator = CythonGenerator::from_config(&manifest.generator);
    let python = HostPython::resolve(&config.python, runner, &manifest.manifest_dir);

    let mut cflags = config.toolchain.cflags.clone();
    cflags.extend(env_flags("CFLAGS"));
    let mut ldflags = config.toolchain.ldflags.clone();
    ldflags.extend(env_flags("LDFLAGS"));

    let ctx = BuildContext::new(
        Arc::from(toolchain),
        Arc::new(generator),
        python,
        manifest.manifest_dir.clone(),
    )
    .with_build_dir(resolve_build_dir(&manifest.manifest_dir, config, opts))
    .with_flags(cflags, ldflags);

    tracing::debug!("Build context: {:?}", ctx);
    Ok(ctx)
}

/// Load a descriptor and configure its build plan. No target is built.
pub fn plan(
    manifest_path: &Path,
    config: &Config,
    opts: &BuildOptions,
    runner: &dyn ToolRunner,
) -> Result<BuildPlan, BuildError> {
    let manifest = Manifest::load(manifest_path)?;
    let ctx = build_context(&manifest, config, opts, runner)?;
    BuildPlan::configure(&manifest, &ctx)
}

/// Configure and build every target of a descriptor.
///
/// Configuration problems are returned as `Err`. Once configured, the
/// outcome of the build itself (including the first failure) is in the
/// returned report.
pub fn build<'a>(
    manifest_path: &Path,
    config: &Config,
    opts: &BuildOptions,
    runner: &'a dyn ToolRunner,
    events: Option<&'a dyn Fn(&BuildEvent)>,
) -> Result<BuildReport, BuildError> {
    let plan = plan(manifest_path, config, opts, runner)?;

    tracing::info!(
        "Building {} ({} extension{})",
        plan.package_id,
        plan.target_count(),
        if plan.target_count() == 1 { "" } else { "s" }
    );

    let mut executor = BuildExecutor::new(runner).progress(opts.progress);
    if let Some(sink) = events {
        executor = executor.with_events(sink);
    }
    Ok(executor.execute(&plan))
}

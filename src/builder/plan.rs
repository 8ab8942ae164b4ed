//! Build plan generation.
//!
//! A BuildPlan is the in-memory result of configuring a descriptor: for each
//! extension target, in declaration order, the concrete generate, compile and
//! link commands plus every path they read or write. Configuring performs no
//! I/O and runs no tools.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::context::BuildContext;
use crate::builder::generator::GenerateInput;
use crate::builder::toolchain::{CommandSpec, CompileInput, LinkInput};
use crate::core::errors::BuildError;
use crate::core::extension::{ExtensionTarget, Language};
use crate::core::manifest::Manifest;
use crate::core::module_name::segments;
use crate::util::fs::resolve_against;

/// A complete build plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Package identifier, e.g. `cvsu v0.0.1`
    pub package_id: String,

    /// Base directory tools are run from
    pub base_dir: PathBuf,

    /// Root of intermediates and outputs
    pub build_dir: PathBuf,

    /// Targets in declaration order
    pub targets: Vec<TargetPlan>,
}

/// Everything needed to build one extension target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPlan {
    /// Target name
    pub name: String,

    /// Language of the generated source
    pub language: Language,

    /// Interface-source file
    pub interface_source: PathBuf,

    /// Generated native source (intermediate)
    pub generated_source: PathBuf,

    /// Object file (intermediate)
    pub object: PathBuf,

    /// Loadable module (final artifact)
    pub module: PathBuf,

    /// Source generation command
    pub generate: CommandSpec,

    /// Compile command
    pub compile: CommandSpec,

    /// Link command
    pub link: CommandSpec,
}

impl BuildPlan {
    /// Configure a plan from a descriptor.
    pub fn configure(manifest: &Manifest, ctx: &BuildContext) -> Result<Self, BuildError> {
        manifest.validate()?;

        let targets = manifest
            .extensions
            .iter()
            .map(|ext| TargetPlan::configure(ext, ctx))
            .collect();

        Ok(BuildPlan {
            package_id: manifest.package.package_id(),
            base_dir: ctx.base_dir.clone(),
            build_dir: ctx.build_dir.clone(),
            targets,
        })
    }

    /// Number of targets in the plan.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Option<&TargetPlan> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Serialize the plan as pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl TargetPlan {
    fn configure(ext: &ExtensionTarget, ctx: &BuildContext) -> Self {
        let base = &ctx.base_dir;
        let interface_source = ext.interface_source_in(base);
        let generated_source = ctx
            .gen_dir()
            .join(format!("{}.{}", ext.name, ext.language.source_extension()));
        let object = ctx.obj_dir().join(format!(
            "{}.{}",
            ext.name,
            ctx.toolchain().object_extension()
        ));
        let module = module_path(&ctx.lib_dir(), &ext.name, &ctx.python.ext_suffix);

        let include_dirs: Vec<PathBuf> = ext
            .include_dirs
            .iter()
            .map(|d| resolve_against(base, d))
            .collect();

        let generate = ctx.generator().generate_command(&GenerateInput {
            interface_source: interface_source.clone(),
            output: generated_source.clone(),
            module_name: ext.name.clone(),
            include_dirs: include_dirs.clone(),
            language: ext.language,
        });

        let mut compile_includes = include_dirs;
        compile_includes.extend(ctx.python.include_dirs.iter().cloned());

        let mut cflags = ext.extra_compile_args.clone();
        cflags.extend(ctx.cflags.iter().cloned());

        let compile = ctx.toolchain().compile_command(
            &CompileInput {
                source: generated_source.clone(),
                output: object.clone(),
                include_dirs: compile_includes,
                defines: ext.defines(),
                cflags,
            },
            ext.language,
        );

        let mut ldflags = ext.extra_link_args.clone();
        ldflags.extend(ctx.ldflags.iter().cloned());

        let link = ctx.toolchain().link_module_command(
            &LinkInput {
                objects: vec![object.clone()],
                output: module.clone(),
                lib_dirs: ext
                    .library_dirs
                    .iter()
                    .map(|d| resolve_against(base, d))
                    .collect(),
                libs: ext.libraries.clone(),
                ldflags,
            },
            ext.language,
        );

        TargetPlan {
            name: ext.name.clone(),
            language: ext.language,
            interface_source,
            generated_source,
            object,
            module,
            generate,
            compile,
            link,
        }
    }
}

/// `lib/<a>/<b><suffix>` for module `a.b`.
fn module_path(lib_dir: &Path, name: &str, suffix: &str) -> PathBuf {
    let parts: Vec<&str> = segments(name).collect();
    let mut path = lib_dir.to_path_buf();
    if let Some((last, parents)) = parts.split_last() {
        for parent in parents {
            path.push(parent);
        }
        path.push(format!("{}{}", last, suffix));
    }
    path
}

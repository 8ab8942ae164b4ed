//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// extbuild - Build Python extension modules from Cython interface sources
#[derive(Parser)]
#[command(name = "extbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every extension declared in ExtBuild.toml
    Build(BuildArgs),

    /// Remove build outputs
    Clean(CleanArgs),

    /// Create an ExtBuild.toml in a directory
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to ExtBuild.toml (defaults to searching upward from cwd)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Emit the build plan as JSON (no build)
    #[arg(long)]
    pub plan: bool,

    /// Output format for build messages: human or json
    #[arg(long, value_name = "FMT")]
    pub message_format: Option<String>,

    /// Directory for intermediates and outputs (default: build)
    #[arg(long, env = "EXTBUILD_BUILD_DIR")]
    pub build_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Path to ExtBuild.toml (defaults to searching upward from cwd)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Directory to clean (default: build)
    #[arg(long, env = "EXTBUILD_BUILD_DIR")]
    pub build_dir: Option<PathBuf>,

    /// Only remove intermediates, keeping built modules
    #[arg(long)]
    pub temp: bool,
}

#[derive(Args)]
pub struct InitArgs {
    /// Package name (defaults to directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

//! extbuild CLI - Build Python extension modules from Cython interface sources

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use extbuild::GlobalContext;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("extbuild=debug")
    } else {
        EnvFilter::new("extbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color && std::io::stderr().is_terminal())
        .init();

    let mut gctx = GlobalContext::new()?;
    gctx.set_verbose(cli.verbose);
    gctx.set_color(!cli.no_color && std::io::stderr().is_terminal());

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &gctx),
        Commands::Clean(args) => commands::clean::execute(args, &gctx),
        Commands::Init(args) => commands::init::execute(args, &gctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

//! GridLam CLI
//!
//! Command-line interface for inspecting and scripting laminate grids.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use gridlam::cli::commands;
use gridlam::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("GridLam v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("GridLam v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::New {
            path,
            columns,
            layers,
        } => commands::new_project(&path, columns, layers)
            .with_context(|| format!("creating {}", path.display())),
        Commands::Show { path } => {
            commands::show(&path).with_context(|| format!("showing {}", path.display()))
        }
        Commands::Classify {
            path,
            cell,
            quasi_max_share,
        } => commands::classify(&path, cell, quasi_max_share)
            .with_context(|| format!("classifying {}", path.display())),
        Commands::Check { path } => {
            commands::check(&path).with_context(|| format!("checking {}", path.display()))
        }
        Commands::Script {
            path,
            script,
            config,
            dry_run,
        } => commands::script(&path, &script, config.as_deref(), dry_run)
            .with_context(|| format!("running {} on {}", script.display(), path.display())),
    }
}

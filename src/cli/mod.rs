//! CLI Module
//!
//! Command-line interface for inspecting and scripting GridLam projects.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::CellId;

/// GridLam - laminate stacking grid editor
#[derive(Parser, Debug)]
#[command(name = "gridlam")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a demo project file
    #[command(name = "new")]
    New {
        /// Path for the new project file
        path: PathBuf,

        /// Number of columns
        #[arg(short, long, default_value_t = 3)]
        columns: usize,

        /// Plies per column
        #[arg(short, long, default_value_t = 4)]
        layers: usize,
    },

    /// Print the sequence x column grid
    #[command(name = "show")]
    Show {
        /// Path to the project file
        path: PathBuf,
    },

    /// Print the orientation summary of each column
    #[command(name = "classify")]
    Classify {
        /// Path to the project file
        path: PathBuf,

        /// Only this cell (e.g. C2)
        #[arg(long)]
        cell: Option<CellId>,

        /// Largest share one orientation may hold in a quasi-isotropic laminate
        #[arg(long)]
        quasi_max_share: Option<f64>,
    },

    /// Report symmetry and duplicate laminates
    #[command(name = "check")]
    Check {
        /// Path to the project file
        path: PathBuf,
    },

    /// Run a JSON list of edits through the undo controller
    #[command(name = "script")]
    Script {
        /// Path to the project file
        path: PathBuf,

        /// Path to the edit script
        script: PathBuf,

        /// Editor configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run the edits without saving the result
        #[arg(long)]
        dry_run: bool,
    },
}

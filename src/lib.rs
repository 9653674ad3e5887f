//! GridLam - laminate stacking grid editor core
//!
//! GridLam keeps a grid of composite laminates (one per column) and lets
//! the user edit it with full undo/redo:
//! 1. Fine-grained edits (insert/remove ply, change orientation, move column)
//!    are recorded as reversible commands
//! 2. Structural edits that touch many laminates (sequence rows, column
//!    lifecycle) are recorded as before/after snapshots
//!
//! # Architecture
//!
//! - `model`: cells, laminates and layers with invariant-preserving accessors
//! - `analysis`: read-only classification, symmetry and duplicate checks
//! - `history`: commands, snapshots, the linear history and its controller

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod model;

pub use config::EditorConfig;
pub use error::{GridError, Result};

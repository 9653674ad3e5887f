//! Read-only analysis over the laminate model.
//!
//! Nothing here mutates a project; results are recomputed on demand.

pub mod checks;
pub mod classify;
pub mod stacking;

pub use checks::{run_all_checks, ChecksReport, DuplicateGroup, SymmetryReport};
pub use classify::{
    classify, classify_project, classify_with, ClassifierConfig, LaminateType,
    OrientationSummary,
};
pub use stacking::{sequence_rows, SequenceRow};

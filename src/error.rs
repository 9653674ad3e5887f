//! Error handling for GridLam
//!
//! Every fallible editing operation reports one of these variants to its
//! immediate caller. Only `IntegrityViolation` is treated as fatal.

use thiserror::Error;

use crate::history::MoveDirection;
use crate::model::CellId;

/// Result type alias for GridLam operations
pub type Result<T> = std::result::Result<T, GridError>;

/// What an out-of-range index was addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTarget {
    /// Layer position inside a laminate
    Layers,
    /// Column position inside the cell order
    Columns,
    /// Sequence row across all laminates
    Sequences,
}

impl std::fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexTarget::Layers => write!(f, "layers"),
            IndexTarget::Columns => write!(f, "columns"),
            IndexTarget::Sequences => write!(f, "sequences"),
        }
    }
}

/// Main error type for GridLam operations
#[derive(Error, Debug)]
pub enum GridError {
    // Model Errors
    #[error("Index {index} out of range for {target} (length {len})")]
    OutOfRange {
        target: IndexTarget,
        index: usize,
        len: usize,
    },

    #[error("Cannot move column {index} {direction}: already at the edge")]
    Boundary {
        direction: MoveDirection,
        index: usize,
    },

    #[error("Unknown cell: {cell}")]
    UnknownCell { cell: CellId },

    #[error("Cell already present: {cell}")]
    DuplicateCell { cell: CellId },

    #[error("Invalid orientation: {value}")]
    InvalidOrientation { value: String },

    #[error("Invalid {field}: '{value}'")]
    InvalidLayerField { field: &'static str, value: String },

    // History Errors
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Stale command: {reason}")]
    StaleCommand { reason: String },

    #[error("Integrity violation: {reason}")]
    IntegrityViolation { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GridError {
    /// Shorthand for an out-of-range layer index.
    pub(crate) fn layer_out_of_range(index: usize, len: usize) -> Self {
        GridError::OutOfRange {
            target: IndexTarget::Layers,
            index,
            len,
        }
    }

    /// Shorthand for an out-of-range column index.
    pub(crate) fn column_out_of_range(index: usize, len: usize) -> Self {
        GridError::OutOfRange {
            target: IndexTarget::Columns,
            index,
            len,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            GridError::OutOfRange { .. } => "OUT_OF_RANGE",
            GridError::Boundary { .. } => "BOUNDARY",
            GridError::UnknownCell { .. } => "UNKNOWN_CELL",
            GridError::DuplicateCell { .. } => "DUPLICATE_CELL",
            GridError::InvalidOrientation { .. } => "INVALID_ORIENTATION",
            GridError::InvalidLayerField { .. } => "INVALID_LAYER_FIELD",
            GridError::NothingToUndo => "NOTHING_TO_UNDO",
            GridError::NothingToRedo => "NOTHING_TO_REDO",
            GridError::StaleCommand { .. } => "STALE_COMMAND",
            GridError::IntegrityViolation { .. } => "INTEGRITY_VIOLATION",
            GridError::Io(_) => "IO_ERROR",
            GridError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable.
    ///
    /// A broken cell/order bijection means the project can no longer be
    /// trusted, so `IntegrityViolation` is the one fatal condition.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, GridError::IntegrityViolation { .. })
    }

    /// Returns a user-facing recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            GridError::OutOfRange { .. } => Some("Select a position inside the laminate or grid."),
            GridError::Boundary { .. } => {
                Some("The column is already at the edge; disable the move action.")
            }
            GridError::NothingToUndo => Some("There are no actions to undo."),
            GridError::NothingToRedo => Some("There are no undone actions to redo."),
            GridError::InvalidOrientation { .. } => {
                Some("Enter an angle between -100 and 100 degrees, e.g. 0, 45, -45 or 90.")
            }
            GridError::InvalidLayerField { .. } => {
                Some("Material and rosette names cannot be blank.")
            }
            GridError::StaleCommand { .. } => {
                Some("Rebuild the edit from the current grid state and try again.")
            }
            GridError::IntegrityViolation { .. } => {
                Some("The last known-good state was restored; save a copy and report the issue.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = GridError::layer_out_of_range(4, 3);
        assert_eq!(err.error_code(), "OUT_OF_RANGE");
        assert_eq!(err.to_string(), "Index 4 out of range for layers (length 3)");
    }

    #[test]
    fn test_integrity_violation_is_fatal() {
        let err = GridError::IntegrityViolation {
            reason: "cell C3 missing".to_string(),
        };
        assert!(!err.is_recoverable());
        assert!(err.recovery_suggestion().is_some());
        assert!(GridError::NothingToUndo.is_recoverable());
    }

    #[test]
    fn test_invalid_layer_field_message() {
        let err = GridError::InvalidLayerField {
            field: "material",
            value: "  ".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid material: '  '");
        assert_eq!(err.error_code(), "INVALID_LAYER_FIELD");
    }

    #[test]
    fn test_boundary_message() {
        let err = GridError::Boundary {
            direction: MoveDirection::Left,
            index: 0,
        };
        assert_eq!(err.to_string(), "Cannot move column 0 left: already at the edge");
        assert_eq!(err.error_code(), "BOUNDARY");
    }
}

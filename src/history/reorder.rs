//! Column Reorder Engine
//!
//! Moves a column left or right by swapping adjacent entries of the cell
//! order. Cells and laminates are never copied, so everything owned by a
//! column travels with it in one step.

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::model::Project;

/// Direction of a single-step column move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Left,
    Right,
}

impl MoveDirection {
    pub fn opposite(self) -> Self {
        match self {
            MoveDirection::Left => MoveDirection::Right,
            MoveDirection::Right => MoveDirection::Left,
        }
    }

    /// Index a column at `index` lands on after moving this way, ignoring
    /// the grid width. [`check_move`] applies the width.
    pub fn destination(self, index: usize) -> Option<usize> {
        match self {
            MoveDirection::Left => index.checked_sub(1),
            MoveDirection::Right => index.checked_add(1),
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDirection::Left => write!(f, "left"),
            MoveDirection::Right => write!(f, "right"),
        }
    }
}

/// Validate a move without touching the project, returning the destination.
///
/// Moving left from index 0 is a boundary error whatever the grid width.
pub fn check_move(project: &Project, index: usize, direction: MoveDirection) -> Result<usize> {
    let len = project.column_count();
    if direction == MoveDirection::Left && index == 0 {
        return Err(GridError::Boundary { direction, index });
    }
    if index >= len {
        return Err(GridError::column_out_of_range(index, len));
    }
    match direction.destination(index) {
        Some(destination) if destination < len => Ok(destination),
        _ => Err(GridError::Boundary { direction, index }),
    }
}

/// Move the column at `index` one step, returning its new index.
pub fn move_column(project: &mut Project, index: usize, direction: MoveDirection) -> Result<usize> {
    let destination = check_move(project, index, direction).map_err(|e| {
        warn!("Rejected column move {} at {}: {}", direction, index, e);
        e
    })?;
    let cell = project
        .cell_at(index)
        .ok_or_else(|| GridError::column_out_of_range(index, project.column_count()))?;
    project.reinsert_cell(cell, destination)?;
    debug!("Moved column {} from {} to {}", cell, index, destination);
    Ok(destination)
}

/// Swap the column at `index` with its left neighbour.
pub fn move_column_left(project: &mut Project, index: usize) -> Result<usize> {
    move_column(project, index, MoveDirection::Left)
}

/// Swap the column at `index` with its right neighbour.
pub fn move_column_right(project: &mut Project, index: usize) -> Result<usize> {
    move_column(project, index, MoveDirection::Right)
}

/// Carry the column at `from` to `to` through adjacent swaps.
///
/// Both positions are validated before anything moves.
pub fn move_column_to(project: &mut Project, from: usize, to: usize) -> Result<()> {
    let len = project.column_count();
    for index in [from, to] {
        if index >= len {
            return Err(GridError::column_out_of_range(index, len));
        }
    }

    let mut current = from;
    while current > to {
        current = move_column_left(project, current)?;
    }
    while current < to {
        current = move_column_right(project, current)?;
    }
    Ok(())
}

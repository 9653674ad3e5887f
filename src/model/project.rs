//! Project - the grid of cells and the laminates they own.
//!
//! `cell_order` defines the column order and must stay in bijection with
//! the `cells` map. Every mutation here preserves that; the history layer
//! verifies it after each apply/revert/restore.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::laminate::Laminate;
use super::layer::{Layer, LayerField};
use super::orientation::Orientation;
use crate::error::{GridError, Result};

/// Stable identifier of a grid cell, displayed as `C<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u64);

impl CellId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl FromStr for CellId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('C')
            .or_else(|| trimmed.strip_prefix('c'))
            .unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(CellId)
            .map_err(|_| format!("invalid cell id '{}', expected C<number>", s))
    }
}

/// A grid column owning exactly one laminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub laminate: Laminate,
}

/// On-disk shape of a project: columns listed in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectDocument {
    #[serde(default)]
    next_cell_id: u64,
    #[serde(default)]
    columns: Vec<Cell>,
}

/// The whole editable grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProjectDocument", into = "ProjectDocument")]
pub struct Project {
    cell_order: Vec<CellId>,
    cells: BTreeMap<CellId, Cell>,
    /// Next id to hand out. Only ever grows.
    next_cell_id: u64,
}

impl Project {
    /// Create an empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a project with one column per laminate, in order.
    pub fn with_laminates(laminates: impl IntoIterator<Item = Laminate>) -> Self {
        let mut project = Self::new();
        for laminate in laminates {
            project.add_column(laminate);
        }
        project
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Append a new column and return its id
    pub fn add_column(&mut self, laminate: Laminate) -> CellId {
        let id = self.allocate_id();
        self.cell_order.push(id);
        self.cells.insert(id, Cell { id, laminate });
        id
    }

    /// Insert a new column at `position`.
    ///
    /// # Errors
    /// `OutOfRange` unless `position <= column_count()`
    pub fn insert_column(&mut self, position: usize, laminate: Laminate) -> Result<CellId> {
        if position > self.cell_order.len() {
            return Err(GridError::column_out_of_range(position, self.cell_order.len()));
        }
        let id = self.allocate_id();
        self.cell_order.insert(position, id);
        self.cells.insert(id, Cell { id, laminate });
        Ok(id)
    }

    /// Remove a column, returning its former position and the cell.
    pub fn remove_column(&mut self, cell: CellId) -> Result<(usize, Cell)> {
        let position = self.position_of(cell).ok_or(GridError::UnknownCell { cell })?;
        let removed = self
            .cells
            .remove(&cell)
            .ok_or(GridError::UnknownCell { cell })?;
        self.cell_order.remove(position);
        Ok((position, removed))
    }

    /// Move an existing cell to `new_position` in the column order.
    ///
    /// Only the order changes; the cell and its laminate are untouched.
    /// Returns the position the cell held before.
    pub fn reinsert_cell(&mut self, cell: CellId, new_position: usize) -> Result<usize> {
        let old_position = self.position_of(cell).ok_or(GridError::UnknownCell { cell })?;
        if new_position >= self.cell_order.len() {
            return Err(GridError::column_out_of_range(new_position, self.cell_order.len()));
        }
        let id = self.cell_order.remove(old_position);
        self.cell_order.insert(new_position, id);
        Ok(old_position)
    }

    fn allocate_id(&mut self) -> CellId {
        self.next_cell_id += 1;
        CellId(self.next_cell_id)
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Column order, left to right
    pub fn cell_order(&self) -> &[CellId] {
        &self.cell_order
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.cell_order.len()
    }

    /// Whether the grid has no columns
    pub fn is_empty(&self) -> bool {
        self.cell_order.is_empty()
    }

    /// Id of the cell shown in column `index`
    pub fn cell_at(&self, index: usize) -> Option<CellId> {
        self.cell_order.get(index).copied()
    }

    /// Column index of `cell`
    pub fn position_of(&self, cell: CellId) -> Option<usize> {
        self.cell_order.iter().position(|id| *id == cell)
    }

    /// Get a cell by id
    pub fn cell(&self, cell: CellId) -> Option<&Cell> {
        self.cells.get(&cell)
    }

    /// Laminate owned by `cell`
    pub fn laminate(&self, cell: CellId) -> Result<&Laminate> {
        self.cells
            .get(&cell)
            .map(|c| &c.laminate)
            .ok_or(GridError::UnknownCell { cell })
    }

    /// Laminate owned by `cell` (mutable)
    pub fn laminate_mut(&mut self, cell: CellId) -> Result<&mut Laminate> {
        self.cells
            .get_mut(&cell)
            .map(|c| &mut c.laminate)
            .ok_or(GridError::UnknownCell { cell })
    }

    /// Iterate over cells in column order
    pub fn columns(&self) -> impl Iterator<Item = &Cell> {
        self.cell_order.iter().filter_map(|id| self.cells.get(id))
    }

    /// Iterate over laminates mutably (order not significant)
    pub fn laminates_mut(&mut self) -> impl Iterator<Item = &mut Laminate> {
        self.cells.values_mut().map(|c| &mut c.laminate)
    }

    /// Layer count of the tallest laminate
    pub fn max_layer_count(&self) -> usize {
        self.cells.values().map(|c| c.laminate.len()).max().unwrap_or(0)
    }

    /// Total layers across all laminates
    pub fn total_layers(&self) -> usize {
        self.cells.values().map(|c| c.laminate.len()).sum()
    }

    // ------------------------------------------------------------------
    // Layer mutations addressed by cell
    // ------------------------------------------------------------------

    /// Insert `layer` at `index` of the laminate owned by `cell`
    pub fn insert_layer(&mut self, cell: CellId, index: usize, layer: Layer) -> Result<()> {
        self.laminate_mut(cell)?.insert_layer(index, layer)
    }

    /// Remove the layer at `index` of the laminate owned by `cell`
    pub fn remove_layer(&mut self, cell: CellId, index: usize) -> Result<Layer> {
        self.laminate_mut(cell)?.remove_layer(index)
    }

    /// Set the orientation at `index`, returning the previous one
    pub fn set_orientation(
        &mut self,
        cell: CellId,
        index: usize,
        orientation: Orientation,
    ) -> Result<Orientation> {
        self.laminate_mut(cell)?.set_orientation(index, orientation)
    }

    /// Replace one attribute of a ply, returning the previous value.
    pub fn set_layer_field(
        &mut self,
        cell: CellId,
        index: usize,
        field: LayerField,
    ) -> Result<LayerField> {
        self.laminate_mut(cell)?.set_field(index, field)
    }

    // ------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------

    /// Verify that `cell_order` and `cells` are in bijection.
    pub fn check_integrity(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.cell_order.len());
        for id in &self.cell_order {
            if !seen.insert(*id) {
                return Err(GridError::IntegrityViolation {
                    reason: format!("cell {} appears twice in the column order", id),
                });
            }
            match self.cells.get(id) {
                None => {
                    return Err(GridError::IntegrityViolation {
                        reason: format!("cell {} is ordered but has no entry", id),
                    })
                }
                Some(cell) if cell.id != *id => {
                    return Err(GridError::IntegrityViolation {
                        reason: format!("entry {} carries mismatched id {}", id, cell.id),
                    })
                }
                Some(_) => {}
            }
        }
        if let Some(orphan) = self.cells.keys().find(|id| !seen.contains(id)) {
            return Err(GridError::IntegrityViolation {
                reason: format!("cell {} has an entry but no column", orphan),
            });
        }
        Ok(())
    }

    /// SHA-256 over the observable content: column order, laminate
    /// metadata and every layer field. The id allocator is excluded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for id in &self.cell_order {
            hasher.update(id.0.to_le_bytes());
        }
        hasher.update(b"|");
        for (id, cell) in &self.cells {
            hasher.update(id.0.to_le_bytes());
            hash_laminate(&mut hasher, &cell.laminate);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Swap in another project's content, keeping the larger id allocator
    /// so ids are never handed out twice.
    pub(crate) fn replace_content(&mut self, other: Project) {
        let next_cell_id = self.next_cell_id.max(other.next_cell_id);
        *self = other;
        self.next_cell_id = next_cell_id;
    }

    #[cfg(test)]
    pub(crate) fn order_mut(&mut self) -> &mut Vec<CellId> {
        &mut self.cell_order
    }
}

fn hash_laminate(hasher: &mut Sha256, laminate: &Laminate) {
    for text in [&laminate.name, &laminate.laminate_type, &laminate.tag] {
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.update([laminate.color_index]);
    hasher.update((laminate.len() as u64).to_le_bytes());
    for layer in laminate.iter() {
        hasher.update(layer.orientation.degrees().to_le_bytes());
        for text in [layer.material.as_str(), layer.rosette.as_str(), layer.sequence.as_str()] {
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        hasher.update([u8::from(layer.ply_type.is_structural()), u8::from(layer.active)]);
    }
}

impl TryFrom<ProjectDocument> for Project {
    type Error = GridError;

    fn try_from(document: ProjectDocument) -> Result<Self> {
        let mut project = Project::new();
        for cell in document.columns {
            if project.cells.contains_key(&cell.id) {
                return Err(GridError::DuplicateCell { cell: cell.id });
            }
            project.next_cell_id = project.next_cell_id.max(cell.id.0);
            project.cell_order.push(cell.id);
            project.cells.insert(cell.id, cell);
        }
        project.next_cell_id = project.next_cell_id.max(document.next_cell_id);
        Ok(project)
    }
}

impl From<Project> for ProjectDocument {
    fn from(mut project: Project) -> Self {
        let columns = project
            .cell_order
            .iter()
            .filter_map(|id| project.cells.remove(id))
            .collect();
        Self {
            next_cell_id: project.next_cell_id,
            columns,
        }
    }
}

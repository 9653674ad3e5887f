//! Laminate checks run before handing a grid to export.
//!
//! - Symmetry: structural plies mirror around the mid-plane
//! - Duplicates: columns whose stacking, type and color all match

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::model::{CellId, Laminate, Layer, Project};

/// Columns split by symmetry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymmetryReport {
    pub symmetric: Vec<CellId>,
    pub not_symmetric: Vec<CellId>,
}

/// Columns sharing one stacking signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub signature: String,
    pub summary: String,
    pub cells: Vec<CellId>,
}

/// Both checks together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksReport {
    pub symmetry: SymmetryReport,
    pub duplicates: Vec<DuplicateGroup>,
}

/// Run every check over the project.
pub fn run_all_checks(project: &Project) -> ChecksReport {
    ChecksReport {
        symmetry: check_symmetry(project),
        duplicates: find_duplicates(project),
    }
}

/// Whether the structural plies of `laminate` mirror around the middle.
///
/// Mirrored plies must share material (ignoring case and extra spaces)
/// and orientation. Stacks with at most one structural ply are symmetric.
pub fn is_symmetric(laminate: &Laminate) -> bool {
    let structural: Vec<&Layer> = laminate.structural_layers().collect();
    structural
        .iter()
        .zip(structural.iter().rev())
        .take(structural.len() / 2)
        .all(|(top, bottom)| plies_match(top, bottom))
}

fn plies_match(top: &Layer, bottom: &Layer) -> bool {
    top.material.normalized() == bottom.material.normalized()
        && top.orientation == bottom.orientation
}

/// Split columns into symmetric and non-symmetric, each in column order.
pub fn check_symmetry(project: &Project) -> SymmetryReport {
    let mut report = SymmetryReport::default();
    for cell in project.columns() {
        if is_symmetric(&cell.laminate) {
            report.symmetric.push(cell.id);
        } else {
            report.not_symmetric.push(cell.id);
        }
    }
    report
}

/// SHA-256 signature of the stacking (material, orientation and ply type
/// per layer) plus the laminate type and color.
pub fn stacking_signature(laminate: &Laminate) -> String {
    let mut hasher = Sha256::new();
    if laminate.is_empty() {
        hasher.update(b"stacking:empty");
    }
    for layer in laminate.iter() {
        let token = format!(
            "{}@{:+}@{};",
            layer.material.normalized(),
            layer.orientation.degrees(),
            if layer.ply_type.is_structural() { "structural" } else { "nonstructural" }
        );
        hasher.update(token.as_bytes());
    }
    hasher.update(b"|");
    hasher.update(laminate.laminate_type.trim().to_lowercase().as_bytes());
    hasher.update(b"|");
    hasher.update(laminate.color_index.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Group columns whose laminates share a stacking signature.
///
/// Groups are ordered by size (largest first), then by summary.
pub fn find_duplicates(project: &Project) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<String, (String, Vec<CellId>)> = BTreeMap::new();
    for cell in project.columns() {
        let signature = stacking_signature(&cell.laminate);
        groups
            .entry(signature)
            .or_insert_with(|| (summarize(&cell.laminate), Vec::new()))
            .1
            .push(cell.id);
    }

    let mut duplicates: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter(|(_, (_, cells))| cells.len() > 1)
        .map(|(signature, (summary, cells))| DuplicateGroup {
            signature,
            summary,
            cells,
        })
        .collect();
    duplicates.sort_by(|a, b| {
        b.cells
            .len()
            .cmp(&a.cells.len())
            .then_with(|| a.summary.to_lowercase().cmp(&b.summary.to_lowercase()))
    });
    duplicates
}

fn summarize(laminate: &Laminate) -> String {
    let laminate_type = laminate.laminate_type.trim();
    if laminate_type.is_empty() {
        format!("Color: {} | {} plies", laminate.color_index, laminate.len())
    } else {
        format!(
            "Type: {} | Color: {} | {} plies",
            laminate_type.to_uppercase(),
            laminate.color_index,
            laminate.len()
        )
    }
}

//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command. Projects are read and
//! written as JSON; edit history lives only for the duration of one run.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{classify_project, run_all_checks, sequence_rows};
use crate::config::EditorConfig;
use crate::error::{GridError, Result};
use crate::history::UndoController;
use crate::model::{CellId, Laminate, Layer, LayerField, Orientation, PlyType, Project};

/// Read a project from a JSON file.
pub fn load_project(path: &Path) -> Result<Project> {
    let content = fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&content)?;
    Ok(project)
}

/// Write a project as pretty JSON.
pub fn save_project(project: &Project, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(project)?;
    fs::write(path, content)?;
    Ok(())
}

/// Build a demo project cycling through the canonical angles.
pub fn demo_project(columns: usize, layers: usize) -> Project {
    Project::with_laminates((0..columns).map(|c| {
        let plies = (0..layers)
            .map(|l| {
                let orientation = Orientation::CANONICAL[(c + l) % Orientation::CANONICAL.len()];
                Layer::new(orientation, "M1").with_sequence(format!("Seq.{}", l + 1))
            })
            .collect();
        Laminate::with_layers(format!("Laminate.{}", c + 1), plies)
    }))
}

/// Create a new demo project file.
pub fn new_project(path: &Path, columns: usize, layers: usize) -> Result<()> {
    info!("Creating new project at: {}", path.display());

    let project = demo_project(columns, layers);
    save_project(&project, path)?;

    println!("Project created: {}", path.display());
    println!("{} columns x {} plies", columns, layers);

    Ok(())
}

/// Render the grid as text: one line per sequence row, one field per column.
pub fn render_grid(project: &Project) -> String {
    let mut out = format!("{:<10}", "");
    for cell in project.columns() {
        out.push_str(&format!("{:>8}", cell.id.to_string()));
    }
    out.push('\n');

    for row in sequence_rows(project) {
        out.push_str(&format!("{:<10}", row.label));
        for cell in project.columns() {
            let field = cell
                .laminate
                .layer(row.index)
                .map(|l| l.orientation.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!("{:>8}", field));
        }
        out.push('\n');
    }
    out
}

/// Print the grid.
pub fn show(path: &Path) -> Result<()> {
    let project = load_project(path)?;
    print!("{}", render_grid(&project));
    Ok(())
}

/// Print orientation summaries.
pub fn classify(path: &Path, cell: Option<CellId>, quasi_max_share: Option<f64>) -> Result<()> {
    let project = load_project(path)?;
    let mut config = EditorConfig::default().classifier;
    if let Some(share) = quasi_max_share {
        config.quasi_max_share = share;
    }
    if let Some(cell) = cell {
        require_cell(&project, cell)?;
    }

    for (id, summary) in classify_project(&project, &config) {
        if cell.is_some_and(|wanted| wanted != id) {
            continue;
        }
        let counts: Vec<String> = summary
            .counts_by_orientation
            .iter()
            .map(|(orientation, count)| format!("{} x{}", orientation, count))
            .collect();
        println!(
            "{}: {} ({} plies: {})",
            id,
            summary.predominant_type,
            summary.total_layers,
            counts.join(", ")
        );
    }
    Ok(())
}

/// Print the symmetry and duplicate report.
pub fn check(path: &Path) -> Result<()> {
    let project = load_project(path)?;
    let report = run_all_checks(&project);

    println!("--- Symmetry ---");
    if report.symmetry.not_symmetric.is_empty() {
        println!("All laminates are symmetric.");
    } else {
        for id in &report.symmetry.not_symmetric {
            println!("{} is not symmetric", id);
        }
    }

    println!("--- Duplicates ---");
    if report.duplicates.is_empty() {
        println!("No duplicate laminates.");
    }
    for group in &report.duplicates {
        let cells: Vec<String> = group.cells.iter().map(|c| c.to_string()).collect();
        println!("{} -> {}", group.summary, cells.join(", "));
    }
    Ok(())
}

/// One edit in a script file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ScriptStep {
    InsertLayer {
        cell: CellId,
        index: usize,
        orientation: Orientation,
        material: String,
        #[serde(default)]
        ply_type: Option<String>,
    },
    RemoveLayer {
        cell: CellId,
        index: usize,
    },
    SetOrientation {
        cell: CellId,
        index: usize,
        orientation: Orientation,
    },
    SetMaterial {
        cell: CellId,
        index: usize,
        material: String,
    },
    SetActive {
        cell: CellId,
        index: usize,
        active: bool,
    },
    MoveLeft {
        column: usize,
    },
    MoveRight {
        column: usize,
    },
    InsertSequence {
        index: usize,
        orientation: Orientation,
        material: String,
    },
    RemoveSequence {
        index: usize,
    },
    Undo,
    Redo,
}

/// Outcome of running a script.
#[derive(Debug, Default)]
pub struct ScriptReport {
    /// Steps that succeeded.
    pub applied: usize,
    /// Steps rejected with a recoverable error, by position.
    pub rejected: Vec<(usize, String)>,
}

/// Apply one step through the controller.
pub fn run_step(controller: &mut UndoController, step: &ScriptStep) -> Result<()> {
    match step {
        ScriptStep::InsertLayer {
            cell,
            index,
            orientation,
            material,
            ply_type,
        } => {
            let mut layer = Layer::new(*orientation, material.as_str());
            if let Some(label) = ply_type {
                layer = layer.with_ply_type(PlyType::from_label(label));
            }
            controller.insert_layer(*cell, *index, layer)
        }
        ScriptStep::RemoveLayer { cell, index } => controller.remove_layer(*cell, *index),
        ScriptStep::SetOrientation {
            cell,
            index,
            orientation,
        } => controller.change_orientation(*cell, *index, *orientation),
        ScriptStep::SetMaterial {
            cell,
            index,
            material,
        } => controller.set_material(*cell, *index, material.as_str()),
        ScriptStep::SetActive {
            cell,
            index,
            active,
        } => controller.edit_layer(*cell, *index, LayerField::Active(*active)),
        ScriptStep::MoveLeft { column } => controller.move_column_left(*column).map(|_| ()),
        ScriptStep::MoveRight { column } => controller.move_column_right(*column).map(|_| ()),
        ScriptStep::InsertSequence {
            index,
            orientation,
            material,
        } => controller
            .insert_sequence(*index, Layer::new(*orientation, material.as_str()))
            .map(|_| ()),
        ScriptStep::RemoveSequence { index } => controller.remove_sequence(*index).map(|_| ()),
        ScriptStep::Undo => controller.undo(),
        ScriptStep::Redo => controller.redo(),
    }
}

/// Run every step, skipping recoverable rejections and stopping on a
/// fatal error.
pub fn run_steps(controller: &mut UndoController, steps: &[ScriptStep]) -> Result<ScriptReport> {
    let mut report = ScriptReport::default();
    for (i, step) in steps.iter().enumerate() {
        match run_step(controller, step) {
            Ok(()) => report.applied += 1,
            Err(e) if e.is_recoverable() => {
                warn!("Step {} rejected: {}", i + 1, e);
                report.rejected.push((i, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}

/// Run a script file against a project file.
pub fn script(path: &Path, script_path: &Path, config: Option<&Path>, dry_run: bool) -> Result<()> {
    info!("Running {} against {}", script_path.display(), path.display());

    let config = match config {
        Some(config_path) => EditorConfig::load(config_path)?,
        None => EditorConfig::default(),
    };
    let steps: Vec<ScriptStep> = serde_json::from_str(&fs::read_to_string(script_path)?)?;

    let mut controller = UndoController::new(load_project(path)?, config)?;
    let report = run_steps(&mut controller, &steps)?;

    println!("Applied {} of {} steps", report.applied, steps.len());
    for (i, reason) in &report.rejected {
        println!("  step {}: {}", i + 1, reason);
    }

    println!("History:");
    for (_, description) in controller.history().summary() {
        println!("  {}", description);
    }

    if dry_run {
        println!();
        println!("[Dry run - no changes saved]");
        return Ok(());
    }

    save_project(controller.project(), path)?;
    println!("Project saved: {}", path.display());
    Ok(())
}

/// Fail with `UnknownCell` unless `cell` is a column of `project`.
pub fn require_cell(project: &Project, cell: CellId) -> Result<()> {
    project
        .cell(cell)
        .map(|_| ())
        .ok_or(GridError::UnknownCell { cell })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_demo_project() {
        let project = demo_project(3, 4);
        assert_eq!(project.column_count(), 3);
        assert_eq!(project.total_layers(), 12);
    }

    #[test]
    fn test_render_grid() {
        let project = demo_project(2, 2);
        let grid = render_grid(&project);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("C1"));
        assert!(lines[1].starts_with("Seq.1"));
        assert!(lines[1].contains("0°"));
        assert!(lines[1].contains("45°"));
    }

    #[test]
    fn test_script_step_format() {
        let json = r#"[
            { "op": "insert-layer", "cell": 2, "index": 0, "orientation": 45, "material": "M1" },
            { "op": "move-left", "column": 1 },
            { "op": "undo" }
        ]"#;
        let steps: Vec<ScriptStep> = serde_json::from_str(json).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1], ScriptStep::MoveLeft { column: 1 });
        assert_eq!(steps[2], ScriptStep::Undo);
    }

    #[test]
    fn test_save_and_load_project() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.json");
        let project = demo_project(2, 3);

        save_project(&project, &path).unwrap();
        assert_eq!(load_project(&path).unwrap(), project);
    }

    #[test]
    fn test_require_cell() {
        let project = demo_project(1, 1);
        assert!(require_cell(&project, CellId::new(1)).is_ok());
        assert!(matches!(
            require_cell(&project, CellId::new(7)),
            Err(GridError::UnknownCell { .. })
        ));
    }
}

//! CLI Tests
//!
//! Drive the command implementations against project files on disk.

use std::fs;

use gridlam::cli::commands::{self, ScriptStep};
use gridlam::history::UndoController;
use gridlam::model::{CellId, Orientation};
use gridlam::{EditorConfig, GridError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_new_then_show_and_check() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grid.json");

    commands::new_project(&path, 3, 4).unwrap();
    let project = commands::load_project(&path).unwrap();
    assert_eq!(project.column_count(), 3);

    commands::show(&path).unwrap();
    commands::check(&path).unwrap();
    commands::classify(&path, None, Some(0.4)).unwrap();
}

#[test]
fn test_classify_unknown_cell() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grid.json");
    commands::new_project(&path, 2, 2).unwrap();

    assert!(matches!(
        commands::classify(&path, Some(CellId::new(9)), None),
        Err(GridError::UnknownCell { .. })
    ));
}

#[test]
fn test_script_applies_and_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grid.json");
    let script = dir.path().join("edits.json");
    commands::new_project(&path, 3, 2).unwrap();
    let original = commands::load_project(&path).unwrap();

    fs::write(
        &script,
        r#"[
            { "op": "insert-layer", "cell": 2, "index": 0, "orientation": 45, "material": "M1" },
            { "op": "move-left", "column": 1 },
            { "op": "move-left", "column": 0 },
            { "op": "remove-sequence", "index": 1 },
            { "op": "undo" }
        ]"#,
    )
    .unwrap();

    commands::script(&path, &script, None, false).unwrap();
    let edited = commands::load_project(&path).unwrap();

    let b = CellId::new(2);
    assert_eq!(edited.cell_at(0), Some(b));
    assert_eq!(edited.laminate(b).unwrap().len(), 3);
    assert_eq!(
        edited.laminate(b).unwrap().layer(0).unwrap().orientation,
        Orientation::PLUS_45
    );
    assert_eq!(edited.total_layers(), original.total_layers() + 1);
}

#[test]
fn test_script_dry_run_leaves_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("grid.json");
    let script = dir.path().join("edits.json");
    commands::new_project(&path, 2, 2).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let steps = r#"[
        { "op": "insert-sequence", "index": 0, "orientation": 90, "material": "M2" }
    ]"#;
    fs::write(&script, steps).unwrap();
    commands::script(&path, &script, None, true).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_run_steps_reports_rejections() {
    let project = commands::demo_project(2, 2);
    let mut controller = UndoController::new(project, EditorConfig::default()).unwrap();
    let steps = vec![
        ScriptStep::MoveRight { column: 1 },
        ScriptStep::Undo,
        ScriptStep::SetOrientation {
            cell: CellId::new(1),
            index: 0,
            orientation: Orientation::NINETY,
        },
        ScriptStep::Redo,
    ];

    let report = commands::run_steps(&mut controller, &steps).unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(
        report.rejected.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        vec![0, 1, 3]
    );
}

#[test]
fn test_script_edits_ply_attributes() {
    let project = commands::demo_project(2, 2);
    let mut controller = UndoController::new(project, EditorConfig::default()).unwrap();
    let steps: Vec<ScriptStep> = serde_json::from_str(
        r#"[
            { "op": "set-material", "cell": 1, "index": 0, "material": "IM7" },
            { "op": "set-active", "cell": 2, "index": 1, "active": false },
            { "op": "set-material", "cell": 1, "index": 1, "material": "  " },
            { "op": "undo" }
        ]"#,
    )
    .unwrap();

    let report = commands::run_steps(&mut controller, &steps).unwrap();
    assert_eq!(report.applied, 3);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0, 2);

    let c1 = controller.project().laminate(CellId::new(1)).unwrap();
    assert_eq!(c1.layer(0).unwrap().material.as_str(), "IM7");
    let c2 = controller.project().laminate(CellId::new(2)).unwrap();
    assert!(c2.layer(1).unwrap().active);
    assert!(controller.can_redo());
}

//! Command Engine
//!
//! Each command stores everything it needs to apply and revert itself,
//! captured when the command is built. Applying then reverting leaves the
//! project exactly as it was.

use log::debug;

use super::reorder::{self, MoveDirection};
use crate::error::{GridError, Result};
use crate::model::{CellId, Layer, LayerField, Orientation, Project};

/// A reversible primitive edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert `layer` at `index` of the laminate owned by `cell`
    InsertLayer {
        cell: CellId,
        index: usize,
        layer: Layer,
    },
    /// Remove the layer at `index`; `layer` is the ply being removed
    RemoveLayer {
        cell: CellId,
        index: usize,
        layer: Layer,
    },
    /// Change one ply's orientation from `old` to `new`
    ChangeOrientation {
        cell: CellId,
        index: usize,
        old: Orientation,
        new: Orientation,
    },
    /// Change any other ply attribute from `old` to `new`
    EditLayer {
        cell: CellId,
        index: usize,
        old: LayerField,
        new: LayerField,
    },
    /// Move the column at `index` one step in `direction`
    MoveColumn {
        index: usize,
        direction: MoveDirection,
    },
}

impl Command {
    /// Insert a new ply.
    pub fn insert_layer(cell: CellId, index: usize, layer: Layer) -> Self {
        Command::InsertLayer { cell, index, layer }
    }

    /// Remove the ply currently at `index`, capturing it for undo.
    pub fn remove_layer(project: &Project, cell: CellId, index: usize) -> Result<Self> {
        let laminate = project.laminate(cell)?;
        let layer = laminate
            .layer(index)
            .cloned()
            .ok_or_else(|| GridError::layer_out_of_range(index, laminate.len()))?;
        Ok(Command::RemoveLayer { cell, index, layer })
    }

    /// Change the orientation at `index`, capturing the current value.
    pub fn change_orientation(
        project: &Project,
        cell: CellId,
        index: usize,
        new: Orientation,
    ) -> Result<Self> {
        let laminate = project.laminate(cell)?;
        let old = laminate
            .layer(index)
            .map(|l| l.orientation)
            .ok_or_else(|| GridError::layer_out_of_range(index, laminate.len()))?;
        Ok(Command::ChangeOrientation {
            cell,
            index,
            old,
            new,
        })
    }

    /// Replace one ply attribute, capturing the current value.
    pub fn edit_layer(
        project: &Project,
        cell: CellId,
        index: usize,
        new: LayerField,
    ) -> Result<Self> {
        new.validate()?;
        let laminate = project.laminate(cell)?;
        let old = laminate
            .layer(index)
            .map(|l| new.current_in(l))
            .ok_or_else(|| GridError::layer_out_of_range(index, laminate.len()))?;
        Ok(Command::EditLayer {
            cell,
            index,
            old,
            new,
        })
    }

    /// Move a column one step.
    pub fn move_column(index: usize, direction: MoveDirection) -> Self {
        Command::MoveColumn { index, direction }
    }

    /// Apply the command's forward effect.
    ///
    /// On error the project is left untouched.
    pub fn apply(&self, project: &mut Project) -> Result<()> {
        debug!("Applying: {}", self.description());
        match self {
            Command::InsertLayer { cell, index, layer } => {
                project.insert_layer(*cell, *index, layer.clone())
            }
            Command::RemoveLayer { cell, index, layer } => {
                expect_layer(project, *cell, *index, layer)?;
                project.remove_layer(*cell, *index).map(|_| ())
            }
            Command::ChangeOrientation {
                cell,
                index,
                old,
                new,
            } => {
                expect_orientation(project, *cell, *index, *old)?;
                project.set_orientation(*cell, *index, *new).map(|_| ())
            }
            Command::EditLayer {
                cell,
                index,
                old,
                new,
            } => {
                expect_field(project, *cell, *index, old)?;
                project.set_layer_field(*cell, *index, new.clone()).map(|_| ())
            }
            Command::MoveColumn { index, direction } => {
                reorder::move_column(project, *index, *direction).map(|_| ())
            }
        }
    }

    /// Undo the command's effect.
    ///
    /// On error the project is left untouched.
    pub fn revert(&self, project: &mut Project) -> Result<()> {
        debug!("Reverting: {}", self.description());
        match self {
            Command::InsertLayer { cell, index, layer } => {
                expect_layer(project, *cell, *index, layer)?;
                project.remove_layer(*cell, *index).map(|_| ())
            }
            Command::RemoveLayer { cell, index, layer } => {
                project.insert_layer(*cell, *index, layer.clone())
            }
            Command::ChangeOrientation {
                cell,
                index,
                old,
                new,
            } => {
                expect_orientation(project, *cell, *index, *new)?;
                project.set_orientation(*cell, *index, *old).map(|_| ())
            }
            Command::EditLayer {
                cell,
                index,
                old,
                new,
            } => {
                expect_field(project, *cell, *index, new)?;
                project.set_layer_field(*cell, *index, old.clone()).map(|_| ())
            }
            Command::MoveColumn { index, direction } => {
                let moved_to = direction.destination(*index).ok_or_else(|| {
                    GridError::StaleCommand {
                        reason: format!("column {} was never moved {}", index + 1, direction),
                    }
                })?;
                reorder::move_column(project, moved_to, direction.opposite()).map(|_| ())
            }
        }
    }

    /// Human-readable description for history display.
    pub fn description(&self) -> String {
        match self {
            Command::InsertLayer { cell, index, layer } => format!(
                "Insert {} {} ply at {} row {}",
                layer.orientation,
                layer.material,
                cell,
                index + 1
            ),
            Command::RemoveLayer { cell, index, .. } => {
                format!("Remove ply at {} row {}", cell, index + 1)
            }
            Command::ChangeOrientation {
                cell,
                index,
                old,
                new,
            } => format!("Change {} row {} from {} to {}", cell, index + 1, old, new),
            Command::EditLayer {
                cell,
                index,
                old,
                new,
            } => format!(
                "Change {} of {} row {} from {} to {}",
                new.name(),
                cell,
                index + 1,
                old,
                new
            ),
            Command::MoveColumn { index, direction } => {
                format!("Move column {} {}", index + 1, direction)
            }
        }
    }
}

/// Fail with `StaleCommand` unless `expected` sits at `index`.
fn expect_layer(project: &Project, cell: CellId, index: usize, expected: &Layer) -> Result<()> {
    let laminate = project.laminate(cell)?;
    let current = laminate
        .layer(index)
        .ok_or_else(|| GridError::layer_out_of_range(index, laminate.len()))?;
    if current != expected {
        return Err(GridError::StaleCommand {
            reason: format!("ply at {} row {} no longer matches", cell, index + 1),
        });
    }
    Ok(())
}

/// Fail with `StaleCommand` unless the ply at `index` holds `expected`.
fn expect_field(
    project: &Project,
    cell: CellId,
    index: usize,
    expected: &LayerField,
) -> Result<()> {
    let laminate = project.laminate(cell)?;
    let current = laminate
        .layer(index)
        .map(|l| expected.current_in(l))
        .ok_or_else(|| GridError::layer_out_of_range(index, laminate.len()))?;
    if &current != expected {
        return Err(GridError::StaleCommand {
            reason: format!(
                "{} of {} row {} is {} but {} was expected",
                expected.name(),
                cell,
                index + 1,
                current,
                expected
            ),
        });
    }
    Ok(())
}

/// Fail with `StaleCommand` unless the ply at `index` has `expected` orientation.
fn expect_orientation(
    project: &Project,
    cell: CellId,
    index: usize,
    expected: Orientation,
) -> Result<()> {
    let laminate = project.laminate(cell)?;
    let current = laminate
        .layer(index)
        .ok_or_else(|| GridError::layer_out_of_range(index, laminate.len()))?;
    if current.orientation != expected {
        return Err(GridError::StaleCommand {
            reason: format!(
                "{} row {} is {} but {} was expected",
                cell,
                index + 1,
                current.orientation,
                expected
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Laminate, MaterialId, PlyType, RosetteRef};
    use pretty_assertions::assert_eq;

    fn ply(degrees: i32) -> Layer {
        Layer::new(Orientation::from_whole_degrees(degrees).unwrap(), "M1")
    }

    fn project_with_stack() -> (Project, CellId) {
        let mut project = Project::new();
        let cell = project.add_column(Laminate::with_layers("A", vec![ply(0), ply(90), ply(45)]));
        project.add_column(Laminate::new("B"));
        (project, cell)
    }

    #[test]
    fn test_insert_round_trip() {
        let (mut project, cell) = project_with_stack();
        let before = project.clone();
        let command = Command::insert_layer(cell, 1, ply(-45));

        command.apply(&mut project).unwrap();
        assert_eq!(project.laminate(cell).unwrap().layer(1), Some(&ply(-45)));
        command.revert(&mut project).unwrap();
        assert_eq!(project, before);
    }

    #[test]
    fn test_remove_round_trip() {
        let (mut project, cell) = project_with_stack();
        let before = project.clone();
        let command = Command::remove_layer(&project, cell, 2).unwrap();

        command.apply(&mut project).unwrap();
        assert_eq!(project.laminate(cell).unwrap().len(), 2);
        command.revert(&mut project).unwrap();
        assert_eq!(project, before);
    }

    #[test]
    fn test_change_orientation_round_trip() {
        let (mut project, cell) = project_with_stack();
        let before = project.clone();
        let command =
            Command::change_orientation(&project, cell, 0, Orientation::MINUS_45).unwrap();
        assert!(matches!(
            command,
            Command::ChangeOrientation { old, .. } if old == Orientation::ZERO
        ));

        command.apply(&mut project).unwrap();
        assert_eq!(
            project.laminate(cell).unwrap().layer(0).unwrap().orientation,
            Orientation::MINUS_45
        );
        command.revert(&mut project).unwrap();
        assert_eq!(project, before);
    }

    #[test]
    fn test_move_column_round_trip() {
        let (mut project, _) = project_with_stack();
        let before = project.clone();
        let command = Command::move_column(0, MoveDirection::Right);
        command.apply(&mut project).unwrap();
        assert_ne!(project.cell_order(), before.cell_order());
        command.revert(&mut project).unwrap();
        assert_eq!(project, before);
    }

    #[test]
    fn test_out_of_range_applies_nothing() {
        let (mut project, cell) = project_with_stack();
        let before = project.clone();
        let command = Command::insert_layer(cell, 7, ply(0));
        assert!(matches!(
            command.apply(&mut project),
            Err(GridError::OutOfRange { .. })
        ));
        assert_eq!(project, before);
        assert!(Command::remove_layer(&project, cell, 3).is_err());
    }

    #[test]
    fn test_stale_remove_is_rejected() {
        let (mut project, cell) = project_with_stack();
        let command = Command::remove_layer(&project, cell, 0).unwrap();
        project.set_orientation(cell, 0, Orientation::NINETY).unwrap();
        let before = project.clone();

        assert!(matches!(
            command.apply(&mut project),
            Err(GridError::StaleCommand { .. })
        ));
        assert_eq!(project, before);
    }

    #[test]
    fn test_edit_layer_round_trip() {
        let (mut project, cell) = project_with_stack();
        let before = project.clone();
        let edits = vec![
            LayerField::Material(MaterialId::new("M7")),
            LayerField::PlyType(PlyType::NonStructural),
            LayerField::Rosette(RosetteRef::new("Rosette.3")),
            LayerField::Active(false),
            LayerField::Sequence("Seq.X".to_string()),
            LayerField::Orientation(Orientation::MINUS_45),
        ];

        for field in edits {
            let command = Command::edit_layer(&project, cell, 1, field.clone()).unwrap();
            command.apply(&mut project).unwrap();
            assert_eq!(
                field.current_in(project.laminate(cell).unwrap().layer(1).unwrap()),
                field
            );
            command.revert(&mut project).unwrap();
            assert_eq!(project, before);
        }
    }

    #[test]
    fn test_edit_layer_rejects_blank_material() {
        let (project, cell) = project_with_stack();
        assert!(matches!(
            Command::edit_layer(&project, cell, 0, LayerField::Material(MaterialId::new(" "))),
            Err(GridError::InvalidLayerField { .. })
        ));
    }

    #[test]
    fn test_stale_edit_is_rejected() {
        let (mut project, cell) = project_with_stack();
        let command =
            Command::edit_layer(&project, cell, 0, LayerField::Material(MaterialId::new("M2")))
                .unwrap();
        project
            .set_layer_field(cell, 0, LayerField::Material(MaterialId::new("M3")))
            .unwrap();
        let before = project.clone();

        assert!(matches!(
            command.apply(&mut project),
            Err(GridError::StaleCommand { .. })
        ));
        assert_eq!(project, before);
    }

    #[test]
    fn test_descriptions() {
        let (project, cell) = project_with_stack();
        let command = Command::change_orientation(&project, cell, 1, Orientation::ZERO).unwrap();
        assert_eq!(command.description(), "Change C1 row 2 from 90\u{00B0} to 0\u{00B0}");
        assert_eq!(
            Command::move_column(2, MoveDirection::Left).description(),
            "Move column 3 left"
        );
        let edit =
            Command::edit_layer(&project, cell, 0, LayerField::Active(false)).unwrap();
        assert_eq!(
            edit.description(),
            "Change active flag of C1 row 1 from active to inactive"
        );
    }
}

//! Sequence-wide edits
//!
//! These touch many laminates at once, so the controller records them as
//! snapshot pairs rather than commands. Each operation validates its input
//! before mutating anything: on error the project is left untouched.

use log::debug;

use crate::error::{GridError, IndexTarget, Result};
use crate::model::{CellId, Layer, LayerField, MaterialId, Orientation, Project};

/// Insert a copy of `template` at row `index` of every laminate that
/// already has at least `index` layers. Returns how many laminates changed.
pub fn insert_sequence(project: &mut Project, index: usize, template: &Layer) -> Result<usize> {
    let rows = project.max_layer_count();
    if index > rows {
        return Err(GridError::OutOfRange {
            target: IndexTarget::Sequences,
            index,
            len: rows,
        });
    }

    let mut touched = 0;
    for laminate in project.laminates_mut() {
        if laminate.len() >= index {
            laminate.insert_layer(index, template.clone())?;
            touched += 1;
        }
    }
    debug!("Inserted sequence row {} into {} laminates", index + 1, touched);
    Ok(touched)
}

/// Remove row `index` from every laminate that has it. Returns how many
/// laminates changed.
pub fn remove_sequence(project: &mut Project, index: usize) -> Result<usize> {
    let rows = project.max_layer_count();
    if index >= rows {
        return Err(GridError::OutOfRange {
            target: IndexTarget::Sequences,
            index,
            len: rows,
        });
    }

    let mut touched = 0;
    for laminate in project.laminates_mut() {
        if index < laminate.len() {
            laminate.remove_layer(index)?;
            touched += 1;
        }
    }
    debug!("Removed sequence row {} from {} laminates", index + 1, touched);
    Ok(touched)
}

/// Set `orientation` on every `(cell, row)` target. Returns how many plies
/// actually changed value.
pub fn set_orientations(
    project: &mut Project,
    targets: &[(CellId, usize)],
    orientation: Orientation,
) -> Result<usize> {
    check_targets(project, targets)?;

    let mut changed = 0;
    for &(cell, index) in targets {
        if project.set_orientation(cell, index, orientation)? != orientation {
            changed += 1;
        }
    }
    debug!("Set {} on {} plies ({} changed)", orientation, targets.len(), changed);
    Ok(changed)
}

/// Set `material` on every `(cell, row)` target. Returns how many plies
/// actually changed value.
pub fn set_materials(
    project: &mut Project,
    targets: &[(CellId, usize)],
    material: &MaterialId,
) -> Result<usize> {
    let material = MaterialId::new(material.as_str().trim());
    LayerField::Material(material.clone()).validate()?;
    check_targets(project, targets)?;

    let mut changed = 0;
    for &(cell, index) in targets {
        if project.laminate_mut(cell)?.set_material(index, material.clone())? != material {
            changed += 1;
        }
    }
    debug!("Set material {} on {} plies ({} changed)", material, targets.len(), changed);
    Ok(changed)
}

fn check_targets(project: &Project, targets: &[(CellId, usize)]) -> Result<()> {
    for &(cell, index) in targets {
        let laminate = project.laminate(cell)?;
        if index >= laminate.len() {
            return Err(GridError::layer_out_of_range(index, laminate.len()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Laminate;
    use pretty_assertions::assert_eq;

    fn ply(degrees: i32) -> Layer {
        Layer::new(Orientation::from_whole_degrees(degrees).unwrap(), "M1")
    }

    fn sample() -> Project {
        Project::with_laminates(vec![
            Laminate::with_layers("A", vec![ply(0), ply(90), ply(0)]),
            Laminate::with_layers("B", vec![ply(45)]),
            Laminate::new("C"),
        ])
    }

    fn orientations(project: &Project, position: usize) -> Vec<i32> {
        let cell = project.cell_at(position).unwrap();
        project
            .laminate(cell)
            .unwrap()
            .iter()
            .map(|l| l.orientation.degrees() as i32)
            .collect()
    }

    #[test]
    fn test_insert_sequence_skips_short_laminates() {
        let mut project = sample();
        let touched = insert_sequence(&mut project, 2, &ply(-45)).unwrap();

        assert_eq!(touched, 1);
        assert_eq!(orientations(&project, 0), vec![0, 90, -45, 0]);
        assert_eq!(orientations(&project, 1), vec![45]);
    }

    #[test]
    fn test_insert_sequence_at_top_reaches_every_laminate() {
        let mut project = sample();
        assert_eq!(insert_sequence(&mut project, 0, &ply(90)).unwrap(), 3);
        assert_eq!(orientations(&project, 2), vec![90]);
    }

    #[test]
    fn test_insert_sequence_past_end() {
        let mut project = sample();
        let before = project.clone();
        assert!(matches!(
            insert_sequence(&mut project, 4, &ply(0)),
            Err(GridError::OutOfRange {
                target: IndexTarget::Sequences,
                index: 4,
                len: 3
            })
        ));
        assert_eq!(project, before);
    }

    #[test]
    fn test_remove_sequence() {
        let mut project = sample();
        assert_eq!(remove_sequence(&mut project, 0).unwrap(), 2);
        assert_eq!(orientations(&project, 0), vec![90, 0]);
        assert!(orientations(&project, 1).is_empty());
    }

    #[test]
    fn test_remove_sequence_out_of_range() {
        let mut project = sample();
        assert!(matches!(
            remove_sequence(&mut project, 3),
            Err(GridError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_set_orientations_validates_first() {
        let mut project = sample();
        let before = project.clone();
        let a = project.cell_at(0).unwrap();
        let b = project.cell_at(1).unwrap();
        let forty_five = Orientation::PLUS_45;

        let result = set_orientations(&mut project, &[(a, 0), (b, 5)], forty_five);
        assert!(result.is_err());
        assert_eq!(project, before);

        let changed = set_orientations(&mut project, &[(a, 0), (b, 0)], forty_five).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(orientations(&project, 0), vec![45, 90, 0]);
    }

    #[test]
    fn test_set_materials() {
        let mut project = sample();
        let before = project.clone();
        let a = project.cell_at(0).unwrap();
        let b = project.cell_at(1).unwrap();

        assert!(set_materials(&mut project, &[(a, 0)], &MaterialId::new(" ")).is_err());
        assert!(set_materials(&mut project, &[(a, 0), (b, 1)], &MaterialId::new("M2")).is_err());
        assert_eq!(project, before);

        let changed = set_materials(&mut project, &[(a, 0), (a, 2), (b, 0)], &MaterialId::new("M2"))
            .unwrap();
        assert_eq!(changed, 3);
        assert_eq!(project.laminate(a).unwrap().layer(2).unwrap().material.as_str(), "M2");
        assert_eq!(project.laminate(a).unwrap().layer(1).unwrap().material.as_str(), "M1");
    }
}

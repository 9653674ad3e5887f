//! Sequence rows of the stacking grid.
//!
//! Row `n` of the grid is layer `n` of every laminate that has one. The
//! row header shows the first sequence label and material found in it.

use crate::model::{MaterialId, Project};

/// Header data for one sequence row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRow {
    /// Zero-based row index
    pub index: usize,
    /// First non-empty sequence label in the row, else `Seq.<n>`
    pub label: String,
    /// First non-empty material in the row
    pub material: Option<MaterialId>,
    /// How many columns have a layer in this row
    pub populated: usize,
}

/// Build one header row per layer index up to the tallest laminate.
pub fn sequence_rows(project: &Project) -> Vec<SequenceRow> {
    (0..project.max_layer_count())
        .map(|index| {
            let layers: Vec<_> = project
                .columns()
                .filter_map(|cell| cell.laminate.layer(index))
                .collect();

            let label = layers
                .iter()
                .map(|l| l.sequence.trim())
                .find(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Seq.{}", index + 1));
            let material = layers
                .iter()
                .map(|l| &l.material)
                .find(|m| !m.is_empty())
                .cloned();

            SequenceRow {
                index,
                label,
                material,
                populated: layers.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Laminate, Layer, Orientation};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rows_follow_tallest_laminate() {
        let mut project = Project::new();
        project.add_column(Laminate::with_layers(
            "A",
            vec![Layer::new(Orientation::ZERO, "")],
        ));
        project.add_column(Laminate::with_layers(
            "B",
            vec![
                Layer::new(Orientation::ZERO, "M1"),
                Layer::new(Orientation::NINETY, "M2").with_sequence("Core"),
            ],
        ));

        let rows = sequence_rows(&project);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Seq.1");
        assert_eq!(rows[0].material, Some(MaterialId::new("M1")));
        assert_eq!(rows[0].populated, 2);
        assert_eq!(rows[1].label, "Core");
        assert_eq!(rows[1].populated, 1);
    }

    #[test]
    fn test_empty_project_has_no_rows() {
        assert!(sequence_rows(&Project::new()).is_empty());
    }
}

//! Snapshot Engine
//!
//! A snapshot owns a full deep copy of the project. Capturing clones every
//! cell, laminate and layer; restoring clones them back, so neither side
//! ever shares storage with the other. Both cost O(total layers).

use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::error::Result;
use crate::model::Project;

/// Deep, independent copy of a project at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    project: Project,
    taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Deep-copy the live project.
    pub fn capture(project: &Project) -> Self {
        debug!(
            "Capturing snapshot of {} columns / {} layers",
            project.column_count(),
            project.total_layers()
        );
        Self {
            project: project.clone(),
            taken_at: Utc::now(),
        }
    }

    /// Replace the live project's content with a fresh copy of this snapshot.
    ///
    /// A snapshot that fails the integrity check is refused and the live
    /// project is left as it was. The live id allocator never moves back.
    pub fn restore(&self, project: &mut Project) -> Result<()> {
        if let Err(e) = self.project.check_integrity() {
            error!("Refusing to restore snapshot from {}: {}", self.taken_at, e);
            return Err(e);
        }
        debug!("Restoring snapshot from {}", self.taken_at);
        project.replace_content(self.project.clone());
        Ok(())
    }

    /// Read access to the captured state
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// When the snapshot was taken
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Fingerprint of the captured state
    pub fn fingerprint(&self) -> String {
        self.project.fingerprint()
    }

    /// Whether the captured state is observably the same as `project`
    pub fn matches(&self, project: &Project) -> bool {
        self.project.fingerprint() == project.fingerprint()
    }
}

/// Deep-copy the live project.
pub fn capture(project: &Project) -> Snapshot {
    Snapshot::capture(project)
}

/// Restore `snapshot` into the live project.
pub fn restore(project: &mut Project, snapshot: &Snapshot) -> Result<()> {
    snapshot.restore(project)
}

/// States either side of an operation too structural for a command.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPair {
    pub before: Snapshot,
    pub after: Snapshot,
}

impl SnapshotPair {
    pub fn new(before: Snapshot, after: Snapshot) -> Self {
        Self { before, after }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::model::{Laminate, Layer, Orientation};
    use pretty_assertions::assert_eq;

    fn sample() -> Project {
        Project::with_laminates([
            Laminate::with_layers("A", vec![Layer::new(Orientation::ZERO, "M1")]),
            Laminate::with_layers("B", vec![Layer::new(Orientation::PLUS_45, "M2")]),
        ])
    }

    #[test]
    fn test_capture_is_not_aliased() {
        let mut project = sample();
        let snapshot = capture(&project);
        let frozen = snapshot.fingerprint();

        let first = project.cell_at(0).unwrap();
        project
            .insert_layer(first, 0, Layer::new(Orientation::NINETY, "M3"))
            .unwrap();
        project.set_orientation(first, 1, Orientation::MINUS_45).unwrap();
        project.add_column(Laminate::new("C"));

        assert_eq!(snapshot.fingerprint(), frozen);
        assert_eq!(snapshot.project().column_count(), 2);
    }

    #[test]
    fn test_restore_round_trip() {
        let mut project = sample();
        let snapshot = capture(&project);
        let cell = project.cell_at(1).unwrap();
        project.remove_layer(cell, 0).unwrap();
        project.remove_column(cell).unwrap();

        restore(&mut project, &snapshot).unwrap();
        assert_eq!(&project, snapshot.project());
    }

    #[test]
    fn test_restored_state_does_not_alias_snapshot() {
        let mut project = sample();
        let snapshot = capture(&project);
        restore(&mut project, &snapshot).unwrap();

        let cell = project.cell_at(0).unwrap();
        project.remove_layer(cell, 0).unwrap();
        assert_eq!(snapshot.project().laminate(cell).unwrap().len(), 1);
    }

    #[test]
    fn test_restore_keeps_id_allocator() {
        let mut project = sample();
        let snapshot = capture(&project);
        let added = project.add_column(Laminate::new("C"));
        restore(&mut project, &snapshot).unwrap();
        let next = project.add_column(Laminate::new("D"));
        assert_ne!(next, added);
    }

    #[test]
    fn test_corrupt_snapshot_is_refused() {
        let mut broken = sample();
        broken.order_mut().pop();
        let snapshot = capture(&broken);

        let mut project = sample();
        let before = project.clone();
        assert!(matches!(
            restore(&mut project, &snapshot),
            Err(GridError::IntegrityViolation { .. })
        ));
        assert_eq!(project, before);
    }
}

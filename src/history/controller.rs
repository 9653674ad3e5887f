//! Undo/Redo Controller
//!
//! Owns the live project and its history. Every state-changing call goes
//! through here so the history cursor, the integrity checkpoint and the
//! editor notifications stay in step with the project.

use log::{debug, error, info, warn};

use super::command::Command;
use super::record::{History, HistoryEntry, HistoryRecord};
use super::reorder::{self, MoveDirection};
use super::sequence;
use super::snapshot::{Snapshot, SnapshotPair};
use crate::config::EditorConfig;
use crate::error::{GridError, Result};
use crate::model::{Cell, CellId, Laminate, Layer, LayerField, MaterialId, Orientation, Project};

/// Callbacks fired by the controller.
///
/// None carries the project; the receiver re-reads whatever it displays.
pub trait EditorHooks {
    /// Redraw the grid from the current project.
    fn rebuild_view(&mut self) {}

    /// Flag the document as modified.
    fn mark_dirty(&mut self) {}

    /// The controller entered `state`. Every operation ends back in `Idle`.
    fn state_changed(&mut self, _state: ControllerState) {}
}

/// Hooks that ignore every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl EditorHooks for NoopHooks {}

/// What the controller is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Applying,
    Undoing,
    Redoing,
}

/// Why running a history entry did not stick.
enum Failure {
    /// Refused before anything changed.
    Rejected(GridError),
    /// Broke the bijection and was undone by running the entry the other way.
    RolledBack(GridError),
    /// Broke the bijection and could not be undone.
    Unrecoverable(GridError),
}

/// The single mutable cursor over the project's edit history.
pub struct UndoController {
    project: Project,
    history: History,
    hooks: Box<dyn EditorHooks>,
    config: EditorConfig,

    /// Last whole-project state known to be consistent. Taken at startup
    /// and whenever a snapshot entry runs; used only when a rollback fails.
    checkpoint: Option<Snapshot>,

    state: ControllerState,
}

impl UndoController {
    /// Take ownership of `project`. Fails if it is already inconsistent.
    pub fn new(project: Project, config: EditorConfig) -> Result<Self> {
        project.check_integrity()?;
        let checkpoint = config
            .verify_integrity
            .then(|| Snapshot::capture(&project));
        Ok(Self {
            history: History::new(config.max_undo_levels),
            project,
            hooks: Box::new(NoopHooks),
            config,
            checkpoint,
            state: ControllerState::Idle,
        })
    }

    /// Replace the notification hooks.
    pub fn with_hooks(mut self, hooks: impl EditorHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Give the project back, dropping the history.
    pub fn into_project(self) -> Project {
        self.project
    }

    // ------------------------------------------------------------------
    // Core protocol
    // ------------------------------------------------------------------

    /// Record an entry, discarding anything that was undone.
    ///
    /// A command is applied here. A snapshot pair describes an edit that
    /// already ran, so its "after" state must be the live one.
    pub fn push(&mut self, description: impl Into<String>, entry: HistoryEntry) -> Result<()> {
        let description = description.into();
        self.set_state(ControllerState::Applying);
        let verify = self.config.verify_integrity;

        let outcome = match &entry {
            HistoryEntry::Command(command) => command
                .apply(&mut self.project)
                .map_err(Failure::Rejected)
                .and_then(|_| check(&mut self.project, &entry, true, verify)),
            HistoryEntry::Snapshot(pair) if !pair.after.matches(&self.project) => {
                Err(Failure::Rejected(GridError::IntegrityViolation {
                    reason: format!("'{}' was recorded against a different state", description),
                }))
            }
            HistoryEntry::Snapshot(_) => check(&mut self.project, &entry, true, verify),
        };
        self.settle(outcome, "Rejected", &description)?;

        if let HistoryEntry::Snapshot(pair) = &entry {
            self.refresh_checkpoint(&pair.after);
        }
        info!("Recorded: {}", description);
        self.history.record(HistoryRecord::new(description, entry));
        self.finish();
        Ok(())
    }

    /// Apply and record a command, described by the command itself.
    pub fn push_command(&mut self, command: Command) -> Result<()> {
        let description = command.description();
        self.push(description, HistoryEntry::Command(command))
    }

    /// Run `op` on the live project and record it as one snapshot pair.
    ///
    /// If `op` fails the project is restored to how it was before. An
    /// operation that changes nothing is not recorded.
    pub fn run_compound<T, F>(&mut self, description: impl Into<String>, op: F) -> Result<T>
    where
        F: FnOnce(&mut Project) -> Result<T>,
    {
        let description = description.into();
        let before = Snapshot::capture(&self.project);
        self.set_state(ControllerState::Applying);

        let value = match op(&mut self.project) {
            Ok(value) => value,
            Err(e) => {
                warn!("Compound '{}' failed: {}", description, e);
                if let Err(restore_err) = before.restore(&mut self.project) {
                    error!("Could not roll back '{}': {}", description, restore_err);
                    self.fall_back();
                }
                self.set_state(ControllerState::Idle);
                return Err(e);
            }
        };

        if before.matches(&self.project) {
            debug!("Compound '{}' changed nothing; not recorded", description);
            self.set_state(ControllerState::Idle);
            return Ok(value);
        }

        info!("Compound: {}", description);
        let after = Snapshot::capture(&self.project);
        self.push(description, HistoryEntry::Snapshot(SnapshotPair::new(before, after)))?;
        Ok(value)
    }

    /// Revert the most recent applied entry.
    pub fn undo(&mut self) -> Result<()> {
        self.replay(false)
    }

    /// Re-apply the most recently undone entry.
    pub fn redo(&mut self) -> Result<()> {
        self.replay(true)
    }

    /// Forget all history. The project itself is unchanged.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ------------------------------------------------------------------
    // Editing intents
    // ------------------------------------------------------------------

    pub fn insert_layer(&mut self, cell: CellId, index: usize, layer: Layer) -> Result<()> {
        self.push_command(Command::insert_layer(cell, index, layer))
    }

    pub fn remove_layer(&mut self, cell: CellId, index: usize) -> Result<()> {
        let command = Command::remove_layer(&self.project, cell, index)?;
        self.push_command(command)
    }

    /// Change one ply's orientation. Setting the current value is a no-op.
    pub fn change_orientation(
        &mut self,
        cell: CellId,
        index: usize,
        orientation: Orientation,
    ) -> Result<()> {
        let command = Command::change_orientation(&self.project, cell, index, orientation)?;
        if let Command::ChangeOrientation { old, .. } = &command {
            if *old == orientation {
                debug!("{} row {} is already {}", cell, index + 1, orientation);
                return Ok(());
            }
        }
        self.push_command(command)
    }

    /// Change any one ply attribute. Setting the current value is a no-op.
    pub fn edit_layer(&mut self, cell: CellId, index: usize, field: LayerField) -> Result<()> {
        let command = Command::edit_layer(&self.project, cell, index, field)?;
        if let Command::EditLayer { old, new, .. } = &command {
            if old == new {
                debug!("{} row {} already has {} {}", cell, index + 1, new.name(), new);
                return Ok(());
            }
        }
        self.push_command(command)
    }

    pub fn set_material(
        &mut self,
        cell: CellId,
        index: usize,
        material: impl Into<MaterialId>,
    ) -> Result<()> {
        let material: MaterialId = material.into();
        let material = MaterialId::new(material.as_str().trim());
        self.edit_layer(cell, index, LayerField::Material(material))
    }

    /// Move the column at `index` one step left, returning its new index.
    pub fn move_column_left(&mut self, index: usize) -> Result<usize> {
        self.move_column(index, MoveDirection::Left)
    }

    /// Move the column at `index` one step right, returning its new index.
    pub fn move_column_right(&mut self, index: usize) -> Result<usize> {
        self.move_column(index, MoveDirection::Right)
    }

    fn move_column(&mut self, index: usize, direction: MoveDirection) -> Result<usize> {
        let destination = reorder::check_move(&self.project, index, direction).map_err(|e| {
            warn!("Rejected column move: {}", e);
            e
        })?;
        self.push_command(Command::move_column(index, direction))?;
        Ok(destination)
    }

    /// Move a column any distance as a single undoable step.
    pub fn move_column_to(&mut self, from: usize, to: usize) -> Result<()> {
        self.run_compound(format!("Move column {} to {}", from + 1, to + 1), |project| {
            reorder::move_column_to(project, from, to)
        })
    }

    /// Insert a copy of `template` as row `index` across the grid.
    pub fn insert_sequence(&mut self, index: usize, template: Layer) -> Result<usize> {
        self.run_compound(format!("Insert sequence {}", index + 1), |project| {
            sequence::insert_sequence(project, index, &template)
        })
    }

    /// Remove row `index` across the grid.
    pub fn remove_sequence(&mut self, index: usize) -> Result<usize> {
        self.run_compound(format!("Remove sequence {}", index + 1), |project| {
            sequence::remove_sequence(project, index)
        })
    }

    /// Set one orientation on many plies as a single undoable step.
    pub fn set_orientations(
        &mut self,
        targets: &[(CellId, usize)],
        orientation: Orientation,
    ) -> Result<usize> {
        let description = format!("Set {} plies to {}", targets.len(), orientation);
        self.run_compound(description, |project| {
            sequence::set_orientations(project, targets, orientation)
        })
    }

    /// Set one material on many plies as a single undoable step.
    pub fn set_materials(
        &mut self,
        targets: &[(CellId, usize)],
        material: &MaterialId,
    ) -> Result<usize> {
        let description = format!("Set {} plies to material {}", targets.len(), material);
        self.run_compound(description, |project| {
            sequence::set_materials(project, targets, material)
        })
    }

    pub fn add_column(&mut self, laminate: Laminate) -> Result<CellId> {
        self.run_compound("Add column", |project| Ok(project.add_column(laminate)))
    }

    pub fn insert_column(&mut self, position: usize, laminate: Laminate) -> Result<CellId> {
        self.run_compound(format!("Insert column {}", position + 1), |project| {
            project.insert_column(position, laminate)
        })
    }

    /// Remove a column, returning the cell that owned it.
    pub fn remove_column(&mut self, cell: CellId) -> Result<Cell> {
        self.run_compound(format!("Remove column {}", cell), |project| {
            project.remove_column(cell).map(|(_, removed)| removed)
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Run the next entry in one direction and move the cursor past it.
    fn replay(&mut self, forward: bool) -> Result<()> {
        let (state, verb) = if forward {
            (ControllerState::Redoing, "Redo")
        } else {
            (ControllerState::Undoing, "Undo")
        };
        let edge = || {
            if forward {
                GridError::NothingToRedo
            } else {
                GridError::NothingToUndo
            }
        };
        let available = if forward {
            self.history.can_redo()
        } else {
            self.history.can_undo()
        };
        if !available {
            debug!("{}", edge());
            return Err(edge());
        }

        self.set_state(state);
        let verify = self.config.verify_integrity;
        let record = if forward {
            self.history.peek_redo()
        } else {
            self.history.peek_undo()
        };
        let (outcome, description, reached) = match record {
            Some(record) => {
                let outcome = run(&mut self.project, &record.entry, forward)
                    .map_err(Failure::Rejected)
                    .and_then(|_| check(&mut self.project, &record.entry, forward, verify));
                let reached = match &record.entry {
                    HistoryEntry::Snapshot(pair) if verify && outcome.is_ok() => {
                        let live = if forward { &pair.after } else { &pair.before };
                        Some(live.clone())
                    }
                    _ => None,
                };
                (outcome, record.description.clone(), reached)
            }
            None => (Err(Failure::Rejected(edge())), String::new(), None),
        };
        self.settle(outcome, &format!("{} failed for", verb), &description)?;

        if reached.is_some() {
            self.checkpoint = reached;
        }
        if forward {
            self.history.step_forward();
        } else {
            self.history.step_back();
        }
        info!("{}: {}", verb, description);
        self.finish();
        Ok(())
    }

    /// Turn a failed outcome into an error, falling back to the checkpoint
    /// when the entry could not be rolled back.
    fn settle(
        &mut self,
        outcome: std::result::Result<(), Failure>,
        context: &str,
        description: &str,
    ) -> Result<()> {
        let error = match outcome {
            Ok(()) => return Ok(()),
            Err(Failure::Rejected(e)) => {
                if e.is_recoverable() {
                    warn!("{} '{}': {}", context, description, e);
                } else {
                    error!("{} '{}': {}", context, description, e);
                }
                e
            }
            Err(Failure::RolledBack(e)) => {
                error!("'{}' broke the project and was rolled back: {}", description, e);
                e
            }
            Err(Failure::Unrecoverable(e)) => {
                error!("'{}' broke the project and could not be rolled back", description);
                self.fall_back();
                e
            }
        };
        self.set_state(ControllerState::Idle);
        Err(error)
    }

    fn refresh_checkpoint(&mut self, snapshot: &Snapshot) {
        if self.config.verify_integrity {
            self.checkpoint = Some(snapshot.clone());
        }
    }

    /// Put the last known-good state back in place. The history no longer
    /// describes the project after that, so it is dropped.
    fn fall_back(&mut self) {
        let Some(checkpoint) = self.checkpoint.take() else {
            error!("No checkpoint to fall back to");
            return;
        };
        match checkpoint.restore(&mut self.project) {
            Ok(()) => {
                error!(
                    "Restored checkpoint from {}; history cleared",
                    checkpoint.taken_at()
                );
                self.history.clear();
                self.notify();
            }
            Err(e) => error!("Checkpoint restore failed: {}", e),
        }
        self.checkpoint = Some(checkpoint);
    }

    fn set_state(&mut self, state: ControllerState) {
        if self.state != state {
            self.state = state;
            self.hooks.state_changed(state);
        }
    }

    fn finish(&mut self) {
        self.notify();
        self.set_state(ControllerState::Idle);
    }

    fn notify(&mut self) {
        self.hooks.rebuild_view();
        self.hooks.mark_dirty();
    }

    #[cfg(test)]
    pub(crate) fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }
}

/// Run `entry` forward (apply) or backward (revert).
fn run(project: &mut Project, entry: &HistoryEntry, forward: bool) -> Result<()> {
    match (entry, forward) {
        (HistoryEntry::Command(command), true) => command.apply(project),
        (HistoryEntry::Command(command), false) => command.revert(project),
        (HistoryEntry::Snapshot(pair), true) => pair.after.restore(project),
        (HistoryEntry::Snapshot(pair), false) => pair.before.restore(project),
    }
}

/// Check the bijection after `entry` ran. A broken result is undone by
/// running the same entry the other way.
fn check(
    project: &mut Project,
    entry: &HistoryEntry,
    forward: bool,
    verify: bool,
) -> std::result::Result<(), Failure> {
    if !verify {
        return Ok(());
    }
    let Err(violation) = project.check_integrity() else {
        return Ok(());
    };
    error!("Integrity check failed: {}", violation);
    match run(project, entry, !forward).and_then(|_| project.check_integrity()) {
        Ok(()) => Err(Failure::RolledBack(violation)),
        Err(e) => {
            error!("Rollback failed: {}", e);
            Err(Failure::Unrecoverable(violation))
        }
    }
}

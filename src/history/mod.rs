//! Reversible editing: commands, snapshots, the linear history and the
//! controller that drives them.

pub mod command;
pub mod controller;
pub mod record;
pub mod reorder;
pub mod sequence;
pub mod snapshot;

pub use command::Command;
pub use controller::{ControllerState, EditorHooks, NoopHooks, UndoController};
pub use record::{History, HistoryEntry, HistoryRecord, DEFAULT_MAX_UNDO_LEVELS};
pub use reorder::{move_column_left, move_column_right, move_column_to, MoveDirection};
pub use snapshot::{capture, restore, Snapshot, SnapshotPair};

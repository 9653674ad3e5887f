//! Laminate Model
//!
//! Authoritative in-memory representation of the grid:
//! - `Project`: ordered columns (cells), each owning one laminate
//! - `Laminate`: ordered stack of layers plus column metadata
//! - `Layer`: one ply with orientation, material, ply type and rosette

mod laminate;
mod layer;
mod orientation;
mod project;

pub use laminate::{Laminate, DEFAULT_COLOR_INDEX, MAX_COLOR_INDEX};
pub use layer::{Layer, LayerField, MaterialId, PlyType, RosetteRef, DEFAULT_ROSETTE};
pub use orientation::{Orientation, ORIENTATION_MAX, ORIENTATION_MIN};
pub use project::{Cell, CellId, Project};

//! Layer - a single ply in a laminate stack.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::orientation::Orientation;
use crate::error::{GridError, Result};

/// Rosette assigned to new plies when none is given.
pub const DEFAULT_ROSETTE: &str = "Rosette.1";

/// Reference to a material definition (lookup only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(String);

impl MaterialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whitespace-collapsed, upper-cased form used when comparing materials.
    pub fn normalized(&self) -> String {
        self.0.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MaterialId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Reference to a rosette / local coordinate system (lookup only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosetteRef(String);

impl RosetteRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RosetteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for RosetteRef {
    fn default() -> Self {
        Self(DEFAULT_ROSETTE.to_string())
    }
}

/// Whether a ply counts towards the structural stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlyType {
    #[default]
    Structural,
    NonStructural,
}

impl PlyType {
    /// Map a free-text label onto a ply type.
    ///
    /// Accepts the English and Portuguese labels found in older grids,
    /// ignoring case, accents, spaces and punctuation. Unknown or empty
    /// text falls back to `Structural`.
    pub fn from_label(label: &str) -> Self {
        match label_token(label).as_str() {
            "nonstructuralply" | "nonstructural" | "naoconsiderar" => PlyType::NonStructural,
            _ => PlyType::Structural,
        }
    }

    /// Whether `label` is one of the recognised ply type labels.
    pub fn is_known_label(label: &str) -> bool {
        matches!(
            label_token(label).as_str(),
            "structuralply"
                | "structural"
                | "considerar"
                | "nonstructuralply"
                | "nonstructural"
                | "naoconsiderar"
        )
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, PlyType::Structural)
    }
}

impl fmt::Display for PlyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlyType::Structural => write!(f, "Structural"),
            PlyType::NonStructural => write!(f, "Non-structural"),
        }
    }
}

fn label_token(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            'ã' | 'á' | 'â' | 'à' | 'Ã' | 'Á' | 'Â' | 'À' => 'a',
            other => other,
        })
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// One physical ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Fiber angle
    pub orientation: Orientation,
    /// Material reference
    pub material: MaterialId,
    /// Structural classification
    #[serde(default)]
    pub ply_type: PlyType,
    /// Local coordinate reference
    #[serde(default)]
    pub rosette: RosetteRef,
    /// Inactive plies stay in the stack but are greyed out by the grid
    #[serde(default = "default_active")]
    pub active: bool,
    /// Optional sequence label shown in the row header
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sequence: String,
}

fn default_active() -> bool {
    true
}

impl Layer {
    /// Create an active structural ply on the default rosette.
    pub fn new(orientation: Orientation, material: impl Into<MaterialId>) -> Self {
        Self {
            orientation,
            material: material.into(),
            ply_type: PlyType::Structural,
            rosette: RosetteRef::default(),
            active: true,
            sequence: String::new(),
        }
    }

    pub fn with_ply_type(mut self, ply_type: PlyType) -> Self {
        self.ply_type = ply_type;
        self
    }

    pub fn with_rosette(mut self, rosette: RosetteRef) -> Self {
        self.rosette = rosette;
        self
    }

    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = sequence.into();
        self
    }
}

/// One editable ply attribute together with its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum LayerField {
    Orientation(Orientation),
    Material(MaterialId),
    PlyType(PlyType),
    Rosette(RosetteRef),
    Active(bool),
    Sequence(String),
}

impl LayerField {
    /// Attribute name for messages
    pub fn name(&self) -> &'static str {
        match self {
            LayerField::Orientation(_) => "orientation",
            LayerField::Material(_) => "material",
            LayerField::PlyType(_) => "ply type",
            LayerField::Rosette(_) => "rosette",
            LayerField::Active(_) => "active flag",
            LayerField::Sequence(_) => "sequence",
        }
    }

    /// The same attribute as currently held by `layer`.
    pub fn current_in(&self, layer: &Layer) -> LayerField {
        match self {
            LayerField::Orientation(_) => LayerField::Orientation(layer.orientation),
            LayerField::Material(_) => LayerField::Material(layer.material.clone()),
            LayerField::PlyType(_) => LayerField::PlyType(layer.ply_type),
            LayerField::Rosette(_) => LayerField::Rosette(layer.rosette.clone()),
            LayerField::Active(_) => LayerField::Active(layer.active),
            LayerField::Sequence(_) => LayerField::Sequence(layer.sequence.clone()),
        }
    }

    /// Material and rosette references must name something.
    pub fn validate(&self) -> Result<()> {
        let blank = match self {
            LayerField::Material(material) => material.is_empty().then(|| material.as_str()),
            LayerField::Rosette(rosette) => {
                rosette.as_str().trim().is_empty().then(|| rosette.as_str())
            }
            _ => None,
        };
        match blank {
            Some(value) => Err(GridError::InvalidLayerField {
                field: self.name(),
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for LayerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerField::Orientation(orientation) => write!(f, "{}", orientation),
            LayerField::Material(material) => write!(f, "{}", material),
            LayerField::PlyType(ply_type) => write!(f, "{}", ply_type),
            LayerField::Rosette(rosette) => write!(f, "{}", rosette),
            LayerField::Active(true) => write!(f, "active"),
            LayerField::Active(false) => write!(f, "inactive"),
            LayerField::Sequence(label) if label.is_empty() => write!(f, "(none)"),
            LayerField::Sequence(label) => write!(f, "{}", label),
        }
    }
}

impl Layer {
    /// Store `field` (unvalidated) and return the value it replaced.
    pub(crate) fn replace_field(&mut self, field: LayerField) -> LayerField {
        match field {
            LayerField::Orientation(v) => {
                LayerField::Orientation(std::mem::replace(&mut self.orientation, v))
            }
            LayerField::Material(v) => {
                LayerField::Material(std::mem::replace(&mut self.material, v))
            }
            LayerField::PlyType(v) => LayerField::PlyType(std::mem::replace(&mut self.ply_type, v)),
            LayerField::Rosette(v) => LayerField::Rosette(std::mem::replace(&mut self.rosette, v)),
            LayerField::Active(v) => LayerField::Active(std::mem::replace(&mut self.active, v)),
            LayerField::Sequence(v) => {
                LayerField::Sequence(std::mem::replace(&mut self.sequence, v))
            }
        }
    }
}

impl From<String> for MaterialId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

//! Laminate - an ordered stack of plies plus the metadata that travels with
//! its column.
//!
//! The point mutations here are the only way layers change. They validate
//! indices and never clamp.

use serde::{Deserialize, Deserializer, Serialize};

use super::layer::{Layer, LayerField, MaterialId, PlyType, RosetteRef};
use super::orientation::Orientation;
use crate::error::{GridError, Result};

/// Color index assigned when none is given.
pub const DEFAULT_COLOR_INDEX: u8 = 1;

/// Largest color index in the grid palette.
pub const MAX_COLOR_INDEX: u8 = 150;

/// Ordered stack of layers, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Laminate {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-form laminate type (e.g. "SS", "Core")
    #[serde(default, rename = "type")]
    pub laminate_type: String,
    /// Palette color, 1..=150
    #[serde(
        default = "default_color_index",
        deserialize_with = "deserialize_color_index"
    )]
    pub color_index: u8,
    /// Free-form tag
    #[serde(default)]
    pub tag: String,
    /// Plies in stacking order
    #[serde(default)]
    layers: Vec<Layer>,
}

fn default_color_index() -> u8 {
    DEFAULT_COLOR_INDEX
}

fn clamp_color_index(raw: i64) -> u8 {
    // Clamped into 1..=150, so the cast cannot truncate.
    raw.clamp(i64::from(DEFAULT_COLOR_INDEX), i64::from(MAX_COLOR_INDEX)) as u8
}

fn deserialize_color_index<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_color_index)
}

impl Laminate {
    /// Create an empty laminate
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            laminate_type: String::new(),
            color_index: DEFAULT_COLOR_INDEX,
            tag: String::new(),
            layers: Vec::new(),
        }
    }

    /// Create a laminate from an existing stack
    pub fn with_layers(name: impl Into<String>, layers: Vec<Layer>) -> Self {
        Self {
            layers,
            ..Self::new(name)
        }
    }

    pub fn with_type(mut self, laminate_type: impl Into<String>) -> Self {
        self.laminate_type = laminate_type.into();
        self
    }

    /// Set the palette color, clamped into `1..=MAX_COLOR_INDEX`.
    pub fn with_color_index(mut self, color_index: u8) -> Self {
        self.color_index = clamp_color_index(i64::from(color_index));
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Insert a layer so that it ends up at `index`.
    ///
    /// # Errors
    /// `OutOfRange` unless `index <= len()`
    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> Result<()> {
        if index > self.layers.len() {
            return Err(GridError::layer_out_of_range(index, self.layers.len()));
        }
        self.layers.insert(index, layer);
        Ok(())
    }

    /// Append a layer at the bottom of the stack
    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Remove and return the layer at `index`.
    ///
    /// # Errors
    /// `OutOfRange` unless `index < len()`
    pub fn remove_layer(&mut self, index: usize) -> Result<Layer> {
        if index >= self.layers.len() {
            return Err(GridError::layer_out_of_range(index, self.layers.len()));
        }
        Ok(self.layers.remove(index))
    }

    /// Replace the orientation at `index`, returning the previous value.
    ///
    /// # Errors
    /// `OutOfRange` unless `index < len()`
    pub fn set_orientation(
        &mut self,
        index: usize,
        orientation: Orientation,
    ) -> Result<Orientation> {
        let layer = self.layer_mut(index)?;
        Ok(std::mem::replace(&mut layer.orientation, orientation))
    }

    /// Replace the material at `index`, returning the previous one.
    ///
    /// # Errors
    /// `OutOfRange` for a bad index, `InvalidLayerField` for a blank material
    pub fn set_material(
        &mut self,
        index: usize,
        material: impl Into<MaterialId>,
    ) -> Result<MaterialId> {
        let material = MaterialId::new(material.into().as_str().trim());
        LayerField::Material(material.clone()).validate()?;
        let layer = self.layer_mut(index)?;
        Ok(std::mem::replace(&mut layer.material, material))
    }

    /// Replace the ply type at `index`, returning the previous one.
    pub fn set_ply_type(&mut self, index: usize, ply_type: PlyType) -> Result<PlyType> {
        let layer = self.layer_mut(index)?;
        Ok(std::mem::replace(&mut layer.ply_type, ply_type))
    }

    /// Replace the rosette at `index`, returning the previous one.
    ///
    /// # Errors
    /// `OutOfRange` for a bad index, `InvalidLayerField` for a blank name
    pub fn set_rosette(&mut self, index: usize, rosette: RosetteRef) -> Result<RosetteRef> {
        LayerField::Rosette(rosette.clone()).validate()?;
        let layer = self.layer_mut(index)?;
        Ok(std::mem::replace(&mut layer.rosette, rosette))
    }

    /// Toggle whether the ply at `index` is active, returning the old flag.
    pub fn set_active(&mut self, index: usize, active: bool) -> Result<bool> {
        let layer = self.layer_mut(index)?;
        Ok(std::mem::replace(&mut layer.active, active))
    }

    /// Replace the sequence label at `index`, returning the old label.
    pub fn set_sequence(&mut self, index: usize, sequence: impl Into<String>) -> Result<String> {
        let layer = self.layer_mut(index)?;
        Ok(std::mem::replace(&mut layer.sequence, sequence.into()))
    }

    /// Replace any one attribute of the ply at `index`, returning the
    /// previous value of that attribute. Nothing changes on error.
    pub fn set_field(&mut self, index: usize, field: LayerField) -> Result<LayerField> {
        field.validate()?;
        let layer = self.layer_mut(index)?;
        Ok(layer.replace_field(field))
    }

    fn layer_mut(&mut self, index: usize) -> Result<&mut Layer> {
        let len = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or_else(|| GridError::layer_out_of_range(index, len))
    }

    /// Get a layer by position
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// All layers in stacking order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Iterate over layers in stacking order
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Iterate over structural layers only
    pub fn structural_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.ply_type.is_structural())
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

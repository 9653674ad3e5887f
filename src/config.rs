//! Editor configuration
//!
//! Every field has a default, so a partial (or empty) JSON object is a
//! valid configuration file.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::ClassifierConfig;
use crate::error::Result;
use crate::history::DEFAULT_MAX_UNDO_LEVELS;

/// Settings for the undo controller and the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history entries kept; older ones are dropped.
    pub max_undo_levels: usize,

    /// Check the cell/order bijection after every apply, revert and restore.
    pub verify_integrity: bool,

    /// Classification thresholds.
    pub classifier: ClassifierConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
            verify_integrity: true,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Write this configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

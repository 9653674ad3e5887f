//! Orientation Classifier
//!
//! Aggregates the orientation make-up of a laminate and names its
//! predominant structural character. Pure and total: every laminate,
//! including an empty one, gets an answer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{CellId, Laminate, Orientation, Project};

/// Largest share any single orientation may hold in a quasi-isotropic
/// laminate, unless configured otherwise.
pub const DEFAULT_QUASI_MAX_SHARE: f64 = 0.5;

/// Thresholds used by [`classify_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A laminate holding all four canonical angles is quasi-isotropic when
    /// no orientation exceeds this share of the total.
    pub quasi_max_share: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            quasi_max_share: DEFAULT_QUASI_MAX_SHARE,
        }
    }
}

/// Predominant structural character of a laminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaminateType {
    /// Only 0° and 90° plies
    Hard,
    /// All of 0°, ±45° and 90° present, none dominant
    QuasiIsotropic,
    /// Anything else with plies
    Soft,
    /// No plies to judge
    Undefined,
}

impl fmt::Display for LaminateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaminateType::Hard => write!(f, "Hard"),
            LaminateType::QuasiIsotropic => write!(f, "Quasi-isotropic"),
            LaminateType::Soft => write!(f, "Soft"),
            LaminateType::Undefined => write!(f, "Undefined"),
        }
    }
}

/// Result of classifying one laminate.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationSummary {
    pub total_layers: usize,
    pub counts_by_orientation: BTreeMap<Orientation, usize>,
    pub predominant_type: LaminateType,
}

impl OrientationSummary {
    /// Number of plies at `orientation`
    pub fn count(&self, orientation: Orientation) -> usize {
        self.counts_by_orientation
            .get(&orientation)
            .copied()
            .unwrap_or(0)
    }

    /// Fraction of plies at `orientation` (0.0 for an empty laminate)
    pub fn share(&self, orientation: Orientation) -> f64 {
        if self.total_layers == 0 {
            return 0.0;
        }
        self.count(orientation) as f64 / self.total_layers as f64
    }
}

/// Classify with the default thresholds.
pub fn classify(laminate: &Laminate) -> OrientationSummary {
    classify_with(laminate, &ClassifierConfig::default())
}

/// Classify with explicit thresholds.
pub fn classify_with(laminate: &Laminate, config: &ClassifierConfig) -> OrientationSummary {
    let mut counts_by_orientation: BTreeMap<Orientation, usize> = BTreeMap::new();
    for layer in laminate.iter() {
        *counts_by_orientation.entry(layer.orientation).or_insert(0) += 1;
    }
    let total_layers = laminate.len();
    let predominant_type = predominant_type(&counts_by_orientation, total_layers, config);

    OrientationSummary {
        total_layers,
        counts_by_orientation,
        predominant_type,
    }
}

/// Classify every column of a project, in column order.
pub fn classify_project(
    project: &Project,
    config: &ClassifierConfig,
) -> Vec<(CellId, OrientationSummary)> {
    project
        .columns()
        .map(|cell| (cell.id, classify_with(&cell.laminate, config)))
        .collect()
}

fn predominant_type(
    counts: &BTreeMap<Orientation, usize>,
    total: usize,
    config: &ClassifierConfig,
) -> LaminateType {
    if total == 0 {
        return LaminateType::Undefined;
    }

    let hard = counts
        .keys()
        .all(|o| *o == Orientation::ZERO || *o == Orientation::NINETY);
    if hard {
        return LaminateType::Hard;
    }

    let all_canonical_present = Orientation::CANONICAL
        .iter()
        .all(|o| counts.contains_key(o));
    let largest = counts.values().copied().max().unwrap_or(0);
    if all_canonical_present && (largest as f64 / total as f64) <= config.quasi_max_share {
        return LaminateType::QuasiIsotropic;
    }

    LaminateType::Soft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layer;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn laminate(angles: &[i32]) -> Laminate {
        let layers = angles
            .iter()
            .map(|a| Layer::new(Orientation::from_whole_degrees(*a).unwrap(), "M1"))
            .collect();
        Laminate::with_layers("L", layers)
    }

    #[test_case(&[0, 90, 0, 90], LaminateType::Hard ; "cross ply")]
    #[test_case(&[0, 0, 0], LaminateType::Hard ; "unidirectional")]
    #[test_case(&[0, 45, -45, 90], LaminateType::QuasiIsotropic ; "balanced quad")]
    #[test_case(&[0, 45, -45, 90, 90, -45, 45, 0], LaminateType::QuasiIsotropic ; "symmetric quad")]
    #[test_case(&[0, 0, 0, 0, 0, 45, -45, 90], LaminateType::Soft ; "zero dominated")]
    #[test_case(&[45, -45, 45, -45], LaminateType::Soft ; "shear ply")]
    #[test_case(&[0, 30, 90], LaminateType::Soft ; "off axis")]
    #[test_case(&[], LaminateType::Undefined ; "empty")]
    fn test_predominant_type(angles: &[i32], expected: LaminateType) {
        assert_eq!(classify(&laminate(angles)).predominant_type, expected);
    }

    #[test]
    fn test_counts_and_shares() {
        let summary = classify(&laminate(&[0, 45, -45, 90, 0, 0]));
        assert_eq!(summary.total_layers, 6);
        assert_eq!(summary.count(Orientation::ZERO), 3);
        assert_eq!(summary.count(Orientation::NINETY), 1);
        assert_relative_eq!(summary.share(Orientation::ZERO), 0.5);
        assert_eq!(summary.predominant_type, LaminateType::QuasiIsotropic);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let stack = laminate(&[0, 0, 0, 45, -45, 90]);
        assert_eq!(classify(&stack).predominant_type, LaminateType::QuasiIsotropic);

        let strict = ClassifierConfig {
            quasi_max_share: 0.3,
        };
        assert_eq!(classify_with(&stack, &strict).predominant_type, LaminateType::Soft);
    }

    #[test]
    fn test_deterministic() {
        let stack = laminate(&[90, -45, 0, 45]);
        assert_eq!(classify(&stack), classify(&stack));
    }

    #[test]
    fn test_empty_share_is_zero() {
        let summary = classify(&Laminate::new("E"));
        assert_eq!(summary.share(Orientation::ZERO), 0.0);
        assert_eq!(summary.predominant_type.to_string(), "Undefined");
    }
}

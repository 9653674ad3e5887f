//! Fiber orientation angles.
//!
//! Orientations are kept as integer hundredths of a degree so that equality
//! and classification are exact. They serialize as plain degree numbers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Smallest accepted angle in degrees.
pub const ORIENTATION_MIN: f64 = -100.0;

/// Largest accepted angle in degrees.
pub const ORIENTATION_MAX: f64 = 100.0;

/// Degree markers stripped before parsing text input.
const DEGREE_TOKENS: [&str; 4] = ["\u{00B0}", "\u{00BA}", "deg", "DEG"];

/// Fiber angle of a single ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Orientation {
    centidegrees: i32,
}

impl Orientation {
    pub const ZERO: Orientation = Orientation { centidegrees: 0 };
    pub const PLUS_45: Orientation = Orientation { centidegrees: 4_500 };
    pub const MINUS_45: Orientation = Orientation { centidegrees: -4_500 };
    pub const NINETY: Orientation = Orientation { centidegrees: 9_000 };

    /// The four canonical angles of a quasi-isotropic layup.
    pub const CANONICAL: [Orientation; 4] = [
        Orientation::ZERO,
        Orientation::PLUS_45,
        Orientation::MINUS_45,
        Orientation::NINETY,
    ];

    /// Build an orientation from whole degrees.
    pub fn from_whole_degrees(degrees: i32) -> Result<Self> {
        Self::from_degrees(f64::from(degrees))
    }

    /// Build an orientation from a decimal degree value.
    ///
    /// The value is kept to a hundredth of a degree. `-90` is folded onto
    /// `90` since both describe the same fiber direction.
    pub fn from_degrees(degrees: f64) -> Result<Self> {
        if !degrees.is_finite() || !(ORIENTATION_MIN..=ORIENTATION_MAX).contains(&degrees) {
            return Err(GridError::InvalidOrientation {
                value: degrees.to_string(),
            });
        }

        let mut centidegrees = (degrees * 100.0).round() as i32;
        if centidegrees == -9_000 {
            centidegrees = 9_000;
        }

        Ok(Self { centidegrees })
    }

    /// Parse user input such as `"45"`, `"+45"`, `"-45°"`, `"90 deg"` or `"22,5"`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || GridError::InvalidOrientation {
            value: text.to_string(),
        };

        let mut cleaned = text.trim().to_string();
        for token in DEGREE_TOKENS {
            cleaned = cleaned.replace(token, "");
        }
        let cleaned = cleaned.trim().replace(',', ".");

        let digits = cleaned
            .strip_prefix('+')
            .or_else(|| cleaned.strip_prefix('-'))
            .unwrap_or(&cleaned);
        let mut parts = digits.splitn(2, '.');
        let whole = parts.next().unwrap_or_default();
        let fraction = parts.next();

        let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if !is_digits(whole) || fraction.is_some_and(|f| !is_digits(f)) {
            return Err(invalid());
        }

        let value: f64 = cleaned.parse().map_err(|_| invalid())?;
        Self::from_degrees(value).map_err(|_| invalid())
    }

    /// Angle in degrees.
    pub fn degrees(&self) -> f64 {
        f64::from(self.centidegrees) / 100.0
    }

    /// Whether this is one of 0°, +45°, -45° or 90°.
    pub fn is_canonical(&self) -> bool {
        Self::CANONICAL.contains(self)
    }
}

impl TryFrom<f64> for Orientation {
    type Error = GridError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_degrees(value)
    }
}

impl From<Orientation> for f64 {
    fn from(orientation: Orientation) -> Self {
        orientation.degrees()
    }
}

impl FromStr for Orientation {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::ZERO
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.centidegrees % 100 == 0 {
            write!(f, "{}\u{00B0}", self.centidegrees / 100)
        } else {
            let text = format!("{:.2}", self.degrees());
            let text = text.trim_end_matches('0').trim_end_matches('.');
            write!(f, "{}\u{00B0}", text)
        }
    }
}

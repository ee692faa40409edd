// src/analysis/level1.rs - Per-step heading labels from heading/elevation angles

use serde::{Deserialize, Serialize};

use super::geometry::GeometryRecord;
use super::AnalysisError;
use crate::labels::{Axis, Heading, LabelTriple, SEPARATOR};

/// Validated labeling thresholds.
///
/// The Y and Z thresholds are supplied as angles from the reference axis and
/// stored internally as their complements (`90 - value`). The complement is
/// taken exactly once, here, so rerunning with the same value is stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelThresholds {
    x: f64,
    y: f64,
    z: f64,
    y_band: f64,
    z_band: f64,
    main_direction: usize,
}

impl LabelThresholds {
    pub fn new(x: f64, y: f64, z: f64, main_direction: usize) -> Result<Self, AnalysisError> {
        for (name, value) in [("x_threshold", x), ("y_threshold", y), ("z_threshold", z)] {
            if !(0.0..=90.0).contains(&value) {
                return Err(AnalysisError::InvalidThreshold {
                    name,
                    value: value.to_string(),
                });
            }
        }
        if main_direction == 0 {
            return Err(AnalysisError::InvalidThreshold {
                name: "main_direction_threshold",
                value: main_direction.to_string(),
            });
        }
        Ok(Self {
            x,
            y,
            z,
            y_band: 90.0 - y,
            z_band: 90.0 - z,
            main_direction,
        })
    }

    /// X threshold as configured.
    pub fn x(&self) -> f64 { self.x }
    /// Y threshold as configured (before the complement).
    pub fn y(&self) -> f64 { self.y }
    /// Z threshold as configured (before the complement).
    pub fn z(&self) -> f64 { self.z }
    /// Effective Y threshold, `90 - y`.
    pub fn y_band(&self) -> f64 { self.y_band }
    /// Effective Z threshold, `90 - z`.
    pub fn z_band(&self) -> f64 { self.z_band }
    /// Minimum level-2 span (in steps) of a main-direction segment.
    pub fn main_direction(&self) -> usize { self.main_direction }
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            x: 60.0,
            y: 60.0,
            z: 60.0,
            y_band: 30.0,
            z_band: 30.0,
            main_direction: 5,
        }
    }
}

/// Swap the two directional symbols of an axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AxisInversion {
    #[serde(default)]
    pub invert_x: bool,
    #[serde(default)]
    pub invert_y: bool,
    #[serde(default)]
    pub invert_z: bool,
}

/// Level-1 labels: one triple per step (N-1 for N points).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level1Labels {
    steps: Vec<LabelTriple>,
}

impl Level1Labels {
    pub fn steps(&self) -> &[LabelTriple] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&LabelTriple> {
        self.steps.get(position)
    }

    /// Symbol string of one axis with the terminal separator (length N).
    pub fn axis_symbols(&self, axis: Axis) -> String {
        self.steps
            .iter()
            .map(|t| t.get(axis).symbol())
            .chain(std::iter::once(SEPARATOR))
            .collect()
    }

    pub(crate) fn set(&mut self, position: usize, label: LabelTriple) -> Option<LabelTriple> {
        let slot = self.steps.get_mut(position)?;
        Some(std::mem::replace(slot, label))
    }
}

/// Label one step from its heading and elevation angles (degrees).
pub fn label_step(heading: f64, elevation: f64, thresholds: &LabelThresholds, inversion: &AxisInversion) -> LabelTriple {
    let x = if heading.abs() <= thresholds.x {
        pick(inversion.invert_x, Heading::Left, Heading::Right)
    } else if heading.abs() >= 180.0 - thresholds.x {
        pick(inversion.invert_x, Heading::Right, Heading::Left)
    } else {
        Heading::Still
    };

    let y_band = thresholds.y_band;
    let y = if y_band < heading && heading < 180.0 - y_band {
        pick(inversion.invert_y, Heading::Backward, Heading::Forward)
    } else if -(180.0 - y_band) < heading && heading < -y_band {
        pick(inversion.invert_y, Heading::Forward, Heading::Backward)
    } else {
        Heading::Still
    };

    let z = if elevation >= thresholds.z_band {
        pick(inversion.invert_z, Heading::Up, Heading::Down)
    } else if elevation <= -thresholds.z_band {
        pick(inversion.invert_z, Heading::Down, Heading::Up)
    } else {
        Heading::Still
    };

    LabelTriple::from_parts(x, y, z)
}

fn pick(inverted: bool, normal: Heading, swapped: Heading) -> Heading {
    if inverted { swapped } else { normal }
}

/// Label every step of the trajectory. The last geometry record has no
/// outgoing step and is skipped.
pub fn label_steps(geometry: &[GeometryRecord], thresholds: &LabelThresholds, inversion: &AxisInversion) -> Level1Labels {
    let steps = geometry
        .iter()
        .take(geometry.len().saturating_sub(1))
        .map(|g| label_step(g.heading, g.elevation, thresholds, inversion))
        .collect();
    Level1Labels { steps }
}

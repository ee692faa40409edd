//! # Trajectory analysis
//!
//! `analyze` runs the whole pipeline over a trajectory:
//!
//! ```text
//! preprocess -> geometry -> level 1 -> level 2 -> level 3 -> index map
//! ```
//!
//! The resulting [`Analysis`] owns every intermediate product. `rerun` builds a
//! fresh `Analysis` from the same points and geometry with new thresholds;
//! manual label edits made on the old value are not carried over.
//!
//! ## Example
//!
//! ```rust
//! use mpal_rs::analysis::analyze;
//! use mpal_rs::config::AnalysisConfig;
//!
//! let points: Vec<[f64; 3]> = (0..6).map(|i| [i as f64, 0.0, 0.0]).collect();
//! let analysis = analyze(&points, &AnalysisConfig::default()).unwrap();
//! assert_eq!(analysis.level3().hashes(), vec!["L", "END"]);
//! ```

pub mod geometry;
pub mod index_map;
pub mod level1;
pub mod level2;
pub mod level3;
pub mod view;

use std::fmt;

use mpal_preprocess::{preprocess, Point3, PreprocessError, Preprocessed};
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::labels::{LabelError, LabelTriple, Level3Label};
use geometry::GeometryRecord;
use level1::{AxisInversion, LabelThresholds, Level1Labels};
use level2::Level2Segments;
use level3::Level3Segments;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Trajectory needs at least 2 points, got {points}")]
    EmptyTrajectory { points: usize },
    #[error("Invalid {name}: {value}")]
    InvalidThreshold { name: &'static str, value: String },
    #[error("Position {position} is out of range for level {level} (length {len})")]
    IndexOutOfRange { level: Level, position: usize, len: usize },
    #[error("Invalid label: {0}")]
    InvalidLabel(#[from] LabelError),
    #[error("Preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
}

/// Processing level of the label hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    One,
    Two,
    Three,
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::One),
            2 => Ok(Level::Two),
            3 => Ok(Level::Three),
            other => Err(format!("Processing level must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
        };
        write!(f, "{}", n)
    }
}

/// Complete result of analysing one trajectory.
#[derive(Debug, Clone)]
pub struct Analysis {
    original: Vec<Point3>,
    points: Vec<Point3>,
    index_map: Vec<usize>,
    thresholds: LabelThresholds,
    inversion: AxisInversion,
    geometry: Vec<GeometryRecord>,
    level1: Level1Labels,
    level2: Level2Segments,
    level3: Level3Segments,
    pre_post: Vec<usize>,
}

/// Preprocess `points` according to `config` and analyse the result.
///
/// Thresholds are validated before any work is done.
pub fn analyze(points: &[Point3], config: &AnalysisConfig) -> Result<Analysis, AnalysisError> {
    let thresholds = config.label_thresholds()?;
    if points.len() < 2 {
        return Err(AnalysisError::EmptyTrajectory { points: points.len() });
    }
    let preprocessed = preprocess(points, &config.smoothing(), &config.interpolation())?;
    Analysis::from_preprocessed(points.to_vec(), preprocessed, thresholds, config.axes)
}

impl Analysis {
    /// Analyse an already preprocessed trajectory. `original` is the raw
    /// sample sequence that `preprocessed.index_map` refers to.
    pub fn from_preprocessed(
        original: Vec<Point3>,
        preprocessed: Preprocessed,
        thresholds: LabelThresholds,
        inversion: AxisInversion,
    ) -> Result<Self, AnalysisError> {
        let Preprocessed { points, index_map } = preprocessed;
        if points.len() < 2 {
            return Err(AnalysisError::EmptyTrajectory { points: points.len() });
        }

        let geometry = geometry::compute(&points);
        let analysis = Self::label(original, points, index_map, geometry, thresholds, inversion);
        tracing::info!(
            "Analyzed {} points ({} original): {} level-2 segments, level-3 hash {:?}",
            analysis.points.len(),
            analysis.original.len(),
            analysis.level2.len(),
            analysis.level3.hashes()
        );
        Ok(analysis)
    }

    /// Relabel with new thresholds, reusing points and geometry.
    ///
    /// Returns a new value; label edits applied to `self` are discarded.
    pub fn rerun(&self, thresholds: LabelThresholds) -> Analysis {
        tracing::info!(
            "Rerunning analysis: thresholds x={} y={} z={} main={}",
            thresholds.x(),
            thresholds.y(),
            thresholds.z(),
            thresholds.main_direction()
        );
        Self::label(
            self.original.clone(),
            self.points.clone(),
            self.index_map.clone(),
            self.geometry.clone(),
            thresholds,
            self.inversion,
        )
    }

    fn label(
        original: Vec<Point3>,
        points: Vec<Point3>,
        index_map: Vec<usize>,
        geometry: Vec<GeometryRecord>,
        thresholds: LabelThresholds,
        inversion: AxisInversion,
    ) -> Self {
        let level1 = level1::label_steps(&geometry, &thresholds, &inversion);
        let level2 = level2::group(&level1);
        let level3 = level3::classify(&level2, thresholds.main_direction());
        let pre_post = index_map::map_boundaries(level3.boundaries(), &index_map);
        Self {
            original,
            points,
            index_map,
            thresholds,
            inversion,
            geometry,
            level1,
            level2,
            level3,
            pre_post,
        }
    }

    /// Raw input samples.
    pub fn original_points(&self) -> &[Point3] { &self.original }
    /// Preprocessed samples the labels refer to.
    pub fn points(&self) -> &[Point3] { &self.points }
    pub fn index_map(&self) -> &[usize] { &self.index_map }
    pub fn thresholds(&self) -> &LabelThresholds { &self.thresholds }
    pub fn inversion(&self) -> &AxisInversion { &self.inversion }
    pub fn geometry(&self) -> &[GeometryRecord] { &self.geometry }
    pub fn level1(&self) -> &Level1Labels { &self.level1 }
    pub fn level2(&self) -> &Level2Segments { &self.level2 }
    pub fn level3(&self) -> &Level3Segments { &self.level3 }

    /// Original-sample index of every level-3 boundary.
    pub fn pre_post_index(&self) -> &[usize] { &self.pre_post }

    /// Replace the level-1 label of one step.
    pub fn edit_level1(&mut self, position: usize, label: LabelTriple) -> Result<LabelTriple, AnalysisError> {
        let len = self.level1.len();
        self.level1
            .set(position, label)
            .ok_or(AnalysisError::IndexOutOfRange { level: Level::One, position, len })
    }

    /// Replace the level-2 label of one segment; boundaries are unchanged.
    pub fn edit_level2(&mut self, position: usize, label: LabelTriple) -> Result<LabelTriple, AnalysisError> {
        let len = self.level2.len();
        self.level2
            .set(position, label)
            .ok_or(AnalysisError::IndexOutOfRange { level: Level::Two, position, len })
    }

    /// Replace the level-3 label of one segment. The `END` sentinel cannot
    /// be edited.
    pub fn edit_level3(&mut self, position: usize, label: &str) -> Result<Level3Label, AnalysisError> {
        let label = Level3Label::parse(label)?;
        let len = self.level3.len().saturating_sub(1);
        self.level3
            .set(position, label)
            .ok_or(AnalysisError::IndexOutOfRange { level: Level::Three, position, len })
    }

    /// Edit by level with a textual label: `"LB-"` style triples for levels
    /// 1 and 2, composite labels such as `"lu"` for level 3.
    pub fn edit_label(&mut self, level: Level, position: usize, label: &str) -> Result<String, AnalysisError> {
        let previous = match level {
            Level::One => self.edit_level1(position, LabelTriple::parse(label)?)?.to_string(),
            Level::Two => self.edit_level2(position, LabelTriple::parse(label)?)?.to_string(),
            Level::Three => self.edit_level3(position, label)?.to_string(),
        };
        tracing::info!("Level {} position {}: '{}' -> '{}'", level, position, previous, label);
        Ok(previous)
    }
}

// src/analysis/view.rs - Point ranges and bounds for displaying segments

use std::ops::Range;

use mpal_preprocess::Point3;
use serde::Serialize;

use super::{Analysis, AnalysisError, Level};

/// Axis-aligned bounds of the processed trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub max: Point3,
    pub min: Point3,
}

impl BoundingBox {
    /// `[max_x, min_x, max_y, min_y, max_z, min_z]`
    pub fn max_min(&self) -> [f64; 6] {
        [self.max[0], self.min[0], self.max[1], self.min[1], self.max[2], self.min[2]]
    }
}

/// Points to draw for one segment: the segment itself and, except for the
/// first segment, the step leading into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentWindow {
    pub main: Range<usize>,
    pub tail: Option<Range<usize>>,
}

impl Analysis {
    pub fn bounds(&self) -> BoundingBox {
        let mut max = [f64::NEG_INFINITY; 3];
        let mut min = [f64::INFINITY; 3];
        for point in &self.points {
            for axis in 0..3 {
                max[axis] = max[axis].max(point[axis]);
                min[axis] = min[axis].min(point[axis]);
            }
        }
        BoundingBox { max, min }
    }

    /// Points shown when a level is first opened.
    pub fn initial_window(&self, level: Level) -> Result<Range<usize>, AnalysisError> {
        match level {
            Level::One => Ok(0..2),
            Level::Two => boundary(self.level2.boundaries(), level, 1).map(|end| 0..end),
            Level::Three => boundary(self.level3.boundaries(), level, 1).map(|end| 0..end),
        }
    }

    /// Points covering segment `position` of `level`.
    pub fn segment_window(&self, level: Level, position: usize) -> Result<SegmentWindow, AnalysisError> {
        let (start, end) = match level {
            Level::One => {
                let len = self.level1.len();
                if position >= len {
                    return Err(AnalysisError::IndexOutOfRange { level, position, len });
                }
                (position, position + 1)
            }
            Level::Two => {
                let len = self.level2.len();
                if position >= len {
                    return Err(AnalysisError::IndexOutOfRange { level, position, len });
                }
                let b = self.level2.boundaries();
                (b[position], b[position + 1])
            }
            Level::Three => {
                // The sentinel has no points of its own
                let len = self.level3.len().saturating_sub(1);
                if position >= len {
                    return Err(AnalysisError::IndexOutOfRange { level, position, len });
                }
                let b = self.level3.boundaries();
                (b[position], b[position + 1])
            }
        };

        let tail = (position != 0 && start > 0).then(|| start - 1..start + 1);
        Ok(SegmentWindow { main: start..end + 1, tail })
    }

    /// Points of a window returned by [`Analysis::initial_window`] or
    /// [`Analysis::segment_window`].
    pub fn window_points(&self, range: Range<usize>) -> &[Point3] {
        let end = range.end.min(self.points.len());
        let start = range.start.min(end);
        &self.points[start..end]
    }
}

fn boundary(boundaries: &[usize], level: Level, position: usize) -> Result<usize, AnalysisError> {
    boundaries.get(position).copied().ok_or(AnalysisError::IndexOutOfRange {
        level,
        position,
        len: boundaries.len(),
    })
}

// mpal_preprocess: smoothing and arc-length resampling applied before trajectory analysis

pub mod interparc;
pub mod savgol;

use thiserror::Error;

/// A sample position in 3D space (x, y, z).
pub type Point3 = [f64; 3];

#[derive(Debug, Error, PartialEq)]
pub enum PreprocessError {
    #[error("Smoothing window must be odd, got {0}")]
    EvenWindow(usize),
    #[error("Smoothing window {window} must be larger than polynomial order {order}")]
    OrderTooHigh { window: usize, order: usize },
    #[error("Smoothing window {window} exceeds trajectory length ({points} points)")]
    WindowTooLarge { window: usize, points: usize },
    #[error("Interpolation distance must be > 0, got {0}")]
    InvalidSpacing(f64),
    #[error("Trajectory has zero arc length, cannot resample")]
    ZeroLength,
    #[error("At least 2 points are required to resample, got {0}")]
    TooFewPoints(usize),
    #[error("Singular least-squares system for smoothing window {0}")]
    SingularFit(usize),
    #[error("Resampling would produce {requested} points, limit is {limit}")]
    TooManyPoints { requested: f64, limit: usize },
}

/// Upper bound on the number of points produced by resampling.
pub const MAX_RESAMPLED_POINTS: usize = 10_000_000;

/// Savitzky–Golay smoothing options.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingConfig {
    pub enabled: bool,
    pub order: usize,
    pub window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { enabled: false, order: 2, window: 7 }
    }
}

/// Arc-length resampling options.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationConfig {
    pub enabled: bool,
    /// Target spacing between resampled points, in input units.
    pub interdist: f64,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self { enabled: false, interdist: 0.5 }
    }
}

/// Output of [`preprocess`].
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub points: Vec<Point3>,
    /// One entry per original sample: the processed position it falls on.
    /// Non-decreasing; the identity when no resampling happened.
    pub index_map: Vec<usize>,
}

impl Preprocessed {
    /// Pass-through result, used when neither smoothing nor interpolation is enabled.
    pub fn identity(points: &[Point3]) -> Self {
        Self {
            points: points.to_vec(),
            index_map: (0..points.len()).collect(),
        }
    }
}

/// Run the enabled preprocessing stages over `points`.
pub fn preprocess(
    points: &[Point3],
    smoothing: &SmoothingConfig,
    interpolation: &InterpolationConfig,
) -> Result<Preprocessed, PreprocessError> {
    let mut result = Preprocessed::identity(points);

    if smoothing.enabled {
        result.points = savgol::smooth(&result.points, smoothing.order, smoothing.window)?;
        tracing::debug!(
            "Smoothed {} points (order {}, window {})",
            result.points.len(),
            smoothing.order,
            smoothing.window
        );
    }

    if interpolation.enabled {
        if !(interpolation.interdist > 0.0) {
            return Err(PreprocessError::InvalidSpacing(interpolation.interdist));
        }
        let cumulative = cumulative_chord_lengths(&result.points);
        let total = cumulative.last().copied().unwrap_or(0.0);
        let requested = (total / interpolation.interdist).round_ties_even();
        if !requested.is_finite() || requested > MAX_RESAMPLED_POINTS as f64 {
            return Err(PreprocessError::TooManyPoints { requested, limit: MAX_RESAMPLED_POINTS });
        }
        result.index_map = cumulative
            .iter()
            .map(|length| (length / interpolation.interdist).floor() as usize)
            .collect();

        let count = requested as usize;
        let resampled = interparc::resample(&result.points, count)?;
        // The first resampled point duplicates the start of the path.
        result.points = resampled.into_iter().skip(1).collect();
        tracing::debug!(
            "Resampled trajectory of length {:.3} into {} points (spacing {})",
            total,
            result.points.len(),
            interpolation.interdist
        );
    }

    Ok(result)
}

/// Cumulative chord length at every sample, starting at 0.
pub fn cumulative_chord_lengths(points: &[Point3]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total += distance(&points[i - 1], point);
        }
        cumulative.push(total);
    }
    cumulative
}

pub(crate) fn distance(a: &Point3, b: &Point3) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

// interparc.rs - Redistribute points evenly along a polyline by arc length

use crate::{distance, Point3, PreprocessError, MAX_RESAMPLED_POINTS};

/// Place `count` points at equal normalized arc-length steps in `[0, 1]` along
/// the polyline through `points` (chordal parametrization).
pub fn resample(points: &[Point3], count: usize) -> Result<Vec<Point3>, PreprocessError> {
    let n = points.len();
    if n < 2 {
        return Err(PreprocessError::TooFewPoints(n));
    }
    if count > MAX_RESAMPLED_POINTS {
        return Err(PreprocessError::TooManyPoints { requested: count as f64, limit: MAX_RESAMPLED_POINTS });
    }

    let chords: Vec<f64> = points.windows(2).map(|w| distance(&w[0], &w[1])).collect();
    let total: f64 = chords.iter().sum();
    if total <= 0.0 {
        return Err(PreprocessError::ZeroLength);
    }
    let chords: Vec<f64> = chords.iter().map(|c| c / total).collect();

    let mut cumarc = Vec::with_capacity(n);
    cumarc.push(0.0);
    for chord in &chords {
        let prev = cumarc[cumarc.len() - 1];
        cumarc.push(prev + chord);
    }

    let mut resampled = Vec::with_capacity(count);
    for k in 0..count {
        let t = if count > 1 { k as f64 / (count - 1) as f64 } else { 0.0 };
        let bin = chord_index(&cumarc, t);
        let s = if chords[bin] > 0.0 {
            (t - cumarc[bin]) / chords[bin]
        } else {
            0.0
        };
        let a = points[bin];
        let b = points[bin + 1];
        resampled.push([
            a[0] + (b[0] - a[0]) * s,
            a[1] + (b[1] - a[1]) * s,
            a[2] + (b[2] - a[2]) * s,
        ]);
    }
    Ok(resampled)
}

/// Index of the chord containing normalized arc length `t`, clamped to the
/// first and last chord.
fn chord_index(cumarc: &[f64], t: f64) -> usize {
    let n = cumarc.len();
    if t <= 0.0 {
        return 0;
    }
    if t >= 1.0 {
        return n - 2;
    }
    let bin = cumarc.partition_point(|&c| c <= t);
    bin.clamp(1, n - 1) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_even_spacing_on_bent_path() {
        // L-shaped path of total length 2
        let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
        let out = resample(&points, 5).unwrap();
        assert_eq!(out.len(), 5);
        let expected = [
            [0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.5, 0.0],
            [1.0, 1.0, 0.0],
        ];
        for (got, want) in out.iter().zip(expected.iter()) {
            for axis in 0..3 {
                assert!((got[axis] - want[axis]).abs() < 1e-12, "{got:?} vs {want:?}");
            }
        }
    }

    #[test]
    fn test_resample_skips_duplicate_points() {
        let points = vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let out = resample(&points, 3).unwrap();
        assert!((out[1][0] - 1.0).abs() < 1e-12);
        assert!(out.iter().all(|p| p.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn test_resample_errors() {
        assert_eq!(resample(&[[0.0; 3]], 4), Err(PreprocessError::TooFewPoints(1)));
        assert_eq!(resample(&[[1.0; 3], [1.0; 3]], 4), Err(PreprocessError::ZeroLength));
        assert!(matches!(
            resample(&[[0.0; 3], [1.0; 3]], usize::MAX),
            Err(PreprocessError::TooManyPoints { .. })
        ));
    }
}

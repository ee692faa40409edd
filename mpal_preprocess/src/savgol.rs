//! Savitzky–Golay smoothing.
//!
//! Each output sample is the value at that sample of a least-squares polynomial
//! fitted over a sliding window. Interior samples use the centred window; the
//! first and last `window / 2` samples are evaluated from the polynomial fitted
//! to the first and last full window respectively.

use nalgebra::{DMatrix, DVector};

use crate::{Point3, PreprocessError};

/// Smooth every axis of `points` independently.
pub fn smooth(points: &[Point3], order: usize, window: usize) -> Result<Vec<Point3>, PreprocessError> {
    if window % 2 == 0 {
        return Err(PreprocessError::EvenWindow(window));
    }
    if order >= window {
        return Err(PreprocessError::OrderTooHigh { window, order });
    }
    if window > points.len() {
        return Err(PreprocessError::WindowTooLarge { window, points: points.len() });
    }

    let half = window / 2;
    let n = points.len();
    // weights[p] evaluates the fit at offset p within the window
    let weights = (0..window)
        .map(|p| fit_weights(order, window, p as f64 - half as f64))
        .collect::<Result<Vec<_>, _>>()?;

    let mut smoothed = Vec::with_capacity(n);
    for i in 0..n {
        let (start, position) = if i < half {
            (0, i)
        } else if i + half >= n {
            (n - window, i - (n - window))
        } else {
            (i - half, half)
        };
        let w = &weights[position];
        let mut out = [0.0; 3];
        for (axis, value) in out.iter_mut().enumerate() {
            *value = (0..window).map(|j| w[j] * points[start + j][axis]).sum();
        }
        smoothed.push(out);
    }
    Ok(smoothed)
}

/// Convolution weights that evaluate the order-`order` least-squares fit over a
/// window of `window` samples (centred offsets) at offset `at`.
fn fit_weights(order: usize, window: usize, at: f64) -> Result<Vec<f64>, PreprocessError> {
    let half = (window / 2) as f64;
    let terms = order + 1;
    let offsets: Vec<f64> = (0..window).map(|j| j as f64 - half).collect();

    // Normal matrix A^T A, with A[j][k] = offset_j^k
    let normal = DMatrix::from_fn(terms, terms, |r, c| {
        offsets.iter().map(|x| x.powi((r + c) as i32)).sum::<f64>()
    });
    let rhs = DVector::from_fn(terms, |k, _| at.powi(k as i32));
    let z = normal.lu().solve(&rhs).ok_or(PreprocessError::SingularFit(window))?;

    Ok(offsets
        .iter()
        .map(|x| (0..terms).map(|k| z[k] * x.powi(k as i32)).sum())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_five_point_quadratic_weights() {
        // Well-known SG(5, 2) smoothing coefficients: [-3, 12, 17, 12, -3] / 35
        let w = fit_weights(2, 5, 0.0).unwrap();
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0].map(|v| v / 35.0);
        for (a, b) in w.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12, "{a} vs {b}");
        }
    }

    #[test]
    fn test_quadratic_is_reproduced_exactly() {
        let points: Vec<Point3> = (0..10)
            .map(|i| {
                let t = i as f64;
                [t * t, 2.0 * t - 1.0, 0.5 * t * t - t]
            })
            .collect();
        let smoothed = smooth(&points, 2, 7).unwrap();
        for (s, p) in smoothed.iter().zip(&points) {
            for axis in 0..3 {
                assert!((s[axis] - p[axis]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_noise_is_reduced() {
        let points: Vec<Point3> = (0..21)
            .map(|i| [i as f64, if i % 2 == 0 { 0.2 } else { -0.2 }, 0.0])
            .collect();
        let smoothed = smooth(&points, 2, 7).unwrap();
        let centre = smoothed[10][1].abs();
        assert!(centre < 0.2);
    }

    #[test]
    fn test_invalid_windows() {
        let points = vec![[0.0; 3]; 5];
        assert_eq!(smooth(&points, 2, 6), Err(PreprocessError::EvenWindow(6)));
        assert_eq!(smooth(&points, 3, 3), Err(PreprocessError::OrderTooHigh { window: 3, order: 3 }));
        assert_eq!(smooth(&points, 2, 7), Err(PreprocessError::WindowTooLarge { window: 7, points: 5 }));
    }
}

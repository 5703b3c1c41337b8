//! Piecewise scoring curves shared by the pose and face comparators.
//!
//! Horizontal error is scored on a gentle staircase that never drops below
//! 20. Vertical error is scored strictly: anything at or beyond 0.1 of the
//! frame scores 0.

use crate::utils::utils::clamp_score;

/// `(upper bound exclusive, score)` bands for horizontal error.
const X_AXIS_BANDS: [(f32, f32); 4] = [(0.05, 100.0), (0.1, 80.0), (0.15, 60.0), (0.2, 40.0)];
const X_AXIS_FLOOR: f32 = 20.0;

const Y_AXIS_CUTOFF: f32 = 0.1;
const Y_AXIS_BANDS: [(f32, f32); 4] = [(0.02, 100.0), (0.04, 90.0), (0.06, 70.0), (0.08, 50.0)];
const Y_AXIS_FLOOR: f32 = 30.0;

fn banded(diff: f32, bands: &[(f32, f32)], floor: f32) -> f32 {
    bands
        .iter()
        .find(|(limit, _)| diff < *limit)
        .map(|(_, score)| *score)
        .unwrap_or(floor)
}

/// x_axis_score maps a horizontal difference to a score in {100, 80, 60, 40, 20}.
pub fn x_axis_score(diff: f32) -> f32 {
    let diff = diff.abs();
    if !diff.is_finite() {
        return X_AXIS_FLOOR
    }
    banded(diff, &X_AXIS_BANDS, X_AXIS_FLOOR)
}

/// y_axis_score maps a vertical difference to a score in {100, 90, 70, 50, 30, 0}.
pub fn y_axis_score(diff: f32) -> f32 {
    let diff = diff.abs();
    if !diff.is_finite() || diff >= Y_AXIS_CUTOFF {
        return 0.0
    }
    banded(diff, &Y_AXIS_BANDS, Y_AXIS_FLOOR)
}

/// part_score combines the two axis scores of one region.
///
/// Excellent alignment on both axes is rounded up to 100, and a single
/// badly aligned axis quarters the sum.
///
/// # Arguments
/// * `x_score` - result of `x_axis_score`
/// * `y_score` - result of `y_axis_score`
///
/// # Returns
/// * `f32` in [0, 100]
pub fn part_score(x_score: f32, y_score: f32) -> f32 {
    if x_score >= 80.0 && y_score >= 80.0 {
        return 100.0
    }
    if x_score <= 40.0 || y_score <= 40.0 {
        return (x_score + y_score) / 4.0
    }

    let base = x_score * 0.6 + y_score * 0.4;
    let correction = if base >= 70.0 {
        1.2
    } else if base >= 50.0 {
        1.1
    } else if base >= 30.0 {
        0.9
    } else {
        0.8
    };
    clamp_score(base * correction)
}

/// difference_score turns a euclidean region difference into a score,
/// `(1 - min(diff, 1)) * 100`.
pub fn difference_score(diff: f32) -> f32 {
    if diff.is_nan() {
        return 0.0
    }
    (1.0 - diff.clamp(0.0, 1.0)) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_axis_bands() {
        assert_eq!(x_axis_score(0.0), 100.0);
        assert_eq!(x_axis_score(0.049), 100.0);
        assert_eq!(x_axis_score(0.05), 80.0);
        assert_eq!(x_axis_score(0.1), 60.0);
        assert_eq!(x_axis_score(0.15), 40.0);
        assert_eq!(x_axis_score(0.2), 20.0);
        assert_eq!(x_axis_score(5.0), 20.0);
        assert_eq!(x_axis_score(f32::NAN), 20.0);
    }

    #[test]
    fn test_y_axis_bands() {
        assert_eq!(y_axis_score(0.0), 100.0);
        assert_eq!(y_axis_score(0.02), 90.0);
        assert_eq!(y_axis_score(0.04), 70.0);
        assert_eq!(y_axis_score(0.06), 50.0);
        assert_eq!(y_axis_score(0.08), 30.0);
        assert_eq!(y_axis_score(0.099), 30.0);
        assert_eq!(y_axis_score(0.1), 0.0);
        assert_eq!(y_axis_score(-0.03), 90.0);
        assert_eq!(y_axis_score(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_axis_scores_non_increasing() {
        let mut prev_x = f32::MAX;
        let mut prev_y = f32::MAX;
        for i in 0..=300 {
            let d = i as f32 * 0.001;
            let (x, y) = (x_axis_score(d), y_axis_score(d));
            assert!(x <= prev_x && y <= prev_y, "score increased at {}", d);
            prev_x = x;
            prev_y = y;
        }
    }

    #[test]
    fn test_part_score_rules() {
        assert_eq!(part_score(100.0, 100.0), 100.0);
        assert_eq!(part_score(80.0, 90.0), 100.0);
        assert_eq!(part_score(40.0, 100.0), 35.0);
        assert_eq!(part_score(100.0, 0.0), 25.0);
        assert_eq!(part_score(20.0, 30.0), 12.5);
        // base 0.6 * 60 + 0.4 * 90 = 72 -> * 1.2
        assert!((part_score(60.0, 90.0) - 86.4).abs() < 1e-4);
        // base 0.6 * 60 + 0.4 * 50 = 56 -> * 1.1
        assert!((part_score(60.0, 50.0) - 61.6).abs() < 1e-4);
        // base 0.6 * 100 + 0.4 * 50 = 80 -> * 1.2 clamps to 96
        assert!((part_score(100.0, 50.0) - 96.0).abs() < 1e-4);
    }

    #[test]
    fn test_difference_score() {
        assert_eq!(difference_score(0.0), 100.0);
        assert!((difference_score(0.25) - 75.0).abs() < 1e-4);
        assert_eq!(difference_score(3.0), 0.0);
        assert_eq!(difference_score(-1.0), 100.0);
        assert_eq!(difference_score(f32::NAN), 0.0);
    }
}

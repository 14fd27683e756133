//! Camera orientation and angle dissimilarity
//!
//! Orientations are pitch/yaw/roll triples in degrees. Dissimilarity is
//! the Euclidean norm of the per-axis differences, with no circular
//! correction: 179 vs -179 counts as a 358-degree difference. That edge
//! is pinned by a test rather than silently smoothed over.

use serde::{Deserialize, Serialize};

/// Camera orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Orientation {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Dissimilarity above which the camera angle counts as changed
pub const DEFAULT_RESET_THRESHOLD: f64 = 30.0;

/// Scalar dissimilarity between two orientations
///
/// Returns 0.0 when either side is unknown: without two known
/// orientations there is nothing to compare and no reset is possible.
pub fn dissimilarity(previous: Option<&Orientation>, current: Option<&Orientation>) -> f64 {
    match (previous, current) {
        (Some(a), Some(b)) => {
            let dp = (a.pitch - b.pitch).abs();
            let dy = (a.yaw - b.yaw).abs();
            let dr = (a.roll - b.roll).abs();
            (dp * dp + dy * dy + dr * dr).sqrt()
        }
        _ => 0.0,
    }
}

/// Reset decision for a computed dissimilarity
///
/// Strictly greater-than: a dissimilarity of exactly the threshold does
/// not trigger a reset.
pub fn exceeds_reset_threshold(dissimilarity: f64, threshold: f64) -> bool {
    dissimilarity > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dissimilarity_is_zero_when_either_side_is_absent() {
        let o = Orientation::new(10.0, 20.0, 30.0);
        assert_eq!(dissimilarity(None, Some(&o)), 0.0);
        assert_eq!(dissimilarity(Some(&o), None), 0.0);
        assert_eq!(dissimilarity(None, None), 0.0);
    }

    #[test]
    fn dissimilarity_is_euclidean_norm_of_axis_deltas() {
        let a = Orientation::new(0.0, 0.0, 0.0);
        let b = Orientation::new(3.0, 4.0, 0.0);
        assert!((dissimilarity(Some(&a), Some(&b)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn dissimilarity_is_symmetric() {
        let a = Orientation::new(10.0, -20.0, 5.0);
        let b = Orientation::new(-3.0, 40.0, 12.5);
        assert_eq!(
            dissimilarity(Some(&a), Some(&b)),
            dissimilarity(Some(&b), Some(&a))
        );
    }

    #[test]
    fn identical_orientations_have_zero_dissimilarity() {
        let a = Orientation::new(12.0, 34.0, 56.0);
        assert_eq!(dissimilarity(Some(&a), Some(&a)), 0.0);
    }

    #[test]
    fn threshold_is_exclusive_at_the_boundary() {
        assert!(!exceeds_reset_threshold(30.0, DEFAULT_RESET_THRESHOLD));
        assert!(exceeds_reset_threshold(30.000001, DEFAULT_RESET_THRESHOLD));
        assert!(!exceeds_reset_threshold(29.999999, DEFAULT_RESET_THRESHOLD));
    }

    #[test]
    fn wraparound_is_not_corrected() {
        // Known behavior: raw per-axis deltas, so a pitch flip across the
        // +-180 boundary reads as a huge change and forces a reset.
        let a = Orientation::new(179.0, 0.0, 0.0);
        let b = Orientation::new(-179.0, 0.0, 0.0);
        let d = dissimilarity(Some(&a), Some(&b));
        assert!((d - 358.0).abs() < 1e-9);
        assert!(exceeds_reset_threshold(d, DEFAULT_RESET_THRESHOLD));
    }
}

use crate::utils::coordinate::{Coordinate2D, CoordinateTransform, Landmark};

/// LandmarkSampler reads detector landmarks into the reference frame.
///
/// A landmark is unavailable when its index is past the end of the detection,
/// its coordinates are not finite, or its reported visibility is below the
/// configured minimum. Available points are transformed and then clamped to
/// the unit frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LandmarkSampler {
    transform: CoordinateTransform,
    min_visibility: f32,
}

impl LandmarkSampler {
    pub fn new(transform: CoordinateTransform, min_visibility: f32) -> Self {
        LandmarkSampler { transform, min_visibility }
    }

    pub fn sample(&self, landmarks: &[Landmark], index: usize) -> Option<Coordinate2D> {
        let lmk = landmarks.get(index)?;
        let position = lmk.position();
        if !position.is_finite() {
            return None
        }
        if let Some(visibility) = lmk.visibility {
            if visibility.is_nan() || visibility < self.min_visibility {
                return None
            }
        }
        Some(self.transform.apply(position).clamped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rejects_gaps() {
        let sampler = LandmarkSampler::new(CoordinateTransform::Identity, 0.5);
        let landmarks = vec![
            Landmark::new(0.2, 0.3),
            Landmark::new(f32::NAN, 0.3),
            Landmark::new(0.2, 0.3).with_visibility(0.1),
            Landmark::new(1.4, -0.2).with_visibility(0.9),
        ];
        assert_eq!(sampler.sample(&landmarks, 0), Some(Coordinate2D::new(0.2, 0.3)));
        assert!(sampler.sample(&landmarks, 1).is_none());
        assert!(sampler.sample(&landmarks, 2).is_none());
        assert_eq!(sampler.sample(&landmarks, 3), Some(Coordinate2D::new(1.0, 0.0)));
        assert!(sampler.sample(&landmarks, 4).is_none());
    }

    #[test]
    fn test_sample_applies_transform_before_clamp() {
        let sampler = LandmarkSampler::new(CoordinateTransform::RotateSensor90, 0.0);
        let p = sampler.sample(&[Landmark::new(0.25, 0.75)], 0).unwrap();
        assert!((p.x - 0.25).abs() < 1e-6 && (p.y - 0.25).abs() < 1e-6);
    }
}

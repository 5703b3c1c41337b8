use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};
use crate::config::config::FaceComparatorConfig;
use crate::error::ConfigurationError;
use crate::modules::result::{ComparisonResult, DifferenceMap};
use crate::modules::sampler::LandmarkSampler;
use crate::modules::scoring::{difference_score, part_score, x_axis_score, y_axis_score};
use crate::modules::suggestion::Suggestion;
use crate::reference::reference::FaceReference;
use crate::utils::coordinate::{Coordinate2D, FrameSize, Landmark};
use crate::utils::geometry::{distance, normalized_proximity, Offset};
use crate::utils::utils::{clamp_score, mean, weighted_mean};

pub const CENTER_REGION: &str = "CENTER";
pub const EYES_REGION: &str = "EYES";
pub const EARS_REGION: &str = "EARS";
pub const MOUTH_AND_CHIN_REGION: &str = "MOUTH_AND_CHIN";
pub const FOREHEAD_REGION: &str = "FOREHEAD";

/// FaceComparator scores a detected face against reference face statistics.
///
/// Feature regions are compared by their radial distance from the face
/// center, which keeps them independent of where the face sits in the
/// frame. Placement in the frame is measured separately by the center
/// difference and the composition score.
#[derive(Debug, Clone)]
pub struct FaceComparator {
    reference: Arc<FaceReference>,
    config: FaceComparatorConfig,
    sampler: LandmarkSampler,
}

impl FaceComparator {
    pub fn new(reference: Arc<FaceReference>, config: FaceComparatorConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(FaceComparator {
            reference,
            sampler: LandmarkSampler::new(config.transform, config.min_visibility),
            config,
        })
    }

    pub fn reference(&self) -> &Arc<FaceReference> {
        &self.reference
    }

    pub fn config(&self) -> &FaceComparatorConfig {
        &self.config
    }

    /// compare scores one face detection.
    ///
    /// # Arguments
    /// * `landmarks` - detector landmarks for a single face
    /// * `frame` - size of the analyzed frame
    ///
    /// # Returns
    /// * `ComparisonResult`
    pub fn compare(&self, landmarks: &[Landmark], frame: FrameSize) -> ComparisonResult {
        let layout = &self.config.layout;
        let sample = |index: usize| self.sampler.sample(landmarks, index);
        let distances = self.reference.average_distances();
        let reference_center = self.reference.average_center();

        let center = sample(layout.center);
        let origin = center.unwrap_or(reference_center);
        let radial = |point: Option<Coordinate2D>, expected: f32| {
            point.map(|p| (distance(p, origin) - expected).abs())
        };

        let regions: [(&str, Vec<Option<f32>>); 4] = [
            (
                EYES_REGION,
                vec![radial(sample(layout.left_eye), distances.left_eye), radial(sample(layout.right_eye), distances.right_eye)],
            ),
            (
                EARS_REGION,
                vec![radial(sample(layout.left_ear), distances.left_ear), radial(sample(layout.right_ear), distances.right_ear)],
            ),
            (
                MOUTH_AND_CHIN_REGION,
                vec![radial(sample(layout.mouth_center), distances.mouth_center), radial(sample(layout.chin), distances.chin)],
            ),
            (FOREHEAD_REGION, vec![radial(sample(layout.forehead), distances.forehead)]),
        ];

        let mut differences = DifferenceMap::new();
        let mut offsets = BTreeMap::new();
        if let Some(c) = center {
            differences.insert(CENTER_REGION.to_string(), distance(c, reference_center));
            offsets.insert(CENTER_REGION.to_string(), Offset::between(c, reference_center));
        } else {
            debug!("face center not detected, measuring features from the reference center");
        }
        for (name, diffs) in &regions {
            match mean(diffs.iter().flatten().copied()) {
                Some(diff) => {
                    differences.insert(name.to_string(), diff);
                }
                None => debug!(region = name, "face region not detected, skipping"),
            }
        }

        // without a center there is no placement to score, position stands alone
        let composition = center.map(|c| self.composition_score(c, frame));
        let position_score = self.position_score(&differences);
        let overall_score = clamp_score(match composition {
            Some(composition_score) => self.config.blend.combine(position_score, composition_score),
            None => position_score,
        });
        let composition_score = composition.unwrap_or(0.0);
        let suggestions = self.suggestions(&differences, composition_score);

        trace!(overall_score, position_score, composition_score, "face comparison");

        ComparisonResult {
            overall_score,
            position_score,
            composition_score,
            suggestions,
            detailed_scores: differences,
            offsets,
        }
    }

    fn composition_score(&self, center: Coordinate2D, frame: FrameSize) -> f32 {
        let (px, py) = frame.to_pixels(center);
        let (line_x, line_y) = frame.to_pixels(self.reference.average_center());
        let x_diff = normalized_proximity(px, line_x, frame.width);
        let y_diff = normalized_proximity(py, line_y, frame.height);
        part_score(x_axis_score(x_diff), y_axis_score(y_diff))
    }

    fn position_score(&self, differences: &DifferenceMap) -> f32 {
        let w = &self.config.weights;
        let weights = [
            (CENTER_REGION, w.center),
            (EYES_REGION, w.eyes),
            (EARS_REGION, w.ears),
            (MOUTH_AND_CHIN_REGION, w.mouth_and_chin),
            (FOREHEAD_REGION, w.forehead),
        ];
        let pairs = weights.iter().filter_map(|(name, weight)| {
            differences.get(*name).map(|diff| (difference_score(*diff), *weight))
        });
        weighted_mean(pairs).unwrap_or(0.0)
    }

    fn suggestions(&self, differences: &DifferenceMap, composition_score: f32) -> Vec<Suggestion> {
        if differences.is_empty() {
            return vec![Suggestion::SubjectNotDetected]
        }

        let thresholds = &self.config.thresholds;
        let exceeds = |region: &str, limit: f32| differences.get(region).is_some_and(|d| *d > limit);
        let checks = [
            (CENTER_REGION, thresholds.critical, Suggestion::AdjustFaceCenter),
            (EYES_REGION, thresholds.position, Suggestion::AdjustEyes),
            (EARS_REGION, thresholds.position, Suggestion::AdjustEars),
            (MOUTH_AND_CHIN_REGION, thresholds.position, Suggestion::AdjustMouthAndChin),
            (FOREHEAD_REGION, thresholds.position, Suggestion::AdjustForehead),
        ];

        let mut suggestions: Vec<Suggestion> = checks
            .iter()
            .filter(|(region, limit, _)| exceeds(region, *limit))
            .map(|(_, _, suggestion)| *suggestion)
            .collect();
        if differences.contains_key(CENTER_REGION) && composition_score < thresholds.composition {
            suggestions.push(Suggestion::CenterFaceInFrame);
        }
        if suggestions.is_empty() && mean(differences.values().copied()).is_some_and(|m| m > thresholds.position) {
            suggestions.push(Suggestion::MatchOverallFace);
        }
        suggestions
    }
}

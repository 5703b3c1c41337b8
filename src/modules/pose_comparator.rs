use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};
use crate::config::config::{CompositionAnchor, PoseComparatorConfig, PositionWeights};
use crate::error::ConfigurationError;
use crate::modules::result::{ComparisonResult, DifferenceMap};
use crate::modules::sampler::LandmarkSampler;
use crate::modules::scoring::{difference_score, part_score, x_axis_score, y_axis_score};
use crate::modules::suggestion::Suggestion;
use crate::reference::reference::PoseReference;
use crate::utils::coordinate::{Coordinate2D, FrameSize, Landmark};
use crate::utils::geometry::{distance, midpoint, normalized_proximity, Offset};
use crate::utils::utils::{clamp_score, mean, weighted_mean};

/// MediaPipe pose landmark indices used for guidance.
pub const NOSE_INDEX: usize = 0;
pub const LEFT_SHOULDER_INDEX: usize = 11;
pub const RIGHT_SHOULDER_INDEX: usize = 12;
pub const LEFT_HIP_INDEX: usize = 23;
pub const RIGHT_HIP_INDEX: usize = 24;

pub const NOSE_REGION: &str = "NOSE";
pub const SHOULDERS_REGION: &str = "SHOULDERS";
pub const HIPS_REGION: &str = "HIPS";

/// Per-axis proximity of a region to the composition anchor, as a fraction
/// of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisProximity {
    x: f32,
    y: f32,
}

/// AnchorTargets fixes where the composition lines sit and how far from them
/// each region sits in the reference. Both anchors reduce to this shape.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AnchorTargets {
    line: Coordinate2D,
    nose: AxisProximity,
    shoulders: AxisProximity,
    hips: AxisProximity,
}

impl AnchorTargets {
    fn build(anchor: CompositionAnchor, reference: &PoseReference) -> Result<Self, ConfigurationError> {
        match anchor {
            CompositionAnchor::RuleOfThirds => {
                let thirds = reference
                    .thirds_proximity()
                    .ok_or(ConfigurationError::MissingAnchor(anchor.name()))?;
                Ok(AnchorTargets {
                    line: Coordinate2D::new(1.0 / 3.0, 1.0 / 3.0),
                    nose: AxisProximity {
                        x: thirds.average_nose_x_proximity,
                        y: thirds.average_nose_y_proximity,
                    },
                    shoulders: AxisProximity {
                        x: thirds.average_shoulder_x_proximity,
                        y: thirds.average_shoulder_y_proximity,
                    },
                    hips: AxisProximity {
                        x: thirds.average_hip_x_proximity,
                        y: thirds.average_hip_y_proximity,
                    },
                })
            }
            CompositionAnchor::CenterOfMass => {
                let com = reference
                    .average_com()
                    .ok_or(ConfigurationError::MissingAnchor(anchor.name()))?;
                let from_com = |p: Coordinate2D| AxisProximity {
                    x: (p.x - com.x).abs(),
                    y: (p.y - com.y).abs(),
                };
                let shoulders = midpoint(&[Some(reference.left_shoulder()), Some(reference.right_shoulder())])
                    .unwrap_or_default();
                let hips = midpoint(&[Some(reference.left_hip()), Some(reference.right_hip())])
                    .unwrap_or_default();
                Ok(AnchorTargets {
                    line: com,
                    nose: from_com(reference.nose()),
                    shoulders: from_com(shoulders),
                    hips: from_com(hips),
                })
            }
        }
    }
}

/// PoseComparator scores a detected body pose against a reference pose.
///
/// The comparator holds no per-frame state, so `compare` takes `&self` and
/// an instance can be shared between threads.
#[derive(Debug, Clone)]
pub struct PoseComparator {
    reference: Arc<PoseReference>,
    config: PoseComparatorConfig,
    weights: PositionWeights,
    sampler: LandmarkSampler,
    targets: AnchorTargets,
}

impl PoseComparator {

    /// new validates the config against the reference and builds a comparator.
    ///
    /// # Arguments
    /// * `reference` - shared pose reference
    /// * `config` - PoseComparatorConfig
    ///
    /// # Returns
    /// * `Result<PoseComparator, ConfigurationError>`
    pub fn new(reference: Arc<PoseReference>, config: PoseComparatorConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let targets = AnchorTargets::build(config.anchor, &reference)?;
        debug!(anchor = config.anchor.name(), "pose comparator ready");
        Ok(PoseComparator {
            reference,
            weights: config.weighting.weights(),
            sampler: LandmarkSampler::new(config.transform, config.min_visibility),
            config,
            targets,
        })
    }

    pub fn reference(&self) -> &Arc<PoseReference> {
        &self.reference
    }

    pub fn config(&self) -> &PoseComparatorConfig {
        &self.config
    }

    /// compare scores one frame of pose landmarks.
    ///
    /// # Arguments
    /// * `landmarks` - detector landmarks in MediaPipe pose order
    /// * `frame` - size of the analyzed frame
    ///
    /// # Returns
    /// * `ComparisonResult`
    pub fn compare(&self, landmarks: &[Landmark], frame: FrameSize) -> ComparisonResult {
        let nose = self.sampler.sample(landmarks, NOSE_INDEX);
        let left_shoulder = self.sampler.sample(landmarks, LEFT_SHOULDER_INDEX);
        let right_shoulder = self.sampler.sample(landmarks, RIGHT_SHOULDER_INDEX);
        let left_hip = self.sampler.sample(landmarks, LEFT_HIP_INDEX);
        let right_hip = self.sampler.sample(landmarks, RIGHT_HIP_INDEX);

        let reference = &self.reference;
        let regions: [(&str, Vec<(Option<Coordinate2D>, Coordinate2D)>); 3] = [
            (NOSE_REGION, vec![(nose, reference.nose())]),
            (
                SHOULDERS_REGION,
                vec![(left_shoulder, reference.left_shoulder()), (right_shoulder, reference.right_shoulder())],
            ),
            (
                HIPS_REGION,
                vec![(left_hip, reference.left_hip()), (right_hip, reference.right_hip())],
            ),
        ];

        let mut differences = DifferenceMap::new();
        let mut offsets = BTreeMap::new();
        for (name, pairs) in &regions {
            match region_difference(pairs) {
                Some((diff, offset)) => {
                    differences.insert(name.to_string(), diff);
                    offsets.insert(name.to_string(), offset);
                }
                None => debug!(region = name, "pose region not detected, skipping"),
            }
        }

        let composition_score = self.composition_score(
            [
                (nose, self.targets.nose),
                (pair_midpoint(left_shoulder, right_shoulder), self.targets.shoulders),
                (pair_midpoint(left_hip, right_hip), self.targets.hips),
            ],
            frame,
        );
        let position_score = self.position_score(&differences);
        let overall_score = clamp_score(self.config.blend.combine(position_score, composition_score));
        let suggestions = self.suggestions(&differences, composition_score);

        trace!(overall_score, position_score, composition_score, "pose comparison");

        ComparisonResult {
            overall_score,
            position_score,
            composition_score,
            suggestions,
            detailed_scores: differences,
            offsets,
        }
    }

    fn composition_score(&self, regions: [(Option<Coordinate2D>, AxisProximity); 3], frame: FrameSize) -> f32 {
        let (line_x, line_y) = frame.to_pixels(self.targets.line);
        let part_scores = regions.iter().filter_map(|(point, target)| {
            let (px, py) = frame.to_pixels((*point)?);
            let x_diff = (normalized_proximity(px, line_x, frame.width) - target.x).abs();
            let y_diff = (normalized_proximity(py, line_y, frame.height) - target.y).abs();
            Some(part_score(x_axis_score(x_diff), y_axis_score(y_diff)))
        });
        mean(part_scores).unwrap_or(0.0)
    }

    fn position_score(&self, differences: &DifferenceMap) -> f32 {
        let weights = [
            (NOSE_REGION, self.weights.nose),
            (SHOULDERS_REGION, self.weights.shoulders),
            (HIPS_REGION, self.weights.hips),
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
        let mut suggestions = Vec::new();
        let exceeds = |region: &str, limit: f32| differences.get(region).is_some_and(|d| *d > limit);

        if exceeds(NOSE_REGION, thresholds.critical) {
            suggestions.push(Suggestion::AdjustFacePosition);
        }
        if exceeds(SHOULDERS_REGION, thresholds.position) {
            suggestions.push(Suggestion::AlignShoulders);
        }
        if exceeds(HIPS_REGION, thresholds.position) {
            suggestions.push(Suggestion::AdjustHips);
        }
        if composition_score < thresholds.composition {
            suggestions.push(match self.config.anchor {
                CompositionAnchor::RuleOfThirds => Suggestion::AlignToThirds,
                CompositionAnchor::CenterOfMass => Suggestion::CenterSubject,
            });
        }
        if suggestions.is_empty() && mean(differences.values().copied()).is_some_and(|m| m > thresholds.position) {
            suggestions.push(Suggestion::MatchOverallPose);
        }
        suggestions
    }
}

/// pair_midpoint is the midpoint of a left/right pair, or `None` unless both
/// sides were detected. Reference proximities are measured from full pairs,
/// so a single side would not be comparable.
fn pair_midpoint(left: Option<Coordinate2D>, right: Option<Coordinate2D>) -> Option<Coordinate2D> {
    midpoint(&[Some(left?), Some(right?)])
}

/// region_difference averages the distances of the detected members of a
/// region and reports the offset of their midpoint from the matching
/// reference midpoint.
pub(crate) fn region_difference(pairs: &[(Option<Coordinate2D>, Coordinate2D)]) -> Option<(f32, Offset)> {
    let detected: Vec<(Coordinate2D, Coordinate2D)> = pairs
        .iter()
        .filter_map(|(current, reference)| current.map(|c| (c, *reference)))
        .collect();
    let diff = mean(detected.iter().map(|(c, r)| distance(*c, *r)))?;
    let current_mid = midpoint(&detected.iter().map(|(c, _)| Some(*c)).collect::<Vec<_>>())?;
    let reference_mid = midpoint(&detected.iter().map(|(_, r)| Some(*r)).collect::<Vec<_>>())?;
    Some((diff, Offset::between(current_mid, reference_mid)))
}

use std::fs;
use std::path::Path;
use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};
use crate::error::ConfigurationError;
use crate::utils::coordinate::CoordinateTransform;

/// PositionWeights sets how much each pose region contributes to the
/// position score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PositionWeights {
    pub nose: f32,
    pub shoulders: f32,
    pub hips: f32,
}

impl PositionWeights {
    pub fn new(nose: f32, shoulders: f32, hips: f32) -> Self {
        PositionWeights { nose, shoulders, hips }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        check_weights(&[("nose", self.nose), ("shoulders", self.shoulders), ("hips", self.hips)])
    }
}

/// WeightingPolicy selects between the known tunings of the position score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightingPolicy {
    /// nose 0.4, shoulders 0.3, hips 0.3
    #[default]
    Balanced,
    /// nose 0.6, shoulders 0.4, hips ignored
    UpperBody,
    Custom(PositionWeights),
}

impl WeightingPolicy {
    pub fn weights(&self) -> PositionWeights {
        match self {
            WeightingPolicy::Balanced => PositionWeights::new(0.4, 0.3, 0.3),
            WeightingPolicy::UpperBody => PositionWeights::new(0.6, 0.4, 0.0),
            WeightingPolicy::Custom(weights) => *weights,
        }
    }
}

/// CompositionAnchor selects the framing rule the composition score measures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompositionAnchor {
    #[default]
    RuleOfThirds,
    CenterOfMass,
}

impl CompositionAnchor {
    pub fn name(&self) -> &'static str {
        match self {
            CompositionAnchor::RuleOfThirds => "rule_of_thirds",
            CompositionAnchor::CenterOfMass => "center_of_mass",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    /// Region difference above which a hint is emitted.
    pub position: f32,
    /// Stricter limit for the most critical region (nose, face center).
    pub critical: f32,
    /// Composition score below which a framing hint is emitted.
    pub composition: f32,
}

impl Thresholds {
    pub fn new() -> Self {
        Thresholds {
            position: 0.1,
            critical: 0.15,
            composition: 70.0,
        }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.position) || !positive(self.critical) {
            return Err(ConfigurationError::InvalidThresholds(format!(
                "position ({}) and critical ({}) must be positive",
                self.position, self.critical
            )))
        }
        if !(0.0..=100.0).contains(&self.composition) {
            return Err(ConfigurationError::InvalidThresholds(format!(
                "composition ({}) must lie within [0, 100]",
                self.composition
            )))
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new()
    }
}

/// ScoreBlend mixes the position and composition sub-scores into the
/// overall score. Weights are normalized by their sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreBlend {
    pub position: f32,
    pub composition: f32,
}

impl ScoreBlend {
    pub fn new() -> Self {
        ScoreBlend {
            position: 0.7,
            composition: 0.3,
        }
    }

    pub fn combine(&self, position_score: f32, composition_score: f32) -> f32 {
        let total = self.position + self.composition;
        (self.position * position_score + self.composition * composition_score) / total
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        check_weights(&[("position", self.position), ("composition", self.composition)])
    }
}

impl Default for ScoreBlend {
    fn default() -> Self {
        Self::new()
    }
}

/// FaceWeights sets how much each face region contributes to the
/// position score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FaceWeights {
    pub center: f32,
    pub eyes: f32,
    pub ears: f32,
    pub mouth_and_chin: f32,
    pub forehead: f32,
}

impl FaceWeights {
    pub fn new() -> Self {
        FaceWeights {
            center: 0.4,
            eyes: 0.15,
            ears: 0.15,
            mouth_and_chin: 0.15,
            forehead: 0.15,
        }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        check_weights(&[
            ("center", self.center),
            ("eyes", self.eyes),
            ("ears", self.ears),
            ("mouth_and_chin", self.mouth_and_chin),
            ("forehead", self.forehead),
        ])
    }
}

impl Default for FaceWeights {
    fn default() -> Self {
        Self::new()
    }
}

/// FaceLandmarkLayout maps face regions to indices in the detector output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FaceLandmarkLayout {
    pub center: usize,
    pub left_eye: usize,
    pub right_eye: usize,
    pub left_ear: usize,
    pub right_ear: usize,
    pub mouth_center: usize,
    pub chin: usize,
    pub forehead: usize,
}

impl FaceLandmarkLayout {
    pub fn new() -> Self {
        FaceLandmarkLayout {
            center: 0,
            left_eye: 1,
            right_eye: 2,
            left_ear: 3,
            right_ear: 4,
            mouth_center: 5,
            chin: 6,
            forehead: 7,
        }
    }
}

impl Default for FaceLandmarkLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PoseComparatorConfig {
    pub weighting: WeightingPolicy,
    pub anchor: CompositionAnchor,
    pub transform: CoordinateTransform,
    pub thresholds: Thresholds,
    pub blend: ScoreBlend,
    /// Landmarks reporting a visibility below this are treated as missing.
    pub min_visibility: f32,
}

impl PoseComparatorConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.weighting.weights().validate()?;
        self.thresholds.validate()?;
        self.blend.validate()?;
        check_visibility(self.min_visibility)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct FaceComparatorConfig {
    pub weights: FaceWeights,
    pub layout: FaceLandmarkLayout,
    pub transform: CoordinateTransform,
    pub thresholds: Thresholds,
    pub blend: ScoreBlend,
    pub min_visibility: f32,
}

impl FaceComparatorConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.weights.validate()?;
        self.thresholds.validate()?;
        self.blend.validate()?;
        check_visibility(self.min_visibility)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmoothingConfig {
    pub enabled: bool,
    /// Weight of the previous frame in the moving average.
    pub factor: f32,
}

impl SmoothingConfig {
    pub fn new() -> Self {
        SmoothingConfig {
            enabled: true,
            factor: 0.8,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..1.0).contains(&self.factor) {
            return Err(ConfigurationError::InvalidSmoothingFactor(self.factor))
        }
        Ok(())
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// PipelineConfig is the top level settings document for one camera stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub pose: PoseComparatorConfig,
    pub face: FaceComparatorConfig,
    pub smoothing: SmoothingConfig,
    pub log_interval_ms: u64,
}

impl PipelineConfig {
    pub fn new() -> Self {
        PipelineConfig {
            pose: PoseComparatorConfig::default(),
            face: FaceComparatorConfig::default(),
            smoothing: SmoothingConfig::new(),
            log_interval_ms: 5000,
        }
    }

    /// from_json_str parses a settings document; omitted fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// load reads and validates a settings file.
    ///
    /// # Arguments
    /// * `path` - path to a json settings file
    ///
    /// # Returns
    /// * `Result<PipelineConfig, Error>`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_json_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.pose.validate()?;
        self.face.validate()?;
        self.smoothing.validate()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn check_weights(weights: &[(&str, f32)]) -> Result<(), ConfigurationError> {
    for (name, weight) in weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(ConfigurationError::InvalidWeights(format!(
                "{} weight must be a non-negative number, got {}",
                name, weight
            )))
        }
    }
    let total: f32 = weights.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Err(ConfigurationError::InvalidWeights("weights sum to zero".to_string()))
    }
    Ok(())
}

fn check_visibility(min_visibility: f32) -> Result<(), ConfigurationError> {
    if !(0.0..=1.0).contains(&min_visibility) {
        return Err(ConfigurationError::InvalidThresholds(format!(
            "min_visibility ({}) must lie within [0, 1]",
            min_visibility
        )))
    }
    Ok(())
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::error::ConfigurationError;
use crate::utils::coordinate::Coordinate2D;

pub const NOSE: &str = "NOSE";
pub const LEFT_SHOULDER: &str = "LEFT_SHOULDER";
pub const RIGHT_SHOULDER: &str = "RIGHT_SHOULDER";
pub const LEFT_HIP: &str = "LEFT_HIP";
pub const RIGHT_HIP: &str = "RIGHT_HIP";

/// Region keys every pose reference has to provide.
pub const REQUIRED_POSE_REGIONS: [&str; 5] = [NOSE, LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP];

/// ThirdsProximity holds the average normalized distance of each tracked
/// region from the first rule-of-thirds lines in the reference corpus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThirdsProximity {
    #[serde(alias = "nose_x")]
    pub average_nose_x_proximity: f32,
    #[serde(alias = "nose_y")]
    pub average_nose_y_proximity: f32,
    #[serde(alias = "shoulder_x")]
    pub average_shoulder_x_proximity: f32,
    #[serde(alias = "shoulder_y")]
    pub average_shoulder_y_proximity: f32,
    #[serde(alias = "hip_x")]
    pub average_hip_x_proximity: f32,
    #[serde(alias = "hip_y")]
    pub average_hip_y_proximity: f32,
}

impl ThirdsProximity {
    fn values(&self) -> [(&'static str, f32); 6] {
        [
            ("average_nose_x_proximity", self.average_nose_x_proximity),
            ("average_nose_y_proximity", self.average_nose_y_proximity),
            ("average_shoulder_x_proximity", self.average_shoulder_x_proximity),
            ("average_shoulder_y_proximity", self.average_shoulder_y_proximity),
            ("average_hip_x_proximity", self.average_hip_x_proximity),
            ("average_hip_y_proximity", self.average_hip_y_proximity),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawPoseReference {
    #[serde(alias = "average_posture")]
    average_pose: HashMap<String, Coordinate2D>,
    #[serde(default)]
    average_com: Option<Coordinate2D>,
    #[serde(default)]
    average_proximity_to_thirds: Option<ThirdsProximity>,
}

/// PoseReference is the validated set of reference statistics for body pose
/// guidance. Every required region is guaranteed to be present.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PoseReference {
    average_pose: HashMap<String, Coordinate2D>,
    average_com: Option<Coordinate2D>,
    average_proximity_to_thirds: Option<ThirdsProximity>,
}

impl PoseReference {
    /// new validates the reference statistics and builds the reference.
    ///
    /// # Arguments
    /// * `average_pose` - region name to average reference point
    /// * `average_com` - average subject center of mass, if known
    /// * `average_proximity_to_thirds` - rule-of-thirds statistics, if known
    ///
    /// # Returns
    /// * `Result<PoseReference, ConfigurationError>`
    pub fn new(
        average_pose: HashMap<String, Coordinate2D>,
        average_com: Option<Coordinate2D>,
        average_proximity_to_thirds: Option<ThirdsProximity>,
    ) -> Result<Self, ConfigurationError> {
        for region in REQUIRED_POSE_REGIONS {
            match average_pose.get(region) {
                None => {
                    warn!(region, "pose reference is missing a required region");
                    return Err(ConfigurationError::MissingRegion(region.to_string()))
                }
                Some(point) if !point.is_finite() => {
                    return Err(ConfigurationError::NonFiniteReference(region.to_string()))
                }
                Some(_) => {}
            }
        }
        if let Some(com) = average_com {
            if !com.is_finite() {
                return Err(ConfigurationError::NonFiniteReference("average_com".to_string()))
            }
        }
        if let Some(thirds) = average_proximity_to_thirds {
            for (name, value) in thirds.values() {
                if !value.is_finite() {
                    return Err(ConfigurationError::NonFiniteReference(name.to_string()))
                }
            }
        }

        Ok(PoseReference {
            average_pose,
            average_com,
            average_proximity_to_thirds,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let raw: RawPoseReference = serde_json::from_str(json)?;
        Self::new(raw.average_pose, raw.average_com, raw.average_proximity_to_thirds)
    }

    /// region returns the reference point for a region name.
    pub fn region(&self, name: &str) -> Option<Coordinate2D> {
        self.average_pose.get(name).copied()
    }

    pub fn nose(&self) -> Coordinate2D {
        self.required(NOSE)
    }

    pub fn left_shoulder(&self) -> Coordinate2D {
        self.required(LEFT_SHOULDER)
    }

    pub fn right_shoulder(&self) -> Coordinate2D {
        self.required(RIGHT_SHOULDER)
    }

    pub fn left_hip(&self) -> Coordinate2D {
        self.required(LEFT_HIP)
    }

    pub fn right_hip(&self) -> Coordinate2D {
        self.required(RIGHT_HIP)
    }

    pub fn average_com(&self) -> Option<Coordinate2D> {
        self.average_com
    }

    pub fn thirds_proximity(&self) -> Option<ThirdsProximity> {
        self.average_proximity_to_thirds
    }

    // Presence of required regions is checked in `new`.
    fn required(&self, name: &str) -> Coordinate2D {
        self.average_pose.get(name).copied().unwrap_or_default()
    }
}

/// FaceDistances are the average distances of each face landmark from the
/// face center in the reference corpus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FaceDistances {
    pub left_eye: f32,
    pub right_eye: f32,
    pub left_ear: f32,
    pub right_ear: f32,
    pub mouth_center: f32,
    pub chin: f32,
    pub forehead: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct RawFaceReference {
    average_center: Option<Coordinate2D>,
    average_distances: Option<FaceDistances>,
}

/// FaceReference is the validated set of reference statistics for face guidance.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FaceReference {
    average_center: Coordinate2D,
    average_distances: FaceDistances,
}

impl FaceReference {
    pub fn new(average_center: Coordinate2D, average_distances: FaceDistances) -> Result<Self, ConfigurationError> {
        if !average_center.is_finite() {
            return Err(ConfigurationError::NonFiniteReference("average_center".to_string()))
        }
        let d = &average_distances;
        let named = [
            ("left_eye", d.left_eye),
            ("right_eye", d.right_eye),
            ("left_ear", d.left_ear),
            ("right_ear", d.right_ear),
            ("mouth_center", d.mouth_center),
            ("chin", d.chin),
            ("forehead", d.forehead),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ConfigurationError::NonFiniteReference(name.to_string()))
            }
        }
        Ok(FaceReference {
            average_center,
            average_distances,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let raw: RawFaceReference = serde_json::from_str(json)?;
        let center = raw
            .average_center
            .ok_or_else(|| ConfigurationError::MissingRegion("average_center".to_string()))?;
        let distances = raw
            .average_distances
            .ok_or_else(|| ConfigurationError::MissingRegion("average_distances".to_string()))?;
        Self::new(center, distances)
    }

    pub fn average_center(&self) -> Coordinate2D {
        self.average_center
    }

    pub fn average_distances(&self) -> &FaceDistances {
        &self.average_distances
    }
}

/// load_pose_reference reads a bundled pose reference file.
///
/// # Arguments
/// * `path` - path to the json reference
///
/// # Returns
/// * `Result<PoseReference, Error>`
pub fn load_pose_reference(path: impl AsRef<Path>) -> Result<PoseReference, Error> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read pose reference {}", path.display()))?;
    let reference = PoseReference::from_json_str(&content)
        .with_context(|| format!("invalid pose reference {}", path.display()))?;
    info!(path = %path.display(), "loaded pose reference");
    Ok(reference)
}

/// load_face_reference reads a bundled face reference file.
pub fn load_face_reference(path: impl AsRef<Path>) -> Result<FaceReference, Error> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read face reference {}", path.display()))?;
    let reference = FaceReference::from_json_str(&content)
        .with_context(|| format!("invalid face reference {}", path.display()))?;
    info!(path = %path.display(), "loaded face reference");
    Ok(reference)
}

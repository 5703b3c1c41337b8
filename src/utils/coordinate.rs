use serde::{Deserialize, Serialize};

/// Coordinate2D is a point in normalized image space, both axes in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Coordinate2D {
    pub x: f32,
    pub y: f32,
}

impl Coordinate2D {
    pub fn new(x: f32, y: f32) -> Self {
        Coordinate2D { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// clamped returns the point pulled back inside the unit frame.
    pub fn clamped(&self) -> Self {
        Coordinate2D {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

/// Landmark is a single detector keypoint with normalized coordinates.
///
/// `z` is the detector's relative depth and is carried through smoothing
/// but never used for scoring. `visibility` is absent for detectors that
/// do not report it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0, visibility: None }
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn position(&self) -> Coordinate2D {
        Coordinate2D::new(self.x, self.y)
    }
}

/// FrameSize is the pixel size of the analyzed camera frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        FrameSize { width, height }
    }

    pub fn to_pixels(&self, point: Coordinate2D) -> (f32, f32) {
        (point.x * self.width as f32, point.y * self.height as f32)
    }
}

/// CoordinateTransform aligns detector coordinates with the frame the
/// reference statistics were computed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateTransform {
    #[default]
    Identity,
    /// Sensor mounted a quarter turn from the display: `x' = 1 - y`, `y' = x`.
    RotateSensor90,
}

impl CoordinateTransform {
    pub fn apply(&self, point: Coordinate2D) -> Coordinate2D {
        match self {
            CoordinateTransform::Identity => point,
            CoordinateTransform::RotateSensor90 => Coordinate2D::new(1.0 - point.y, point.x),
        }
    }
}

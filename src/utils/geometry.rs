use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use crate::utils::coordinate::Coordinate2D;

/// Offset is the signed displacement of a live point from its reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Offset {
    pub dx: f32,
    pub dy: f32,
}

impl Offset {
    pub fn between(current: Coordinate2D, reference: Coordinate2D) -> Self {
        Offset {
            dx: current.x - reference.x,
            dy: current.y - reference.y,
        }
    }
}

/// distance returns the euclidean distance between two normalized points.
///
/// # Arguments
/// * `current` - Coordinate2D
/// * `reference` - Coordinate2D
///
/// # Returns
/// * `f32`
pub fn distance(current: Coordinate2D, reference: Coordinate2D) -> f32 {
    let vec_current = Vector2::new(current.x, current.y);
    let vec_reference = Vector2::new(reference.x, reference.y);
    (vec_current - vec_reference).norm()
}

/// normalized_proximity returns how far a coordinate sits from a reference
/// line as a fraction of the frame dimension.
///
/// A zero dimension cannot be normalized and is reported as maximal error.
///
/// # Arguments
/// * `coordinate` - pixel coordinate on one axis
/// * `reference_line` - pixel position of the line on the same axis
/// * `dimension` - frame size along that axis
///
/// # Returns
/// * `f32`
pub fn normalized_proximity(coordinate: f32, reference_line: f32, dimension: u32) -> f32 {
    if dimension == 0 {
        return 1.0
    }
    (coordinate - reference_line).abs() / dimension as f32
}

/// midpoint averages whichever points are present.
pub fn midpoint(points: &[Option<Coordinate2D>]) -> Option<Coordinate2D> {
    let present: Vec<Coordinate2D> = points.iter().flatten().copied().collect();
    if present.is_empty() {
        return None
    }
    let n = present.len() as f32;
    let sum = present
        .iter()
        .fold(Vector2::new(0.0f32, 0.0f32), |acc, p| acc + Vector2::new(p.x, p.y));
    Some(Coordinate2D::new(sum.x / n, sum.y / n))
}

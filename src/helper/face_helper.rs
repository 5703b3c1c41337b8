use serde::{Deserialize, Serialize};
use crate::utils::coordinate::{Coordinate2D, Landmark};
use crate::utils::geometry::distance;

/// FaceBox is the normalized bounding box around one face's landmarks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FaceBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl FaceBox {

    /// from_landmarks returns the tightest box around the finite landmarks,
    /// or `None` if there are none.
    pub fn from_landmarks(landmarks: &[Landmark]) -> Option<Self> {
        let mut points = landmarks
            .iter()
            .map(|l| l.position())
            .filter(|p| p.is_finite());
        let first = points.next()?;
        let init = FaceBox {
            left: first.x,
            top: first.y,
            right: first.x,
            bottom: first.y,
        };
        Some(points.fold(init, |b, p| FaceBox {
            left: b.left.min(p.x),
            top: b.top.min(p.y),
            right: b.right.max(p.x),
            bottom: b.bottom.max(p.y),
        }))
    }

    pub fn area(&self) -> f32 {
        let clamp = |v: f32| v.clamp(0.0, 1.0);
        (clamp(self.right) - clamp(self.left)) * (clamp(self.bottom) - clamp(self.top))
    }

    pub fn center(&self) -> Coordinate2D {
        Coordinate2D::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn contains(&self, point: Coordinate2D) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// FaceSelection decides which detected face guidance follows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FaceSelection {
    #[default]
    Largest,
    Center,
    /// The face under a tap, in view pixels.
    Tap { x: f32, y: f32, view_width: u32, view_height: u32 },
    Index(usize),
}

/// get_largest_face returns the index of the face with the biggest box.
pub fn get_largest_face(boxes: &[FaceBox]) -> Option<usize> {
    boxes
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.area().total_cmp(&b.area()))
        .map(|(index, _)| index)
}

/// get_center_face returns the index of the face closest to `center`,
/// the frame center when `center` is `None`.
pub fn get_center_face(boxes: &[FaceBox], center: Option<Coordinate2D>) -> Option<usize> {
    let center = center.unwrap_or(Coordinate2D::new(0.5, 0.5));
    boxes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| distance(a.center(), center).total_cmp(&distance(b.center(), center)))
        .map(|(index, _)| index)
}

/// select_face_at hit-tests a tap in view pixels against the face boxes.
///
/// # Arguments
/// * `boxes` - normalized face boxes
/// * `x`, `y` - tap position in view pixels
/// * `view_width`, `view_height` - view size in pixels
///
/// # Returns
/// * `Option<usize>` - first face containing the tap
pub fn select_face_at(boxes: &[FaceBox], x: f32, y: f32, view_width: u32, view_height: u32) -> Option<usize> {
    if view_width == 0 || view_height == 0 {
        return None
    }
    let tap = Coordinate2D::new(x / view_width as f32, y / view_height as f32);
    boxes.iter().position(|b| b.contains(tap))
}

/// select_face applies a selection policy to a multi-face detection.
pub fn select_face(faces: &[Vec<Landmark>], selection: FaceSelection) -> Option<usize> {
    let boxes: Vec<(usize, FaceBox)> = faces
        .iter()
        .enumerate()
        .filter_map(|(i, f)| FaceBox::from_landmarks(f).map(|b| (i, b)))
        .collect();
    let only_boxes: Vec<FaceBox> = boxes.iter().map(|(_, b)| *b).collect();

    let picked = match selection {
        FaceSelection::Largest => get_largest_face(&only_boxes),
        FaceSelection::Center => get_center_face(&only_boxes, None),
        FaceSelection::Tap { x, y, view_width, view_height } => {
            select_face_at(&only_boxes, x, y, view_width, view_height)
        }
        FaceSelection::Index(index) => return (index < faces.len()).then_some(index),
    };
    picked.map(|i| boxes[i].0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f32, cy: f32, half: f32) -> Vec<Landmark> {
        vec![
            Landmark::new(cx - half, cy - half),
            Landmark::new(cx + half, cy + half),
            Landmark::new(cx, cy),
        ]
    }

    #[test]
    fn test_face_box_from_landmarks() {
        let b = FaceBox::from_landmarks(&square(0.5, 0.4, 0.1)).unwrap();
        assert!((b.left - 0.4).abs() < 1e-6 && (b.bottom - 0.5).abs() < 1e-6);
        assert!((b.area() - 0.04).abs() < 1e-5);
        assert!(FaceBox::from_landmarks(&[]).is_none());
        assert!(FaceBox::from_landmarks(&[Landmark::new(f32::NAN, 0.1)]).is_none());
    }

    #[test]
    fn test_largest_and_center() {
        let faces = vec![square(0.2, 0.2, 0.15), square(0.55, 0.5, 0.05), square(0.8, 0.8, 0.1)];
        assert_eq!(select_face(&faces, FaceSelection::Largest), Some(0));
        assert_eq!(select_face(&faces, FaceSelection::Center), Some(1));
        assert_eq!(select_face(&[], FaceSelection::Largest), None);
    }

    #[test]
    fn test_tap_selection() {
        let faces = vec![square(0.2, 0.2, 0.1), square(0.8, 0.8, 0.1)];
        let tap = FaceSelection::Tap { x: 800.0, y: 1600.0, view_width: 1000, view_height: 2000 };
        assert_eq!(select_face(&faces, tap), Some(1));
        let miss = FaceSelection::Tap { x: 500.0, y: 1000.0, view_width: 1000, view_height: 2000 };
        assert_eq!(select_face(&faces, miss), None);
        assert_eq!(select_face_at(&[], 1.0, 1.0, 0, 0), None);
    }

    #[test]
    fn test_index_selection_skips_empty_faces() {
        let faces = vec![vec![], square(0.5, 0.5, 0.1)];
        assert_eq!(select_face(&faces, FaceSelection::Largest), Some(1));
        assert_eq!(select_face(&faces, FaceSelection::Index(0)), Some(0));
        assert_eq!(select_face(&faces, FaceSelection::Index(5)), None);
    }
}

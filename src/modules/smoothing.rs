//! Exponential smoothing of landmark tracks between detection frames.
//!
//! Smoothing only steadies what is drawn on screen; comparators always score
//! the raw landmarks of the current frame.

use std::collections::{HashMap, HashSet};
use ndarray::{Array2, Axis};
use tracing::debug;
use crate::utils::array::{landmarks_to_ndarray, ndarray_to_landmarks};
use crate::utils::coordinate::{Coordinate2D, Landmark};
use crate::utils::geometry::distance;

/// Largest centroid movement between frames that still counts as the same
/// subject, in normalized units.
pub const DEFAULT_MAX_TRACK_JUMP: f32 = 0.15;

/// smooth blends one landmark with its previous value,
/// `factor * previous + (1 - factor) * current` on each axis.
pub fn smooth(previous: &Landmark, current: &Landmark, factor: f32) -> Landmark {
    let blend = |p: f32, c: f32| factor * p + (1.0 - factor) * c;
    Landmark {
        x: blend(previous.x, current.x),
        y: blend(previous.y, current.y),
        z: blend(previous.z, current.z),
        visibility: current.visibility,
    }
}

/// SmoothingState carries the previous smoothed frame of one tracked subject.
#[derive(Debug, Clone, Default)]
pub struct SmoothingState {
    previous: Option<Array2<f32>>,
}

impl SmoothingState {
    pub fn new() -> Self {
        SmoothingState { previous: None }
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_none()
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// centroid is the mean position of the last smoothed frame.
    pub fn centroid(&self) -> Option<Coordinate2D> {
        self.previous.as_ref().and_then(centroid)
    }
}

fn centroid(arr: &Array2<f32>) -> Option<Coordinate2D> {
    let mean = arr.mean_axis(Axis(0))?;
    let point = Coordinate2D::new(mean[0], mean[1]);
    point.is_finite().then_some(point)
}

/// smooth_frame smooths a whole frame of landmarks and records it in `state`.
///
/// The first frame, and any frame whose landmark count differs from the
/// previous one, passes through unchanged and restarts the track.
/// Non-finite input coordinates also restart the track.
///
/// # Arguments
/// * `state` - SmoothingState of the subject
/// * `current` - landmarks of the new frame
/// * `factor` - weight of the previous frame in [0, 1)
///
/// # Returns
/// * `Vec<Landmark>`
pub fn smooth_frame(state: &mut SmoothingState, current: &[Landmark], factor: f32) -> Vec<Landmark> {
    let current_arr = landmarks_to_ndarray(current);
    if current_arr.iter().any(|v| !v.is_finite()) {
        debug!("non-finite landmark, restarting smoothing track");
        state.reset();
        return current.to_vec()
    }

    let smoothed = match state.previous.take() {
        Some(previous) if previous.dim() == current_arr.dim() => {
            previous * factor + &current_arr * (1.0 - factor)
        }
        Some(_) => {
            debug!(landmarks = current.len(), "landmark count changed, restarting smoothing track");
            current_arr
        }
        None => current_arr,
    };

    let landmarks = ndarray_to_landmarks(&smoothed, current).unwrap_or_else(|_| current.to_vec());
    state.previous = Some(smoothed);
    landmarks
}

/// SmoothingArena keeps independent smoothing tracks for several subjects,
/// such as every face in a multi-face detection.
///
/// Detectors do not report stable subject ids and reorder their output as
/// subjects come and go, so each frame's subjects are matched to tracks by
/// the nearest centroid of their previous smoothed frame.
#[derive(Debug, Clone)]
pub struct SmoothingArena {
    tracks: HashMap<usize, SmoothingState>,
    next_id: usize,
    max_jump: f32,
}

impl SmoothingArena {
    pub fn new() -> Self {
        Self::with_max_jump(DEFAULT_MAX_TRACK_JUMP)
    }

    pub fn with_max_jump(max_jump: f32) -> Self {
        SmoothingArena {
            tracks: HashMap::new(),
            next_id: 0,
            max_jump,
        }
    }

    /// smooth_subjects smooths every subject of one frame.
    ///
    /// Each subject continues the unclaimed track whose centroid lies
    /// nearest, if that is within the arena's max jump. Unmatched subjects
    /// start fresh tracks and tracks left unmatched are dropped.
    ///
    /// # Arguments
    /// * `subjects` - landmarks of every subject in the frame
    /// * `factor` - weight of the previous frame in [0, 1)
    ///
    /// # Returns
    /// * `Vec<Vec<Landmark>>` - smoothed landmarks in input order
    pub fn smooth_subjects(&mut self, subjects: &[Vec<Landmark>], factor: f32) -> Vec<Vec<Landmark>> {
        let mut candidates: Vec<(f32, usize, usize)> = Vec::new();
        for (index, subject) in subjects.iter().enumerate() {
            let current = match centroid(&landmarks_to_ndarray(subject)) {
                Some(current) => current,
                None => continue,
            };
            for (id, state) in &self.tracks {
                if let Some(previous) = state.centroid() {
                    let jump = distance(current, previous);
                    if jump <= self.max_jump {
                        candidates.push((jump, index, *id));
                    }
                }
            }
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut assigned: Vec<Option<usize>> = vec![None; subjects.len()];
        let mut claimed = HashSet::new();
        for (_, index, id) in candidates {
            if assigned[index].is_none() && claimed.insert(id) {
                assigned[index] = Some(id);
            }
        }

        let mut tracks = HashMap::with_capacity(subjects.len());
        let mut smoothed = Vec::with_capacity(subjects.len());
        for (subject, id) in subjects.iter().zip(assigned) {
            let (id, mut state) = match id.and_then(|id| self.tracks.remove(&id).map(|state| (id, state))) {
                Some(track) => track,
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    (id, SmoothingState::new())
                }
            };
            smoothed.push(smooth_frame(&mut state, subject, factor));
            tracks.insert(id, state);
        }
        if !self.tracks.is_empty() {
            debug!(dropped = self.tracks.len(), "subjects left the frame, dropping their tracks");
        }
        self.tracks = tracks;
        smoothed
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl Default for SmoothingArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_single_landmark() {
        let s = smooth(&Landmark::new(0.0, 1.0), &Landmark::new(1.0, 0.0).with_visibility(0.7), 0.8);
        assert!((s.x - 0.2).abs() < 1e-6);
        assert!((s.y - 0.8).abs() < 1e-6);
        assert_eq!(s.visibility, Some(0.7));
    }

    #[test]
    fn test_first_frame_passes_through() {
        let mut state = SmoothingState::new();
        let frame = vec![Landmark::new(0.3, 0.6).with_z(0.1), Landmark::new(0.9, 0.2)];
        assert_eq!(smooth_frame(&mut state, &frame, 0.8), frame);
        assert!(!state.is_empty());
    }

    #[test]
    fn test_second_frame_blends() {
        let mut state = SmoothingState::new();
        smooth_frame(&mut state, &[Landmark::new(0.0, 0.0)], 0.8);
        let out = smooth_frame(&mut state, &[Landmark::new(1.0, 0.5)], 0.8);
        assert!((out[0].x - 0.2).abs() < 1e-6);
        assert!((out[0].y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_converges_to_constant_input() {
        let mut state = SmoothingState::new();
        smooth_frame(&mut state, &[Landmark::new(0.0, 1.0)], 0.8);
        let target = [Landmark::new(0.6, 0.4)];
        let mut out = Vec::new();
        for _ in 0..200 {
            out = smooth_frame(&mut state, &target, 0.8);
        }
        assert!((out[0].x - 0.6).abs() < 1e-5);
        assert!((out[0].y - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_count_change_restarts() {
        let mut state = SmoothingState::new();
        smooth_frame(&mut state, &[Landmark::new(0.0, 0.0)], 0.8);
        let frame = vec![Landmark::new(0.5, 0.5), Landmark::new(0.7, 0.7)];
        assert_eq!(smooth_frame(&mut state, &frame, 0.8), frame);
    }

    #[test]
    fn test_arena_tracks_are_independent() {
        let mut arena = SmoothingArena::new();
        arena.smooth_subjects(&[vec![Landmark::new(0.2, 0.2)], vec![Landmark::new(0.8, 0.8)]], 0.5);
        let out = arena.smooth_subjects(&[vec![Landmark::new(0.3, 0.2)], vec![Landmark::new(0.8, 0.8)]], 0.5);
        assert!((out[0][0].x - 0.25).abs() < 1e-6);
        assert!((out[1][0].x - 0.8).abs() < 1e-6);
        assert_eq!(arena.len(), 2);
    }

    fn assert_close(actual: &[Landmark], expected: &[Landmark]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.x - e.x).abs() < 1e-5 && (a.y - e.y).abs() < 1e-5, "{:?} != {:?}", a, e);
        }
    }

    #[test]
    fn test_arena_follows_subjects_when_order_changes() {
        let mut arena = SmoothingArena::new();
        let left = vec![Landmark::new(0.2, 0.5), Landmark::new(0.22, 0.55)];
        let right = vec![Landmark::new(0.8, 0.5), Landmark::new(0.82, 0.55)];
        arena.smooth_subjects(&[left.clone(), right.clone()], 0.8);

        // left subject leaves, right one is now first in the detection
        let out = arena.smooth_subjects(&[right.clone()], 0.8);
        assert_close(&out[0], &right);
        assert_eq!(arena.len(), 1);

        let out = arena.smooth_subjects(&[left.clone(), right.clone()], 0.8);
        assert_close(&out[0], &left);
        assert_close(&out[1], &right);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_arena_restarts_on_large_jump() {
        let mut arena = SmoothingArena::with_max_jump(0.1);
        arena.smooth_subjects(&[vec![Landmark::new(0.1, 0.1)]], 0.8);
        let far = vec![Landmark::new(0.6, 0.6)];
        assert_eq!(arena.smooth_subjects(&[far.clone()], 0.8), vec![far]);
        assert!(SmoothingState::new().centroid().is_none());
    }
}

use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::config::config::PipelineConfig;
use crate::error::ConfigurationError;
use crate::helper::face_helper::{select_face, FaceSelection};
use crate::helper::overlay_helper::{build_overlay, OverlayGuidance};
use crate::modules::face_comparator::FaceComparator;
use crate::modules::pose_comparator::PoseComparator;
use crate::modules::result::ComparisonResult;
use crate::modules::smoothing::{smooth_frame, SmoothingArena, SmoothingState};
use crate::modules::throttle::LogThrottle;
use crate::reference::library::{CameraFacing, ReferenceLibrary};
use crate::reference::reference::{FaceReference, PoseReference};
use crate::utils::coordinate::{FrameSize, Landmark};

/// FrameOutput is what the pipeline hands to the renderer for one detection.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// `None` while scoring is disabled or no subject was selected.
    pub result: Option<ComparisonResult>,
    pub overlay: Option<OverlayGuidance>,
    /// Landmarks to draw; smoothed when smoothing is enabled.
    pub landmarks: Vec<Landmark>,
    /// Index of the face that was scored, for multi-face input.
    pub subject: Option<usize>,
}

impl FrameOutput {
    fn neutral(landmarks: Vec<Landmark>) -> Self {
        FrameOutput {
            result: None,
            overlay: None,
            landmarks,
            subject: None,
        }
    }
}

/// GuidancePipeline owns everything needed to guide one camera stream.
///
/// Comparators are immutable; the pipeline holds the per-stream mutable
/// state (smoothing tracks and the diagnostic throttle), so each concurrent
/// stream needs its own pipeline.
#[derive(Debug)]
pub struct GuidancePipeline {
    config: PipelineConfig,
    frame: FrameSize,
    pose: Option<PoseComparator>,
    face: Option<FaceComparator>,
    pose_track: SmoothingState,
    face_tracks: SmoothingArena,
    throttle: LogThrottle,
}

impl GuidancePipeline {

    /// new initializes a pipeline for one stream.
    ///
    /// A missing reference disables that kind of scoring; the pipeline still
    /// passes landmarks through for drawing.
    ///
    /// # Arguments
    /// * `config` - PipelineConfig
    /// * `pose_reference` - Option<Arc<PoseReference>>
    /// * `face_reference` - Option<Arc<FaceReference>>
    /// * `frame` - size of the analyzed frames
    ///
    /// # Returns
    /// * `Result<GuidancePipeline, ConfigurationError>`
    pub fn new(
        config: PipelineConfig,
        pose_reference: Option<Arc<PoseReference>>,
        face_reference: Option<Arc<FaceReference>>,
        frame: FrameSize,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let pose = pose_reference
            .map(|reference| PoseComparator::new(reference, config.pose))
            .transpose()?;
        let face = face_reference
            .map(|reference| FaceComparator::new(reference, config.face))
            .transpose()?;

        if pose.is_none() {
            warn!("no pose reference available, pose scoring disabled");
        }
        if face.is_none() {
            warn!("no face reference available, face scoring disabled");
        }

        Ok(GuidancePipeline {
            throttle: LogThrottle::new(config.log_interval_ms),
            config,
            frame,
            pose,
            face,
            pose_track: SmoothingState::new(),
            face_tracks: SmoothingArena::new(),
        })
    }

    pub fn pose_enabled(&self) -> bool {
        self.pose.is_some()
    }

    pub fn face_enabled(&self) -> bool {
        self.face.is_some()
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame
    }

    pub fn set_frame_size(&mut self, frame: FrameSize) {
        self.frame = frame;
    }

    /// switch_camera replaces the pose comparator with one built on the
    /// library's reference for `facing`, and restarts smoothing.
    ///
    /// If the library has no reference for that camera pose scoring is
    /// disabled until the next switch.
    pub fn switch_camera(&mut self, facing: CameraFacing, library: &ReferenceLibrary) -> Result<(), ConfigurationError> {
        self.pose = library
            .get(facing)
            .map(|reference| PoseComparator::new(reference, self.config.pose))
            .transpose()?;
        self.pose_track.reset();
        self.face_tracks.clear();
        info!(?facing, pose_enabled = self.pose.is_some(), "switched camera");
        Ok(())
    }

    /// process_pose scores one pose detection.
    ///
    /// # Arguments
    /// * `landmarks` - pose landmarks in MediaPipe order
    /// * `timestamp_ms` - detection timestamp, drives the diagnostic throttle
    ///
    /// # Returns
    /// * `FrameOutput`
    pub fn process_pose(&mut self, landmarks: &[Landmark], timestamp_ms: u64) -> FrameOutput {
        let drawn = if self.config.smoothing.enabled {
            smooth_frame(&mut self.pose_track, landmarks, self.config.smoothing.factor)
        } else {
            landmarks.to_vec()
        };

        let comparator = match &self.pose {
            Some(comparator) => comparator,
            None => return FrameOutput::neutral(drawn),
        };

        let result = comparator.compare(landmarks, self.frame);
        if self.throttle.should_log(timestamp_ms) {
            debug!(
                overall = result.overall_score,
                position = result.position_score,
                composition = result.composition_score,
                differences = ?result.detailed_scores,
                "pose guidance"
            );
        }
        let overlay = build_overlay(&result, self.config.pose.thresholds.position);
        FrameOutput {
            result: Some(result),
            overlay: Some(overlay),
            landmarks: drawn,
            subject: None,
        }
    }

    /// process_faces picks one face out of a multi-face detection and scores it.
    ///
    /// Every face keeps its own smoothing track, followed across frames by
    /// position rather than detection order; `landmarks` of the output are
    /// those of the selected face.
    pub fn process_faces(&mut self, faces: &[Vec<Landmark>], selection: FaceSelection, timestamp_ms: u64) -> FrameOutput {
        let smoothing = self.config.smoothing;
        let drawn = if smoothing.enabled {
            self.face_tracks.smooth_subjects(faces, smoothing.factor)
        } else {
            faces.to_vec()
        };

        let subject = match select_face(faces, selection) {
            Some(subject) => subject,
            None => return FrameOutput::neutral(Vec::new()),
        };
        let selected = drawn.get(subject).cloned().unwrap_or_default();

        let comparator = match &self.face {
            Some(comparator) => comparator,
            None => {
                let mut output = FrameOutput::neutral(selected);
                output.subject = Some(subject);
                return output
            }
        };

        let result = comparator.compare(&faces[subject], self.frame);
        if self.throttle.should_log(timestamp_ms) {
            debug!(
                subject,
                faces = faces.len(),
                overall = result.overall_score,
                differences = ?result.detailed_scores,
                "face guidance"
            );
        }
        let overlay = build_overlay(&result, self.config.face.thresholds.position);
        FrameOutput {
            result: Some(result),
            overlay: Some(overlay),
            landmarks: selected,
            subject: Some(subject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::SmoothingConfig;
    use crate::modules::suggestion::Suggestion;

    const POSE_JSON: &str = r#"{"average_pose":{"NOSE":{"x":0.5,"y":0.3},"LEFT_SHOULDER":{"x":0.6,"y":0.45},"RIGHT_SHOULDER":{"x":0.4,"y":0.45},"LEFT_HIP":{"x":0.57,"y":0.75},"RIGHT_HIP":{"x":0.43,"y":0.75}},"average_com":{"x":0.5,"y":0.55},"average_proximity_to_thirds":{"nose_x":0.16667,"nose_y":0.03333,"shoulder_x":0.16667,"shoulder_y":0.11667,"hip_x":0.16667,"hip_y":0.41667}}"#;
    const FACE_JSON: &str = r#"{"average_center":{"x":0.5,"y":0.4},"average_distances":{"left_eye":0.08,"right_eye":0.08,"left_ear":0.15,"right_ear":0.15,"mouth_center":0.1,"chin":0.2,"forehead":0.12}}"#;
    const FRAME: FrameSize = FrameSize { width: 720, height: 1280 };

    fn pose_landmarks(dx: f32) -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::new(0.5, 0.5); 33];
        landmarks[0] = Landmark::new(0.5 + dx, 0.3);
        landmarks[11] = Landmark::new(0.6 + dx, 0.45);
        landmarks[12] = Landmark::new(0.4 + dx, 0.45);
        landmarks[23] = Landmark::new(0.57 + dx, 0.75);
        landmarks[24] = Landmark::new(0.43 + dx, 0.75);
        landmarks
    }

    fn pipeline(config: PipelineConfig) -> GuidancePipeline {
        let pose = Arc::new(PoseReference::from_json_str(POSE_JSON).unwrap());
        let face = Arc::new(FaceReference::from_json_str(FACE_JSON).unwrap());
        GuidancePipeline::new(config, Some(pose), Some(face), FRAME).unwrap()
    }

    #[test]
    fn test_disabled_pipeline_is_neutral() {
        let mut pipeline = GuidancePipeline::new(PipelineConfig::default(), None, None, FRAME).unwrap();
        assert!(!pipeline.pose_enabled() && !pipeline.face_enabled());
        let output = pipeline.process_pose(&pose_landmarks(0.0), 0);
        assert!(output.result.is_none() && output.overlay.is_none());
        assert_eq!(output.landmarks.len(), 33);
    }

    #[test]
    fn test_scoring_uses_raw_landmarks() {
        let mut pipeline = pipeline(PipelineConfig::default());
        pipeline.process_pose(&pose_landmarks(0.3), 0);
        let output = pipeline.process_pose(&pose_landmarks(0.0), 33);
        // the drawn landmarks lag behind, the score does not
        assert!((output.landmarks[0].x - 0.74).abs() < 1e-5);
        let result = output.result.unwrap();
        assert!((result.overall_score - 100.0).abs() < 1e-3);
        let overlay = output.overlay.unwrap();
        assert_eq!(overlay.grade, crate::helper::overlay_helper::ScoreGrade::Good);
        assert!(overlay.cues.is_empty());
    }

    #[test]
    fn test_smoothing_disabled_passes_through() {
        let config = PipelineConfig {
            smoothing: SmoothingConfig { enabled: false, factor: 0.8 },
            ..PipelineConfig::default()
        };
        let mut pipeline = pipeline(config);
        pipeline.process_pose(&pose_landmarks(0.3), 0);
        let output = pipeline.process_pose(&pose_landmarks(0.0), 33);
        assert_eq!(output.landmarks, pose_landmarks(0.0));
    }

    #[test]
    fn test_switch_camera() {
        let mut pipeline = pipeline(PipelineConfig::default());
        let library = ReferenceLibrary::new(None, Some(PoseReference::from_json_str(POSE_JSON).unwrap()));

        pipeline.switch_camera(CameraFacing::Front, &library).unwrap();
        assert!(!pipeline.pose_enabled());
        assert!(pipeline.process_pose(&pose_landmarks(0.0), 0).result.is_none());

        pipeline.switch_camera(CameraFacing::Back, &library).unwrap();
        assert!(pipeline.pose_enabled());
        assert!(pipeline.process_pose(&pose_landmarks(0.0), 0).result.is_some());
    }

    #[test]
    fn test_process_faces_selects_largest() {
        let mut pipeline = pipeline(PipelineConfig::default());
        let face = |cx: f32, cy: f32, scale: f32| -> Vec<Landmark> {
            vec![
                Landmark::new(cx, cy),
                Landmark::new(cx - 0.08 * scale, cy),
                Landmark::new(cx + 0.08 * scale, cy),
                Landmark::new(cx - 0.15 * scale, cy),
                Landmark::new(cx + 0.15 * scale, cy),
                Landmark::new(cx, cy + 0.1 * scale),
                Landmark::new(cx, cy + 0.2 * scale),
                Landmark::new(cx, cy - 0.12 * scale),
            ]
        };
        let faces = vec![face(0.2, 0.8, 0.3), face(0.5, 0.4, 1.0)];

        let output = pipeline.process_faces(&faces, FaceSelection::Largest, 0);
        assert_eq!(output.subject, Some(1));
        let result = output.result.unwrap();
        assert!((result.overall_score - 100.0).abs() < 1e-3);

        let output = pipeline.process_faces(&faces, FaceSelection::Index(0), 10);
        assert_eq!(output.subject, Some(0));
        assert!(output.result.unwrap().has_suggestion(Suggestion::AdjustFaceCenter));

        let output = pipeline.process_faces(&[], FaceSelection::Largest, 20);
        assert!(output.subject.is_none() && output.result.is_none());
    }

    #[test]
    fn test_departed_face_does_not_leak_into_remaining_track() {
        let mut pipeline = pipeline(PipelineConfig::default());
        let face = |cx: f32| -> Vec<Landmark> {
            vec![
                Landmark::new(cx, 0.4),
                Landmark::new(cx - 0.08, 0.4),
                Landmark::new(cx + 0.08, 0.4),
            ]
        };
        pipeline.process_faces(&[face(0.2), face(0.8)], FaceSelection::Index(1), 0);

        let output = pipeline.process_faces(&[face(0.8)], FaceSelection::Index(0), 33);
        assert_eq!(output.subject, Some(0));
        assert!((output.landmarks[0].x - 0.8).abs() < 1e-5, "{:?}", output.landmarks);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.smoothing.factor = 1.5;
        let result = GuidancePipeline::new(config, None, None, FRAME);
        assert!(matches!(result, Err(ConfigurationError::InvalidSmoothingFactor(_))));
    }
}

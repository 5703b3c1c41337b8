//! Pose and face landmark comparison for live camera guidance.
//!
//! A [`PoseComparator`] or [`FaceComparator`] scores one frame of detector
//! landmarks against reference statistics and returns a [`ComparisonResult`]
//! with an overall score, per-region differences and hints. The
//! [`GuidancePipeline`] wraps both with smoothing, face selection and overlay
//! guidance for a single camera stream.

pub mod config;
pub mod error;
pub mod helper;
pub mod modules;
pub mod pipeline;
pub mod reference;
pub mod utils;

pub use crate::config::config::{FaceComparatorConfig, PipelineConfig, PoseComparatorConfig};
pub use crate::error::ConfigurationError;
pub use crate::modules::face_comparator::FaceComparator;
pub use crate::modules::pose_comparator::PoseComparator;
pub use crate::modules::result::ComparisonResult;
pub use crate::modules::suggestion::Suggestion;
pub use crate::pipeline::pipeline::{FrameOutput, GuidancePipeline};
pub use crate::reference::reference::{FaceReference, PoseReference};
pub use crate::utils::coordinate::{Coordinate2D, FrameSize, Landmark};

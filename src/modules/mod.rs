pub mod face_comparator;
pub mod pose_comparator;
pub mod result;
pub(crate) mod sampler;
pub mod scoring;
pub mod smoothing;
pub mod suggestion;
pub mod throttle;

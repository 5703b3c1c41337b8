pub mod face_helper;
pub mod overlay_helper;

use std::path::Path;
use std::sync::Arc;
use anyhow::Error;
use serde::{Deserialize, Serialize};
use crate::reference::reference::{load_pose_reference, PoseReference};

/// CameraFacing picks which camera the reference statistics were captured with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    Front,
    Back,
}

impl CameraFacing {
    pub fn file_name(&self) -> &'static str {
        match self {
            CameraFacing::Front => "pose_front.json",
            CameraFacing::Back => "pose_back.json",
        }
    }
}

/// ReferenceLibrary keeps one immutable pose reference per camera.
///
/// Switching cameras hands out a different shared reference; loaded
/// references are never modified.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLibrary {
    front: Option<Arc<PoseReference>>,
    back: Option<Arc<PoseReference>>,
}

impl ReferenceLibrary {
    pub fn new(front: Option<PoseReference>, back: Option<PoseReference>) -> Self {
        ReferenceLibrary {
            front: front.map(Arc::new),
            back: back.map(Arc::new),
        }
    }

    /// load_dir reads `pose_front.json` and `pose_back.json` from a directory.
    /// A missing file leaves that camera without a reference; a malformed one
    /// is an error.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let mut library = ReferenceLibrary::default();
        for facing in [CameraFacing::Front, CameraFacing::Back] {
            let path = dir.join(facing.file_name());
            if !path.exists() {
                continue
            }
            let reference = Arc::new(load_pose_reference(&path)?);
            match facing {
                CameraFacing::Front => library.front = Some(reference),
                CameraFacing::Back => library.back = Some(reference),
            }
        }
        Ok(library)
    }

    pub fn get(&self, facing: CameraFacing) -> Option<Arc<PoseReference>> {
        match facing {
            CameraFacing::Front => self.front.clone(),
            CameraFacing::Back => self.back.clone(),
        }
    }
}

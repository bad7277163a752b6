use std::fs;
use std::path::{Path, PathBuf};

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::pico_cascade::{cluster_detections, PicoCascade};
use crate::shared::detection::Detection;
use crate::shared::error::FaceDetectionError;
use crate::shared::frame::Frame;
use crate::shared::request_config::DetectionParams;

/// Face detector backed by a pico cascade file on disk.
///
/// The model is read on every call; nothing survives between requests.
pub struct PicoFaceDetector {
    model_path: PathBuf,
}

impl PicoFaceDetector {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
        }
    }

    fn load_cascade(&self) -> Result<PicoCascade, FaceDetectionError> {
        let model_err = |source: Box<dyn std::error::Error + Send + Sync>| {
            FaceDetectionError::ModelLoad {
                path: self.model_path.clone(),
                source,
            }
        };
        let data = fs::read(&self.model_path).map_err(|e| model_err(Box::new(e)))?;
        PicoCascade::unpack(&data).map_err(|e| model_err(Box::new(e)))
    }
}

impl FaceDetector for PicoFaceDetector {
    fn detect(
        &self,
        source: &Path,
        params: &DetectionParams,
    ) -> Result<Vec<Detection>, FaceDetectionError> {
        let cascade = self.load_cascade()?;
        log::debug!(
            "Loaded cascade from {} ({} trees, depth {})",
            self.model_path.display(),
            cascade.tree_count(),
            cascade.depth()
        );

        let frame = Frame::open(source).map_err(FaceDetectionError::detection)?;
        let pixels = frame.to_grayscale();

        let candidates = cascade.find_objects(&pixels.view(), params);
        let faces = cluster_detections(&candidates, params.iou_threshold);
        log::debug!(
            "{} candidate windows clustered into {} detections",
            candidates.len(),
            faces.len()
        );
        Ok(faces)
    }
}

use std::path::Path;

use crate::shared::detection::Detection;
use crate::shared::error::FaceDetectionError;
use crate::shared::request_config::DetectionParams;

/// Domain interface for face detection over a path-addressable image.
///
/// Implementations must be deterministic for identical inputs and params,
/// and must return at most one detection per physical face.
pub trait FaceDetector: Send {
    fn detect(
        &self,
        source: &Path,
        params: &DetectionParams,
    ) -> Result<Vec<Detection>, FaceDetectionError>;
}

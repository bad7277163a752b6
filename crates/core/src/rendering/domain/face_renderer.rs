use std::path::Path;

use crate::shared::detection::Detection;
use crate::shared::error::FaceDetectionError;
use crate::shared::request_config::MarkerStyle;

/// Domain interface for producing an annotated copy of the source image.
///
/// Every face passed in is drawn; filtering happens before this call.
/// Returns the encoded image bytes.
pub trait FaceRenderer: Send {
    fn render(
        &self,
        source: &Path,
        faces: &[Detection],
        style: MarkerStyle,
    ) -> Result<Vec<u8>, FaceDetectionError>;
}

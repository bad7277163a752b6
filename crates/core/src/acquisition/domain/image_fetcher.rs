use crate::shared::error::FaceDetectionError;

/// Downloads the raw bytes behind a URL.
///
/// Failures are reported as [`FaceDetectionError::Acquisition`] naming the URL.
pub trait ImageFetcher: Send {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FaceDetectionError>;
}

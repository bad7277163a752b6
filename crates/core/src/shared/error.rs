use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every way a detection request can fail.
///
/// The `Display` text of each variant is what the caller receives as the
/// response body, so messages are written for the person who sent the image.
#[derive(Error, Debug)]
pub enum FaceDetectionError {
    #[error("Unable to download image file from URI: {url}: {source}")]
    Acquisition {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error(
        "Only jpeg or png images, either raw uncompressed bytes or base64 encoded \
         are acceptable inputs, you uploaded: {content_type}"
    )]
    UnsupportedFormat { content_type: String },
    #[error("Unable to stage image in {dir}: {source}")]
    Staging {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to load cascade model from {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("Error on face detection: {0}")]
    Detection(#[source] BoxError),
    #[error("Error creating image output: {0}")]
    Render(#[source] BoxError),
    #[error("Error encoding output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FaceDetectionError {
    pub fn acquisition(url: &str, source: impl Into<BoxError>) -> Self {
        Self::Acquisition {
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub fn detection(source: impl Into<BoxError>) -> Self {
        Self::Detection(source.into())
    }

    pub fn render(source: impl Into<BoxError>) -> Self {
        Self::Render(source.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_message_names_url() {
        let err = FaceDetectionError::acquisition("http://unreachable.invalid/a.jpg", "dns error");
        let msg = err.to_string();
        assert!(msg.contains("http://unreachable.invalid/a.jpg"));
        assert!(msg.contains("dns error"));
    }

    #[test]
    fn test_unsupported_format_names_content_type() {
        let err = FaceDetectionError::UnsupportedFormat {
            content_type: "image/gif".to_string(),
        };
        assert!(err.to_string().ends_with("you uploaded: image/gif"));
    }

    #[test]
    fn test_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = FaceDetectionError::ModelLoad {
            path: PathBuf::from("./data/facefinder"),
            source: Box::new(io),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "no such file");
    }
}

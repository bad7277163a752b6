use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::shared::error::FaceDetectionError;
use crate::shared::face_rect::FaceRect;
use crate::shared::request_config::OutputMode;

/// Structured response body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(rename = "Faces")]
    pub faces: Vec<FaceRect>,
    #[serde(rename = "ImageBase64")]
    pub image_base64: String,
}

/// What the invocation hands back to its caller.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponsePayload {
    Json(String),
    Image(Vec<u8>),
    /// Human-readable failure description.
    Error(String),
}

impl ResponsePayload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResponsePayload::Json(text) | ResponsePayload::Error(text) => text.as_bytes(),
            ResponsePayload::Image(bytes) => bytes,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponsePayload::Error(_))
    }
}

impl From<FaceDetectionError> for ResponsePayload {
    fn from(err: FaceDetectionError) -> Self {
        ResponsePayload::Error(err.to_string())
    }
}

/// Chooses the payload shape for `mode`.
///
/// `image` is only consulted by the image-bearing modes; `Image` mode with
/// no rendered image yields an empty body.
pub fn assemble(
    faces: Vec<FaceRect>,
    image: Option<Vec<u8>>,
    mode: OutputMode,
) -> Result<ResponsePayload, FaceDetectionError> {
    match mode {
        OutputMode::Image => Ok(ResponsePayload::Image(image.unwrap_or_default())),
        OutputMode::JsonImage => {
            let image_base64 = image.map(|b| STANDARD.encode(b)).unwrap_or_default();
            to_json(&DetectionResult {
                faces,
                image_base64,
            })
        }
        OutputMode::Json => to_json(&DetectionResult {
            faces,
            image_base64: String::new(),
        }),
    }
}

fn to_json(result: &DetectionResult) -> Result<ResponsePayload, FaceDetectionError> {
    Ok(ResponsePayload::Json(serde_json::to_string(result)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection::Detection;

    fn rect() -> FaceRect {
        FaceRect::from_detection(&Detection::new(100, 100, 40, 9.0))
    }

    fn parse(payload: &ResponsePayload) -> DetectionResult {
        serde_json::from_slice(payload.as_bytes()).unwrap()
    }

    #[test]
    fn test_json_mode_has_empty_image() {
        let payload = assemble(vec![rect()], None, OutputMode::Json).unwrap();
        let result = parse(&payload);
        assert_eq!(result.faces, vec![rect()]);
        assert!(result.image_base64.is_empty());
    }

    #[test]
    fn test_json_mode_ignores_rendered_image() {
        let payload = assemble(vec![], Some(vec![1, 2, 3]), OutputMode::Json).unwrap();
        assert!(parse(&payload).image_base64.is_empty());
    }

    #[test]
    fn test_json_image_mode_embeds_base64() {
        let payload =
            assemble(vec![rect()], Some(vec![0xFF, 0xD8, 0xFF]), OutputMode::JsonImage).unwrap();
        let result = parse(&payload);
        assert_eq!(result.image_base64, "/9j/");
        assert_eq!(result.faces.len(), 1);
    }

    #[test]
    fn test_image_mode_is_raw_bytes() {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        let payload = assemble(vec![rect()], Some(jpeg.clone()), OutputMode::Image).unwrap();
        assert_eq!(payload, ResponsePayload::Image(jpeg));
        assert!(serde_json::from_slice::<serde_json::Value>(payload.as_bytes()).is_err());
    }

    #[test]
    fn test_wire_format() {
        let payload = assemble(vec![rect()], None, OutputMode::Json).unwrap();
        assert_eq!(
            payload,
            ResponsePayload::Json(
                r#"{"Faces":[{"Min":{"X":80,"Y":80},"Max":{"X":40,"Y":40}}],"ImageBase64":""}"#
                    .to_string()
            )
        );
    }

    #[test]
    fn test_no_faces_serializes_empty_list() {
        let payload = assemble(vec![], None, OutputMode::Json).unwrap();
        assert_eq!(payload.as_bytes(), br#"{"Faces":[],"ImageBase64":""}"#);
    }

    #[test]
    fn test_error_payload_from_error() {
        let payload = ResponsePayload::from(FaceDetectionError::UnsupportedFormat {
            content_type: "image/gif".to_string(),
        });
        assert!(payload.is_error());
        assert!(String::from_utf8_lossy(payload.as_bytes()).contains("image/gif"));
    }
}

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::acquisition::content_sniffer::sniff_content_type;
use crate::acquisition::domain::image_fetcher::ImageFetcher;
use crate::shared::constants::ACCEPTED_CONTENT_TYPES;
use crate::shared::error::FaceDetectionError;
use crate::shared::request_config::InputMode;

/// Image bytes whose sniffed type is JPEG or PNG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawImage {
    bytes: Vec<u8>,
    content_type: &'static str,
}

impl RawImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }
}

/// Resolves the request body into validated image bytes.
pub struct ImageAcquirer {
    fetcher: Box<dyn ImageFetcher>,
}

impl ImageAcquirer {
    pub fn new(fetcher: Box<dyn ImageFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn acquire(&self, body: &[u8], mode: InputMode) -> Result<RawImage, FaceDetectionError> {
        let bytes = match mode {
            InputMode::Url => {
                let url = String::from_utf8_lossy(body);
                self.fetcher.fetch(url.trim())?
            }
            InputMode::Inline => decode_inline(body),
        };
        validate(bytes)
    }
}

/// Base64 if it decodes, otherwise the body as-is.
///
/// Line breaks anywhere in the body are ignored so wrapped encoder output
/// (76 columns for MIME and GNU `base64`) decodes.
fn decode_inline(body: &[u8]) -> Vec<u8> {
    let unwrapped: Vec<u8> = body
        .trim_ascii()
        .iter()
        .copied()
        .filter(|b| !matches!(b, b'\r' | b'\n'))
        .collect();
    match STANDARD.decode(&unwrapped) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("Inline body is not base64 ({e}), treating as raw bytes");
            body.to_vec()
        }
    }
}

fn validate(bytes: Vec<u8>) -> Result<RawImage, FaceDetectionError> {
    let content_type = sniff_content_type(&bytes);
    if !ACCEPTED_CONTENT_TYPES.contains(&content_type) {
        return Err(FaceDetectionError::UnsupportedFormat {
            content_type: content_type.to_string(),
        });
    }
    Ok(RawImage {
        bytes,
        content_type,
    })
}

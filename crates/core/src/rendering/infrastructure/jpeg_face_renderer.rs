use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;

use super::stroke::{stroke_circle, stroke_rect};
use crate::rendering::domain::face_renderer::FaceRenderer;
use crate::shared::constants::{JPEG_QUALITY, RENDERED_IMAGE_PREFIX, STROKE_COLOR, STROKE_WIDTH};
use crate::shared::detection::Detection;
use crate::shared::error::FaceDetectionError;
use crate::shared::frame::Frame;
use crate::shared::request_config::MarkerStyle;

/// Draws outlines onto a fresh decode of the source and encodes it as JPEG.
///
/// The encoded image passes through a scratch file that is removed before
/// `render` returns, whatever the outcome.
pub struct JpegFaceRenderer {
    scratch_dir: PathBuf,
    stroke_width: f32,
    color: [u8; 3],
    quality: u8,
}

impl JpegFaceRenderer {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            stroke_width: STROKE_WIDTH,
            color: STROKE_COLOR,
            quality: JPEG_QUALITY,
        }
    }

    fn draw(&self, frame: &mut Frame, face: &Detection, style: MarkerStyle) {
        let (row, col, scale) = (face.row as f32, face.col as f32, face.scale as f32);
        match style {
            MarkerStyle::Rectangle => {
                let half = (face.scale / 2) as f32;
                stroke_rect(frame, col - half, row - half, scale, self.stroke_width, self.color)
            }
            MarkerStyle::Circle => {
                stroke_circle(frame, col, row, scale / 2.0, self.stroke_width, self.color)
            }
        }
    }

    fn encode(&self, frame: Frame) -> Result<Vec<u8>, FaceDetectionError> {
        let img = frame
            .into_rgb_image()
            .ok_or_else(|| FaceDetectionError::render("frame buffer does not match its dimensions"))?;

        let mut scratch = tempfile::Builder::new()
            .prefix(RENDERED_IMAGE_PREFIX)
            .suffix(".jpg")
            .tempfile_in(&self.scratch_dir)
            .map_err(FaceDetectionError::render)?;
        {
            let mut writer = BufWriter::new(scratch.as_file_mut());
            JpegEncoder::new_with_quality(&mut writer, self.quality)
                .encode_image(&img)
                .map_err(FaceDetectionError::render)?;
            writer.flush().map_err(FaceDetectionError::render)?;
        }

        let encoded = fs::read(scratch.path()).map_err(FaceDetectionError::render)?;
        scratch.close().map_err(FaceDetectionError::render)?;
        Ok(encoded)
    }
}

impl FaceRenderer for JpegFaceRenderer {
    fn render(
        &self,
        source: &Path,
        faces: &[Detection],
        style: MarkerStyle,
    ) -> Result<Vec<u8>, FaceDetectionError> {
        let mut frame = Frame::open(source).map_err(FaceDetectionError::render)?;
        for face in faces {
            self.draw(&mut frame, face, style);
        }
        let encoded = self.encode(frame)?;
        log::debug!(
            "Rendered {} {style} markers into {} bytes",
            faces.len(),
            encoded.len()
        );
        Ok(encoded)
    }
}

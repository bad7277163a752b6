use std::path::PathBuf;
use std::time::Instant;

use crate::acquisition::image_acquirer::ImageAcquirer;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::face_filter::{accept_faces, to_face_rects};
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::pipeline::response_assembler::{assemble, ResponsePayload};
use crate::rendering::domain::face_renderer::FaceRenderer;
use crate::shared::constants::QUALITY_THRESHOLD;
use crate::shared::error::FaceDetectionError;
use crate::shared::request_config::{DetectionParams, MarkerStyle, RequestConfig};
use crate::staging::staged_image::StagedImage;

/// Deployment-wide knobs that do not change between requests.
#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub scratch_dir: PathBuf,
    pub params: DetectionParams,
    pub marker: MarkerStyle,
    pub quality_threshold: f32,
}

impl PipelineSettings {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            params: DetectionParams::default(),
            marker: MarkerStyle::default(),
            quality_threshold: QUALITY_THRESHOLD,
        }
    }
}

/// Single-request pipeline: acquire → stage → detect → filter → render → assemble.
pub struct DetectFacesUseCase {
    acquirer: ImageAcquirer,
    detector: Box<dyn FaceDetector>,
    renderer: Box<dyn FaceRenderer>,
    settings: PipelineSettings,
    logger: Box<dyn PipelineLogger>,
}

impl DetectFacesUseCase {
    pub fn new(
        acquirer: ImageAcquirer,
        detector: Box<dyn FaceDetector>,
        renderer: Box<dyn FaceRenderer>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            acquirer,
            detector,
            renderer,
            settings,
            logger: Box::new(NullPipelineLogger),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Runs the request and always produces a payload; failures become
    /// [`ResponsePayload::Error`].
    pub fn handle(&mut self, body: &[u8], config: &RequestConfig) -> ResponsePayload {
        let payload = match self.execute(body, config) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("{e}");
                e.into()
            }
        };
        self.logger.summary();
        payload
    }

    pub fn execute(
        &mut self,
        body: &[u8],
        config: &RequestConfig,
    ) -> Result<ResponsePayload, FaceDetectionError> {
        let settings = &self.settings;
        let logger = self.logger.as_mut();
        logger.begin_request();
        logger.info(&format!(
            "Handling {} byte request ({:?} in, {:?} out)",
            body.len(),
            config.input_mode,
            config.output_mode
        ));

        let raw = timed(logger, "acquire", || {
            self.acquirer.acquire(body, config.input_mode)
        })?;
        logger.info(&format!(
            "Acquired {} image ({} bytes)",
            raw.content_type(),
            raw.bytes().len()
        ));
        let staged = timed(logger, "stage", || {
            StagedImage::stage(raw.bytes(), &settings.scratch_dir)
        })?;

        let detections = timed(logger, "detect", || {
            self.detector.detect(staged.path(), &settings.params)
        })?;
        let faces = accept_faces(&detections, settings.quality_threshold);
        logger.metric("detections", detections.len() as f64);
        logger.metric("faces", faces.len() as f64);

        let image = if config.output_mode.renders_image() {
            Some(timed(logger, "render", || {
                self.renderer
                    .render(staged.path(), &faces, settings.marker)
            })?)
        } else {
            None
        };

        if let Err(e) = staged.release() {
            log::warn!("Failed to remove staged image: {e}");
        }

        timed(logger, "assemble", || {
            assemble(to_face_rects(&faces), image, config.output_mode)
        })
    }
}

fn timed<T>(logger: &mut dyn PipelineLogger, stage: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    logger.timing(stage, start.elapsed().as_secs_f64() * 1000.0);
    out
}

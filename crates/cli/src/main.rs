use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use face_detector_core::acquisition::image_acquirer::ImageAcquirer;
use face_detector_core::acquisition::infrastructure::http_image_fetcher::HttpImageFetcher;
use face_detector_core::detection::infrastructure::pico_face_detector::PicoFaceDetector;
use face_detector_core::pipeline::pipeline_logger::LogPipelineLogger;
use face_detector_core::rendering::infrastructure::jpeg_face_renderer::JpegFaceRenderer;
use face_detector_core::shared::constants::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_IOU_THRESHOLD, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE,
    DEFAULT_MODEL_PATH, DEFAULT_SCALE_FACTOR, DEFAULT_SHIFT_FACTOR, QUALITY_THRESHOLD,
};
use face_detector_core::shared::request_config::{
    HTTP_QUERY_KEY, INPUT_MODE_KEY, OUTPUT_MODE_KEY,
};
use face_detector_core::{
    DetectFacesUseCase, DetectionParams, MarkerStyle, PipelineSettings, RequestConfig,
};

/// Detect faces in one image and print the response.
///
/// The request body is read from stdin (or INPUT) and is either an image,
/// raw or base64-encoded, or a URL when the input mode is `url`.
#[derive(Parser)]
#[command(name = "face-detector")]
struct Cli {
    /// Read the request body from this file instead of stdin.
    input: Option<PathBuf>,

    /// `url` to treat the body as an image URL; anything else means inline.
    #[arg(long, env = "input_mode")]
    input_mode: Option<String>,

    /// Response shape: json, image or json_image.
    #[arg(long, env = "output_mode")]
    output_mode: Option<String>,

    /// Raw request query string; its `output` parameter overrides --output-mode.
    #[arg(long, env = "Http_Query")]
    query: Option<String>,

    /// Pico cascade model file.
    #[arg(long, env = "model_path", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Smallest face side to search for, in pixels.
    #[arg(long, default_value_t = DEFAULT_MIN_SIZE)]
    min_size: u32,

    /// Largest face side to search for, in pixels.
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u32,

    /// Window step as a fraction of the window size.
    #[arg(long, default_value_t = DEFAULT_SHIFT_FACTOR)]
    shift_factor: f64,

    /// Window growth between scales.
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale_factor: f64,

    /// Overlap above which candidate windows are merged.
    #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD)]
    iou_threshold: f64,

    /// Marker drawn around faces: rect or circle.
    #[arg(long, default_value_t = MarkerStyle::Rectangle)]
    marker: MarkerStyle,

    /// Directory for transient image files.
    #[arg(long, env = "scratch_dir")]
    scratch_dir: Option<PathBuf>,

    /// Timeout for downloading the image in URL mode.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    fetch_timeout_secs: u64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let params = validate(&cli)?;

    let config = RequestConfig::from_lookup(|key| match key {
        INPUT_MODE_KEY => cli.input_mode.clone(),
        OUTPUT_MODE_KEY => cli.output_mode.clone(),
        HTTP_QUERY_KEY => cli.query.clone(),
        _ => None,
    });
    let body = read_body(cli.input.as_ref())?;

    let scratch_dir = cli.scratch_dir.clone().unwrap_or_else(std::env::temp_dir);
    let fetcher = HttpImageFetcher::new(Duration::from_secs(cli.fetch_timeout_secs))?;
    let settings = PipelineSettings {
        scratch_dir: scratch_dir.clone(),
        params,
        marker: cli.marker,
        quality_threshold: QUALITY_THRESHOLD,
    };

    let mut use_case = DetectFacesUseCase::new(
        ImageAcquirer::new(Box::new(fetcher)),
        Box::new(PicoFaceDetector::new(&cli.model)),
        Box::new(JpegFaceRenderer::new(scratch_dir)),
        settings,
    )
    .with_logger(Box::new(LogPipelineLogger::new()));

    let payload = use_case.handle(&body, &config);

    let mut stdout = io::stdout().lock();
    stdout.write_all(payload.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn read_body(input: Option<&PathBuf>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    match input {
        Some(path) => Ok(fs::read(path)
            .map_err(|e| format!("Unable to read request body from {}: {e}", path.display()))?),
        None => {
            let mut body = Vec::new();
            io::stdin().lock().read_to_end(&mut body)?;
            Ok(body)
        }
    }
}

fn validate(cli: &Cli) -> Result<DetectionParams, Box<dyn std::error::Error>> {
    if cli.fetch_timeout_secs == 0 {
        return Err("Fetch timeout must be at least one second".into());
    }
    if let Some(dir) = &cli.scratch_dir {
        if !dir.is_dir() {
            return Err(format!("Scratch directory not found: {}", dir.display()).into());
        }
    }
    let params = DetectionParams {
        min_size: cli.min_size,
        max_size: cli.max_size,
        shift_factor: cli.shift_factor,
        scale_factor: cli.scale_factor,
        iou_threshold: cli.iou_threshold,
    };
    params.validate()?;
    Ok(params)
}

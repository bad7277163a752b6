pub const DEFAULT_MODEL_PATH: &str = "./data/facefinder";

pub const DEFAULT_MIN_SIZE: u32 = 20;
pub const DEFAULT_MAX_SIZE: u32 = 2000;
pub const DEFAULT_SHIFT_FACTOR: f64 = 0.1;
pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.2;

/// Detections must score strictly above this to be reported or drawn.
pub const QUALITY_THRESHOLD: f32 = 5.0;

pub const STROKE_WIDTH: f32 = 3.0;
pub const STROKE_COLOR: [u8; 3] = [255, 0, 0];
pub const JPEG_QUALITY: u8 = 100;

/// Upper bound on a URL-mode download, connect through last body byte.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

pub const STAGED_IMAGE_PREFIX: &str = "image";
pub const RENDERED_IMAGE_PREFIX: &str = "rendered";

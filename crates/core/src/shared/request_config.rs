use std::fmt;
use std::str::FromStr;

use crate::shared::constants::{
    DEFAULT_IOU_THRESHOLD, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE, DEFAULT_SCALE_FACTOR,
    DEFAULT_SHIFT_FACTOR,
};

pub const INPUT_MODE_KEY: &str = "input_mode";
pub const OUTPUT_MODE_KEY: &str = "output_mode";
pub const HTTP_QUERY_KEY: &str = "Http_Query";
const OUTPUT_QUERY_PARAM: &str = "output";

/// How the request body is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Body is a URL to download the image from.
    Url,
    /// Body is the image itself, base64-encoded or raw.
    #[default]
    Inline,
}

impl InputMode {
    /// Only the exact value `url` selects URL mode.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("url") => InputMode::Url,
            _ => InputMode::Inline,
        }
    }
}

/// Shape of the response payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Json,
    Image,
    JsonImage,
}

impl OutputMode {
    /// Unrecognized values fall back to JSON.
    pub fn parse(value: &str) -> Self {
        match value {
            "image" => OutputMode::Image,
            "json_image" => OutputMode::JsonImage,
            _ => OutputMode::Json,
        }
    }

    /// A non-empty `output` query parameter wins over the deployment setting.
    pub fn resolve(output_mode: Option<&str>, http_query: Option<&str>) -> Self {
        if let Some(value) = http_query.and_then(output_from_query) {
            return Self::parse(&value);
        }
        output_mode.map(Self::parse).unwrap_or_default()
    }

    pub fn renders_image(&self) -> bool {
        matches!(self, OutputMode::Image | OutputMode::JsonImage)
    }
}

fn output_from_query(query: &str) -> Option<String> {
    let query = query.trim().trim_start_matches('?');
    if query.is_empty() {
        return None;
    }
    let url = reqwest::Url::parse(&format!("http://localhost/?{query}")).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == OUTPUT_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Outline drawn around each accepted face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerStyle {
    #[default]
    Rectangle,
    Circle,
}

impl FromStr for MarkerStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rect" => Ok(MarkerStyle::Rectangle),
            "circle" => Ok(MarkerStyle::Circle),
            other => Err(format!("Marker must be 'rect' or 'circle', got '{other}'")),
        }
    }
}

impl fmt::Display for MarkerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerStyle::Rectangle => write!(f, "rect"),
            MarkerStyle::Circle => write!(f, "circle"),
        }
    }
}

/// Cascade search parameters, fixed per deployment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    pub min_size: u32,
    pub max_size: u32,
    pub shift_factor: f64,
    pub scale_factor: f64,
    pub iou_threshold: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            shift_factor: DEFAULT_SHIFT_FACTOR,
            scale_factor: DEFAULT_SCALE_FACTOR,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_size == 0 {
            return Err("Minimum face size must be positive".to_string());
        }
        if self.max_size < self.min_size {
            return Err(format!(
                "Maximum face size ({}) must not be below minimum ({})",
                self.max_size, self.min_size
            ));
        }
        if !(self.shift_factor > 0.0 && self.shift_factor <= 1.0) {
            return Err(format!(
                "Shift factor must be in (0.0, 1.0], got {}",
                self.shift_factor
            ));
        }
        if self.scale_factor <= 1.0 {
            return Err(format!(
                "Scale factor must be greater than 1.0, got {}",
                self.scale_factor
            ));
        }
        if !(0.0..1.0).contains(&self.iou_threshold) {
            return Err(format!(
                "IoU threshold must be in [0.0, 1.0), got {}",
                self.iou_threshold
            ));
        }
        Ok(())
    }
}

/// Per-invocation mode selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub input_mode: InputMode,
    pub output_mode: OutputMode,
}

impl RequestConfig {
    pub fn new(input_mode: InputMode, output_mode: OutputMode) -> Self {
        Self {
            input_mode,
            output_mode,
        }
    }

    /// Builds the config from a key lookup such as `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let input_mode = InputMode::parse(lookup(INPUT_MODE_KEY).as_deref());
        let output_mode = OutputMode::resolve(
            lookup(OUTPUT_MODE_KEY).as_deref(),
            lookup(HTTP_QUERY_KEY).as_deref(),
        );
        Self {
            input_mode,
            output_mode,
        }
    }
}

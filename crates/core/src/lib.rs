//! Single-shot face detection: one image in, one response out.
//!
//! The request pipeline lives in [`pipeline::detect_faces_use_case`]; the
//! cascade and rasterizer sit behind the [`detection::domain::face_detector::FaceDetector`]
//! and [`rendering::domain::face_renderer::FaceRenderer`] traits.

pub mod acquisition {
    pub mod content_sniffer;
    pub mod domain {
        pub mod image_fetcher;
    }
    pub mod image_acquirer;
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod detect_faces_use_case;
    pub mod face_filter;
    pub mod pipeline_logger;
    pub mod response_assembler;
}

pub mod rendering {
    pub mod domain {
        pub mod face_renderer;
    }
    pub mod infrastructure;
}

pub mod shared {
    pub mod constants;
    pub mod detection;
    pub mod error;
    pub mod face_rect;
    pub mod frame;
    pub mod request_config;
}

pub mod staging {
    pub mod staged_image;
}

pub use pipeline::detect_faces_use_case::{DetectFacesUseCase, PipelineSettings};
pub use pipeline::response_assembler::{DetectionResult, ResponsePayload};
pub use shared::error::FaceDetectionError;
pub use shared::request_config::{DetectionParams, InputMode, MarkerStyle, OutputMode, RequestConfig};

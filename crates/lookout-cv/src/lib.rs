//! Lookout Computer Vision Library
//!
//! Template-matching detection engine: a store of labeled grayscale patches,
//! a normalized cross-correlation matcher, per-label duplicate suppression,
//! and a throttled frame pipeline feeding a shared detector.

pub mod bbox;
pub mod detection;
pub mod error;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use bbox::{BBox, BBoxCollection};
pub use detection::{DetectionPipeline, DetectionReport, Detector, DetectorConfig};
pub use error::TrainingError;
pub use template::{MatchConfig, Template, TemplateMatcher, TemplateStore};

// Error handling
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// Core traits for the CV system
pub mod traits {
    use image::DynamicImage;

    /// Pull interface for anything that yields sequential raw frames.
    ///
    /// `next_frame` returning `None` means the source has stopped; callers
    /// schedule no further detection work after that.
    pub trait FrameSource {
        fn next_frame(&mut self) -> Option<DynamicImage>;
    }
}

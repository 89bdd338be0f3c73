//! High-level detection module

pub mod config;
pub mod detector;
pub mod pipeline;

pub use config::DetectorConfig;
pub use detector::{DetectionReport, DetectionStats, Detector};
pub use pipeline::{DetectionPipeline, Frame, FrameDetections};

//! Lookout Core Library
//!
//! Domain data and geometry shared across the detection stack: labeled
//! training samples, rectangle primitives, and the letterboxed viewport
//! coordinate mapper.

pub mod geometry;
pub mod sample;
pub mod viewport;

pub use geometry::{Rect, RectF};
pub use sample::LabeledSample;
pub use viewport::{LetterboxLayout, ViewportContext};

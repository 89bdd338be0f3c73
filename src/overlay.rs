//! Overlay descriptions for the presentation layer.
//!
//! The engine never draws; it hands the renderer viewport-space rectangles and
//! label text, already mapped through the current letterbox layout.

use lookout_core::geometry::{Rect, RectF};
use lookout_core::viewport::ViewportContext;
use lookout_cv::BBox;
use serde::Serialize;

/// One box-plus-caption to draw over the displayed frame
#[derive(Debug, Clone, Serialize)]
pub struct Overlay {
    pub rect: RectF,
    pub text: String,
    pub color: (u8, u8, u8),
}

/// Map detections into viewport space for drawing.
///
/// Detections that map to a zero-size rect (display not yet laid out) are
/// dropped rather than drawn.
pub fn build_overlays(detections: &[BBox], ctx: &ViewportContext) -> Vec<Overlay> {
    detections
        .iter()
        .filter_map(|det| {
            let rect = ctx.image_to_viewport(&det.to_rect());
            if rect.is_empty() {
                return None;
            }
            Some(Overlay {
                rect,
                text: format!("{} ({:.2})", det.label, det.confidence),
                color: det.color,
            })
        })
        .collect()
}

/// Record a user-drawn viewport selection as an image-space box
pub fn selection_to_box(ctx: &ViewportContext, selection: RectF) -> Rect {
    ctx.viewport_to_image(&selection)
}

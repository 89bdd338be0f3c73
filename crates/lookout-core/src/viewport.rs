//! Bidirectional mapping between image pixel space and a letterboxed viewport.
//!
//! The image is rendered into the display area with uniform fit: scaled to
//! preserve aspect ratio and centered, padding one axis. Mapping is needed in
//! both directions: viewport to image when the operator draws a label box over
//! the preview, image to viewport when a detection box is drawn back over the
//! display.

use crate::geometry::{Rect, RectF};
use serde::{Deserialize, Serialize};

/// Dimensions needed to derive the letterbox layout for one mapping call.
///
/// Built fresh per call from current display and image sizes, never cached;
/// the display can be resized between frames. `display_x`/`display_y` locate
/// the display surface when it is nested in a larger coordinate space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportContext {
    pub display_x: f32,
    pub display_y: f32,
    pub display_width: f32,
    pub display_height: f32,
    pub image_width: f32,
    pub image_height: f32,
}

/// Where the uniformly fit image lands inside the display area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxLayout {
    pub rendered_width: f32,
    pub rendered_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ViewportContext {
    pub fn new(display_width: f32, display_height: f32, image_width: f32, image_height: f32) -> Self {
        Self {
            display_x: 0.0,
            display_y: 0.0,
            display_width,
            display_height,
            image_width,
            image_height,
        }
    }

    pub fn with_origin(mut self, display_x: f32, display_y: f32) -> Self {
        self.display_x = display_x;
        self.display_y = display_y;
        self
    }

    /// Derive the letterbox layout, or `None` when any dimension is
    /// degenerate (display not yet sized, empty image).
    pub fn layout(&self) -> Option<LetterboxLayout> {
        if self.display_width <= 0.0
            || self.display_height <= 0.0
            || self.image_width <= 0.0
            || self.image_height <= 0.0
        {
            return None;
        }

        let image_aspect = self.image_width / self.image_height;
        let display_aspect = self.display_width / self.display_height;

        if image_aspect > display_aspect {
            // Image fills the display width, bars above and below.
            let rendered_height = self.display_width / image_aspect;
            Some(LetterboxLayout {
                rendered_width: self.display_width,
                rendered_height,
                offset_x: 0.0,
                offset_y: (self.display_height - rendered_height) / 2.0,
            })
        } else {
            // Image fills the display height, bars left and right.
            let rendered_width = self.display_height * image_aspect;
            Some(LetterboxLayout {
                rendered_width,
                rendered_height: self.display_height,
                offset_x: (self.display_width - rendered_width) / 2.0,
                offset_y: 0.0,
            })
        }
    }

    /// Map a viewport-space selection into image pixel coordinates.
    ///
    /// Points outside the rendered image are clamped onto it, so a drag that
    /// starts on the letterbox bar still yields a usable box. Returns an empty
    /// rect when the layout is degenerate.
    pub fn viewport_to_image(&self, rect: &RectF) -> Rect {
        let Some(layout) = self.layout() else {
            return Rect::default();
        };

        let scale_x = self.image_width / layout.rendered_width;
        let scale_y = self.image_height / layout.rendered_height;

        let left = (rect.x - self.display_x - layout.offset_x).clamp(0.0, layout.rendered_width);
        let top = (rect.y - self.display_y - layout.offset_y).clamp(0.0, layout.rendered_height);
        let right =
            (rect.x + rect.width - self.display_x - layout.offset_x).clamp(0.0, layout.rendered_width);
        let bottom = (rect.y + rect.height - self.display_y - layout.offset_y)
            .clamp(0.0, layout.rendered_height);

        let x = (left * scale_x).round() as i32;
        let y = (top * scale_y).round() as i32;
        let x2 = ((right * scale_x).round() as i32).min(self.image_width as i32);
        let y2 = ((bottom * scale_y).round() as i32).min(self.image_height as i32);

        Rect::new(x, y, x2 - x, y2 - y).clamp_to(self.image_width as i32, self.image_height as i32)
    }

    /// Map an image-space box into viewport coordinates for overlay drawing.
    ///
    /// Returns a zero-size rect when the layout is degenerate, signaling
    /// "do not render".
    pub fn image_to_viewport(&self, rect: &Rect) -> RectF {
        let Some(layout) = self.layout() else {
            return RectF::default();
        };

        let scale_x = layout.rendered_width / self.image_width;
        let scale_y = layout.rendered_height / self.image_height;

        RectF::new(
            rect.x as f32 * scale_x + layout.offset_x + self.display_x,
            rect.y as f32 * scale_y + layout.offset_y + self.display_y,
            rect.width as f32 * scale_x,
            rect.height as f32 * scale_y,
        )
    }
}

//! Rectangle primitives shared between image space and viewport space.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in integer image-pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        self.width as i64 * self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection of two rectangles, or `None` when they are disjoint.
    /// Rectangles touching only along an edge do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Clamp this rectangle into an `image_w` x `image_h` image.
    ///
    /// The origin is pulled up to (0, 0) and the extent is cut down to what
    /// remains of the image from the clamped origin. A rectangle already fully
    /// inside the image comes back unchanged. The result may be empty.
    pub fn clamp_to(&self, image_w: i32, image_h: i32) -> Rect {
        let x = self.x.max(0);
        let y = self.y.max(0);
        let width = self.width.min(image_w - x);
        let height = self.height.min(image_h - y);

        Rect::new(x, y, width, height)
    }
}

/// Axis-aligned rectangle in fractional viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

//! Bounding box operations and non-maximum suppression
//!
//! Core abstraction for representing and manipulating detection results.

use lookout_core::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a bounding box detection with associated metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f64,
    pub label: String,
    pub color: (u8, u8, u8),
}

impl BBox {
    /// Create a new bounding box
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
            label: String::new(),
            color: (255, 255, 255),
        }
    }

    /// Create from an image-space rect
    pub fn from_rect(rect: Rect, confidence: f64) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height, confidence)
    }

    /// Convert to an image-space rect
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Calculate area of the bounding box
    pub fn area(&self) -> f64 {
        self.to_rect().area() as f64
    }

    /// Calculate center point
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Calculate intersection over union (IoU) with another box.
    ///
    /// Zero when the boxes are disjoint, touch only along an edge, or either
    /// has non-positive area.
    pub fn iou(&self, other: &BBox) -> f64 {
        let Some(inter) = self.to_rect().intersect(&other.to_rect()) else {
            return 0.0;
        };
        if self.to_rect().is_empty() || other.to_rect().is_empty() {
            return 0.0;
        }

        let intersection = inter.area() as f64;
        let union = self.area() + other.area() - intersection;

        intersection / union
    }

    /// Check if this box overlaps with another at or above the threshold
    pub fn overlaps(&self, other: &BBox, threshold: f64) -> bool {
        self.iou(other) >= threshold
    }

    /// Set label information
    pub fn with_label(mut self, label: String, color: (u8, u8, u8)) -> Self {
        self.label = label;
        self.color = color;
        self
    }
}

/// Collection of bounding boxes with batch operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BBoxCollection {
    boxes: Vec<BBox>,
}

impl BBoxCollection {
    /// Create new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from vector of boxes
    pub fn from_vec(boxes: Vec<BBox>) -> Self {
        Self { boxes }
    }

    /// Add a box to the collection
    pub fn push(&mut self, bbox: BBox) {
        self.boxes.push(bbox);
    }

    /// Extend with another collection
    pub fn extend(&mut self, other: BBoxCollection) {
        self.boxes.extend(other.boxes);
    }

    /// Get boxes as slice
    pub fn as_slice(&self) -> &[BBox] {
        &self.boxes
    }

    /// Get number of boxes
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Sort by confidence (descending)
    pub fn sort_by_confidence(&mut self) {
        self.boxes
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    }

    /// Filter by confidence threshold
    pub fn filter_by_confidence(mut self, threshold: f64) -> Self {
        self.boxes.retain(|bbox| bbox.confidence >= threshold);
        self
    }

    /// Apply non-maximum suppression across the whole collection.
    ///
    /// Greedy: repeatedly keep the highest-confidence remaining box and drop
    /// every box whose IoU with it reaches the threshold.
    pub fn apply_nms(mut self, threshold: f64) -> Self {
        if self.boxes.is_empty() {
            return self;
        }

        // Sort by confidence
        self.sort_by_confidence();

        let mut keep = Vec::new();
        let mut suppressed = vec![false; self.boxes.len()];

        for i in 0..self.boxes.len() {
            if suppressed[i] {
                continue;
            }

            keep.push(self.boxes[i].clone());

            // Suppress overlapping boxes
            for j in (i + 1)..self.boxes.len() {
                if !suppressed[j] && self.boxes[i].overlaps(&self.boxes[j], threshold) {
                    suppressed[j] = true;
                }
            }
        }

        Self::from_vec(keep)
    }

    /// Apply label-aware NMS (NMS within each label, independently).
    ///
    /// Boxes of different labels never suppress each other; a fully
    /// overlapping pair with distinct labels both survive.
    pub fn apply_label_nms(self, threshold: f64) -> Self {
        let mut label_groups: HashMap<String, Vec<BBox>> = HashMap::new();

        // Group by label
        for bbox in self.boxes {
            label_groups.entry(bbox.label.clone()).or_default().push(bbox);
        }

        // Apply NMS to each label separately
        let mut result = Vec::new();
        for (_, boxes) in label_groups {
            let collection = BBoxCollection::from_vec(boxes);
            result.extend(collection.apply_nms(threshold).boxes);
        }

        Self::from_vec(result)
    }

    /// Get statistics
    pub fn stats(&self) -> BBoxStats {
        let mut label_counts: HashMap<String, usize> = HashMap::new();
        let mut total_confidence = 0.0;
        let mut max_confidence: f64 = 0.0;

        for bbox in &self.boxes {
            *label_counts.entry(bbox.label.clone()).or_insert(0) += 1;
            total_confidence += bbox.confidence;
            max_confidence = max_confidence.max(bbox.confidence);
        }

        let avg_confidence = if self.boxes.is_empty() {
            0.0
        } else {
            total_confidence / self.boxes.len() as f64
        };

        BBoxStats {
            total_boxes: self.boxes.len(),
            label_counts,
            avg_confidence,
            max_confidence,
        }
    }

    /// Convert to iterator
    pub fn iter(&self) -> std::slice::Iter<'_, BBox> {
        self.boxes.iter()
    }
}

impl IntoIterator for BBoxCollection {
    type Item = BBox;
    type IntoIter = std::vec::IntoIter<BBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl FromIterator<BBox> for BBoxCollection {
    fn from_iter<T: IntoIterator<Item = BBox>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

/// Statistics about a collection of bounding boxes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BBoxStats {
    pub total_boxes: usize,
    pub label_counts: HashMap<String, usize>,
    pub avg_confidence: f64,
    pub max_confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_iou() {
        let box1 = BBox::new(0, 0, 10, 10, 0.9);
        let box2 = BBox::new(5, 5, 10, 10, 0.8);

        let iou = box1.iou(&box2);
        assert!(iou > 0.0 && iou < 1.0);
        // 5x5 intersection over 200 - 25 union
        assert!((iou - 25.0 / 175.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_conversion_and_center() {
        let rect = lookout_core::geometry::Rect::new(4, 6, 10, 20);
        let bbox = BBox::from_rect(rect, 0.5);
        assert_eq!(bbox.to_rect(), rect);
        assert_eq!(bbox.center(), (9, 16));
    }

    #[test]
    fn test_filter_by_confidence() {
        let collection = BBoxCollection::from_vec(vec![
            BBox::new(0, 0, 10, 10, 0.9),
            BBox::new(20, 20, 10, 10, 0.4),
        ]);
        let kept = collection.filter_by_confidence(0.6);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.as_slice()[0].confidence, 0.9);
    }

    #[test]
    fn test_iou_shared_edge_is_zero() {
        let box1 = BBox::new(0, 0, 10, 10, 0.9);
        let box2 = BBox::new(10, 0, 10, 10, 0.8);
        assert_eq!(box1.iou(&box2), 0.0);
    }

    #[test]
    fn test_iou_degenerate_box_is_zero() {
        let box1 = BBox::new(0, 0, 0, 10, 0.9);
        let box2 = BBox::new(0, 0, 10, 10, 0.8);
        assert_eq!(box1.iou(&box2), 0.0);
    }

    #[test]
    fn test_nms_suppresses_heavy_overlap() {
        let mut collection = BBoxCollection::new();
        collection.push(BBox::new(0, 0, 10, 10, 0.9).with_label("A".to_string(), (255, 0, 0)));
        collection.push(BBox::new(2, 2, 10, 10, 0.8).with_label("A".to_string(), (255, 0, 0)));
        collection.push(BBox::new(20, 20, 10, 10, 0.7).with_label("B".to_string(), (0, 255, 0)));

        // IoU of the two A boxes is 64/136, above 0.3.
        let result = collection.apply_nms(0.3);
        assert_eq!(result.len(), 2);
        assert_eq!(result.as_slice()[0].confidence, 0.9);
    }

    #[test]
    fn test_nms_keeps_light_overlap() {
        let mut collection = BBoxCollection::new();
        collection.push(BBox::new(0, 0, 10, 10, 0.9).with_label("A".to_string(), (255, 0, 0)));
        // IoU 9/191, below 0.3: both survive.
        collection.push(BBox::new(7, 7, 10, 10, 0.8).with_label("A".to_string(), (255, 0, 0)));

        let result = collection.apply_nms(0.3);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_label_nms_never_suppresses_across_labels() {
        let mut collection = BBoxCollection::new();
        collection.push(BBox::new(0, 0, 10, 10, 0.9).with_label("cat".to_string(), (255, 0, 0)));
        collection.push(BBox::new(0, 0, 10, 10, 0.8).with_label("dog".to_string(), (0, 255, 0)));

        let result = collection.apply_label_nms(0.3);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_label_nms_dedups_within_label() {
        let mut collection = BBoxCollection::new();
        collection.push(BBox::new(0, 0, 10, 10, 0.9).with_label("cat".to_string(), (255, 0, 0)));
        collection.push(BBox::new(0, 0, 10, 10, 0.8).with_label("cat".to_string(), (255, 0, 0)));
        collection.push(BBox::new(0, 0, 10, 10, 0.7).with_label("dog".to_string(), (0, 255, 0)));

        let result = collection.apply_label_nms(0.3);
        assert_eq!(result.len(), 2);

        let kept_cat = result.iter().find(|b| b.label == "cat").unwrap();
        assert_eq!(kept_cat.confidence, 0.9);
    }
}

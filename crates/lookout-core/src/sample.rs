//! Labeled training samples supplied by the operator.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One example region drawn and labeled by the operator.
///
/// Immutable once created. `image_data` holds the encoded bytes of the full
/// source frame; `bounding_box` is the labeled region in that frame's pixel
/// space. The detection engine only reads samples during training ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledSample {
    pub id: u64,
    pub label: String,
    pub image_data: Vec<u8>,
    pub bounding_box: Rect,
    pub created_at: SystemTime,
}

impl LabeledSample {
    pub fn new(id: u64, label: impl Into<String>, image_data: Vec<u8>, bounding_box: Rect) -> Self {
        Self {
            id,
            label: label.into(),
            image_data,
            bounding_box,
            created_at: SystemTime::now(),
        }
    }
}

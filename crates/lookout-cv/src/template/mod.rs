//! Template store and matching module

pub mod matcher;
pub mod trainer;

pub use matcher::{TemplateMatch, TemplateMatcher};

use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single-channel reference patch for one label
#[derive(Debug, Clone)]
pub struct Template {
    pub label: String,
    pub image: GrayImage,
}

impl Template {
    pub fn new(label: String, image: GrayImage) -> Self {
        Self { label, image }
    }
}

/// All reference patches, grouped by label in ingestion order.
///
/// Owned exclusively by the detector. Training never edits a store in place:
/// it builds a complete replacement and the detector swaps it in wholesale,
/// so a detection pass sees either the old store in full or the new one.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    by_label: HashMap<String, Vec<Template>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a template under its label, preserving insertion order
    pub fn insert(&mut self, template: Template) {
        self.by_label
            .entry(template.label.clone())
            .or_default()
            .push(template);
    }

    /// True iff at least one label has at least one template
    pub fn is_trained(&self) -> bool {
        self.by_label.values().any(|templates| !templates.is_empty())
    }

    /// Total number of templates across all labels
    pub fn template_count(&self) -> usize {
        self.by_label.values().map(Vec::len).sum()
    }

    /// Labels with at least one template
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_label
            .iter()
            .filter(|(_, templates)| !templates.is_empty())
            .map(|(label, _)| label.as_str())
    }

    /// All templates across all labels
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.by_label.values().flatten()
    }

    /// Templates for one label, in ingestion order
    pub fn templates_for(&self, label: &str) -> &[Template] {
        self.by_label.get(label).map_or(&[], Vec::as_slice)
    }
}

/// Matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum correlation score for a match to count as a detection
    pub score_threshold: f64,
    /// IoU at which a lower-confidence same-label box is suppressed
    pub nms_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.6,
            nms_threshold: 0.3,
        }
    }
}

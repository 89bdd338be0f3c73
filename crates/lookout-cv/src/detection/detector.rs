//! Detector: the template store plus one detection pass per frame.

use super::config::DetectorConfig;
use crate::bbox::{BBox, BBoxCollection, BBoxStats};
use crate::error::TrainingError;
use crate::template::{trainer, TemplateMatcher, TemplateStore};
use crate::utils::ImageOps;
use crate::Result;
use anyhow::Context;
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, warn};

/// One frame's detections plus summary statistics
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub detections: Vec<BBox>,
    pub stats: DetectionStats,
}

/// Detection statistics
#[derive(Debug, Clone, Serialize)]
pub struct DetectionStats {
    pub total_detections: usize,
    pub templates_evaluated: usize,
    pub avg_confidence: f64,
    pub processing_time_ms: u64,
}

/// Template-matching detector with an atomically replaceable store.
///
/// The store sits behind a reference swap: training builds a complete new
/// store and replaces the shared `Arc` in one step, while a detection pass
/// clones the `Arc` once up front. A pass therefore sees either the previous
/// store in full or the new one in full, never a partial mix.
pub struct Detector {
    config: DetectorConfig,
    store: RwLock<Arc<TemplateStore>>,
}

impl Detector {
    /// Create a new, untrained detector
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            store: RwLock::new(Arc::new(TemplateStore::new())),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Train from a batch of labeled samples, replacing the whole store.
    ///
    /// Returns the number of templates built. Previous templates are
    /// discarded wholesale; there are no merge semantics.
    pub fn train(&self, samples: &[lookout_core::LabeledSample]) -> Result<usize, TrainingError> {
        let store = trainer::build_store(samples, self.config.min_template_size)?;
        let count = store.template_count();

        let mut guard = self.store.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(store);

        debug!(templates = count, "template store replaced");
        Ok(count)
    }

    /// True iff the current store holds at least one template
    pub fn is_trained(&self) -> bool {
        self.current_store().is_trained()
    }

    fn current_store(&self) -> Arc<TemplateStore> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Detect on an encoded frame. An undecodable frame yields an empty
    /// list, never an error.
    pub fn detect_from_bytes(&self, bytes: &[u8]) -> Vec<BBox> {
        match ImageOps::decode(bytes) {
            Ok(frame) => self.detect_image(&frame),
            Err(error) => {
                warn!(%error, "undecodable frame, skipping detection pass");
                Vec::new()
            }
        }
    }

    /// Detect on a decoded frame
    pub fn detect_image(&self, frame: &DynamicImage) -> Vec<BBox> {
        let gray = ImageOps::to_grayscale(frame.clone());
        self.detect_gray(&gray)
    }

    /// Core detection pass over a grayscale frame.
    ///
    /// Every (label, template) pair is matched against the frame; scores at or
    /// above the threshold become candidate boxes, then per-label NMS removes
    /// same-label duplicates. Templates larger than the frame are skipped.
    /// Untrained store or empty frame yields an empty list.
    pub fn detect_gray(&self, frame: &GrayImage) -> Vec<BBox> {
        let store = self.current_store();
        if !store.is_trained() || frame.width() == 0 || frame.height() == 0 {
            return Vec::new();
        }

        let matcher = TemplateMatcher::new(self.config.match_config.clone());
        let templates: Vec<_> = store.templates().collect();

        let mut candidates = BBoxCollection::new();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let hits: Vec<Option<BBox>> = templates
                .par_iter()
                .map(|template| matcher.match_single(frame, template))
                .collect();
            for hit in hits.into_iter().flatten() {
                candidates.push(hit);
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            for template in &templates {
                if let Some(hit) = matcher.match_single(frame, template) {
                    candidates.push(hit);
                }
            }
        }

        candidates
            .apply_label_nms(self.config.match_config.nms_threshold)
            .into_iter()
            .collect()
    }

    /// Detection pass with timing and confidence statistics
    pub fn detect_report(&self, frame: &DynamicImage) -> DetectionReport {
        let start_time = Instant::now();
        let templates_evaluated = self.current_store().template_count();
        let detections = self.detect_image(frame);

        let stats_source: BBoxStats = BBoxCollection::from_vec(detections.clone()).stats();
        DetectionReport {
            detections,
            stats: DetectionStats {
                total_detections: stats_source.total_boxes,
                templates_evaluated,
                avg_confidence: stats_source.avg_confidence,
                processing_time_ms: start_time.elapsed().as_millis() as u64,
            },
        }
    }

    /// Export a detection report as JSON
    pub fn export_json(&self, report: &DetectionReport, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)
            .context("Failed to serialize detection report")?;

        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path))?;

        Ok(())
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use lookout_core::geometry::Rect;
    use lookout_core::LabeledSample;

    fn textured(width: u32, height: u32, seed: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            Luma([((x * 31 + y * 17 + x * y * 7 + seed * 97) % 251) as u8])
        })
    }

    fn png_bytes(gray: &GrayImage) -> Vec<u8> {
        ImageOps::encode_png(gray).unwrap()
    }

    #[test]
    fn test_untrained_detector_returns_empty() {
        let detector = Detector::default();
        assert!(!detector.is_trained());

        let frame = textured(64, 64, 1);
        assert!(detector.detect_gray(&frame).is_empty());
    }

    #[test]
    fn test_undecodable_frame_returns_empty() {
        let detector = Detector::default();
        let scene = textured(64, 64, 1);
        detector
            .train(&[LabeledSample::new(
                1,
                "cup",
                png_bytes(&scene),
                Rect::new(4, 4, 16, 16),
            )])
            .unwrap();

        assert!(detector.detect_from_bytes(&[9, 9, 9]).is_empty());
    }

    #[test]
    fn test_detects_trained_region() {
        let detector = Detector::default();
        let scene = textured(80, 60, 2);
        let count = detector
            .train(&[LabeledSample::new(
                1,
                "cup",
                png_bytes(&scene),
                Rect::new(20, 10, 24, 24),
            )])
            .unwrap();
        assert_eq!(count, 1);

        let detections = detector.detect_gray(&scene);
        assert_eq!(detections.len(), 1);
        let hit = &detections[0];
        assert_eq!(hit.label, "cup");
        assert!(hit.confidence > 0.99);
        assert_eq!((hit.x, hit.y, hit.width, hit.height), (20, 10, 24, 24));
    }

    #[test]
    fn test_retraining_replaces_the_store_wholesale() {
        let detector = Detector::default();
        let scene = textured(80, 80, 3);

        detector
            .train(&[LabeledSample::new(
                1,
                "alpha",
                png_bytes(&scene),
                Rect::new(0, 0, 20, 20),
            )])
            .unwrap();
        detector
            .train(&[LabeledSample::new(
                2,
                "beta",
                png_bytes(&scene),
                Rect::new(40, 40, 20, 20),
            )])
            .unwrap();

        let detections = detector.detect_gray(&scene);
        assert!(!detections.is_empty());
        assert!(detections.iter().all(|d| d.label == "beta"));
    }

    #[test]
    fn test_oversized_template_is_skipped() {
        let detector = Detector::default();
        let scene = textured(64, 64, 4);
        detector
            .train(&[LabeledSample::new(
                1,
                "cup",
                png_bytes(&scene),
                Rect::new(0, 0, 64, 64),
            )])
            .unwrap();

        // Frame smaller than the only template: no placement possible.
        let small_frame = textured(32, 32, 4);
        assert!(detector.detect_gray(&small_frame).is_empty());
    }

    #[test]
    fn test_report_counts_and_timing() {
        let detector = Detector::default();
        let scene = textured(64, 64, 5);
        detector
            .train(&[LabeledSample::new(
                1,
                "cup",
                png_bytes(&scene),
                Rect::new(8, 8, 16, 16),
            )])
            .unwrap();

        let report = detector.detect_report(&DynamicImage::ImageLuma8(scene));
        assert_eq!(report.stats.templates_evaluated, 1);
        assert_eq!(report.stats.total_detections, report.detections.len());
        assert!(report.stats.avg_confidence > 0.99);

        let path = std::env::temp_dir().join("lookout_report_test.json");
        detector.export_json(&report, &path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"cup\""));
        let _ = std::fs::remove_file(&path);
    }
}

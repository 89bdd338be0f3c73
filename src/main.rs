//! Demo wiring: synthesize a scene, label two regions through the viewport
//! mapper, train the detector, and run frames through the pipeline.

use image::{DynamicImage, GrayImage, Luma};
use lookout_core::geometry::RectF;
use lookout_core::viewport::ViewportContext;
use lookout_core::LabeledSample;
use lookout_cv::traits::FrameSource;
use lookout_cv::utils::ImageOps;
use lookout_cv::{DetectionPipeline, Detector, DetectorConfig};
use std::sync::Arc;

mod overlay;

const SCENE_SIZE: u32 = 200;
const DISPLAY_W: f32 = 640.0;
const DISPLAY_H: f32 = 480.0;

/// Deterministic textured scene standing in for a camera frame
fn synthetic_scene() -> GrayImage {
    GrayImage::from_fn(SCENE_SIZE, SCENE_SIZE, |x, y| {
        Luma([((x * 31 + y * 17 + x * y * 7) % 251) as u8])
    })
}

/// Replays the synthetic scene a fixed number of times
struct SyntheticCamera {
    remaining: u32,
    scene: GrayImage,
}

impl FrameSource for SyntheticCamera {
    fn next_frame(&mut self) -> Option<DynamicImage> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(DynamicImage::ImageLuma8(self.scene.clone()))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let scene = synthetic_scene();
    let scene_bytes = ImageOps::encode_png(&scene)?;

    // The operator draws selections over the letterboxed preview; record them
    // back into image pixel space before cropping templates.
    let ctx = ViewportContext::new(DISPLAY_W, DISPLAY_H, SCENE_SIZE as f32, SCENE_SIZE as f32);
    let cup_box = overlay::selection_to_box(&ctx, RectF::new(104.0, 24.0, 120.0, 120.0));
    let mug_box = overlay::selection_to_box(&ctx, RectF::new(320.0, 240.0, 96.0, 96.0));

    let samples = vec![
        LabeledSample::new(1, "cup", scene_bytes.clone(), cup_box),
        LabeledSample::new(2, "mug", scene_bytes, mug_box),
    ];

    let detector = Detector::new(DetectorConfig::default());
    let count = detector.train(&samples)?;
    tracing::info!(templates = count, samples = samples.len(), "training complete");

    // One direct pass with stats.
    let report = detector.detect_report(&DynamicImage::ImageLuma8(scene.clone()));
    println!(
        "Direct pass: {} detections, avg confidence {:.3}, {}ms",
        report.stats.total_detections, report.stats.avg_confidence, report.stats.processing_time_ms
    );
    for ov in overlay::build_overlays(&report.detections, &ctx) {
        println!(
            "  overlay {} at ({:.0}, {:.0}) {:.0}x{:.0}",
            ov.text, ov.rect.x, ov.rect.y, ov.rect.width, ov.rect.height
        );
    }

    // Feed a few frames through the throttled pipeline, latest-frame-wins.
    let detector = Arc::new(detector);
    let interval = detector.config().detection_interval;
    let pipeline = DetectionPipeline::spawn(detector, interval);

    let mut camera = SyntheticCamera {
        remaining: 5,
        scene,
    };
    let mut seq = 0;
    while let Some(frame) = camera.next_frame() {
        seq += 1;
        pipeline.submit(lookout_cv::detection::Frame { seq, image: frame });
    }

    if let Some(result) = pipeline.recv_timeout(std::time::Duration::from_secs(10)) {
        println!(
            "Pipeline pass for frame {}: {} detections",
            result.seq,
            result.detections.len()
        );
    }
    pipeline.shutdown();

    Ok(())
}

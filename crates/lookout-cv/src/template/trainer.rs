//! Training ingestion: labeled samples in, a freshly built template store out.

use super::{Template, TemplateStore};
use crate::error::TrainingError;
use crate::utils::ImageOps;
use lookout_core::LabeledSample;
use tracing::{debug, warn};

/// Build a complete template store from a batch of labeled samples.
///
/// Each sample is decoded, its bounding box clamped to the image, and the
/// grayscale crop appended under the sample's label. Bad samples (undecodable
/// bytes, blank label, clamped box smaller than `min_template_size` in either
/// dimension) are skipped with a diagnostic and never fail the batch.
///
/// Fails with `EmptyInput` when no sample carries both a non-blank label and
/// image bytes, and with `NoValidTemplates` when every sample was skipped.
pub fn build_store(
    samples: &[LabeledSample],
    min_template_size: u32,
) -> Result<TemplateStore, TrainingError> {
    let usable = samples
        .iter()
        .any(|s| !s.label.trim().is_empty() && !s.image_data.is_empty());
    if !usable {
        return Err(TrainingError::EmptyInput);
    }

    let mut store = TemplateStore::new();
    for sample in samples {
        let label = sample.label.trim();
        if label.is_empty() {
            warn!(sample = sample.id, "skipping sample: blank label");
            continue;
        }
        if sample.image_data.is_empty() {
            warn!(sample = sample.id, "skipping sample: no image data");
            continue;
        }

        let decoded = match ImageOps::decode(&sample.image_data) {
            Ok(decoded) => decoded,
            Err(error) => {
                warn!(sample = sample.id, %error, "skipping sample: undecodable image");
                continue;
            }
        };

        let clamped = sample
            .bounding_box
            .clamp_to(decoded.width() as i32, decoded.height() as i32);
        if clamped.width < min_template_size as i32 || clamped.height < min_template_size as i32 {
            warn!(
                sample = sample.id,
                ?clamped,
                min_template_size,
                "skipping sample: box too small after clamping"
            );
            continue;
        }

        let gray = ImageOps::to_grayscale(decoded);
        let patch = ImageOps::crop(&gray, &clamped);
        debug!(sample = sample.id, label, width = clamped.width, height = clamped.height, "template built");
        store.insert(Template::new(label.to_string(), patch));
    }

    if !store.is_trained() {
        return Err(TrainingError::NoValidTemplates);
    }
    Ok(store)
}

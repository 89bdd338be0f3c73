//! Typed failures surfaced by the detection engine.

use thiserror::Error;

/// Whole-batch training failures.
///
/// Per-sample problems (undecodable image, blank label, undersized box) are
/// skipped with a diagnostic and never abort the batch; these two variants
/// cover the cases where the batch as a whole produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrainingError {
    /// No sample carried both a non-blank label and image bytes.
    #[error("no usable training samples provided")]
    EmptyInput,
    /// Every sample was rejected during ingestion.
    #[error("all training samples were rejected, no templates built")]
    NoValidTemplates,
}

//! Detection configuration

use crate::template::MatchConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub match_config: MatchConfig,
    /// Smallest accepted template edge, in pixels, after box clamping
    pub min_template_size: u32,
    /// Minimum time between detection passes in the frame pipeline; frames
    /// arriving inside the interval keep the previous overlay
    pub detection_interval: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            min_template_size: 10,
            detection_interval: Duration::from_millis(200),
        }
    }
}

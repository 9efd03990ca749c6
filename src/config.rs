//! Evaluation settings.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matching::DEFAULT_IOU_THRESHOLD;
use crate::threshold::{validate_threshold, DEFAULT_MIN_CONFIDENCE};
use crate::types::MatchOrder;

/// Settings for one evaluation run.
///
/// Missing fields in a config file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// IoU a detection needs to claim a ground-truth box
    pub iou_threshold: f64,
    /// Detections below this confidence are dropped before matching
    pub min_confidence: f64,
    pub match_order: MatchOrder,
    /// Shard images across the rayon thread pool
    pub parallel: bool,
    /// Skip images whose file is absent on disk. Turn off when predictions
    /// were exported elsewhere and the images are not available locally.
    pub check_images: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            match_order: MatchOrder::SourceOrder,
            parallel: false,
            check_images: true,
        }
    }
}

impl EvaluationConfig {
    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds an
    /// out-of-range threshold.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: EvaluationConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON string.
    pub fn load_from_string(json: &str) -> Result<Self> {
        let config: EvaluationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both thresholds lie in [0.0, 1.0].
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.iou_threshold)?;
        validate_threshold(self.min_confidence)
    }
}

//! Statistics tracking for skipped and evaluated images
//!
//! Every image the evaluator gives up on is counted under the reason it was
//! skipped, so data dropped from the totals stays visible.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Why an image was left out of the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The image file does not exist
    MissingImage,
    /// The detection source failed on the image
    InferenceFailed,
    /// No annotation file for the image
    MissingAnnotation,
    /// The annotation file exists but could not be parsed
    MalformedAnnotation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingImage => "missing image",
            SkipReason::InferenceFailed => "inference failed",
            SkipReason::MissingAnnotation => "missing annotation",
            SkipReason::MalformedAnnotation => "malformed annotation",
        };
        f.write_str(text)
    }
}

/// Statistics collected during an evaluation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipStats {
    /// Number of images listed for evaluation
    pub total_images: usize,

    /// Number of images that made it into the totals
    pub evaluated_images: usize,

    /// Evaluated images with zero detections after filtering
    pub empty_predictions: usize,

    pub skipped_missing_images: usize,
    pub skipped_inference_failures: usize,
    pub skipped_missing_annotations: usize,
    pub skipped_malformed_annotations: usize,
}

impl SkipStats {
    /// Create a new `SkipStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for one image that was evaluated.
    pub fn evaluated(detection_count: usize) -> Self {
        Self {
            total_images: 1,
            evaluated_images: 1,
            empty_predictions: usize::from(detection_count == 0),
            ..Self::default()
        }
    }

    /// Stats for one image that was skipped.
    pub fn skipped(reason: SkipReason) -> Self {
        let mut stats = Self {
            total_images: 1,
            ..Self::default()
        };
        stats.record_skip(reason);
        stats
    }

    /// Record a skipped image
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingImage => self.skipped_missing_images += 1,
            SkipReason::InferenceFailed => self.skipped_inference_failures += 1,
            SkipReason::MissingAnnotation => self.skipped_missing_annotations += 1,
            SkipReason::MalformedAnnotation => self.skipped_malformed_annotations += 1,
        }
    }

    /// Count for a single skip reason
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        match reason {
            SkipReason::MissingImage => self.skipped_missing_images,
            SkipReason::InferenceFailed => self.skipped_inference_failures,
            SkipReason::MissingAnnotation => self.skipped_missing_annotations,
            SkipReason::MalformedAnnotation => self.skipped_malformed_annotations,
        }
    }

    /// Calculate the total number of skipped images
    pub fn total_skipped(&self) -> usize {
        self.skipped_missing_images
            + self.skipped_inference_failures
            + self.skipped_missing_annotations
            + self.skipped_malformed_annotations
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "SkipStats {{ total: {}, evaluated: {}, skipped: {}, empty: {} }}",
            self.total_images,
            self.evaluated_images,
            self.total_skipped(),
            self.empty_predictions
        )
    }
}

impl fmt::Display for SkipStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Images listed:    {}", self.total_images)?;
        writeln!(f, "Images evaluated: {}", self.evaluated_images)?;
        writeln!(f, "Images skipped:   {}", self.total_skipped())?;
        writeln!(f, "  - Missing images: {}", self.skipped_missing_images)?;
        writeln!(f, "  - Inference failures: {}", self.skipped_inference_failures)?;
        writeln!(f, "  - Missing annotations: {}", self.skipped_missing_annotations)?;
        writeln!(f, "  - Malformed annotations: {}", self.skipped_malformed_annotations)?;
        write!(f, "Images without detections: {}", self.empty_predictions)
    }
}

impl Add for SkipStats {
    type Output = SkipStats;

    fn add(self, rhs: SkipStats) -> SkipStats {
        SkipStats {
            total_images: self.total_images + rhs.total_images,
            evaluated_images: self.evaluated_images + rhs.evaluated_images,
            empty_predictions: self.empty_predictions + rhs.empty_predictions,
            skipped_missing_images: self.skipped_missing_images + rhs.skipped_missing_images,
            skipped_inference_failures: self.skipped_inference_failures
                + rhs.skipped_inference_failures,
            skipped_missing_annotations: self.skipped_missing_annotations
                + rhs.skipped_missing_annotations,
            skipped_malformed_annotations: self.skipped_malformed_annotations
                + rhs.skipped_malformed_annotations,
        }
    }
}

impl AddAssign for SkipStats {
    fn add_assign(&mut self, rhs: SkipStats) {
        *self = *self + rhs;
    }
}

impl Sum for SkipStats {
    fn sum<I: Iterator<Item = SkipStats>>(iter: I) -> Self {
        iter.fold(SkipStats::new(), Add::add)
    }
}

//! # pcb-eval
//!
//! Scores a PCB defect detector against hand-labeled ground truth.
//!
//! Each image's predictions are matched greedily to ground-truth boxes of the
//! same defect class by Intersection over Union (IoU). Matched predictions
//! are true positives, the rest are false positives, and the counts summed
//! over the test set give:
//! - **Precision**: TP / (TP + FP)
//! - **Recall**: TP / number of ground-truth defects
//! - **F1**: harmonic mean of the two
//!
//! ## Features
//!
//! - Load Pascal VOC XML annotations and image list files
//! - Read detector output exported as JSON, or plug in any [`DetectionSource`]
//! - Choose between source-order and confidence-ranked matching
//! - Skip and count images with missing or malformed inputs instead of aborting
//! - Evaluate sequentially or sharded across a rayon thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use pcb_eval::{match_detections, BoundingBox, Detection, GroundTruthBox, MatchOrder, RunTotals};
//!
//! let ground_truth = vec![GroundTruthBox::new("open", BoundingBox::new(0.0, 0.0, 10.0, 10.0))];
//! let detections = vec![Detection::new("open", BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0.9)];
//!
//! let mut totals = RunTotals::new();
//! let result = match_detections(&detections, &ground_truth, 0.5, MatchOrder::SourceOrder);
//! totals.accumulate(&result, ground_truth.len());
//!
//! let report = totals.finalize();
//! assert_eq!(report.precision, 1.0);
//! assert_eq!(report.recall, 1.0);
//! ```
//!
//! ## Directory layout
//!
//! ```text
//! test.txt                     one image path per line
//! Annotations/<stem>.xml       Pascal VOC ground truth
//! predictions/<stem>.json      [{"xmin", "ymin", "xmax", "ymax", "confidence", "name"}, ...]
//! ```

pub mod error;
pub mod types;
pub mod loader;
pub mod source;
pub mod threshold;
pub mod metrics;
pub mod matching;
pub mod totals;
pub mod report;
pub mod stats;
pub mod config;
pub mod evaluator;

// Re-export commonly used types and functions
pub use error::{EvalError, Result};
pub use types::{BoundingBox, Detection, GroundTruthBox, MatchOrder};
pub use loader::{load_image_list, load_voc_file, parse_voc_str, GroundTruthLoader, VocAnnotationLoader};
pub use source::{DetectionRecord, DetectionSource, JsonDetectionSource};
pub use threshold::filter_by_confidence;
pub use matching::{match_detections, DetectionOutcome, MatchResult, Matcher};
pub use totals::RunTotals;
pub use report::EvaluationReport;
pub use stats::{SkipReason, SkipStats};
pub use config::EvaluationConfig;
pub use evaluator::{evaluate, Evaluation, Evaluator, ImageOutcome};

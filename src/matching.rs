//! Per-image matching of detections against ground truth.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::iou::calculate_iou;
use crate::threshold::validate_threshold;
use crate::types::{Detection, GroundTruthBox, MatchOrder};

/// Default IoU a detection needs to claim a ground-truth box.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// Classification of one detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutcome {
    /// Best IoU against a same-class, still-unmatched ground-truth box (0.0 if none).
    pub iou: f64,
    /// Index into the ground-truth slice when this detection is a true positive.
    pub matched_ground_truth: Option<usize>,
    pub is_true_positive: bool,
}

/// Result of matching one image.
///
/// `outcomes[i]` describes `detections[i]` in the order they were supplied,
/// regardless of the order used to match them. `ground_truth_matched[j]`
/// tells whether `ground_truths[j]` was claimed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcomes: Vec<DetectionOutcome>,
    pub ground_truth_matched: Vec<bool>,
}

impl MatchResult {
    pub fn true_positives(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_true_positive).count()
    }

    pub fn false_positives(&self) -> usize {
        self.outcomes.len() - self.true_positives()
    }

    pub fn ground_truth_count(&self) -> usize {
        self.ground_truth_matched.len()
    }

    /// Ground-truth boxes no detection claimed (missed defects).
    pub fn unmatched_ground_truths(&self) -> usize {
        self.ground_truth_matched.iter().filter(|&&m| !m).count()
    }
}

/// Greedy IoU matcher with a fixed threshold and matching order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    iou_threshold: f64,
    order: MatchOrder,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            order: MatchOrder::SourceOrder,
        }
    }
}

impl Matcher {
    /// Create a matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if `iou_threshold` is outside [0.0, 1.0].
    pub fn new(iou_threshold: f64, order: MatchOrder) -> Result<Self> {
        validate_threshold(iou_threshold)?;
        Ok(Self { iou_threshold, order })
    }

    pub fn iou_threshold(&self) -> f64 {
        self.iou_threshold
    }

    pub fn order(&self) -> MatchOrder {
        self.order
    }

    /// Match the detections of one image against its ground truth.
    pub fn match_image(&self, detections: &[Detection], ground_truths: &[GroundTruthBox]) -> MatchResult {
        match_detections(detections, ground_truths, self.iou_threshold, self.order)
    }
}

/// Match predictions to ground truth boxes for a single image.
///
/// Each detection, in the order chosen by `order`, looks at the ground-truth
/// boxes of its own class that are still unmatched and picks the one with
/// the strictly greatest IoU (the first one wins a tie). If that IoU is at
/// least `iou_threshold` the box is claimed and the detection is a true
/// positive; otherwise the detection is a false positive. A detection with
/// no remaining same-class candidate is a false positive.
///
/// # Example
///
/// ```
/// use pcb_eval::matching::match_detections;
/// use pcb_eval::types::{BoundingBox, Detection, GroundTruthBox, MatchOrder};
///
/// let gt = vec![GroundTruthBox::new("short", BoundingBox::new(0.0, 0.0, 10.0, 10.0))];
/// let det = vec![Detection::new("short", BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0.9)];
/// let result = match_detections(&det, &gt, 0.5, MatchOrder::SourceOrder);
/// assert_eq!(result.true_positives(), 1);
/// ```
pub fn match_detections(
    detections: &[Detection],
    ground_truths: &[GroundTruthBox],
    iou_threshold: f64,
    order: MatchOrder,
) -> MatchResult {
    let mut ground_truth_matched = vec![false; ground_truths.len()];
    let mut outcomes: Vec<Option<DetectionOutcome>> = vec![None; detections.len()];

    for det_idx in processing_order(detections, order) {
        let detection = &detections[det_idx];

        let mut best_iou = 0.0;
        let mut best_gt_idx: Option<usize> = None;

        for (gt_idx, gt) in ground_truths.iter().enumerate() {
            if ground_truth_matched[gt_idx] || gt.label != detection.label {
                continue;
            }

            let iou = calculate_iou(&detection.bbox, &gt.bbox);
            if iou > best_iou {
                best_iou = iou;
                best_gt_idx = Some(gt_idx);
            }
        }

        let matched = best_gt_idx.filter(|_| best_iou >= iou_threshold);
        if let Some(gt_idx) = matched {
            ground_truth_matched[gt_idx] = true;
        }

        outcomes[det_idx] = Some(DetectionOutcome {
            iou: best_iou,
            matched_ground_truth: matched,
            is_true_positive: matched.is_some(),
        });
    }

    MatchResult {
        outcomes: outcomes.into_iter().flatten().collect(),
        ground_truth_matched,
    }
}

/// Indices of `detections` in the order they get to claim ground truth.
fn processing_order(detections: &[Detection], order: MatchOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..detections.len()).collect();
    if order == MatchOrder::ConfidenceDescending {
        // Stable: equal confidences keep source order. Positive NaN sorts first.
        indices.sort_by(|&a, &b| detections[b].confidence.total_cmp(&detections[a].confidence));
    }
    indices
}

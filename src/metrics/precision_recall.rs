//! Precision and Recall calculation.

use serde::{Deserialize, Serialize};

/// Container for precision and recall values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
}

/// Fraction of predictions that were correct: `TP / (TP + FP)`.
///
/// Defined as 0.0 when no detections were produced.
///
/// # Arguments
///
/// * `true_positives` - Detections that claimed a ground-truth box
/// * `false_positives` - Detections that did not
///
/// # Returns
///
/// Precision between 0.0 and 1.0
///
/// # Example
///
/// ```
/// use pcb_eval::metrics::precision_recall::calculate_precision;
///
/// assert_eq!(calculate_precision(8, 2), 0.8);
/// assert_eq!(calculate_precision(0, 0), 0.0);
/// ```
pub fn calculate_precision(true_positives: usize, false_positives: usize) -> f64 {
    let predicted = true_positives + false_positives;
    if predicted == 0 {
        return 0.0;
    }
    true_positives as f64 / predicted as f64
}

/// Fraction of ground-truth defects that were found: `TP / GT`.
///
/// Defined as 0.0 when there is no ground truth.
///
/// # Arguments
///
/// * `true_positives` - Ground-truth boxes that were claimed
/// * `ground_truths` - All ground-truth boxes
///
/// # Returns
///
/// Recall between 0.0 and 1.0
///
/// # Example
///
/// ```
/// use pcb_eval::metrics::precision_recall::calculate_recall;
///
/// assert_eq!(calculate_recall(3, 4), 0.75);
/// assert_eq!(calculate_recall(0, 0), 0.0);
/// ```
pub fn calculate_recall(true_positives: usize, ground_truths: usize) -> f64 {
    if ground_truths == 0 {
        return 0.0;
    }
    true_positives as f64 / ground_truths as f64
}

/// Calculate precision and recall from TP, FP and ground-truth counts.
///
/// # Arguments
///
/// * `true_positives` - Number of true positive detections
/// * `false_positives` - Number of false positive detections
/// * `ground_truths` - Number of ground-truth boxes
///
/// # Returns
///
/// `PrecisionRecall` struct containing both metrics
///
/// # Example
///
/// ```
/// use pcb_eval::metrics::precision_recall::calculate_precision_recall;
///
/// let pr = calculate_precision_recall(8, 2, 11);
/// assert_eq!(pr.precision, 0.8); // 8 / (8 + 2)
/// assert!((pr.recall - 0.7272).abs() < 0.001); // 8 / 11
/// ```
pub fn calculate_precision_recall(
    true_positives: usize,
    false_positives: usize,
    ground_truths: usize,
) -> PrecisionRecall {
    PrecisionRecall {
        precision: calculate_precision(true_positives, false_positives),
        recall: calculate_recall(true_positives, ground_truths),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_precision_recall() {
        let pr = calculate_precision_recall(10, 0, 10);
        assert_eq!(pr.precision, 1.0);
        assert_eq!(pr.recall, 1.0);
    }

    #[test]
    fn test_zero_precision() {
        let pr = calculate_precision_recall(0, 10, 5);
        assert_eq!(pr.precision, 0.0);
        assert_eq!(pr.recall, 0.0);
    }

    #[test]
    fn test_empty_denominators() {
        let pr = calculate_precision_recall(0, 0, 0);
        assert_eq!(pr.precision, 0.0);
        assert_eq!(pr.recall, 0.0);
    }

    #[test]
    fn test_precision_recall_values() {
        let pr = calculate_precision_recall(8, 2, 11);
        assert!((pr.precision - 0.8).abs() < 1e-10);
        assert!((pr.recall - 8.0 / 11.0).abs() < 1e-10);
    }
}

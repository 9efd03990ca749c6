//! Confidence score thresholding utilities.

use crate::error::{EvalError, Result};
use crate::types::Detection;

/// Minimum confidence the detector was run with when scoring the PCB test set.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.4;

/// Filter detections by confidence score threshold.
///
/// Returns a new vector containing only detections with confidence >= threshold,
/// in their original order.
///
/// # Arguments
///
/// * `detections` - Detections to filter
/// * `threshold` - Minimum confidence score (0.0 to 1.0)
///
/// # Returns
///
/// Detections with confidence >= threshold
///
/// # Errors
///
/// Returns an error if the threshold is not in the valid range [0.0, 1.0].
///
/// # Example
///
/// ```
/// use pcb_eval::threshold::filter_by_confidence;
/// use pcb_eval::types::{BoundingBox, Detection};
///
/// let detections = vec![
///     Detection::new("spur", BoundingBox::new(10.0, 20.0, 30.0, 40.0), 0.9),
///     Detection::new("spur", BoundingBox::new(50.0, 60.0, 70.0, 80.0), 0.3),
/// ];
///
/// let filtered = filter_by_confidence(&detections, 0.5).unwrap();
/// assert_eq!(filtered.len(), 1);
/// ```
pub fn filter_by_confidence(detections: &[Detection], threshold: f64) -> Result<Vec<Detection>> {
    validate_threshold(threshold)?;

    Ok(detections
        .iter()
        .filter(|det| det.confidence >= threshold)
        .cloned()
        .collect())
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
///
/// # Arguments
///
/// * `threshold` - IoU or confidence threshold to check
///
/// # Returns
///
/// `Ok(())` if the threshold is in range
///
/// # Errors
///
/// Returns `InvalidThreshold` for values outside [0.0, 1.0], including NaN.
///
/// # Example
///
/// ```
/// use pcb_eval::threshold::validate_threshold;
///
/// assert!(validate_threshold(0.5).is_ok());
/// assert!(validate_threshold(1.5).is_err());
/// assert!(validate_threshold(f64::NAN).is_err());
/// ```
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(EvalError::InvalidThreshold(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    #[test]
    fn test_filter_by_confidence() {
        let detections = vec![
            Detection::new("open", BoundingBox::new(10.0, 20.0, 30.0, 40.0), 0.9),
            Detection::new("open", BoundingBox::new(50.0, 60.0, 70.0, 80.0), 0.3),
            Detection::new("short", BoundingBox::new(5.0, 5.0, 9.0, 9.0), 0.4),
        ];

        let filtered = filter_by_confidence(&detections, DEFAULT_MIN_CONFIDENCE).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].confidence, 0.9);
        assert_eq!(filtered[1].label, "short");
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let detections = vec![Detection::new("open", BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0.0)];
        assert_eq!(filter_by_confidence(&detections, 0.0).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_threshold() {
        let detections = vec![];
        assert!(filter_by_confidence(&detections, 1.5).is_err());
        assert!(filter_by_confidence(&detections, -0.1).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }
}

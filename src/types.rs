//! Core data types for detections, ground truth and matching policy.

use serde::{Deserialize, Serialize};

/// Represents a bounding box in corner format (xmin, ymin, xmax, ymax).
///
/// Coordinates are in image-pixel space. A well-formed box has
/// `xmin < xmax` and `ymin < ymax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    /// Box width (`xmax - xmin`).
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Box height (`ymax - ymin`).
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Get the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check if the bounding box is valid (finite, positive extent on both axes).
    pub fn is_valid(&self) -> bool {
        [self.xmin, self.ymin, self.xmax, self.ymax]
            .iter()
            .all(|v| v.is_finite())
            && self.xmin < self.xmax
            && self.ymin < self.ymax
    }
}

/// A single prediction produced by a detection source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Defect class label, e.g. `missing_hole` or `short`
    pub label: String,
    /// Confidence score in [0, 1]
    pub confidence: f64,
}

impl Detection {
    pub fn new(label: impl Into<String>, bbox: BoundingBox, confidence: f64) -> Self {
        Self {
            bbox,
            label: label.into(),
            confidence,
        }
    }
}

/// A hand-labeled box parsed from an annotation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthBox {
    pub bbox: BoundingBox,
    pub label: String,
}

impl GroundTruthBox {
    pub fn new(label: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            bbox,
            label: label.into(),
        }
    }
}

/// Order in which detections claim ground-truth boxes during matching.
///
/// `SourceOrder` reproduces the reference numbers: detections are matched in
/// the order the detection source returned them. `ConfidenceDescending` is
/// the order used by mAP-style evaluation, where the most confident
/// prediction gets first claim on a ground-truth box. The two can disagree
/// whenever several detections overlap the same box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrder {
    #[default]
    SourceOrder,
    ConfidenceDescending,
}

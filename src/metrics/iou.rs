//! Intersection over Union (IoU) calculation.

use crate::types::BoundingBox;

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// IoU is defined as the area of intersection divided by the area of union.
/// Overlap extents are clamped at zero, so disjoint or edge-touching boxes
/// give exactly 0.0. A zero union area also gives 0.0.
///
/// # Arguments
///
/// * `bbox1` - First bounding box
/// * `bbox2` - Second bounding box
///
/// # Returns
///
/// IoU value between 0.0 and 1.0
///
/// # Example
///
/// ```
/// use pcb_eval::metrics::iou::calculate_iou;
/// use pcb_eval::types::BoundingBox;
///
/// let bbox1 = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
/// let bbox2 = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
/// let iou = calculate_iou(&bbox1, &bbox2);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    let x_left = bbox1.xmin.max(bbox2.xmin);
    let y_top = bbox1.ymin.max(bbox2.ymin);
    let x_right = bbox1.xmax.min(bbox2.xmax);
    let y_bottom = bbox1.ymax.min(bbox2.ymax);

    let intersection_area = (x_right - x_left).max(0.0) * (y_bottom - y_top).max(0.0);
    let union_area = bbox1.area() + bbox2.area() - intersection_area;

    if union_area <= 0.0 {
        return 0.0;
    }

    intersection_area / union_area
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// # Arguments
///
/// * `bboxes1` - First set of bounding boxes (rows)
/// * `bboxes2` - Second set of bounding boxes (columns)
///
/// # Returns
///
/// Matrix where `result[i][j]` is the IoU between `bboxes1[i]` and `bboxes2[j]`
///
/// # Example
///
/// ```
/// use pcb_eval::metrics::iou::calculate_iou_matrix;
/// use pcb_eval::types::BoundingBox;
///
/// let a = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];
/// let b = vec![
///     BoundingBox::new(0.0, 0.0, 10.0, 10.0),
///     BoundingBox::new(20.0, 20.0, 30.0, 30.0),
/// ];
/// assert_eq!(calculate_iou_matrix(&a, &b), vec![vec![1.0, 0.0]]);
/// ```
pub fn calculate_iou_matrix(bboxes1: &[BoundingBox], bboxes2: &[BoundingBox]) -> Vec<Vec<f64>> {
    bboxes1
        .iter()
        .map(|bbox1| {
            bboxes2
                .iter()
                .map(|bbox2| calculate_iou(bbox1, bbox2))
                .collect()
        })
        .collect()
}

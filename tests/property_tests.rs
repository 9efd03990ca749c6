//! Property-based tests using proptest
//!
//! These tests verify mathematical properties and invariants that should
//! always hold regardless of the input values.

use pcb_eval::matching::match_detections;
use pcb_eval::metrics::{calculate_iou, calculate_precision, calculate_recall};
use pcb_eval::types::{BoundingBox, Detection, GroundTruthBox, MatchOrder};
use pcb_eval::RunTotals;
use proptest::prelude::*;

fn bbox_strategy() -> impl Strategy<Value = BoundingBox> {
    (0.0f64..100.0, 0.0f64..100.0, 1.0f64..50.0, 1.0f64..50.0)
        .prop_map(|(x, y, w, h)| BoundingBox::new(x, y, x + w, y + h))
}

fn label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("short".to_string()), Just("spur".to_string()), Just("open".to_string())]
}

fn image_strategy() -> impl Strategy<Value = (Vec<Detection>, Vec<GroundTruthBox>)> {
    (
        prop::collection::vec((label_strategy(), bbox_strategy(), 0.0f64..=1.0), 0..8),
        prop::collection::vec((label_strategy(), bbox_strategy()), 0..8),
    )
        .prop_map(|(dets, gts)| {
            let detections: Vec<Detection> =
                dets.into_iter().map(|(l, b, c)| Detection::new(l, b, c)).collect();
            let ground_truths: Vec<GroundTruthBox> =
                gts.into_iter().map(|(l, b)| GroundTruthBox::new(l, b)).collect();
            (detections, ground_truths)
        })
}

fn image_totals(image: &(Vec<Detection>, Vec<GroundTruthBox>)) -> RunTotals {
    let (dets, gts) = image;
    let result = match_detections(dets, gts, 0.5, MatchOrder::SourceOrder);
    RunTotals::from_match(&result, gts.len())
}

// Property: IoU is symmetric and bounded
proptest! {
    #[test]
    fn prop_iou_symmetric(a in bbox_strategy(), b in bbox_strategy()) {
        let iou1 = calculate_iou(&a, &b);
        let iou2 = calculate_iou(&b, &a);
        prop_assert_eq!(iou1, iou2, "IoU should be symmetric");
    }

    #[test]
    fn prop_iou_range(a in bbox_strategy(), b in bbox_strategy()) {
        let iou = calculate_iou(&a, &b);
        prop_assert!((0.0..=1.0).contains(&iou), "IoU should be in [0,1], got {}", iou);
    }

    #[test]
    fn prop_iou_identical(a in bbox_strategy()) {
        prop_assert_eq!(calculate_iou(&a, &a), 1.0);
    }
}

// Property: boxes separated on either axis have IoU exactly 0
proptest! {
    #[test]
    fn prop_iou_disjoint(a in bbox_strategy(), gap in 0.0f64..20.0, w in 1.0f64..50.0, horizontal in any::<bool>()) {
        let b = if horizontal {
            BoundingBox::new(a.xmax + gap, a.ymin, a.xmax + gap + w, a.ymax)
        } else {
            BoundingBox::new(a.xmin, a.ymax + gap, a.xmax, a.ymax + gap + w)
        };
        prop_assert_eq!(calculate_iou(&a, &b), 0.0);
    }
}

// Property: shrinking a prediction inside the ground truth never raises IoU
proptest! {
    #[test]
    fn prop_iou_monotone_shrink(
        gt in bbox_strategy(),
        f1 in 0.05f64..1.0,
        f2 in 0.05f64..1.0,
    ) {
        let (outer, inner) = if f1 >= f2 { (f1, f2) } else { (f2, f1) };
        let shrink = |f: f64| BoundingBox::new(
            gt.xmin,
            gt.ymin,
            gt.xmin + gt.width() * f,
            gt.ymin + gt.height() * f,
        );

        let iou_outer = calculate_iou(&shrink(outer), &gt);
        let iou_inner = calculate_iou(&shrink(inner), &gt);
        prop_assert!(iou_inner <= iou_outer + 1e-12,
            "shrinking raised IoU: {} -> {}", iou_outer, iou_inner);
    }
}

// Property: matching invariants
proptest! {
    #[test]
    fn prop_match_counts_consistent(image in image_strategy()) {
        let (dets, gts) = &image;
        let result = match_detections(dets, gts, 0.5, MatchOrder::SourceOrder);

        prop_assert_eq!(result.outcomes.len(), dets.len());
        prop_assert_eq!(result.true_positives() + result.false_positives(), dets.len());
        prop_assert!(result.true_positives() <= gts.len());

        // Each claimed box is claimed once, by a detection of its own class
        let mut claimed = vec![false; gts.len()];
        for (det, outcome) in dets.iter().zip(&result.outcomes) {
            if let Some(idx) = outcome.matched_ground_truth {
                prop_assert!(!claimed[idx], "box {} claimed twice", idx);
                claimed[idx] = true;
                prop_assert_eq!(&gts[idx].label, &det.label);
                prop_assert!(outcome.iou >= 0.5);
            }
        }
        prop_assert_eq!(claimed, result.ground_truth_matched);
    }

    #[test]
    fn prop_precision_recall_range(image in image_strategy()) {
        let report = image_totals(&image).finalize();
        prop_assert!((0.0..=1.0).contains(&report.precision));
        prop_assert!((0.0..=1.0).contains(&report.recall));
    }

    #[test]
    fn prop_precision_recall_counts(tp in 0usize..1000, fp in 0usize..1000, extra_gt in 0usize..1000) {
        let precision = calculate_precision(tp, fp);
        let recall = calculate_recall(tp, tp + extra_gt);
        prop_assert!((0.0..=1.0).contains(&precision));
        prop_assert!((0.0..=1.0).contains(&recall));
    }
}

// Property: sharded totals merged by addition equal the sequential run
proptest! {
    #[test]
    fn prop_shard_merge_matches_sequential(
        images in prop::collection::vec(image_strategy(), 0..12),
        split in 0usize..12,
    ) {
        let sequential = images.iter().fold(RunTotals::new(), |mut acc, image| {
            let (dets, gts) = image;
            let result = match_detections(dets, gts, 0.5, MatchOrder::SourceOrder);
            acc.accumulate(&result, gts.len());
            acc
        });

        let split = split.min(images.len());
        let (left, right) = images.split_at(split);
        let left_totals: RunTotals = left.iter().map(image_totals).sum();
        let right_totals: RunTotals = right.iter().rev().map(image_totals).sum();

        prop_assert_eq!(sequential, right_totals + left_totals);
    }
}

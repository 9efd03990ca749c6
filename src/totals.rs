//! Run-wide accumulation of true positives, false positives and ground truth.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::matching::MatchResult;
use crate::report::EvaluationReport;

/// Running sums over all evaluated images.
///
/// Accumulation is plain component-wise addition, so totals computed on
/// disjoint shards of the image set can be merged with `+` in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub ground_truths: usize,
    pub true_positives: usize,
    pub false_positives: usize,
}

impl RunTotals {
    /// Create a new `RunTotals` with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals of a single image.
    pub fn from_match(result: &MatchResult, ground_truth_count: usize) -> Self {
        Self {
            ground_truths: ground_truth_count,
            true_positives: result.true_positives(),
            false_positives: result.false_positives(),
        }
    }

    /// Add one image's match result.
    pub fn accumulate(&mut self, result: &MatchResult, ground_truth_count: usize) {
        *self += Self::from_match(result, ground_truth_count);
    }

    /// Ground-truth boxes no detection matched.
    pub fn missed(&self) -> usize {
        self.ground_truths.saturating_sub(self.true_positives)
    }

    /// Compute the final report. Consumes the totals; start a new run with
    /// a fresh `RunTotals`.
    pub fn finalize(self) -> EvaluationReport {
        EvaluationReport::from_totals(&self)
    }
}

impl Add for RunTotals {
    type Output = RunTotals;

    fn add(self, rhs: RunTotals) -> RunTotals {
        RunTotals {
            ground_truths: self.ground_truths + rhs.ground_truths,
            true_positives: self.true_positives + rhs.true_positives,
            false_positives: self.false_positives + rhs.false_positives,
        }
    }
}

impl AddAssign for RunTotals {
    fn add_assign(&mut self, rhs: RunTotals) {
        *self = *self + rhs;
    }
}

impl Sum for RunTotals {
    fn sum<I: Iterator<Item = RunTotals>>(iter: I) -> Self {
        iter.fold(RunTotals::new(), Add::add)
    }
}

//! Final evaluation report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::f1_score::calculate_f1_score;
use crate::metrics::precision_recall::calculate_precision_recall;
use crate::totals::RunTotals;

/// Summary of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub ground_truths: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    /// Ground-truth defects the detector did not find (`GT - TP`)
    pub missed: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl EvaluationReport {
    pub fn from_totals(totals: &RunTotals) -> Self {
        let pr = calculate_precision_recall(
            totals.true_positives,
            totals.false_positives,
            totals.ground_truths,
        );

        Self {
            ground_truths: totals.ground_truths,
            true_positives: totals.true_positives,
            false_positives: totals.false_positives,
            missed: totals.missed(),
            precision: pr.precision,
            recall: pr.recall,
            f1: calculate_f1_score(pr.precision, pr.recall),
        }
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(30);
        let thin = "-".repeat(30);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Evaluation report")?;
        writeln!(f, "{}", thin)?;
        writeln!(f, "Ground-truth defects: {}", self.ground_truths)?;
        writeln!(f, "True positives:       {}", self.true_positives)?;
        writeln!(f, "False positives:      {}", self.false_positives)?;
        writeln!(f, "Missed:               {}", self.missed)?;
        writeln!(f, "{}", thin)?;
        writeln!(f, "Precision: {:.2}%", self.precision * 100.0)?;
        writeln!(f, "Recall:    {:.2}%", self.recall * 100.0)?;
        writeln!(f, "F1:        {:.2}%", self.f1 * 100.0)?;
        write!(f, "{}", rule)
    }
}

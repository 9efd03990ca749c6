//! Evaluation driver: runs every listed image through detection, ground-truth
//! loading and matching, and aggregates the results.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::EvaluationConfig;
use crate::error::{EvalError, Result};
use crate::loader::GroundTruthLoader;
use crate::matching::Matcher;
use crate::report::EvaluationReport;
use crate::source::DetectionSource;
use crate::stats::{SkipReason, SkipStats};
use crate::totals::RunTotals;

/// Outcome of a complete run.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub report: EvaluationReport,
    pub totals: RunTotals,
    pub stats: SkipStats,
}

/// What happened to a single image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    Evaluated { totals: RunTotals, detections: usize },
    Skipped(SkipReason),
}

impl ImageOutcome {
    fn into_parts(self) -> (RunTotals, SkipStats) {
        match self {
            ImageOutcome::Evaluated { totals, detections } => {
                (totals, SkipStats::evaluated(detections))
            }
            ImageOutcome::Skipped(reason) => (RunTotals::new(), SkipStats::skipped(reason)),
        }
    }
}

/// Scores a detection source against a ground-truth loader.
pub struct Evaluator<'a> {
    source: &'a dyn DetectionSource,
    loader: &'a dyn GroundTruthLoader,
    matcher: Matcher,
    min_confidence: f64,
    parallel: bool,
    check_images: bool,
    progress: ProgressBar,
}

impl<'a> Evaluator<'a> {
    /// # Errors
    ///
    /// Returns an error if a threshold in `config` is out of range.
    pub fn new(
        source: &'a dyn DetectionSource,
        loader: &'a dyn GroundTruthLoader,
        config: &EvaluationConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            loader,
            matcher: Matcher::new(config.iou_threshold, config.match_order)?,
            min_confidence: config.min_confidence,
            parallel: config.parallel,
            check_images: config.check_images,
            progress: ProgressBar::hidden(),
        })
    }

    /// Advance `progress` once per image. Its length is set when a run starts.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Evaluate every image and compute the final report.
    ///
    /// Per-image failures are logged and counted, never returned.
    pub fn evaluate(&self, images: &[PathBuf]) -> Evaluation {
        info!(
            images = images.len(),
            iou_threshold = self.matcher.iou_threshold(),
            min_confidence = self.min_confidence,
            order = ?self.matcher.order(),
            parallel = self.parallel,
            "starting evaluation"
        );
        self.progress.set_length(images.len() as u64);

        let (totals, stats) = if self.parallel {
            images
                .par_iter()
                .map(|image| self.evaluate_tracked(image).into_parts())
                .reduce(
                    || (RunTotals::new(), SkipStats::new()),
                    |(ta, sa), (tb, sb)| (ta + tb, sa + sb),
                )
        } else {
            images.iter().fold(
                (RunTotals::new(), SkipStats::new()),
                |(totals, stats), image| {
                    let (t, s) = self.evaluate_tracked(image).into_parts();
                    (totals + t, stats + s)
                },
            )
        };

        self.progress.finish();

        if stats.total_skipped() > 0 {
            warn!(summary = %stats.summary_string(), "some images were left out of the totals");
        }
        info!(
            ground_truths = totals.ground_truths,
            true_positives = totals.true_positives,
            false_positives = totals.false_positives,
            "evaluation finished"
        );

        Evaluation {
            report: totals.finalize(),
            totals,
            stats,
        }
    }

    fn evaluate_tracked(&self, image: &Path) -> ImageOutcome {
        let outcome = self.evaluate_image(image);
        self.progress.inc(1);
        outcome
    }

    /// Run one image through detection, ground-truth loading and matching.
    pub fn evaluate_image(&self, image: &Path) -> ImageOutcome {
        if self.check_images && !image.is_file() {
            return skip(image, SkipReason::MissingImage, None);
        }

        let mut detections = match self.source.detect(image) {
            Ok(detections) => detections,
            Err(e) => return skip(image, SkipReason::InferenceFailed, Some(&e)),
        };

        let annotation = self.loader.annotation_path(image);
        let ground_truths = match self.loader.load(&annotation) {
            Ok(boxes) => boxes,
            Err(e @ EvalError::MissingFile(_)) => {
                return skip(image, SkipReason::MissingAnnotation, Some(&e));
            }
            Err(e) => return skip(image, SkipReason::MalformedAnnotation, Some(&e)),
        };

        detections.retain(|d| d.confidence >= self.min_confidence);

        let result = self.matcher.match_image(&detections, &ground_truths);
        let totals = RunTotals::from_match(&result, ground_truths.len());

        debug!(
            image = %image.display(),
            detections = detections.len(),
            ground_truths = totals.ground_truths,
            true_positives = totals.true_positives,
            false_positives = totals.false_positives,
            "image evaluated"
        );

        ImageOutcome::Evaluated {
            totals,
            detections: detections.len(),
        }
    }
}

fn skip(image: &Path, reason: SkipReason, error: Option<&EvalError>) -> ImageOutcome {
    match error {
        Some(e) => warn!(image = %image.display(), %reason, error = %e, "skipping image"),
        None => warn!(image = %image.display(), %reason, "skipping image"),
    }
    ImageOutcome::Skipped(reason)
}

/// Evaluate `images` with the given collaborators and settings.
///
/// # Errors
///
/// Only configuration errors are returned; per-image failures are skipped.
pub fn evaluate(
    images: &[PathBuf],
    source: &dyn DetectionSource,
    loader: &dyn GroundTruthLoader,
    config: &EvaluationConfig,
) -> Result<Evaluation> {
    Ok(Evaluator::new(source, loader, config)?.evaluate(images))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Detection, GroundTruthBox};
    use std::collections::HashMap;

    struct FixedSource(HashMap<PathBuf, Vec<Detection>>);

    impl DetectionSource for FixedSource {
        fn detect(&self, image: &Path) -> Result<Vec<Detection>> {
            self.0
                .get(image)
                .cloned()
                .ok_or_else(|| EvalError::Inference(format!("cannot decode {}", image.display())))
        }
    }

    struct FixedLoader(HashMap<PathBuf, Vec<GroundTruthBox>>);

    impl GroundTruthLoader for FixedLoader {
        fn annotation_path(&self, image: &Path) -> PathBuf {
            image.with_extension("xml")
        }

        fn load(&self, annotation: &Path) -> Result<Vec<GroundTruthBox>> {
            self.0
                .get(annotation)
                .cloned()
                .ok_or_else(|| EvalError::MissingFile(annotation.to_path_buf()))
        }
    }

    fn unit_box() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 10.0, 10.0)
    }

    fn config() -> EvaluationConfig {
        EvaluationConfig {
            check_images: false,
            ..EvaluationConfig::default()
        }
    }

    #[test]
    fn test_evaluate_basic() {
        let source = FixedSource(HashMap::from([(
            PathBuf::from("a.jpg"),
            vec![Detection::new("short", unit_box(), 0.9)],
        )]));
        let loader = FixedLoader(HashMap::from([(
            PathBuf::from("a.xml"),
            vec![GroundTruthBox::new("short", unit_box())],
        )]));

        let evaluation = evaluate(&[PathBuf::from("a.jpg")], &source, &loader, &config()).unwrap();
        assert_eq!(evaluation.totals.true_positives, 1);
        assert_eq!(evaluation.report.precision, 1.0);
        assert_eq!(evaluation.stats.evaluated_images, 1);
    }

    #[test]
    fn test_skip_reasons() {
        let source = FixedSource(HashMap::from([(PathBuf::from("b.jpg"), vec![])]));
        let loader = FixedLoader(HashMap::new());
        let evaluator = Evaluator::new(&source, &loader, &config()).unwrap();

        assert_eq!(
            evaluator.evaluate_image(Path::new("a.jpg")),
            ImageOutcome::Skipped(SkipReason::InferenceFailed)
        );
        assert_eq!(
            evaluator.evaluate_image(Path::new("b.jpg")),
            ImageOutcome::Skipped(SkipReason::MissingAnnotation)
        );
    }

    #[test]
    fn test_missing_image_file() {
        let source = FixedSource(HashMap::new());
        let loader = FixedLoader(HashMap::new());
        let evaluator = Evaluator::new(&source, &loader, &EvaluationConfig::default()).unwrap();

        assert_eq!(
            evaluator.evaluate_image(Path::new("/path/that/does/not/exist.jpg")),
            ImageOutcome::Skipped(SkipReason::MissingImage)
        );
    }

    #[test]
    fn test_low_confidence_dropped() {
        let source = FixedSource(HashMap::from([(
            PathBuf::from("a.jpg"),
            vec![Detection::new("short", unit_box(), 0.2)],
        )]));
        let loader = FixedLoader(HashMap::from([(
            PathBuf::from("a.xml"),
            vec![GroundTruthBox::new("short", unit_box())],
        )]));
        let evaluator = Evaluator::new(&source, &loader, &config()).unwrap();

        assert_eq!(
            evaluator.evaluate_image(Path::new("a.jpg")),
            ImageOutcome::Evaluated {
                totals: RunTotals { ground_truths: 1, true_positives: 0, false_positives: 0 },
                detections: 0,
            }
        );
    }

    #[test]
    fn test_confidence_at_minimum_is_kept() {
        let source = FixedSource(HashMap::from([(
            PathBuf::from("a.jpg"),
            vec![
                Detection::new("short", unit_box(), 0.4),
                Detection::new("short", BoundingBox::new(50.0, 50.0, 60.0, 60.0), 0.399),
            ],
        )]));
        let loader = FixedLoader(HashMap::from([(
            PathBuf::from("a.xml"),
            vec![GroundTruthBox::new("short", unit_box())],
        )]));
        let evaluator = Evaluator::new(&source, &loader, &config()).unwrap();

        assert_eq!(
            evaluator.evaluate_image(Path::new("a.jpg")),
            ImageOutcome::Evaluated {
                totals: RunTotals { ground_truths: 1, true_positives: 1, false_positives: 0 },
                detections: 1,
            }
        );
    }

    #[test]
    fn test_progress_counts_every_image() {
        let source = FixedSource(HashMap::from([(PathBuf::from("a.jpg"), vec![])]));
        let loader = FixedLoader(HashMap::from([(PathBuf::from("a.xml"), vec![])]));
        let images: Vec<PathBuf> = ["a.jpg", "b.jpg", "c.jpg"].into_iter().map(PathBuf::from).collect();

        for parallel in [false, true] {
            let progress = ProgressBar::hidden();
            let settings = EvaluationConfig { parallel, ..config() };
            let evaluation = Evaluator::new(&source, &loader, &settings)
                .unwrap()
                .with_progress(progress.clone())
                .evaluate(&images);

            assert_eq!(evaluation.stats.total_images, 3);
            assert_eq!(progress.length(), Some(3));
            assert_eq!(progress.position(), 3);
            assert!(progress.is_finished());
        }
    }

    #[test]
    fn test_invalid_config() {
        let source = FixedSource(HashMap::new());
        let loader = FixedLoader(HashMap::new());
        let bad = EvaluationConfig {
            iou_threshold: 1.2,
            ..config()
        };
        assert!(Evaluator::new(&source, &loader, &bad).is_err());
    }
}

//! Detection sources: where predictions for an image come from.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::loader::sibling_name;
use crate::types::{BoundingBox, Detection};

/// Produces the predictions for one image.
///
/// Implementations are built once before the run; a source that cannot be
/// built (model or data unavailable) fails in its constructor, which is the
/// only fatal error of a run. Failures on a single image are reported as
/// `EvalError::Inference` and the evaluator skips that image.
pub trait DetectionSource: Send + Sync {
    fn detect(&self, image: &Path) -> Result<Vec<Detection>>;
}

/// One row of the detector's export, in corner coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub confidence: f64,
    /// Numeric class index, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<u32>,
    pub name: String,
}

impl From<DetectionRecord> for Detection {
    fn from(record: DetectionRecord) -> Self {
        Detection::new(
            record.name,
            BoundingBox::new(record.xmin, record.ymin, record.xmax, record.ymax),
            record.confidence,
        )
    }
}

/// Reads pre-computed predictions stored as `<image-stem>.json` files.
///
/// Each file holds a JSON array of [`DetectionRecord`]s, in the order the
/// detector emitted them.
#[derive(Debug, Clone)]
pub struct JsonDetectionSource {
    dir: PathBuf,
}

impl JsonDetectionSource {
    /// # Errors
    ///
    /// Returns `SourceUnavailable` if `dir` is not a directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(EvalError::SourceUnavailable(format!(
                "prediction directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir: dir.to_path_buf() })
    }

    /// File holding the predictions for `image`.
    pub fn prediction_path(&self, image: &Path) -> PathBuf {
        self.dir.join(sibling_name(image, "json"))
    }
}

impl DetectionSource for JsonDetectionSource {
    fn detect(&self, image: &Path) -> Result<Vec<Detection>> {
        let path = self.prediction_path(image);
        let file = File::open(&path).map_err(|e| {
            EvalError::Inference(format!("no predictions at {}: {}", path.display(), e))
        })?;
        let records: Vec<DetectionRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| EvalError::Inference(format!("{}: {}", path.display(), e)))?;

        records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| {
                validate_record(&record).map_err(|reason| {
                    EvalError::Inference(format!("{} record {}: {}", path.display(), idx, reason))
                })?;
                Ok(Detection::from(record))
            })
            .collect()
    }
}

/// Check that a record has a well-formed box and a confidence in [0, 1].
fn validate_record(record: &DetectionRecord) -> std::result::Result<(), String> {
    let bbox = BoundingBox::new(record.xmin, record.ymin, record.xmax, record.ymax);
    if !bbox.is_valid() {
        return Err(format!("non-positive box extent {:?}", bbox));
    }
    if !(0.0..=1.0).contains(&record.confidence) {
        return Err(format!("confidence {} outside [0, 1]", record.confidence));
    }
    Ok(())
}

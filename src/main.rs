use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pcb_eval::{
    load_image_list, EvaluationConfig, Evaluator, JsonDetectionSource, MatchOrder,
    VocAnnotationLoader,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Match detections in the order the detector emitted them
    Source,
    /// Let the most confident detection claim a box first
    Confidence,
}

impl From<OrderArg> for MatchOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Source => MatchOrder::SourceOrder,
            OrderArg::Confidence => MatchOrder::ConfidenceDescending,
        }
    }
}

/// Score PCB defect detections against Pascal VOC ground truth
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image list, one path per line
    #[arg(long, value_name = "FILE")]
    images: PathBuf,

    /// Directory of <image-stem>.xml annotations
    #[arg(long, value_name = "DIR")]
    annotations: PathBuf,

    /// Directory of <image-stem>.json detector output
    #[arg(long, value_name = "DIR")]
    predictions: PathBuf,

    /// JSON settings file; command-line flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// IoU needed for a true positive (0.0 - 1.0)
    #[arg(long, value_name = "THRESHOLD")]
    iou_threshold: Option<f64>,

    /// Drop detections below this confidence (0.0 - 1.0)
    #[arg(long, value_name = "THRESHOLD")]
    min_confidence: Option<f64>,

    /// Order in which detections claim ground-truth boxes
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Evaluate images in parallel
    #[arg(long)]
    parallel: bool,

    /// Do not require the image files to exist locally
    #[arg(long)]
    no_image_check: bool,

    /// Also write the report as JSON
    #[arg(long, value_name = "FILE")]
    report_json: Option<PathBuf>,
}

impl Args {
    fn evaluation_config(&self) -> Result<EvaluationConfig> {
        let mut config = match &self.config {
            Some(path) => EvaluationConfig::load_from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EvaluationConfig::default(),
        };

        if let Some(iou) = self.iou_threshold {
            config.iou_threshold = iou;
        }
        if let Some(conf) = self.min_confidence {
            config.min_confidence = conf;
        }
        if let Some(order) = self.order {
            config.match_order = order.into();
        }
        config.parallel |= self.parallel;
        if self.no_image_check {
            config.check_images = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.evaluation_config()?;

    info!("image list: {}", args.images.display());
    info!("annotations: {}", args.annotations.display());
    info!("predictions: {}", args.predictions.display());

    let images = load_image_list(&args.images)
        .with_context(|| format!("reading image list {}", args.images.display()))?;
    let source = JsonDetectionSource::new(&args.predictions)?;
    let loader = VocAnnotationLoader::new(&args.annotations)?;

    let progress = ProgressBar::new(images.len() as u64);
    let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
        .progress_chars("=>-");
    progress.set_style(style);
    progress.set_message("evaluating");

    let evaluation = Evaluator::new(&source, &loader, &config)?
        .with_progress(progress)
        .evaluate(&images);

    println!("{}", evaluation.stats);
    println!();
    println!("{}", evaluation.report);

    if let Some(path) = &args.report_json {
        fs::write(path, evaluation.report.to_json()?)
            .with_context(|| format!("writing report {}", path.display()))?;
        info!("report written to {}", path.display());
    }

    Ok(())
}

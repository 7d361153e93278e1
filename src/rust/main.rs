use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tao_classifier::{read_csv, Classifier, OpenAiGenerator, SaveOutcome};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Labeled CSV file used for training
    #[arg(short, long)]
    dataset: PathBuf,

    /// Column of the dataset holding the class of each row
    #[arg(short, long)]
    target: String,

    /// Id the trained model is saved and loaded under
    #[arg(short, long)]
    model_id: String,

    /// Maximum descriptions collected per class
    #[arg(short, long, default_value_t = tao_classifier::classifier::DEFAULT_PROMPT_SAMPLE_SIZE)]
    sample_size: usize,

    /// Sampling temperature for predictions
    #[arg(long, default_value_t = tao_classifier::classifier::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// CSV file whose rows should be classified
    #[arg(short, long)]
    predict: Option<PathBuf>,

    /// Classify at most this many rows of the prediction file
    #[arg(short, long)]
    limit: Option<usize>,

    /// Ignore any saved model and train from scratch
    #[arg(short, long)]
    fresh: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting Tao Classifier ===");
    let generator = OpenAiGenerator::from_env().context("Failed to configure the generative service")?;

    let mut classifier = Classifier::builder()
        .with_generator(Arc::new(generator))
        .with_model_id(args.model_id.as_str())
        .with_dataset_path(&args.dataset)
        .with_target_column(args.target.as_str())
        .with_prompt_sample_size(args.sample_size)
        .with_temperature(args.temperature)
        .build()?;

    let loaded = !args.fresh && match classifier.load_model(&args.model_id) {
        Ok(()) => {
            info!("Loaded saved model '{}'", args.model_id);
            true
        }
        Err(e) => {
            info!("No usable saved model ({}), training", e);
            false
        }
    };

    if !loaded {
        let start_time = Instant::now();
        let report = classifier.train()?;
        info!(
            "=== Training finished in {:.2?}: {} rows, {} descriptions, {} failures ===",
            start_time.elapsed(),
            report.rows_visited,
            report.descriptions_added,
            report.profiles_failed
        );

        match classifier.save_model(true) {
            Ok(SaveOutcome::Written(id)) => info!("Saved model '{}'", id),
            Ok(SaveOutcome::Skipped(id)) => warn!("Model '{}' already on disk, not saved", id),
            Err(e) => warn!("Failed to save model: {}", e),
        }
    }

    for (label, descriptions) in classifier.prompts().iter() {
        println!("{} ({} descriptions)", label, descriptions.len());
    }

    if let Some(path) = args.predict {
        let mut rows = read_csv(&path)?;
        if let Some(limit) = args.limit {
            rows.truncate(limit);
        }

        let start_time = Instant::now();
        let predictions = classifier.predict_many_rows(&rows)?;
        for (row, prediction) in rows.iter().zip(&predictions) {
            println!("Row: {:?}", row);
            println!(
                "Prediction: {} = {} ({:.2})",
                prediction.label, prediction.predicted_class, prediction.probability
            );
        }
        info!("Classified {} rows in {:.2?}", predictions.len(), start_time.elapsed());
    }

    Ok(())
}

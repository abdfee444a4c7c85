//! Command-line entry point for the insight prediction core.
//!
//! Wraps the library in a small CLI: `analyze` profiles a CSV file,
//! `train` fits and saves a model, `models` lists saved artifacts.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use insight_learning::{
    ModelType, Session, SplitPolicy, Trainer, TrainingRequest, DEFAULT_ARTIFACT_DIR,
};

#[derive(Parser)]
#[command(name = "insight", about = "Tabular dataset analysis and model training", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Profile a CSV file: shape, summary statistics, correlations.
    Analyze {
        /// Path to the CSV file.
        file: PathBuf,
        /// Number of preview rows to print.
        #[arg(long, default_value_t = insight_data::DEFAULT_PREVIEW_ROWS)]
        preview: usize,
    },
    /// Train a model on a CSV file and save the artifact.
    Train {
        /// Path to the CSV file.
        file: PathBuf,
        /// Column to predict.
        #[arg(long)]
        target: String,
        /// Model type: linear_regression, logistic_regression,
        /// random_forest_classifier or random_forest_regressor.
        #[arg(long)]
        model: String,
        /// Directory for saved model artifacts.
        #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
        artifact_dir: PathBuf,
        /// Fraction of rows held out for testing.
        #[arg(long, default_value_t = 0.2)]
        test_ratio: f64,
        /// Seed for the train/test shuffle.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// List saved model artifacts.
    Models {
        /// Directory holding the artifacts.
        #[arg(long, default_value = DEFAULT_ARTIFACT_DIR)]
        artifact_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Analyze { file, preview } => {
            let session = Session::with_defaults()?;
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let summary = session.load_csv(&bytes)?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
            if preview > 0 {
                let rows = session.preview(preview)?;
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            let analysis = session.analyze()?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Train {
            file,
            target,
            model,
            artifact_dir,
            test_ratio,
            seed,
        } => {
            let model_type = ModelType::from_str(&model)?;
            let trainer = Trainer::builder()
                .with_split_policy(SplitPolicy { test_ratio, seed })
                .with_artifact_dir(artifact_dir)
                .build()?;
            let session = Session::new(trainer);

            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            session.load_csv(&bytes)?;

            let report = session.train(&TrainingRequest {
                target_column: target,
                model_type,
            })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Models { artifact_dir } => {
            let trainer = Trainer::builder().with_artifact_dir(artifact_dir).build()?;
            for name in trainer.store().list()? {
                println!("{name}");
            }
        }
    }

    Ok(())
}

//! Command-line interface: train, predict, schema

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::inference::{InferenceEngine, PredictInput};
use crate::training::{Trainer, TrainerConfig};

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

#[derive(Parser)]
#[command(name = "coursecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Course-completion prediction: offline training, online inference")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train candidate classifiers and write the best one as a bundle
    Train {
        /// Labeled training data (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Output bundle directory
        #[arg(short, long)]
        out: PathBuf,

        /// Label column name
        #[arg(long, default_value = "completed_course")]
        label: String,

        /// Seed for the split and the seeded classifiers
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Held-out fraction
        #[arg(long, default_value = "0.2")]
        test_size: f64,
    },

    /// Predict completion labels for a JSON record or record list
    Predict {
        /// Bundle directory
        #[arg(short, long)]
        bundle: PathBuf,

        /// Input JSON file (one record object or an array of them)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the active bundle's feature schema
    Schema {
        /// Bundle directory
        #[arg(short, long)]
        bundle: PathBuf,
    },
}

pub fn load_csv(path: &PathBuf) -> anyhow::Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.clone()))?
        .finish()?;
    Ok(df)
}

pub fn cmd_train(
    data: &PathBuf,
    out: &Path,
    label: &str,
    seed: u64,
    test_size: f64,
) -> anyhow::Result<()> {
    section("Train");

    let start = Instant::now();
    let df = load_csv(data)?;
    step_ok(&format!(
        "loaded {} rows, {} columns",
        df.height(),
        df.width()
    ));

    let config = TrainerConfig {
        label_column: label.to_string(),
        seed,
        test_size,
        ..Default::default()
    };
    let bundle = Trainer::new(config).train(&df)?;
    step_ok(&format!(
        "selected {} (accuracy {:.4})",
        bundle.manifest().classifier_name,
        bundle.manifest().validation_accuracy
    ));

    bundle.save(out)?;
    step_ok(&format!("bundle written to {}", out.display()));

    println!();
    println!("  {}", dim(&format!("{:.2?} total", start.elapsed())));
    println!();
    Ok(())
}

pub fn cmd_predict(bundle: &Path, input: &PathBuf) -> anyhow::Result<()> {
    let engine = InferenceEngine::load(bundle)?;

    let file = std::fs::File::open(input)?;
    let payload: PredictInput = serde_json::from_reader(std::io::BufReader::new(file))?;

    let labels = engine.predict(payload)?;
    println!("{}", serde_json::to_string(&labels)?);
    Ok(())
}

pub fn cmd_schema(bundle: &Path) -> anyhow::Result<()> {
    let engine = InferenceEngine::load(bundle)?;
    println!("{}", serde_json::to_string_pretty(&engine.schema())?);
    Ok(())
}

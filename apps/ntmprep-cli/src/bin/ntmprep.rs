use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ntmprep_core::config::PipelineConfig;
use ntmprep_core::store::FsBlobStore;
use ntmprep_pipeline::{config_base_dir, Pipeline, ProcessReport};

#[derive(Parser)]
#[command(name = "ntmprep", about = "Prepare review text for topic model training")]
struct Cli {
    /// Base configuration file; `<name>.<env>.toml` next to it is layered on top
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory backing the blob store
    #[arg(long, global = true)]
    root: Option<String>,

    #[arg(long, global = true)]
    bucket: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Keep reviews with the target label
    Ingest,
    /// Shuffle and split filtered reviews
    Prepare {
        /// Fraction of documents used for training
        #[arg(long)]
        train_percent: Option<f64>,
    },
    /// Fit the vocabulary and write record chunks
    Process,
    /// ingest, prepare and process in sequence
    Run {
        #[arg(long)]
        train_percent: Option<f64>,
    },
    /// Summarize a record chunk
    Inspect { key: String },
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from(path).with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::load().context("loading ntmprep.toml")?,
    };
    if let Some(root) = &cli.root {
        config.store.root = root.clone();
    }
    if let Some(bucket) = &cli.bucket {
        config.store.bucket = bucket.clone();
    }
    if let Command::Prepare { train_percent: Some(f) } | Command::Run { train_percent: Some(f) } = &cli.command {
        config.prepare.train_fraction = *f;
    }
    config.validate()?;
    Ok(config)
}

fn print_report(report: &ProcessReport) {
    println!("vocabulary: {} tokens", report.vocabulary_size);
    for d in &report.datasets {
        match d.error {
            None => println!("{:<10} {:>7} rows  {:>3} chunks", d.name, d.rows, d.chunks_written),
            Some(kind) => {
                println!("{:<10} {:>7} rows  {:>3} chunks  FAILED ({kind:?})", d.name, d.rows, d.chunks_written)
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("ntmprep=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let base_dir = cli.config.as_deref().map_or_else(|| PathBuf::from("."), config_base_dir);
    let store = FsBlobStore::new(config.store_root());
    tracing::debug!(root = %store.root().display(), bucket = %config.store.bucket, "opened store");
    let pipeline = Pipeline::new(store, config).with_base_dir(base_dir);

    match &cli.command {
        Command::Ingest => {
            let kept = pipeline.ingest()?;
            println!("kept {kept} reviews");
        }
        Command::Prepare { .. } => {
            let splits = pipeline.prepare()?;
            println!(
                "train {}  validation {}  test {}  demo {}",
                splits.train.len(),
                splits.validation.len(),
                splits.test.len(),
                splits.demo.len()
            );
        }
        Command::Process => {
            let report = pipeline.process()?;
            print_report(&report);
            anyhow::ensure!(report.is_complete(), "{} dataset(s) failed", report.failed().count());
        }
        Command::Run { .. } => {
            let report = pipeline.run()?;
            print_report(&report);
            anyhow::ensure!(report.is_complete(), "{} dataset(s) failed", report.failed().count());
        }
        Command::Inspect { key } => {
            let summary = pipeline.inspect(key).with_context(|| format!("inspecting {key}"))?;
            let shape = summary.shape.unwrap_or_default();
            println!("{key}: {} rows, {} non-zeros, shape {shape:?}", summary.rows, summary.nnz);
        }
    }
    Ok(())
}

//! Ticket Triage CLI
//!
//! The `triage` command labels, trains on and classifies helpdesk tickets.
//!
//! ## Commands
//!
//! - `label`: apply the keyword rules to a raw CSV and write the processed dataset
//! - `train`: fit the vectorizer and voting ensemble on a processed dataset
//! - `process`: classify a raw CSV, forward each ticket, write the JSON batch
//! - `classify`: show what the rules say about a single text

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{warn, Level};

use triage_core::{
    assign_category, assign_priority, category_counts, clean_examples, label_dataset, normalize,
    process_dataset, read_processed, train_and_persist, write_training_report_json,
    HttpTicketSink, PredictionRecord, TrainingConfig, TrainingReportArtifact, TriageConfig,
    TriageError,
};
use triage_store::FsModelStore;

const DEFAULT_INPUT: &str = "tickets.csv";
const DEFAULT_PROCESSED: &str = "tickets_procesados.csv";

#[derive(Parser)]
#[command(name = "triage")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Helpdesk ticket triage: rule labeling, ensemble training, batch classification", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the trained artifacts [env: TRIAGE_MODEL_DIR]
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Label a raw ticket CSV with the keyword rules
    Label {
        /// Raw ticket CSV
        #[arg(default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Processed CSV to write
        #[arg(short, long, default_value = DEFAULT_PROCESSED)]
        output: PathBuf,
    },

    /// Train the classifier ensemble on a processed CSV
    Train {
        /// Processed CSV (columns `descripcion_limpia`, `categoria`)
        #[arg(default_value = DEFAULT_PROCESSED)]
        input: PathBuf,

        /// Seed for the split and the SGD member
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Copies of the cleaned examples used for training (at least 1)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        augmentation: u64,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,
    },

    /// Classify a raw ticket CSV and forward each prediction
    Process {
        /// Raw ticket CSV (default: tickets.csv)
        input: Option<PathBuf>,

        /// JSON file for the prediction batch [env: TRIAGE_OUTPUT]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Endpoint receiving each prediction [env: TRIAGE_SINK_URL]
        #[arg(long)]
        sink_url: Option<String>,

        /// Per-request sink timeout in milliseconds [env: TRIAGE_SINK_TIMEOUT_MS]
        #[arg(long)]
        sink_timeout_ms: Option<u64>,
    },

    /// Apply only the keyword rules to one text
    Classify {
        /// Ticket description
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    triage_core::init_tracing(cli.json, level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<TriageError>() {
                Some(reported) if reported.is_reported() => eprintln!("{reported}"),
                _ => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = TriageConfig::from_env();
    if let Some(dir) = cli.model_dir {
        config.model_dir = dir;
    }

    match cli.command {
        Commands::Label { input, output } => cmd_label(&input, &output),
        Commands::Train {
            input,
            seed,
            augmentation,
            test_fraction,
        } => {
            let mut training = TrainingConfig::with_seed(seed);
            training.augmentation_factor = augmentation as usize;
            training.test_fraction = test_fraction;
            cmd_train(&config, &training, &input)
        }
        Commands::Process {
            input,
            output,
            sink_url,
            sink_timeout_ms,
        } => {
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(url) = sink_url {
                config.sink_url = url;
            }
            if let Some(ms) = sink_timeout_ms {
                config.sink_timeout_ms = ms;
            }
            let input = input.unwrap_or_else(|| {
                warn!(input = DEFAULT_INPUT, "no input file given; using default");
                println!("No input file given, using {DEFAULT_INPUT}");
                PathBuf::from(DEFAULT_INPUT)
            });
            cmd_process(&config, &input).await
        }
        Commands::Classify { text } => cmd_classify(&text),
    }
}

fn cmd_label(input: &Path, output: &Path) -> Result<()> {
    let labeled = label_dataset(input, output)?;

    println!("Labeled {} tickets → {}", labeled.len(), output.display());
    println!();
    print!("{}", triage_core::labeling::render_counts(&category_counts(&labeled)));
    Ok(())
}

fn cmd_train(config: &TriageConfig, training: &TrainingConfig, input: &Path) -> Result<()> {
    let rows = read_processed(input)?;
    let (examples, dropped) = clean_examples(&rows);
    if examples.is_empty() {
        return Err(TriageError::EmptyDataset.into());
    }

    let store = FsModelStore::new(&config.model_dir)
        .with_context(|| format!("Failed to open model store: {:?}", config.model_dir))?;
    let (outcome, saved) = train_and_persist(&examples, training, &store)?;

    println!(
        "Trained on {} rows ({} examples x{}), evaluated on {}",
        outcome.train_rows, outcome.examples, training.augmentation_factor, outcome.test_rows
    );
    if dropped > 0 {
        println!("Dropped {dropped} rows without text or category");
    }
    println!();
    print!("{}", outcome.report.render());

    let report = TrainingReportArtifact::new(&outcome, &saved, training, dropped);
    let report_path = config.training_report_path();
    write_training_report_json(&report_path, &report)
        .with_context(|| format!("Failed to write training report: {:?}", report_path))?;

    println!();
    println!("Models saved to {}", config.model_dir.display());
    println!("  vectorizer: {}", saved.vectorizer.short());
    println!("  ensemble:   {}", saved.ensemble.short());
    Ok(())
}

fn progress_line(record: &PredictionRecord, delivered: bool) -> String {
    let mark = if delivered { "✔" } else { "x" };
    format!(
        "{mark} {} → {} / {}",
        record.ticket_id, record.category, record.priority
    )
}

async fn cmd_process(config: &TriageConfig, input: &Path) -> Result<()> {
    let store = FsModelStore::open(&config.model_dir);
    let sink = HttpTicketSink::from_config(config).context("Failed to build sink client")?;

    let summary = process_dataset(
        &store,
        Arc::new(sink),
        input,
        &config.output_path,
        |record, delivered| println!("{}", progress_line(record, delivered)),
    )
    .await?;

    println!();
    println!(
        "Processed {} tickets ({} delivered, {} not delivered) → {}",
        summary.records.len(),
        summary.delivered,
        summary.failed,
        config.output_path.display()
    );
    Ok(())
}

fn cmd_classify(text: &str) -> Result<()> {
    let category = assign_category(text);
    let priority = assign_priority(text, category);
    let out = serde_json::json!({
        "normalizado": normalize(text),
        "categoria": category,
        "prioridad": priority,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

//! CLI entry point for the data quality engine.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use prepflow::{
    ActionStatus, AnalysisResult, Analyzer, AppliedAction, DatasetInfo, EngineConfig,
    ImbalanceHint, ImbalanceResolver, PreprocessAction, Preprocessor, ResampleMethod,
};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// CLI-compatible resampling method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliResampleMethod {
    /// Synthesize minority rows by interpolating numeric features
    Smote,
    /// Duplicate minority rows up to the majority count
    Oversample,
    /// Drop majority rows down to the minority count
    Undersample,
}

impl From<CliResampleMethod> for ResampleMethod {
    fn from(cli: CliResampleMethod) -> Self {
        match cli {
            CliResampleMethod::Smote => ResampleMethod::Smote,
            CliResampleMethod::Oversample => ResampleMethod::Oversample,
            CliResampleMethod::Undersample => ResampleMethod::Undersample,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data quality engine",
    long_about = "Finds and fixes quality problems in CSV datasets.\n\n\
                  EXAMPLES:\n  \
                  # Report every detected issue as JSON\n  \
                  prepflow analyze -i data.csv\n\n  \
                  # Apply a prepared list of fix actions\n  \
                  prepflow preprocess -i data.csv --actions actions.json -o clean.csv\n\n  \
                  # Fix everything fixable with default methods\n  \
                  prepflow fix-all -i data.csv -o clean.csv\n\n  \
                  # Even out an imbalanced classification target\n  \
                  prepflow resample -i data.csv --target label --method smote -o balanced.csv"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect data-quality issues and print a JSON report
    Analyze {
        /// Path to the CSV file to analyze
        #[arg(short, long)]
        input: String,
    },
    /// Apply a JSON list of fix actions to a dataset
    Preprocess {
        /// Path to the CSV file to process
        #[arg(short, long)]
        input: String,

        /// Path to a JSON array of actions
        /// (each `{issue_type, columns, method, parameters?}`)
        #[arg(short, long)]
        actions: String,

        /// Where to write the processed CSV
        #[arg(short, long)]
        output: String,
    },
    /// Detect issues and fix everything fixable with default methods
    FixAll {
        /// Path to the CSV file to process
        #[arg(short, long)]
        input: String,

        /// Where to write the processed CSV
        #[arg(short, long)]
        output: String,
    },
    /// Resample an imbalanced classification target
    Resample {
        /// Path to the CSV file to process
        #[arg(short, long)]
        input: String,

        /// Target column holding the class labels
        #[arg(short, long)]
        target: String,

        /// Resampling method
        #[arg(short, long, value_enum)]
        method: CliResampleMethod,

        /// Where to write the resampled CSV
        #[arg(short, long)]
        output: String,
    },
}

/// Analysis report printed by `analyze`.
#[derive(Serialize)]
struct AnalyzeReport {
    dataset_info: DatasetInfo,
    #[serde(flatten)]
    analysis: AnalysisResult,
}

/// Report printed by `preprocess` and `fix-all`.
#[derive(Serialize)]
struct ProcessReport {
    original_rows: usize,
    processed_rows: usize,
    applied_actions: Vec<AppliedAction>,
    summary: ActionSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    imbalance: Option<ImbalanceHint>,
}

#[derive(Serialize)]
struct ActionSummary {
    success: usize,
    failed: usize,
}

impl ActionSummary {
    fn new(applied: &[AppliedAction]) -> Self {
        Self {
            success: applied
                .iter()
                .filter(|a| a.status == ActionStatus::Success)
                .count(),
            failed: applied
                .iter()
                .filter(|a| a.status == ActionStatus::Failed)
                .count(),
        }
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    match args.command {
        Command::Analyze { input } => analyze(&input),
        Command::Preprocess {
            input,
            actions,
            output,
        } => preprocess(&input, &actions, &output),
        Command::FixAll { input, output } => fix_all(&input, &output),
        Command::Resample {
            input,
            target,
            method,
            output,
        } => resample(&input, &target, method.into(), &output),
    }
}

fn analyze(input: &str) -> Result<()> {
    let data = load_csv(input)?;
    let analysis = Analyzer::default().analyze(&data)?;

    let report = AnalyzeReport {
        dataset_info: DatasetInfo {
            rows: data.height(),
            columns: data.width(),
        },
        analysis,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn preprocess(input: &str, actions_path: &str, output: &str) -> Result<()> {
    let data = load_csv(input)?;
    let actions: Vec<PreprocessAction> = serde_json::from_reader(
        File::open(actions_path).with_context(|| format!("cannot open {actions_path}"))?,
    )
    .context("actions file is not a valid action list")?;

    let (mut processed, applied) =
        Preprocessor::new(EngineConfig::default()).preprocess(&data, &actions);
    write_csv(&mut processed, output)?;

    let report = ProcessReport {
        original_rows: data.height(),
        processed_rows: processed.height(),
        summary: ActionSummary::new(&applied),
        applied_actions: applied,
        imbalance: None,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn fix_all(input: &str, output: &str) -> Result<()> {
    let data = load_csv(input)?;
    let mut outcome = Preprocessor::new(EngineConfig::default()).fix_all(&data)?;
    write_csv(&mut outcome.data, output)?;

    let report = ProcessReport {
        original_rows: data.height(),
        processed_rows: outcome.data.height(),
        summary: ActionSummary::new(&outcome.applied),
        applied_actions: outcome.applied,
        imbalance: Some(outcome.imbalance),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn resample(input: &str, target: &str, method: ResampleMethod, output: &str) -> Result<()> {
    let data = load_csv(input)?;
    let mut resampled = ImbalanceResolver::new(EngineConfig::default())
        .resolve(&data, target, method)?;
    write_csv(&mut resampled, output)?;

    info!(
        rows_before = data.height(),
        rows_after = resampled.height(),
        "resampled dataset written to {output}"
    );
    Ok(())
}

fn load_csv(path: &str) -> Result<DataFrame> {
    if !Path::new(path).exists() {
        return Err(anyhow!("Input file not found: {path}"));
    }
    info!("Loading dataset from: {path}");

    // Standard loading with quote handling first, then a permissive retry
    // for files with broken quoting.
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {e}");
        }
    }

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(|e| {
            error!("Could not load {path}: {e}");
            e.into()
        })
}

fn write_csv(df: &mut DataFrame, path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
    CsvWriter::new(file).finish(df)?;
    info!("Wrote {} rows to {path}", df.height());
    Ok(())
}

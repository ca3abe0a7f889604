//! Tabular Data Quality Engine
//!
//! A rule-based engine for finding and fixing quality problems in tabular
//! datasets, built on Polars.
//!
//! # Overview
//!
//! The engine works in three stages, each usable on its own:
//!
//! - **Analysis**: fifteen detectors scan a dataset for issues such as
//!   missing values, duplicate rows, IQR outliers, inconsistent category
//!   spellings, skewed distributions and class imbalance.
//! - **Preprocessing**: every issue type maps to a set of named fix
//!   methods; actions are applied in order and each one's fate (success or
//!   failure) is recorded without aborting the batch. A fix-all pass picks
//!   sensible defaults automatically.
//! - **Resampling**: imbalanced classification targets can be evened out
//!   with undersampling, oversampling or SMOTE, all seeded for
//!   reproducibility.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use prepflow::{Analyzer, Preprocessor, EngineConfig};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("data.csv".into()))?
//!     .finish()?;
//!
//! // What is wrong with this dataset?
//! let report = Analyzer::default().analyze(&df)?;
//! for issue in &report.issues {
//!     println!("[{}] {}", issue.severity, issue.description);
//! }
//!
//! // Fix everything fixable with default methods.
//! let outcome = Preprocessor::new(EngineConfig::default()).fix_all(&df)?;
//! println!("{} rows after cleanup", outcome.data.height());
//! ```
//!
//! Issue reports and actions serialize with serde, so the analysis output
//! of one process can drive the preprocessing input of another unchanged.

pub mod config;
pub mod detectors;
pub mod error;
pub mod imbalance;
pub mod preprocess;
pub mod profiler;
pub mod quality;
pub mod transforms;
pub mod types;
pub mod utils;

pub use config::{ConfigValidationError, EngineConfig, EngineConfigBuilder};
pub use error::{PrepError, Result};
pub use imbalance::ImbalanceResolver;
pub use preprocess::{FixAllOutcome, Preprocessor};
pub use profiler::{ColumnKind, infer_kind, infer_kinds};
pub use quality::Analyzer;
pub use transforms::TransformRegistry;
pub use types::{
    ActionStatus, AnalysisResult, AppliedAction, DataIssue, DatasetInfo, ImbalanceHint,
    IssueType, PreprocessAction, ResampleMethod, Severity,
};

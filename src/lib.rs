//! # FNOL Classifier
//!
//! Classifies German first-notification-of-loss (FNOL) documents into the
//! structured fields of a claims system (claim type, cause, notifier, date of
//! loss, insured object) by asking a text-completion model one question per
//! field, then maps the model's labels deterministically onto cause codes.
//!
//! ## Core Concepts
//!
//! - **Claim type / object**: closed code sets (`LW`, `ST`, … / `GL`, `HR`, …)
//! - **Cause vocabulary**: per claim type, the labels the model may answer with
//!   and the cause code (`sd_urs_art`) each label maps to
//! - **Bucketing**: legacy ground-truth cause codes are collapsed into the same
//!   small canonical set so predictions and ground truth can be compared
//!
//! ## Example
//!
//! ```rust,ignore
//! use fnol_classifier::*;
//! use std::sync::Arc;
//!
//! let service = Arc::new(OpenAiClient::from_env()?);
//! let classifier = ClaimClassifier::new(service, ClassifierConfig::from_env()?);
//! let pipeline = ClaimPipeline::new(classifier);
//!
//! let dataset = ClaimsDataset::from_csv_path("claims.csv")?;
//! let (records, report) = evaluate_dataset(&pipeline, &dataset).await;
//! println!("{report}");
//! ```

pub mod classifier;
pub mod codes;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod llm;
pub mod mapper;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod vocabulary;

pub use classifier::{earliest_date, ClaimClassifier};
pub use codes::{CauseCode, ClaimTypeCode, NotifierCode, ObjectTypeCode};
pub use config::ClassifierConfig;
pub use dataset::{ClaimColumns, ClaimRow, ClaimsDataset};
pub use error::{ClaimsError, Result};
pub use evaluation::{compare_records, ClaimField, FieldTally, MatchReport};
pub use llm::{AnswerFormat, CompletionRequest, CompletionService};
#[cfg(feature = "openai")]
pub use llm::OpenAiClient;
pub use mapper::CauseMapper;
pub use normalizer::{normalize_dataset, BucketRule};
pub use pipeline::ClaimPipeline;
pub use record::{ClaimRecord, Field};
pub use vocabulary::CauseVocabulary;

use log::info;

/// Classifies every document of `dataset`, buckets the dataset's own labels
/// and compares both field by field.
pub async fn evaluate_dataset(
    pipeline: &ClaimPipeline,
    dataset: &ClaimsDataset,
) -> (Vec<ClaimRecord>, MatchReport) {
    info!("Starting predictions for {} documents", dataset.len());
    let records = pipeline.classify_dataset(dataset).await;

    let ground_truth = normalize_dataset(dataset);
    let report = compare_records(&records, &ground_truth);
    info!("Predictions done");

    (records, report)
}

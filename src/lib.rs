//! Varscore - single-nucleotide variant effect scoring
//!
//! Predicts whether a variant is likely pathogenic or benign by comparing the
//! likelihood a sequence model assigns to the reference window against the
//! same window with the variant substituted in.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{ClassificationParams, VariantAnalyzer, WindowFetcher, window_bounds};
pub use error::AnalysisError;
pub use models::{Prediction, SequenceWindow, VariantCall, VariantRequest};
pub use services::{RemoteOracle, RetryPolicy, ScoringOracle, SequenceSource, UcscClient};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::domain::{Chromosome, GenomeAssembly};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Chromosome listing for a genome build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromosomesResponse {
    pub genome: String,
    pub chromosomes: Vec<Chromosome>,
}

/// Available assemblies keyed by organism
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomesResponse {
    pub genomes: BTreeMap<String, Vec<GenomeAssembly>>,
}

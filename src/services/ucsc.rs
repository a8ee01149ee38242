use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::{group_by_organism, primary_chromosomes};
use crate::models::{Chromosome, GenomeAssembly};

/// Errors that can occur when talking to the sequence service
#[derive(Debug, Error)]
pub enum UcscError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Raw reply of a sequence query
///
/// A successful reply carries `dna`; a failed lookup usually carries only
/// `error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceResponse {
    #[serde(default)]
    pub dna: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One entry of the `list/ucscGenomes` reply
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenomeInfo {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    organism: Option<String>,
    #[serde(default)]
    source_name: Option<String>,
    #[serde(default)]
    active: Value,
}

impl GenomeInfo {
    fn into_assembly(self, id: String) -> (Option<String>, GenomeAssembly) {
        let active = match &self.active {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64().map_or(false, |n| n != 0),
            _ => false,
        };

        let assembly = GenomeAssembly {
            name: self.description.unwrap_or_else(|| id.clone()),
            source_name: self.source_name.unwrap_or_else(|| id.clone()),
            active,
            id,
        };
        (self.organism, assembly)
    }
}

/// A source of reference sequence for half-open 0-based intervals
pub trait SequenceSource {
    fn fetch_sequence(
        &self,
        genome: &str,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> impl Future<Output = Result<SequenceResponse, UcscError>> + Send;
}

/// UCSC Genome Browser REST API client
///
/// Handles:
/// - Fetching reference sequence windows
/// - Listing available genome assemblies
/// - Listing the chromosomes of a genome build
pub struct UcscClient {
    base_url: String,
    client: Client,
}

impl UcscClient {
    /// Create a new UCSC client
    pub fn new(
        base_url: String,
        timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, UcscError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(idle_timeout)
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn sequence_url(&self, genome: &str, chromosome: &str, start: u64, end: u64) -> String {
        format!(
            "{}/getData/sequence?genome={}&chrom={}&start={}&end={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(genome),
            urlencoding::encode(chromosome),
            start,
            end
        )
    }

    /// List the assemblies the service knows about, grouped by organism
    pub async fn list_genomes(&self) -> Result<BTreeMap<String, Vec<GenomeAssembly>>, UcscError> {
        let url = format!("{}/list/ucscGenomes", self.base_url.trim_end_matches('/'));

        tracing::debug!("Listing genomes from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to list genomes: {} - {}", status, body);
            return Err(UcscError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to list genomes: {}", status),
            });
        }

        let json: Value = response.json().await?;

        let genomes = json
            .get("ucscGenomes")
            .and_then(|g| g.as_object())
            .ok_or_else(|| UcscError::InvalidResponse("missing ucscGenomes".to_string()))?;

        let mut assemblies = Vec::with_capacity(genomes.len());
        for (id, info) in genomes {
            let info: GenomeInfo = serde_json::from_value(info.clone()).map_err(|e| {
                UcscError::InvalidResponse(format!("Failed to parse genome {}: {}", id, e))
            })?;
            assemblies.push(info.into_assembly(id.clone()));
        }

        Ok(group_by_organism(assemblies))
    }

    /// List the primary chromosomes of a genome build, karyotype-ordered
    pub async fn list_chromosomes(&self, genome: &str) -> Result<Vec<Chromosome>, UcscError> {
        let url = format!(
            "{}/list/chromosomes?genome={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(genome)
        );

        tracing::debug!("Listing chromosomes from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to list chromosomes for {}: {} - {}", genome, status, body);
            return Err(UcscError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to list chromosomes: {}", status),
            });
        }

        let json: Value = response.json().await?;

        let chromosomes = json
            .get("chromosomes")
            .and_then(|c| c.as_object())
            .ok_or_else(|| {
                let upstream = json
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("missing chromosomes");
                UcscError::InvalidResponse(upstream.to_string())
            })?;

        let sizes: HashMap<String, u64> = chromosomes
            .iter()
            .filter_map(|(name, size)| size.as_u64().map(|s| (name.clone(), s)))
            .collect();

        Ok(primary_chromosomes(sizes))
    }
}

impl SequenceSource for UcscClient {
    async fn fetch_sequence(
        &self,
        genome: &str,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Result<SequenceResponse, UcscError> {
        let url = self.sequence_url(genome, chromosome, start, end);

        tracing::debug!("Fetching sequence from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let upstream = serde_json::from_str::<SequenceResponse>(&body)
                .ok()
                .and_then(|r| r.error);
            return Err(UcscError::ApiError {
                status: status.as_u16(),
                message: match upstream {
                    Some(error) => {
                        format!("Failed to fetch genome sequence: {} ({})", status, error)
                    }
                    None => format!("Failed to fetch genome sequence: {}", status),
                },
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| UcscError::InvalidResponse(format!("Failed to parse sequence: {}", e)))
    }
}

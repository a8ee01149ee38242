use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;

/// Errors that can occur when scoring sequences
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Oracle returned error: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Oracle is shutting down")]
    Closed,
}

/// Assigns a log-likelihood score to each DNA sequence
///
/// Scores come back in input order, one per sequence. Implementations must
/// tolerate concurrent read-only calls.
pub trait ScoringOracle {
    fn score_sequences(
        &self,
        sequences: &[String],
    ) -> impl Future<Output = Result<Vec<f64>, OracleError>> + Send;
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    model: &'a str,
    sequences: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    #[serde(default)]
    scores: Option<Vec<f64>>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a model server exposing `POST /score`
///
/// Built once at start-up. In-flight calls are bounded by a semaphore so a
/// single inference host is never oversubscribed.
pub struct RemoteOracle {
    endpoint: String,
    model: String,
    client: Client,
    permits: Arc<Semaphore>,
}

impl RemoteOracle {
    pub fn new(
        endpoint: String,
        model: String,
        timeout: Duration,
        idle_timeout: Duration,
        max_concurrent_requests: usize,
    ) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(idle_timeout)
            .build()?;

        Ok(Self {
            endpoint,
            model,
            client,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn score_url(&self) -> String {
        format!("{}/score", self.endpoint.trim_end_matches('/'))
    }
}

impl ScoringOracle for RemoteOracle {
    async fn score_sequences(&self, sequences: &[String]) -> Result<Vec<f64>, OracleError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| OracleError::Closed)?;

        let response = self
            .client
            .post(self.score_url())
            .json(&ScoreRequest {
                model: &self.model,
                sequences,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Oracle returned {}: {}", status, body);
            return Err(OracleError::ApiError {
                status: status.as_u16(),
                message: format!("{} - {}", status, body),
            });
        }

        let reply: ScoreResponse = response.json().await?;

        let scores = reply.scores.ok_or_else(|| {
            OracleError::InvalidResponse(
                reply.error.unwrap_or_else(|| "missing scores".to_string()),
            )
        })?;

        if scores.len() != sequences.len() {
            return Err(OracleError::InvalidResponse(format!(
                "expected {} scores, got {}",
                sequences.len(),
                scores.len()
            )));
        }

        if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
            return Err(OracleError::InvalidResponse(format!("non-finite score {}", bad)));
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle(endpoint: &str) -> RemoteOracle {
        RemoteOracle::new(
            endpoint.to_string(),
            "evo2_7b".to_string(),
            Duration::from_secs(5),
            Duration::from_secs(30),
            2,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_score_sequences() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/score")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "model": "evo2_7b",
                "sequences": ["ACGT"],
            })))
            .with_status(200)
            .with_body(r#"{"scores": [-1.25]}"#)
            .create_async()
            .await;

        let scores = oracle(&server.url())
            .score_sequences(&["ACGT".to_string()])
            .await
            .unwrap();

        assert_eq!(scores, vec![-1.25]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_score_count_mismatch() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/score")
            .with_status(200)
            .with_body(r#"{"scores": [-1.0, -2.0]}"#)
            .create_async()
            .await;

        let result = oracle(&server.url()).score_sequences(&["ACGT".to_string()]).await;
        assert!(matches!(result, Err(OracleError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/score")
            .with_status(500)
            .with_body("CUDA out of memory")
            .create_async()
            .await;

        match oracle(&server.url()).score_sequences(&["ACGT".to_string()]).await {
            Err(OracleError::ApiError { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.contains("CUDA out of memory"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_scores_surfaces_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/score")
            .with_status(200)
            .with_body(r#"{"error": "sequence too long"}"#)
            .create_async()
            .await;

        match oracle(&server.url()).score_sequences(&["ACGT".to_string()]).await {
            Err(OracleError::InvalidResponse(msg)) => assert_eq!(msg, "sequence too long"),
            other => panic!("expected InvalidResponse, got {:?}", other),
        }
    }
}

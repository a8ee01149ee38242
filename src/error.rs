use actix_web::{error, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::{OracleError, UcscError};

/// Errors surfaced by a variant analysis request
///
/// Each kind maps to a distinct HTTP status so a client can tell
/// "fix your input" from "retry later" from "give up".
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Variant position {position} is outside the fetched window (start={start}, end={end})")]
    PositionOutOfWindow { position: u64, start: u64, end: u64 },

    #[error("Sequence service unavailable: {message}")]
    UpstreamUnavailable { message: String, transient: bool },

    #[error("Sequence service error: {0}")]
    UpstreamDataError(String),

    #[error("Scoring failed: {message}")]
    ScoringFailed { message: String, transient: bool },
}

impl AnalysisError {
    /// Stable machine-readable kind used in error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidRequest(_) => "invalid_request",
            AnalysisError::PositionOutOfWindow { .. } => "position_out_of_window",
            AnalysisError::UpstreamUnavailable { .. } => "upstream_unavailable",
            AnalysisError::UpstreamDataError(_) => "upstream_data_error",
            AnalysisError::ScoringFailed { .. } => "scoring_failed",
        }
    }

    /// Whether retrying the same request may succeed
    ///
    /// Only transport failures and 5xx/429 replies count; a 4xx or a reply
    /// that breaks the oracle contract would fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::UpstreamUnavailable { transient, .. }
            | AnalysisError::ScoringFailed { transient, .. } => *transient,
            _ => false,
        }
    }

    /// Deterministic scoring failure, never retried
    pub fn scoring_failed(message: impl Into<String>) -> Self {
        AnalysisError::ScoringFailed {
            message: message.into(),
            transient: false,
        }
    }
}

/// Whether an upstream HTTP status is worth retrying
pub fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Whether a reqwest failure happened in transport rather than in decoding
pub fn is_transient_transport(err: &reqwest::Error) -> bool {
    if let Some(status) = err.status() {
        return is_transient_status(status.as_u16());
    }
    !(err.is_decode() || err.is_builder() || err.is_redirect())
}

impl From<UcscError> for AnalysisError {
    fn from(err: UcscError) -> Self {
        match err {
            UcscError::RequestError(e) => AnalysisError::UpstreamUnavailable {
                transient: is_transient_transport(&e),
                message: e.to_string(),
            },
            UcscError::ApiError { status, message } => AnalysisError::UpstreamUnavailable {
                message,
                transient: is_transient_status(status),
            },
            UcscError::InvalidResponse(msg) => AnalysisError::UpstreamDataError(msg),
        }
    }
}

impl From<OracleError> for AnalysisError {
    fn from(err: OracleError) -> Self {
        let transient = match &err {
            OracleError::RequestError(e) => is_transient_transport(e),
            OracleError::ApiError { status, .. } => is_transient_status(*status),
            OracleError::InvalidResponse(_) | OracleError::Closed => false,
        };
        AnalysisError::ScoringFailed {
            message: err.to_string(),
            transient,
        }
    }
}

impl error::ResponseError for AnalysisError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AnalysisError::PositionOutOfWindow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::UpstreamDataError(_) => StatusCode::BAD_GATEWAY,
            AnalysisError::ScoringFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

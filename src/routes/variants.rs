use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

use crate::core::VariantAnalyzer;
use crate::error::AnalysisError;
use crate::models::{AnalyzeVariantRequest, ChromosomesResponse, GenomesResponse, HealthResponse};
use crate::services::{RemoteOracle, RetryPolicy, UcscClient};

/// Analyzer wired to the production collaborators
pub type Analyzer = VariantAnalyzer<UcscClient, RemoteOracle>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub retry: RetryPolicy,
}

/// Configure all variant-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/variants/analyze", web::post().to(analyze_variant))
        .route("/genomes", web::get().to(list_genomes))
        .route("/genomes/{genome}/chromosomes", web::get().to(list_chromosomes));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Analyze a single-nucleotide variant
///
/// POST /api/v1/variants/analyze
///
/// Request body:
/// ```json
/// {
///   "position": 43119628,
///   "alternative": "G",
///   "genome": "hg38",
///   "chromosome": "chr17"
/// }
/// ```
async fn analyze_variant(
    state: web::Data<AppState>,
    req: web::Json<AnalyzeVariantRequest>,
) -> Result<HttpResponse, AnalysisError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for analyze request: field_errors={:?}", errors);
        return Err(AnalysisError::InvalidRequest(errors.to_string()));
    }

    let variant = req.to_variant()?;

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "analyze",
        %request_id,
        genome = %variant.genome_build,
        chromosome = %variant.chromosome,
        position = variant.position,
    );

    let analyzer = state.analyzer.as_ref();
    let retry = state.retry;
    let variant = &variant;

    let call = async {
        tracing::info!("Analyzing {}>{}", variant.position, variant.alternative);

        let result = retry.run(move || analyzer.analyze(variant)).await;

        match &result {
            Ok(call) => tracing::info!(
                "{} (confidence {:.3}, delta {})",
                call.prediction,
                call.classification_confidence,
                call.delta_score
            ),
            Err(e) => tracing::error!("Analysis failed: {}", e),
        }

        result
    }
    .instrument(span)
    .await?;

    Ok(HttpResponse::Ok().json(call))
}

/// List available genome assemblies grouped by organism
///
/// GET /api/v1/genomes
async fn list_genomes(state: web::Data<AppState>) -> Result<HttpResponse, AnalysisError> {
    let genomes = state
        .analyzer
        .fetcher()
        .source()
        .list_genomes()
        .await
        .map_err(|e| {
            tracing::error!("Failed to list genomes: {}", e);
            AnalysisError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(GenomesResponse { genomes }))
}

/// List the primary chromosomes of a genome build
///
/// GET /api/v1/genomes/{genome}/chromosomes
async fn list_chromosomes(
    state: web::Data<AppState>,
    genome: web::Path<String>,
) -> Result<HttpResponse, AnalysisError> {
    let genome = genome.into_inner();

    let chromosomes = state
        .analyzer
        .fetcher()
        .source()
        .list_chromosomes(&genome)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list chromosomes for {}: {}", genome, e);
            AnalysisError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(ChromosomesResponse { genome, chromosomes }))
}

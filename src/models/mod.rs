// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Chromosome, Classification, GenomeAssembly, Prediction, ScoreDelta, ScoredVariant, SequenceWindow,
    VariantCall, VariantRequest, MAX_POSITION,
};
pub use requests::AnalyzeVariantRequest;
pub use responses::{ChromosomesResponse, ErrorResponse, GenomesResponse, HealthResponse};

// Core pipeline exports
pub mod analyzer;
pub mod chromosomes;
pub mod classification;
pub mod genomes;
pub mod scorer;
pub mod window;

pub use analyzer::VariantAnalyzer;
pub use chromosomes::primary_chromosomes;
pub use classification::{ClassificationParams, FUNC_STD, LOF_STD, PATHOGENIC_THRESHOLD};
pub use genomes::group_by_organism;
pub use scorer::{score_variant, substitute_base};
pub use window::{window_bounds, WindowBounds, WindowFetcher, DEFAULT_WINDOW_SIZE};

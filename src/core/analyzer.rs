use crate::core::classification::ClassificationParams;
use crate::core::scorer::score_variant;
use crate::core::window::WindowFetcher;
use crate::error::AnalysisError;
use crate::models::{VariantCall, VariantRequest};
use crate::services::{ScoringOracle, SequenceSource};

/// Variant analysis pipeline: fetch the window, then score the substitution
///
/// Constructed once per process and shared read-only between requests.
/// The oracle it owns is never replaced after construction.
pub struct VariantAnalyzer<S, O> {
    fetcher: WindowFetcher<S>,
    oracle: O,
    params: ClassificationParams,
}

impl<S: SequenceSource, O: ScoringOracle> VariantAnalyzer<S, O> {
    pub fn new(fetcher: WindowFetcher<S>, oracle: O, params: ClassificationParams) -> Self {
        Self {
            fetcher,
            oracle,
            params,
        }
    }

    pub fn params(&self) -> &ClassificationParams {
        &self.params
    }

    pub fn fetcher(&self) -> &WindowFetcher<S> {
        &self.fetcher
    }

    /// Analyze one variant
    ///
    /// # Errors
    /// * `PositionOutOfWindow` - the fetched window does not cover the
    ///   position (upstream truncated it)
    /// * `UpstreamUnavailable` / `UpstreamDataError` - window fetch failed
    /// * `ScoringFailed` - either oracle call failed
    pub async fn analyze(&self, request: &VariantRequest) -> Result<VariantCall, AnalysisError> {
        let window = self
            .fetcher
            .fetch(request.position, &request.genome_build, &request.chromosome)
            .await?;

        let offset = window.relative_offset(request.position)?;
        let reference = window.base_at(offset).ok_or(AnalysisError::PositionOutOfWindow {
            position: request.position,
            start: window.start() + 1,
            end: window.end(),
        })?;

        if reference == request.alternative {
            tracing::warn!(
                "Alternative base {} matches the reference at {}:{}",
                request.alternative,
                request.chromosome,
                request.position
            );
        }

        let scored = score_variant(
            &self.oracle,
            &window,
            offset,
            reference,
            request.alternative,
            &self.params,
        )
        .await?;

        Ok(scored.at_position(request.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prediction;
    use crate::services::{OracleError, SequenceResponse, UcscError};

    struct StaticSource(Option<String>);

    impl SequenceSource for StaticSource {
        async fn fetch_sequence(
            &self,
            _genome: &str,
            _chromosome: &str,
            _start: u64,
            _end: u64,
        ) -> Result<SequenceResponse, UcscError> {
            Ok(SequenceResponse {
                dna: self.0.clone(),
                error: None,
            })
        }
    }

    /// Scores a sequence by the count of 'G' bases, scaled
    struct CountingOracle;

    impl ScoringOracle for CountingOracle {
        async fn score_sequences(&self, sequences: &[String]) -> Result<Vec<f64>, OracleError> {
            Ok(sequences
                .iter()
                .map(|s| s.bytes().filter(|b| *b == b'G').count() as f64 * -0.01)
                .collect())
        }
    }

    #[tokio::test]
    async fn test_analyze_attaches_position() {
        // window size 4 around position 3: [0, 5)
        let analyzer = VariantAnalyzer::new(
            WindowFetcher::new(StaticSource(Some("acaca".into())), 4),
            CountingOracle,
            ClassificationParams::default(),
        );

        let request = VariantRequest::new(3, "G", "hg38", "chr1").unwrap();
        let call = analyzer.analyze(&request).await.unwrap();

        assert_eq!(call.position, 3);
        assert_eq!(call.reference, 'A');
        assert_eq!(call.alternative, 'G');
        assert!((call.delta_score + 0.01).abs() < 1e-12);
        assert_eq!(call.prediction, Prediction::LikelyPathogenic);
        assert_eq!(call.classification_confidence, 1.0);
    }

    #[tokio::test]
    async fn test_analyze_truncated_window() {
        // asked for [96, 105), upstream returned three bases
        let analyzer = VariantAnalyzer::new(
            WindowFetcher::new(StaticSource(Some("ACG".into())), 8),
            CountingOracle,
            ClassificationParams::default(),
        );

        let request = VariantRequest::new(101, "T", "hg38", "chr1").unwrap();
        match analyzer.analyze(&request).await {
            Err(AnalysisError::PositionOutOfWindow { position, start, end }) => {
                assert_eq!(position, 101);
                assert_eq!(start, 97);
                assert_eq!(end, 99);
            }
            other => panic!("expected PositionOutOfWindow, got {:?}", other),
        }
    }
}

use std::slice;

use crate::core::classification::ClassificationParams;
use crate::error::AnalysisError;
use crate::models::{ScoreDelta, ScoredVariant, SequenceWindow};
use crate::services::ScoringOracle;

/// Replace the base at `offset` with `alternative`
///
/// Every other byte is copied from the reference unchanged.
pub fn substitute_base(
    window: &SequenceWindow,
    offset: usize,
    alternative: char,
) -> Result<String, AnalysisError> {
    if offset >= window.len() {
        return Err(AnalysisError::PositionOutOfWindow {
            position: window.start() + offset as u64 + 1,
            start: window.start() + 1,
            end: window.end(),
        });
    }
    if !alternative.is_ascii() {
        return Err(AnalysisError::InvalidRequest(format!(
            "alternative base {:?} is not a nucleotide symbol",
            alternative
        )));
    }

    let reference = window.sequence();
    let mut variant = String::with_capacity(reference.len());
    variant.push_str(&reference[..offset]);
    variant.push(alternative);
    variant.push_str(&reference[offset + 1..]);

    Ok(variant)
}

/// Score a single-base substitution against its reference window
///
/// The two oracle calls are independent and run concurrently. No retries
/// happen here; an oracle failure fails the variant.
pub async fn score_variant<O: ScoringOracle>(
    oracle: &O,
    window: &SequenceWindow,
    offset: usize,
    reference: char,
    alternative: char,
    params: &ClassificationParams,
) -> Result<ScoredVariant, AnalysisError> {
    let reference_seq = window.sequence().to_string();
    let variant_seq = substitute_base(window, offset, alternative)?;

    let (reference_scores, variant_scores) = tokio::try_join!(
        oracle.score_sequences(slice::from_ref(&reference_seq)),
        oracle.score_sequences(slice::from_ref(&variant_seq)),
    )
    .map_err(|e| {
        tracing::error!("Oracle scoring failed: {}", e);
        AnalysisError::from(e)
    })?;

    let reference_score = single_score(&reference_scores, "reference")?;
    let variant_score = single_score(&variant_scores, "variant")?;

    let delta = ScoreDelta::from_scores(reference_score, variant_score);
    if !delta.value().is_finite() {
        return Err(AnalysisError::scoring_failed(format!(
            "score delta is not finite (reference={}, variant={})",
            reference_score, variant_score
        )));
    }

    let classification = params.classify(delta);

    tracing::debug!(
        "Scored {}>{}: reference={}, variant={}, delta={}, {} ({:.3})",
        reference,
        alternative,
        reference_score,
        variant_score,
        delta.value(),
        classification.prediction,
        classification.confidence
    );

    Ok(ScoredVariant {
        reference,
        alternative,
        delta,
        classification,
    })
}

fn single_score(scores: &[f64], which: &str) -> Result<f64, AnalysisError> {
    match scores {
        [score] if score.is_finite() => Ok(*score),
        [score] => Err(AnalysisError::scoring_failed(format!(
            "oracle returned a non-finite {} score: {}",
            which, score
        ))),
        _ => Err(AnalysisError::scoring_failed(format!(
            "oracle returned {} scores for the {} window, expected 1",
            scores.len(),
            which
        ))),
    }
}

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Bases accepted as an alternative allele
pub const VALID_BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Largest 1-based position accepted from a client
pub const MAX_POSITION: u64 = i64::MAX as u64;

/// A single-nucleotide variant to analyze
///
/// Built from an inbound request after validation; the alternative base is
/// always upper case and the chromosome carries a `chr` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRequest {
    /// 1-based genomic coordinate
    pub position: u64,
    pub alternative: char,
    pub genome_build: String,
    pub chromosome: String,
}

impl VariantRequest {
    pub fn new(
        position: u64,
        alternative: &str,
        genome_build: &str,
        chromosome: &str,
    ) -> Result<Self, AnalysisError> {
        if position == 0 {
            return Err(AnalysisError::InvalidRequest(
                "position is 1-based and must be at least 1".to_string(),
            ));
        }
        if position > MAX_POSITION {
            return Err(AnalysisError::InvalidRequest(format!(
                "position must not exceed {}",
                MAX_POSITION
            )));
        }

        let alternative = parse_base(alternative)?;

        let genome_build = genome_build.trim();
        if genome_build.is_empty() {
            return Err(AnalysisError::InvalidRequest("genome is required".to_string()));
        }

        let chromosome = chromosome.trim();
        if chromosome.is_empty() {
            return Err(AnalysisError::InvalidRequest("chromosome is required".to_string()));
        }

        Ok(Self {
            position,
            alternative,
            genome_build: genome_build.to_string(),
            chromosome: normalize_chromosome(chromosome),
        })
    }
}

/// Parse a single base symbol, accepting lower case
pub fn parse_base(value: &str) -> Result<char, AnalysisError> {
    let mut chars = value.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if VALID_BASES.contains(&c.to_ascii_uppercase()) => {
            Ok(c.to_ascii_uppercase())
        }
        _ => Err(AnalysisError::InvalidRequest(format!(
            "alternative must be a single base (A, C, G or T), got {:?}",
            value
        ))),
    }
}

/// Prefix bare chromosome names with `chr` (`17` -> `chr17`)
pub fn normalize_chromosome(chromosome: &str) -> String {
    if chromosome.starts_with("chr") {
        chromosome.to_string()
    } else {
        format!("chr{}", chromosome)
    }
}

/// Contiguous run of reference bases around a variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceWindow {
    sequence: String,
    start: u64,
    requested_end: u64,
}

impl SequenceWindow {
    /// Wrap an upstream sequence starting at the 0-based `start`
    ///
    /// The sequence is upper-cased; non-ASCII content is rejected.
    pub fn new(sequence: &str, start: u64, requested_end: u64) -> Result<Self, AnalysisError> {
        if !sequence.is_ascii() {
            return Err(AnalysisError::UpstreamDataError(
                "sequence contains non-ASCII symbols".to_string(),
            ));
        }

        Ok(Self {
            sequence: sequence.to_ascii_uppercase(),
            start,
            requested_end,
        })
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// 0-based inclusive start
    pub fn start(&self) -> u64 {
        self.start
    }

    /// 0-based exclusive end of what was actually returned
    pub fn end(&self) -> u64 {
        self.start + self.sequence.len() as u64
    }

    /// 0-based exclusive end of what was asked for
    pub fn requested_end(&self) -> u64 {
        self.requested_end
    }

    pub fn requested_len(&self) -> u64 {
        self.requested_end.saturating_sub(self.start)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// True when upstream returned fewer or more bases than requested
    pub fn is_truncated(&self) -> bool {
        self.len() as u64 != self.requested_len()
    }

    /// Offset of a 1-based genomic position inside the fetched bases
    ///
    /// Validated against the returned length, not the requested one.
    pub fn relative_offset(&self, position: u64) -> Result<usize, AnalysisError> {
        let absolute = position.checked_sub(1).filter(|p| *p >= self.start);

        match absolute {
            Some(p) if p < self.end() => Ok((p - self.start) as usize),
            _ => Err(AnalysisError::PositionOutOfWindow {
                position,
                start: self.start + 1,
                end: self.end(),
            }),
        }
    }

    pub fn base_at(&self, offset: usize) -> Option<char> {
        self.sequence.as_bytes().get(offset).map(|b| *b as char)
    }
}

/// Oracle log-likelihood of the variant window minus that of the reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDelta(f64);

impl ScoreDelta {
    pub fn from_scores(reference_score: f64, variant_score: f64) -> Self {
        Self(variant_score - reference_score)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Binary pathogenicity call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    #[serde(rename = "Likely pathogenic")]
    LikelyPathogenic,
    #[serde(rename = "Likely benign")]
    LikelyBenign,
}

impl Prediction {
    pub fn label(&self) -> &'static str {
        match self {
            Prediction::LikelyPathogenic => "Likely pathogenic",
            Prediction::LikelyBenign => "Likely benign",
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Prediction plus its confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub prediction: Prediction,
    pub confidence: f64,
}

/// Scorer output before the genomic position is attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredVariant {
    pub reference: char,
    pub alternative: char,
    pub delta: ScoreDelta,
    pub classification: Classification,
}

impl ScoredVariant {
    pub fn at_position(self, position: u64) -> VariantCall {
        VariantCall {
            position,
            reference: self.reference,
            alternative: self.alternative,
            delta_score: self.delta.value(),
            prediction: self.classification.prediction,
            classification_confidence: self.classification.confidence,
        }
    }
}

/// Final analysis result returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantCall {
    pub position: u64,
    pub reference: char,
    pub alternative: char,
    pub delta_score: f64,
    pub prediction: Prediction,
    pub classification_confidence: f64,
}

/// Named chromosome with its length in bases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chromosome {
    pub name: String,
    pub size: u64,
}

/// A genome assembly served by the sequence service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeAssembly {
    /// Assembly id used in sequence queries (`hg38`)
    pub id: String,
    pub name: String,
    pub source_name: String,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_request_normalizes() {
        let req = VariantRequest::new(43119628, "g", "hg38", "17").unwrap();
        assert_eq!(req.alternative, 'G');
        assert_eq!(req.chromosome, "chr17");
        assert_eq!(req.genome_build, "hg38");
    }

    #[test]
    fn test_variant_request_rejects_bad_input() {
        assert!(VariantRequest::new(0, "A", "hg38", "chr1").is_err());
        assert!(VariantRequest::new(1, "N", "hg38", "chr1").is_err());
        assert!(VariantRequest::new(1, "AC", "hg38", "chr1").is_err());
        assert!(VariantRequest::new(1, "", "hg38", "chr1").is_err());
        assert!(VariantRequest::new(1, "A", " ", "chr1").is_err());
        assert!(VariantRequest::new(1, "A", "hg38", "").is_err());
    }

    #[test]
    fn test_variant_request_rejects_position_past_max() {
        assert!(VariantRequest::new(MAX_POSITION, "A", "hg38", "chr1").is_ok());
        assert!(matches!(
            VariantRequest::new(u64::MAX, "A", "hg38", "chr1"),
            Err(AnalysisError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_window_uppercases() {
        let window = SequenceWindow::new("acgtn", 10, 15).unwrap();
        assert_eq!(window.sequence(), "ACGTN");
        assert!(!window.is_truncated());
    }

    #[test]
    fn test_window_rejects_non_ascii() {
        assert!(matches!(
            SequenceWindow::new("ACGé", 0, 4),
            Err(AnalysisError::UpstreamDataError(_))
        ));
    }

    #[test]
    fn test_relative_offset() {
        let window = SequenceWindow::new("ACGTACGT", 100, 108).unwrap();
        // position 101 is 0-based 100, the first base
        assert_eq!(window.relative_offset(101).unwrap(), 0);
        assert_eq!(window.relative_offset(108).unwrap(), 7);
        assert!(window.relative_offset(100).is_err());
        assert!(window.relative_offset(109).is_err());
    }

    #[test]
    fn test_relative_offset_uses_actual_length() {
        // asked for [100, 110), got 4 bases
        let window = SequenceWindow::new("ACGT", 100, 110).unwrap();
        assert!(window.is_truncated());

        match window.relative_offset(106) {
            Err(AnalysisError::PositionOutOfWindow { position, start, end }) => {
                assert_eq!(position, 106);
                assert_eq!(start, 101);
                assert_eq!(end, 104);
            }
            other => panic!("expected PositionOutOfWindow, got {:?}", other),
        }
    }

    #[test]
    fn test_prediction_serializes_as_label() {
        let json = serde_json::to_string(&Prediction::LikelyPathogenic).unwrap();
        assert_eq!(json, "\"Likely pathogenic\"");
        let json = serde_json::to_string(&Prediction::LikelyBenign).unwrap();
        assert_eq!(json, "\"Likely benign\"");
    }

    #[test]
    fn test_variant_call_json_shape() {
        let call = VariantCall {
            position: 43119628,
            reference: 'A',
            alternative: 'G',
            delta_score: -0.002,
            prediction: Prediction::LikelyPathogenic,
            classification_confidence: 0.71,
        };

        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["position"], 43119628);
        assert_eq!(value["reference"], "A");
        assert_eq!(value["alternative"], "G");
        assert_eq!(value["prediction"], "Likely pathogenic");
        assert_eq!(value["classification_confidence"], 0.71);
    }
}

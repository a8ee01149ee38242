use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::AnalysisError;
use crate::models::domain::{parse_base, VariantRequest, MAX_POSITION};

/// Request to analyze a single-nucleotide variant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzeVariantRequest {
    #[validate(range(min = 1, max = MAX_POSITION))]
    #[serde(alias = "variant_position")]
    pub position: u64,
    #[validate(custom(function = "validate_base"))]
    pub alternative: String,
    #[validate(length(min = 1))]
    #[serde(alias = "genomeId", alias = "genome_build")]
    pub genome: String,
    #[validate(length(min = 1))]
    pub chromosome: String,
}

fn validate_base(value: &str) -> Result<(), ValidationError> {
    parse_base(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_base"))
}

impl AnalyzeVariantRequest {
    pub fn to_variant(&self) -> Result<VariantRequest, AnalysisError> {
        VariantRequest::new(self.position, &self.alternative, &self.genome, &self.chromosome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_variant_position_alias() {
        let req: AnalyzeVariantRequest = serde_json::from_str(
            r#"{"variant_position": 43119628, "alternative": "G", "genome": "hg38", "chromosome": "chr17"}"#,
        )
        .unwrap();

        assert_eq!(req.position, 43119628);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_base() {
        let req = AnalyzeVariantRequest {
            position: 10,
            alternative: "X".to_string(),
            genome: "hg38".to_string(),
            chromosome: "chr1".to_string(),
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("alternative"));
    }

    #[test]
    fn test_validation_rejects_zero_position() {
        let req = AnalyzeVariantRequest {
            position: 0,
            alternative: "A".to_string(),
            genome: "hg38".to_string(),
            chromosome: "chr1".to_string(),
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_overflowing_position() {
        let req: AnalyzeVariantRequest = serde_json::from_str(
            r#"{"position": 18446744073709551615, "alternative": "A", "genome": "hg38", "chromosome": "chr1"}"#,
        )
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("position"));
        assert!(req.to_variant().is_err());
    }
}

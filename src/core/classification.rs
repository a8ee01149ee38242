use crate::models::{Classification, Prediction, ScoreDelta};

/// Delta below which a variant is called likely pathogenic
pub const PATHOGENIC_THRESHOLD: f64 = -0.0009178519;

/// Spread of deltas among known loss-of-function variants
pub const LOF_STD: f64 = 0.0015140239;

/// Spread of deltas among known functional variants
pub const FUNC_STD: f64 = 0.0009016589;

/// Threshold rule for turning a score delta into a call
///
/// Confidence is the distance from the threshold measured in units of the
/// spread of the population on the same side, capped at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationParams {
    pub threshold: f64,
    pub lof_std: f64,
    pub func_std: f64,
}

impl Default for ClassificationParams {
    fn default() -> Self {
        Self {
            threshold: PATHOGENIC_THRESHOLD,
            lof_std: LOF_STD,
            func_std: FUNC_STD,
        }
    }
}

impl ClassificationParams {
    pub fn classify(&self, delta: ScoreDelta) -> Classification {
        let delta = delta.value();
        let distance = (delta - self.threshold).abs();

        if delta < self.threshold {
            Classification {
                prediction: Prediction::LikelyPathogenic,
                confidence: (distance / self.lof_std).min(1.0),
            }
        } else {
            Classification {
                prediction: Prediction::LikelyBenign,
                confidence: (distance / self.func_std).min(1.0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(delta: f64) -> Classification {
        ClassificationParams::default().classify(ScoreDelta::from_scores(0.0, delta))
    }

    #[test]
    fn test_threshold_boundary_is_benign() {
        let result = classify(PATHOGENIC_THRESHOLD);
        assert_eq!(result.prediction, Prediction::LikelyBenign);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_below_threshold_is_pathogenic() {
        let result = classify(-0.0015);
        assert_eq!(result.prediction, Prediction::LikelyPathogenic);
        let expected = (-0.0015 - PATHOGENIC_THRESHOLD).abs() / LOF_STD;
        assert!((result.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn test_above_threshold_uses_func_std() {
        let result = classify(-0.0005);
        assert_eq!(result.prediction, Prediction::LikelyBenign);
        let expected = (-0.0005 - PATHOGENIC_THRESHOLD).abs() / FUNC_STD;
        assert!((result.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_is_asymmetric() {
        let offset = 0.0003;
        let below = classify(PATHOGENIC_THRESHOLD - offset);
        let above = classify(PATHOGENIC_THRESHOLD + offset);

        assert!(below.confidence < above.confidence);
    }

    #[test]
    fn test_confidence_capped() {
        assert_eq!(classify(-1.0).confidence, 1.0);
        assert_eq!(classify(1.0).confidence, 1.0);
        assert_eq!(classify(f64::MAX).confidence, 1.0);
        assert_eq!(classify(-f64::MAX).confidence, 1.0);
    }
}

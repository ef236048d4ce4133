use analysis_core::{AnalysisError, EvaluationConfig, FinancialSnapshot, NormalizedMetrics, ValuationResult};
use serde::{Deserialize, Serialize};

pub mod normalizer;
pub mod valuation;

pub use normalizer::normalize;
pub use valuation::{
    dcf_value, gordon_growth_value, graham_number, margin_of_safety, mean_reversion_value,
    peg_value, peter_lynch_value, resolve_discount_rate, value_all, value_with, DcfInputs,
    DiscountRateSource,
};

/// Normalized inputs plus every configured fair-value estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalAnalysis {
    pub metrics: NormalizedMetrics,
    pub valuations: Vec<ValuationResult>,
}

impl FundamentalAnalysis {
    /// Valuations that produced a number
    pub fn applicable(&self) -> impl Iterator<Item = &ValuationResult> {
        self.valuations.iter().filter(|v| v.is_applicable())
    }
}

pub struct FundamentalAnalysisEngine;

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a snapshot and run the configured valuation methods on it.
    pub fn analyze(
        &self,
        snapshot: &FinancialSnapshot,
        config: &EvaluationConfig,
    ) -> Result<FundamentalAnalysis, AnalysisError> {
        let metrics = normalize(snapshot)?;
        let valuations = value_all(&metrics, config);

        tracing::debug!(
            "{}: {}/{} valuation methods applicable",
            metrics.symbol,
            valuations.iter().filter(|v| v.is_applicable()).count(),
            valuations.len()
        );

        Ok(FundamentalAnalysis { metrics, valuations })
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_rejects_invalid_snapshot() {
        let engine = FundamentalAnalysisEngine::new();
        let snapshot = FinancialSnapshot::new("BAD", -3.0);
        assert!(matches!(
            engine.analyze(&snapshot, &EvaluationConfig::default()),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_analyze_with_empty_snapshot_marks_everything_not_applicable() {
        let engine = FundamentalAnalysisEngine::new();
        let snapshot = FinancialSnapshot::new("BARE", 10.0);
        let analysis = engine.analyze(&snapshot, &EvaluationConfig::default()).unwrap();
        assert_eq!(analysis.valuations.len(), 4);
        assert_eq!(analysis.applicable().count(), 0);
        assert!(analysis.valuations.iter().all(|v| !v.margin_of_safety.is_available()));
    }
}

use analysis_core::{EvaluationConfig, MomentumMetrics, NormalizedMetrics, ValuationResult};

use crate::dimensions::*;
use crate::models::*;

/// Share of a dimension's weight at or above which it counts as a strength
pub const STRENGTH_THRESHOLD: f64 = 0.8;
/// Share of a dimension's weight below which it counts as a concern
pub const CONCERN_THRESHOLD: f64 = 0.4;

pub struct AiScoringEngine;

impl AiScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Combine normalized metrics, valuations and momentum into the five
    /// weighted dimension scores.
    pub fn score(
        &self,
        metrics: &NormalizedMetrics,
        valuations: &[ValuationResult],
        momentum: &MomentumMetrics,
        config: &EvaluationConfig,
    ) -> ScoreBreakdown {
        score(metrics, valuations, momentum, config)
    }
}

impl Default for AiScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub fn score(
    metrics: &NormalizedMetrics,
    valuations: &[ValuationResult],
    momentum: &MomentumMetrics,
    config: &EvaluationConfig,
) -> ScoreBreakdown {
    let dimensions: Vec<DimensionScore> = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let components = match dimension {
                Dimension::Valuation => valuation_components(valuations),
                Dimension::FinancialHealth => financial_health_components(metrics),
                Dimension::Growth => growth_components(metrics, &config.growth_clamp),
                Dimension::Momentum => momentum_components(momentum),
                Dimension::Risk => risk_components(metrics),
            };
            score_dimension(dimension, dimension.weight(&config.weights), components)
        })
        .collect();

    // Weights may overshoot 100 by the validation tolerance
    let total = dimensions.iter().map(|d| d.score).sum::<f64>().clamp(0.0, 100.0);
    let recommendation = Recommendation::from_score(total);

    let mut strengths = Vec::new();
    let mut concerns = Vec::new();
    for d in dimensions.iter().filter(|d| !d.degraded) {
        match d.fraction() {
            Some(f) if f >= STRENGTH_THRESHOLD => strengths.push(d.dimension.as_str().to_string()),
            Some(f) if f < CONCERN_THRESHOLD => concerns.push(d.dimension.as_str().to_string()),
            _ => {}
        }
    }

    tracing::debug!(
        "{}: total {:.2} ({}), {} degraded dimension(s)",
        metrics.symbol,
        total,
        recommendation.as_str(),
        dimensions.iter().filter(|d| d.degraded).count()
    );

    ScoreBreakdown {
        dimensions,
        total,
        recommendation,
        strengths,
        concerns,
    }
}

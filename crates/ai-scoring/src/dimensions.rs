use analysis_core::stats::{mean, weighted_mean};
use analysis_core::{GrowthClamp, MomentumMetrics, NormalizedMetrics, ValuationResult};

use crate::curves::{self, interpolate};
use crate::models::{ComponentScore, Dimension, DimensionScore};

/// Fold components into a dimension score in [0, max].
///
/// Unknown components drop out and the remaining weights are re-normalized.
/// With nothing known the dimension takes the midpoint and is marked degraded.
pub fn score_dimension(dimension: Dimension, max: f64, components: Vec<ComponentScore>) -> DimensionScore {
    let pairs: Vec<(Option<f64>, f64)> = components.iter().map(|c| (c.value, c.weight)).collect();
    let (score, degraded) = match weighted_mean(&pairs) {
        Some(fraction) => ((fraction.clamp(0.0, 1.0) * max).clamp(0.0, max), false),
        None => {
            tracing::debug!("{}: no known components, scoring midpoint", dimension.as_str());
            (max / 2.0, true)
        }
    };
    DimensionScore {
        dimension,
        score,
        max,
        components,
        degraded,
    }
}

/// Mean margin of safety over applicable valuations, clamped to [-1, 1] and
/// mapped linearly onto [0, 1].
pub fn valuation_components(valuations: &[ValuationResult]) -> Vec<ComponentScore> {
    let margins: Vec<f64> = valuations
        .iter()
        .filter_map(|v| v.margin_of_safety.value())
        .collect();
    let value = mean(&margins).map(|m| (m.clamp(-1.0, 1.0) + 1.0) / 2.0);
    vec![ComponentScore::new("margin_of_safety", 1.0, value)]
}

pub fn financial_health_components(metrics: &NormalizedMetrics) -> Vec<ComponentScore> {
    let fcf = metrics.free_cash_flow.map(|fcf| {
        if fcf <= 0.0 {
            0.0
        } else {
            metrics
                .fcf_yield
                .map(|y| interpolate(y, curves::FCF_YIELD))
                .unwrap_or(curves::POSITIVE_FCF_DEFAULT)
        }
    });

    vec![
        ComponentScore::new(
            "debt_to_equity",
            6.0,
            metrics.debt_to_equity.map(|de| interpolate(de, curves::DEBT_TO_EQUITY)),
        ),
        ComponentScore::new("free_cash_flow", 8.0, fcf),
        ComponentScore::new(
            "return_on_equity",
            4.0,
            metrics.return_on_equity.map(|r| interpolate(r, curves::PROFITABILITY)),
        ),
        ComponentScore::new(
            "net_margin",
            3.0,
            metrics.net_margin.map(|m| interpolate(m, curves::PROFITABILITY)),
        ),
        ComponentScore::new(
            "gross_margin",
            1.0,
            metrics.gross_margin.map(|m| interpolate(m, curves::GROSS_MARGIN)),
        ),
    ]
}

/// Growth inputs are clamped to `clamp` before scoring.
pub fn growth_components(metrics: &NormalizedMetrics, clamp: &GrowthClamp) -> Vec<ComponentScore> {
    let annual = |g: Option<f64>| g.map(|g| interpolate(clamp.apply(g), curves::ANNUAL_GROWTH));

    vec![
        ComponentScore::new("revenue_growth_1y", 6.0, annual(metrics.revenue_growth_1y)),
        ComponentScore::new("revenue_growth_3y_avg", 2.0, annual(metrics.revenue_growth_3y_avg)),
        ComponentScore::new("earnings_growth", 8.0, annual(metrics.earnings_growth)),
        ComponentScore::new(
            "earnings_quarterly_growth",
            4.0,
            metrics
                .earnings_quarterly_growth
                .map(|g| interpolate(clamp.apply(g), curves::QUARTERLY_GROWTH)),
        ),
    ]
}

pub fn momentum_components(momentum: &MomentumMetrics) -> Vec<ComponentScore> {
    vec![
        ComponentScore::new(
            "rs_rating",
            1.0,
            momentum.rs_rating.value().map(|r| interpolate(r as f64, curves::RS_RATING)),
        ),
        ComponentScore::new(
            "return_3m",
            1.0,
            momentum.return_3m.value().map(|r| interpolate(r, curves::RETURN_3M)),
        ),
        ComponentScore::new(
            "return_6m",
            1.0,
            momentum.return_6m.value().map(|r| interpolate(r, curves::RETURN_6M)),
        ),
    ]
}

/// Higher risk scores lower.
pub fn risk_components(metrics: &NormalizedMetrics) -> Vec<ComponentScore> {
    vec![
        ComponentScore::new("beta", 5.0, metrics.beta.map(|b| interpolate(b, curves::BETA))),
        ComponentScore::new(
            "range_position",
            5.0,
            metrics.range_position.map(|p| interpolate(p, curves::RANGE_POSITION)),
        ),
        ComponentScore::new(
            "analyst_rating",
            5.0,
            metrics.analyst_rating.map(|r| interpolate(r, curves::ANALYST_RATING)),
        ),
    ]
}

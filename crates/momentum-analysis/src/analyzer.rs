use analysis_core::{Measure, MomentumMetrics, PriceSeries, ReferenceUniverse, RsWeights};

use crate::relative_strength::*;
use crate::returns::*;

pub struct MomentumAnalysisEngine;

impl MomentumAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// Trailing returns and relative-strength metrics for one security.
    ///
    /// Never fails: windows the history cannot cover come back as
    /// `InsufficientData`, and ranking against an empty universe does too.
    pub fn analyze(
        &self,
        series: &PriceSeries,
        universe: &ReferenceUniverse,
        weights: &RsWeights,
    ) -> MomentumMetrics {
        let closes = series.closes();

        let return_3m = trailing_return(&closes, LOOKBACK_3M);
        let return_6m = trailing_return(&closes, LOOKBACK_6M);
        let return_12m = trailing_return(&closes, LOOKBACK_12M);
        let composite = rs_composite(&closes, weights);

        let rs_rating = match &composite {
            Measure::Value(c) => rs_rating(*c, &universe.composites()),
            other => other.clone().map(|_| 0u8),
        };
        let rs_percentile = match &return_6m {
            Measure::Value(r) => rs_percentile(*r, &universe.returns_6m()),
            other => other.clone(),
        };
        let excess_return_6m = excess_return(&return_6m, universe.benchmark_return_6m);
        let relative_strength = relative_strength_label(&excess_return_6m);

        if !composite.is_available() {
            tracing::debug!(
                "Momentum: {} closes, RS composite unavailable ({:?})",
                closes.len(),
                composite
            );
        }

        MomentumMetrics {
            return_3m,
            return_6m,
            return_12m,
            rs_composite: composite,
            rs_percentile,
            rs_rating,
            excess_return_6m,
            relative_strength,
        }
    }
}

impl Default for MomentumAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

use analysis_core::stats::percentile_rank;
use analysis_core::{Measure, PeerPerformance, PriceSeries, ReferenceUniverse, RelativeStrengthLabel, RsWeights};
use rayon::prelude::*;

use crate::returns::{rs_composite, trailing_return, LOOKBACK_6M};

/// Lowest and highest IBD-style rating
pub const RS_RATING_MIN: u8 = 1;
pub const RS_RATING_MAX: u8 = 99;

/// Map a composite onto 1-99 by its percentile within the universe's composites.
///
/// Equal composites always receive equal ratings: the percentile depends only
/// on the value and the set, never on position in the list.
pub fn rs_rating(composite: f64, universe_composites: &[f64]) -> Measure<u8> {
    match percentile_rank(composite, universe_composites) {
        Some(pct) => {
            let span = (RS_RATING_MAX - RS_RATING_MIN) as f64;
            let rating = (RS_RATING_MIN as f64 + (pct * span).round()) as u8;
            Measure::Value(rating.clamp(RS_RATING_MIN, RS_RATING_MAX))
        }
        None => Measure::InsufficientData {
            required: 1,
            available: 0,
        },
    }
}

/// Percentile (0-100) of a trailing return within the peers' returns.
pub fn rs_percentile(trailing: f64, peer_returns: &[f64]) -> Measure {
    match percentile_rank(trailing, peer_returns) {
        Some(pct) => Measure::Value(pct * 100.0),
        None => Measure::InsufficientData {
            required: 1,
            available: 0,
        },
    }
}

/// Security return minus benchmark return over the same window.
pub fn excess_return(trailing: &Measure, benchmark: Option<f64>) -> Measure {
    match (trailing, benchmark) {
        (Measure::Value(r), Some(b)) => Measure::finite(r - b, "excess return"),
        (Measure::Value(_), None) => Measure::not_applicable("no benchmark return in reference universe"),
        (other, _) => other.clone(),
    }
}

pub fn relative_strength_label(excess: &Measure) -> Option<RelativeStrengthLabel> {
    excess.value().map(RelativeStrengthLabel::from_excess_return)
}

/// Build a reference universe from peer price histories using the same
/// return and composite definitions the analyzer applies to the security.
/// Peers with too little history contribute `None` and are skipped in ranking.
pub fn build_reference_universe(
    peers: &[(String, PriceSeries)],
    weights: &RsWeights,
    benchmark: Option<&PriceSeries>,
) -> ReferenceUniverse {
    let peers: Vec<PeerPerformance> = peers
        .par_iter()
        .map(|(symbol, series)| {
            let closes = series.closes();
            PeerPerformance {
                symbol: symbol.clone(),
                rs_composite: rs_composite(&closes, weights).value(),
                return_6m: trailing_return(&closes, LOOKBACK_6M).value(),
            }
        })
        .collect();

    let benchmark_return_6m =
        benchmark.and_then(|series| trailing_return(&series.closes(), LOOKBACK_6M).value());

    tracing::debug!(
        "Reference universe built: {} peers, {} with composites",
        peers.len(),
        peers.iter().filter(|p| p.rs_composite.is_some()).count()
    );

    ReferenceUniverse {
        peers,
        benchmark_return_6m,
    }
}

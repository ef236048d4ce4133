use analysis_core::{Measure, RsWeights};

/// Calendar-to-trading-day approximation used for every lookback window
pub const TRADING_DAYS_PER_MONTH: usize = 21;
pub const LOOKBACK_3M: usize = 3 * TRADING_DAYS_PER_MONTH;
pub const LOOKBACK_6M: usize = 6 * TRADING_DAYS_PER_MONTH;
pub const LOOKBACK_9M: usize = 9 * TRADING_DAYS_PER_MONTH;
pub const LOOKBACK_12M: usize = 12 * TRADING_DAYS_PER_MONTH;

/// Return from the close `days` trading days before the latest close to the
/// latest close, as a fraction.
pub fn trailing_return(closes: &[f64], days: usize) -> Measure {
    let required = days + 1;
    if closes.len() < required {
        return Measure::InsufficientData {
            required,
            available: closes.len(),
        };
    }
    let latest = closes[closes.len() - 1];
    let prior = closes[closes.len() - 1 - days];
    period_return(prior, latest)
}

/// Quarterly returns, most recent quarter first.
pub fn quarterly_returns(closes: &[f64]) -> Measure<[f64; 4]> {
    let required = LOOKBACK_12M + 1;
    if closes.len() < required {
        return Measure::InsufficientData {
            required,
            available: closes.len(),
        };
    }
    let at = |days_back: usize| closes[closes.len() - 1 - days_back];
    let marks = [
        at(0),
        at(LOOKBACK_3M),
        at(LOOKBACK_6M),
        at(LOOKBACK_9M),
        at(LOOKBACK_12M),
    ];

    let mut quarters = [0.0; 4];
    for (i, quarter) in quarters.iter_mut().enumerate() {
        match period_return(marks[i + 1], marks[i]) {
            Measure::Value(r) => *quarter = r,
            Measure::NotApplicable(reason) => return Measure::NotApplicable(reason),
            Measure::InsufficientData { required, available } => {
                return Measure::InsufficientData { required, available }
            }
        }
    }
    Measure::Value(quarters)
}

/// IBD-style composite: quarterly returns blended by `weights`, normalized by
/// the weight sum so the composite stays on the scale of a quarterly return.
pub fn rs_composite(closes: &[f64], weights: &RsWeights) -> Measure {
    let total_weight: f64 = weights.0.iter().sum();
    if total_weight <= 0.0 {
        return Measure::not_applicable("RS quarter weights sum to zero");
    }
    match quarterly_returns(closes) {
        Measure::Value(quarters) => {
            let blended: f64 = quarters.iter().zip(weights.0.iter()).map(|(q, w)| q * w).sum();
            Measure::finite(blended / total_weight, "RS composite")
        }
        Measure::NotApplicable(reason) => Measure::NotApplicable(reason),
        Measure::InsufficientData { required, available } => {
            Measure::InsufficientData { required, available }
        }
    }
}

fn period_return(start: f64, end: f64) -> Measure {
    if !start.is_finite() || start <= 0.0 {
        return Measure::not_applicable("starting close is not positive");
    }
    Measure::finite((end - start) / start, "period return")
}

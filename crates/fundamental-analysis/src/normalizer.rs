use analysis_core::{AnalysisError, FinancialSnapshot, NormalizedMetrics};

/// Smallest denominator magnitude treated as defined.
const MIN_DENOMINATOR: f64 = 1e-12;

/// Validate a snapshot and derive the ratios the valuation and scoring stages need.
///
/// Physically impossible inputs abort with `InvalidInput`. Non-finite optional
/// inputs and ratios with undefined denominators become `None`.
pub fn normalize(snapshot: &FinancialSnapshot) -> Result<NormalizedMetrics, AnalysisError> {
    let symbol = snapshot.symbol.as_str();
    let price = snapshot.current_price;
    if !price.is_finite() || price <= 0.0 {
        tracing::warn!("{}: rejecting snapshot with price {}", symbol, price);
        return Err(AnalysisError::invalid_input(format!(
            "{symbol}: current price must be a positive number, got {price}"
        )));
    }

    let shares = non_negative(symbol, "shares_outstanding", snapshot.shares_outstanding)?;
    let total_debt = non_negative(symbol, "total_debt", snapshot.total_debt)?;
    let high = non_negative(symbol, "fifty_two_week_high", snapshot.fifty_two_week_high)?;
    let low = non_negative(symbol, "fifty_two_week_low", snapshot.fifty_two_week_low)?;
    let dividend_yield = non_negative(symbol, "dividend_yield", snapshot.dividend_yield)?;
    let dividend_per_share = non_negative(symbol, "dividend_per_share", snapshot.dividend_per_share)?;

    if let (Some(h), Some(l)) = (high, low) {
        if h < l {
            return Err(AnalysisError::invalid_input(format!(
                "{symbol}: 52-week high {h} is below 52-week low {l}"
            )));
        }
    }

    let analyst_rating = known(symbol, "analyst_rating", snapshot.analyst_rating);
    if let Some(rating) = analyst_rating {
        if !(1.0..=5.0).contains(&rating) {
            return Err(AnalysisError::invalid_input(format!(
                "{symbol}: analyst rating must be on the 1-5 scale, got {rating}"
            )));
        }
    }

    let trailing_eps = known(symbol, "trailing_eps", snapshot.trailing_eps);
    let earnings_growth = known(symbol, "earnings_growth", snapshot.earnings_growth);
    let free_cash_flow = known(symbol, "free_cash_flow", snapshot.free_cash_flow);
    let total_equity = known(symbol, "total_equity", snapshot.total_equity);

    let pe_ratio = trailing_eps.and_then(|eps| calculate_pe_ratio(price, eps));
    let peg_ratio = match (pe_ratio, earnings_growth) {
        (Some(pe), Some(growth)) => calculate_peg_ratio(pe, growth),
        _ => None,
    };
    let debt_to_equity = match (total_debt, total_equity) {
        (Some(debt), Some(equity)) => calculate_debt_to_equity(debt, equity),
        _ => None,
    };
    let (fcf_per_share, fcf_yield) = match (free_cash_flow, shares) {
        (Some(fcf), Some(shares)) => (
            ratio(fcf, shares),
            ratio(fcf, shares * price),
        ),
        _ => (None, None),
    };
    let range_position = match (high, low) {
        (Some(h), Some(l)) => calculate_range_position(price, h, l),
        _ => None,
    };

    Ok(NormalizedMetrics {
        symbol: snapshot.symbol.clone(),
        price,
        trailing_eps,
        forward_eps: known(symbol, "forward_eps", snapshot.forward_eps),
        earnings_growth,
        earnings_quarterly_growth: known(symbol, "earnings_quarterly_growth", snapshot.earnings_quarterly_growth),
        free_cash_flow,
        shares_outstanding: shares,
        fcf_per_share,
        fcf_yield,
        total_debt,
        total_equity,
        debt_to_equity,
        pe_ratio,
        peg_ratio,
        return_on_equity: known(symbol, "return_on_equity", snapshot.return_on_equity),
        gross_margin: known(symbol, "gross_margin", snapshot.gross_margin),
        net_margin: known(symbol, "net_margin", snapshot.net_margin),
        revenue_growth_1y: known(symbol, "revenue_growth_1y", snapshot.revenue_growth_1y),
        revenue_growth_3y_avg: known(symbol, "revenue_growth_3y_avg", snapshot.revenue_growth_3y_avg),
        beta: known(symbol, "beta", snapshot.beta),
        fifty_two_week_high: high,
        fifty_two_week_low: low,
        range_position,
        analyst_rating,
        required_return: known(symbol, "required_return", snapshot.required_return),
        dividend_yield,
        dividend_per_share,
        book_value_per_share: known(symbol, "book_value_per_share", snapshot.book_value_per_share),
        historical_pe: known(symbol, "historical_pe", snapshot.historical_pe),
    })
}

fn known(symbol: &str, field: &str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            tracing::debug!("{}: {} is {}, treating as unknown", symbol, field, v);
            None
        }
        None => None,
    }
}

fn non_negative(symbol: &str, field: &str, value: Option<f64>) -> Result<Option<f64>, AnalysisError> {
    match known(symbol, field, value) {
        Some(v) if v < 0.0 => {
            tracing::warn!("{}: rejecting negative {} ({})", symbol, field, v);
            Err(AnalysisError::invalid_input(format!(
                "{symbol}: {field} cannot be negative, got {v}"
            )))
        }
        other => Ok(other),
    }
}

/// Quotient for a strictly positive denominator.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > MIN_DENOMINATOR {
        Some(numerator / denominator).filter(|v| v.is_finite())
    } else {
        None
    }
}

fn calculate_pe_ratio(price: f64, eps: f64) -> Option<f64> {
    ratio(price, eps)
}

/// PEG with growth expressed in percentage points, as the ratio is quoted.
fn calculate_peg_ratio(pe: f64, growth: f64) -> Option<f64> {
    ratio(pe, growth * 100.0)
}

fn calculate_debt_to_equity(debt: f64, equity: f64) -> Option<f64> {
    ratio(debt, equity)
}

fn calculate_range_position(price: f64, high: f64, low: f64) -> Option<f64> {
    ratio(price - low, high - low).map(|p| p.clamp(0.0, 1.0))
}

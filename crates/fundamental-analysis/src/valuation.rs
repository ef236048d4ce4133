//! Independent fair-value estimates.
//!
//! Every method checks its own preconditions and returns
//! `Measure::NotApplicable` when they fail, so one method can never block
//! another and "can't value this way" stays distinct from a computed number.

use analysis_core::{EvaluationConfig, Measure, NormalizedMetrics, ValuationMethod, ValuationResult};

/// Graham's constant: a P/E of 15 times a P/B of 1.5
const GRAHAM_MULTIPLIER: f64 = 22.5;

/// Where the discount rate came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscountRateSource {
    Override,
    Snapshot,
    Capm { beta_assumed: bool },
}

/// Inputs to a discounted-cash-flow projection
#[derive(Debug, Clone, Copy)]
pub struct DcfInputs {
    pub free_cash_flow: f64,
    pub growth_rate: f64,
    pub discount_rate: f64,
    pub terminal_growth_rate: f64,
    pub horizon_years: u32,
    /// `None` means the cash flow is already per share
    pub shares_outstanding: Option<f64>,
}

/// Run every configured method, in configuration order.
pub fn value_all(metrics: &NormalizedMetrics, config: &EvaluationConfig) -> Vec<ValuationResult> {
    config
        .methods
        .iter()
        .map(|method| value_with(*method, metrics, config))
        .collect()
}

/// Run one method.
pub fn value_with(
    method: ValuationMethod,
    metrics: &NormalizedMetrics,
    config: &EvaluationConfig,
) -> ValuationResult {
    let mut notes = Vec::new();
    let fair_value = match method {
        ValuationMethod::Dcf => dcf(metrics, config, &mut notes),
        ValuationMethod::Peg => peg_value(metrics.trailing_eps, metrics.earnings_growth),
        ValuationMethod::PeterLynch => peter_lynch_value(
            metrics.trailing_eps,
            metrics.earnings_growth,
            metrics.dividend_yield,
            config.growth_ceiling,
            &mut notes,
        ),
        ValuationMethod::MeanReversion => {
            mean_reversion_value(metrics.price, metrics.trailing_eps, metrics.historical_pe)
        }
        ValuationMethod::GrahamNumber => {
            graham_number(metrics.trailing_eps, metrics.book_value_per_share)
        }
        ValuationMethod::DividendDiscount => dividend_discount(metrics, config, &mut notes),
    };
    let margin_of_safety = margin_of_safety(&fair_value, metrics.price);

    match &fair_value {
        Measure::Value(v) => tracing::debug!("{}: {} fair value {:.2}", metrics.symbol, method, v),
        Measure::NotApplicable(reason) => {
            tracing::debug!("{}: {} not applicable ({})", metrics.symbol, method, reason)
        }
        Measure::InsufficientData { .. } => {}
    }

    ValuationResult {
        method,
        fair_value,
        margin_of_safety,
        notes,
    }
}

/// (fair value - price) / price, carrying the fair value's inapplicability through.
pub fn margin_of_safety(fair_value: &Measure, price: f64) -> Measure {
    match fair_value {
        Measure::Value(fv) if price > 0.0 => Measure::finite((fv - price) / price, "margin of safety"),
        Measure::Value(_) => Measure::not_applicable("price is not positive"),
        other => other.clone(),
    }
}

/// Pick the discount rate: configured override, then the snapshot's required
/// return, then CAPM when a risk-free rate is configured.
pub fn resolve_discount_rate(
    metrics: &NormalizedMetrics,
    config: &EvaluationConfig,
) -> Option<(f64, DiscountRateSource)> {
    if let Some(rate) = config.discount_rate_override {
        return Some((rate, DiscountRateSource::Override));
    }
    if let Some(rate) = metrics.required_return.filter(|r| *r > 0.0) {
        return Some((rate, DiscountRateSource::Snapshot));
    }
    config.risk_free_rate.map(|rf| {
        let beta_assumed = metrics.beta.is_none();
        let beta = metrics.beta.unwrap_or(1.0);
        let rate = (rf + beta * config.equity_risk_premium).max(config.min_discount_rate);
        (rate, DiscountRateSource::Capm { beta_assumed })
    })
}

fn discount_rate_note(rate: f64, source: DiscountRateSource) -> String {
    match source {
        DiscountRateSource::Override => format!("discount rate {:.2}% from configuration override", rate * 100.0),
        DiscountRateSource::Snapshot => format!("discount rate {:.2}% from required return", rate * 100.0),
        DiscountRateSource::Capm { beta_assumed: false } => {
            format!("discount rate {:.2}% from CAPM", rate * 100.0)
        }
        DiscountRateSource::Capm { beta_assumed: true } => {
            format!("discount rate {:.2}% from CAPM with market beta 1.0 (beta unknown)", rate * 100.0)
        }
    }
}

fn dcf(metrics: &NormalizedMetrics, config: &EvaluationConfig, notes: &mut Vec<String>) -> Measure {
    let Some(fcf) = metrics.free_cash_flow else {
        return Measure::not_applicable("free cash flow unknown");
    };
    if fcf <= 0.0 {
        return Measure::not_applicable("free cash flow is not positive");
    }
    let Some(growth) = metrics.earnings_growth else {
        return Measure::not_applicable("growth rate unknown");
    };
    let Some((discount_rate, source)) = resolve_discount_rate(metrics, config) else {
        return Measure::not_applicable("no discount rate available");
    };
    notes.push(discount_rate_note(discount_rate, source));

    let shares = match metrics.shares_outstanding {
        Some(s) if s > 0.0 => Some(s),
        Some(_) => return Measure::not_applicable("shares outstanding is zero"),
        None => {
            notes.push("shares outstanding unknown; free cash flow treated as per-share".to_string());
            None
        }
    };

    dcf_value(&DcfInputs {
        free_cash_flow: fcf,
        growth_rate: growth,
        discount_rate,
        terminal_growth_rate: config.terminal_growth_rate,
        horizon_years: config.dcf_horizon_years,
        shares_outstanding: shares,
    })
}

/// Discounted cash flow with a perpetuity-growth terminal value.
///
/// Cash flow grows at `growth_rate` for `horizon_years`, each year discounted
/// at `discount_rate`; the terminal value is taken on the final projected year.
pub fn dcf_value(inputs: &DcfInputs) -> Measure {
    let DcfInputs {
        free_cash_flow,
        growth_rate,
        discount_rate,
        terminal_growth_rate,
        horizon_years,
        shares_outstanding,
    } = *inputs;

    if terminal_growth_rate >= discount_rate {
        return Measure::not_applicable(format!(
            "terminal growth {:.2}% is not below discount rate {:.2}%",
            terminal_growth_rate * 100.0,
            discount_rate * 100.0
        ));
    }
    if discount_rate <= -1.0 || growth_rate <= -1.0 {
        return Measure::not_applicable("rates at or below -100% cannot be compounded");
    }
    if horizon_years == 0 {
        return Measure::not_applicable("projection horizon is zero years");
    }

    let horizon = horizon_years as i32;
    let projected_pv: f64 = (1..=horizon)
        .map(|year| {
            free_cash_flow * (1.0 + growth_rate).powi(year) / (1.0 + discount_rate).powi(year)
        })
        .sum();
    let final_fcf = free_cash_flow * (1.0 + growth_rate).powi(horizon);
    let terminal_value = final_fcf * (1.0 + terminal_growth_rate) / (discount_rate - terminal_growth_rate);
    let terminal_pv = terminal_value / (1.0 + discount_rate).powi(horizon);
    let equity_value = projected_pv + terminal_pv;

    let per_share = match shares_outstanding {
        Some(shares) if shares > 0.0 => equity_value / shares,
        Some(_) => return Measure::not_applicable("shares outstanding is zero"),
        None => equity_value,
    };
    Measure::finite(per_share, "DCF")
}

/// Fair value at PEG = 1: EPS times growth in percentage points.
pub fn peg_value(eps: Option<f64>, growth: Option<f64>) -> Measure {
    let (eps, growth) = match earnings_inputs(eps, growth) {
        Ok(inputs) => inputs,
        Err(reason) => return Measure::not_applicable(reason),
    };
    Measure::finite(eps * growth * 100.0, "PEG")
}

/// Lynch fair value: EPS times (growth + dividend yield) in percentage points,
/// with growth capped at `ceiling`.
pub fn peter_lynch_value(
    eps: Option<f64>,
    growth: Option<f64>,
    dividend_yield: Option<f64>,
    ceiling: f64,
    notes: &mut Vec<String>,
) -> Measure {
    let (eps, growth) = match earnings_inputs(eps, growth) {
        Ok(inputs) => inputs,
        Err(reason) => return Measure::not_applicable(reason),
    };
    let capped = growth.min(ceiling);
    if capped < growth {
        notes.push(format!(
            "growth {:.1}% capped at {:.1}% ceiling",
            growth * 100.0,
            ceiling * 100.0
        ));
    }
    let dividend = match dividend_yield {
        Some(y) => y,
        None => {
            notes.push("dividend yield unknown; no dividend adjustment".to_string());
            0.0
        }
    };
    Measure::finite(eps * (capped + dividend) * 100.0, "Peter Lynch")
}

/// Price re-rated from the current P/E to the historical average P/E.
pub fn mean_reversion_value(price: f64, eps: Option<f64>, historical_pe: Option<f64>) -> Measure {
    let Some(baseline) = historical_pe.filter(|pe| *pe > 0.0) else {
        return Measure::not_applicable("no positive historical P/E baseline");
    };
    let current_pe = match eps {
        Some(eps) if eps > 0.0 => price / eps,
        Some(_) => return Measure::not_applicable("current P/E is not positive"),
        None => return Measure::not_applicable("EPS unknown"),
    };
    if !current_pe.is_finite() || current_pe <= 0.0 {
        return Measure::not_applicable("current P/E is not positive");
    }
    Measure::finite(price * (baseline / current_pe), "mean reversion")
}

/// sqrt(22.5 * EPS * book value per share)
pub fn graham_number(eps: Option<f64>, book_value_per_share: Option<f64>) -> Measure {
    match (eps, book_value_per_share) {
        (Some(eps), Some(bvps)) if eps > 0.0 && bvps > 0.0 => {
            Measure::finite((GRAHAM_MULTIPLIER * eps * bvps).sqrt(), "Graham number")
        }
        (Some(_), Some(_)) => Measure::not_applicable("EPS and book value must both be positive"),
        _ => Measure::not_applicable("EPS or book value unknown"),
    }
}

fn dividend_discount(
    metrics: &NormalizedMetrics,
    config: &EvaluationConfig,
    notes: &mut Vec<String>,
) -> Measure {
    let Some(dividend) = metrics.dividend_per_share.filter(|d| *d > 0.0) else {
        return Measure::not_applicable("no dividend paid");
    };
    let Some((rate, source)) = resolve_discount_rate(metrics, config) else {
        return Measure::not_applicable("no discount rate available");
    };
    notes.push(discount_rate_note(rate, source));
    gordon_growth_value(dividend, rate, config.dividend_growth_rate)
}

/// D1 / (r - g) with D1 = D0 * (1 + g)
pub fn gordon_growth_value(dividend: f64, required_return: f64, growth: f64) -> Measure {
    if required_return <= growth {
        return Measure::not_applicable(format!(
            "dividend growth {:.2}% is not below required return {:.2}%",
            growth * 100.0,
            required_return * 100.0
        ));
    }
    let next_dividend = dividend * (1.0 + growth);
    Measure::finite(next_dividend / (required_return - growth), "dividend discount")
}

fn earnings_inputs(eps: Option<f64>, growth: Option<f64>) -> Result<(f64, f64), &'static str> {
    match (eps, growth) {
        (None, _) => Err("EPS unknown"),
        (_, None) => Err("growth rate unknown"),
        (Some(eps), _) if eps <= 0.0 => Err("EPS is not positive"),
        (_, Some(growth)) if growth <= 0.0 => Err("growth rate is not positive"),
        (Some(eps), Some(growth)) => Ok((eps, growth)),
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AnalysisError;

/// Result of a single computed metric.
///
/// `NotApplicable` and `InsufficientData` are first-class outcomes, not
/// errors: they are excluded from aggregation rather than read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Measure<T = f64> {
    Value(T),
    NotApplicable(String),
    InsufficientData { required: usize, available: usize },
}

impl<T: Copy> Measure<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Measure::Value(v) => Some(*v),
            _ => None,
        }
    }
}

impl<T> Measure<T> {
    pub fn not_applicable(reason: impl Into<String>) -> Self {
        Measure::NotApplicable(reason.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Measure::Value(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Measure<U> {
        match self {
            Measure::Value(v) => Measure::Value(f(v)),
            Measure::NotApplicable(reason) => Measure::NotApplicable(reason),
            Measure::InsufficientData { required, available } => {
                Measure::InsufficientData { required, available }
            }
        }
    }
}

impl Measure<f64> {
    /// Wrap a computed number, refusing to surface NaN or infinities.
    pub fn finite(value: f64, context: &str) -> Self {
        if value.is_finite() {
            Measure::Value(value)
        } else {
            Measure::NotApplicable(format!("{context} produced a non-finite result"))
        }
    }
}

/// Point-in-time financial inputs for one security.
///
/// Rates and ratios are fractions (0.15 = 15%). `analyst_rating` uses the
/// consensus-mean scale: 1.0 strong buy, 3.0 hold, 5.0 strong sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub symbol: String,
    pub current_price: f64,
    #[serde(default)]
    pub trailing_eps: Option<f64>,
    #[serde(default)]
    pub forward_eps: Option<f64>,
    /// Expected EPS growth rate
    #[serde(default)]
    pub earnings_growth: Option<f64>,
    #[serde(default)]
    pub earnings_quarterly_growth: Option<f64>,
    #[serde(default)]
    pub free_cash_flow: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub total_debt: Option<f64>,
    #[serde(default)]
    pub total_equity: Option<f64>,
    #[serde(default)]
    pub return_on_equity: Option<f64>,
    #[serde(default)]
    pub gross_margin: Option<f64>,
    #[serde(default)]
    pub net_margin: Option<f64>,
    #[serde(default)]
    pub revenue_growth_1y: Option<f64>,
    #[serde(default)]
    pub revenue_growth_3y_avg: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default)]
    pub analyst_rating: Option<f64>,
    /// Required return on equity used as the DCF discount rate
    #[serde(default)]
    pub required_return: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub dividend_per_share: Option<f64>,
    #[serde(default)]
    pub book_value_per_share: Option<f64>,
    /// Long-run average trailing P/E, the mean-reversion baseline
    #[serde(default)]
    pub historical_pe: Option<f64>,
}

impl FinancialSnapshot {
    /// Snapshot with only a price; every other field unknown.
    pub fn new(symbol: impl Into<String>, current_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            current_price,
            trailing_eps: None,
            forward_eps: None,
            earnings_growth: None,
            earnings_quarterly_growth: None,
            free_cash_flow: None,
            shares_outstanding: None,
            total_debt: None,
            total_equity: None,
            return_on_equity: None,
            gross_margin: None,
            net_margin: None,
            revenue_growth_1y: None,
            revenue_growth_3y_avg: None,
            beta: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            analyst_rating: None,
            required_return: None,
            dividend_yield: None,
            dividend_per_share: None,
            book_value_per_share: None,
            historical_pe: None,
        }
    }
}

/// Snapshot after validation: every number is finite or `None`, and every
/// derived ratio with an undefined denominator is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    pub symbol: String,
    pub price: f64,
    pub trailing_eps: Option<f64>,
    pub forward_eps: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub earnings_quarterly_growth: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub fcf_per_share: Option<f64>,
    pub fcf_yield: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_equity: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub gross_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub revenue_growth_1y: Option<f64>,
    pub revenue_growth_3y_avg: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    /// Position of the price inside the 52-week range, 0.0 at the low, 1.0 at the high
    pub range_position: Option<f64>,
    pub analyst_rating: Option<f64>,
    pub required_return: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub dividend_per_share: Option<f64>,
    pub book_value_per_share: Option<f64>,
    pub historical_pe: Option<f64>,
}

/// Daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chronological close prices with strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, AnalysisError> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(AnalysisError::invalid_input(format!(
                    "close on {} must be a positive number, got {}",
                    point.date, point.close
                )));
            }
            if i > 0 && point.date <= points[i - 1].date {
                return Err(AnalysisError::invalid_input(format!(
                    "price series is not strictly chronological at {}",
                    point.date
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = AnalysisError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        PriceSeries::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// Trailing performance of one peer in the reference universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerPerformance {
    pub symbol: String,
    #[serde(default)]
    pub rs_composite: Option<f64>,
    #[serde(default)]
    pub return_6m: Option<f64>,
}

/// Read-only peer set for relative-strength ranking. Treated as immutable
/// for the duration of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceUniverse {
    #[serde(default)]
    pub peers: Vec<PeerPerformance>,
    /// Benchmark (e.g. index ETF) 6-month return
    #[serde(default)]
    pub benchmark_return_6m: Option<f64>,
}

impl ReferenceUniverse {
    pub fn composites(&self) -> Vec<f64> {
        self.peers
            .iter()
            .filter_map(|p| p.rs_composite)
            .filter(|v| v.is_finite())
            .collect()
    }

    pub fn returns_6m(&self) -> Vec<f64> {
        self.peers
            .iter()
            .filter_map(|p| p.return_6m)
            .filter(|v| v.is_finite())
            .collect()
    }
}

/// Fair-value method identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    Dcf,
    Peg,
    PeterLynch,
    MeanReversion,
    GrahamNumber,
    DividendDiscount,
}

impl ValuationMethod {
    /// The four methods evaluated unless configured otherwise
    pub const CORE: [ValuationMethod; 4] = [
        ValuationMethod::Dcf,
        ValuationMethod::Peg,
        ValuationMethod::PeterLynch,
        ValuationMethod::MeanReversion,
    ];

    pub fn to_label(&self) -> &'static str {
        match self {
            ValuationMethod::Dcf => "DCF",
            ValuationMethod::Peg => "PEG",
            ValuationMethod::PeterLynch => "Peter Lynch",
            ValuationMethod::MeanReversion => "Mean Reversion",
            ValuationMethod::GrahamNumber => "Graham Number",
            ValuationMethod::DividendDiscount => "Dividend Discount",
        }
    }
}

impl fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

impl FromStr for ValuationMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "dcf" => Ok(ValuationMethod::Dcf),
            "peg" => Ok(ValuationMethod::Peg),
            "peter_lynch" | "lynch" => Ok(ValuationMethod::PeterLynch),
            "mean_reversion" => Ok(ValuationMethod::MeanReversion),
            "graham_number" | "graham" => Ok(ValuationMethod::GrahamNumber),
            "dividend_discount" | "ddm" => Ok(ValuationMethod::DividendDiscount),
            other => Err(AnalysisError::config(format!("unknown valuation method '{other}'"))),
        }
    }
}

/// One fair-value estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub method: ValuationMethod,
    pub fair_value: Measure,
    /// (fair value - price) / price
    pub margin_of_safety: Measure,
    /// Assumptions the estimate relied on
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ValuationResult {
    pub fn is_applicable(&self) -> bool {
        self.fair_value.is_available()
    }
}

/// Qualitative reading of the excess 6-month return over the benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeStrengthLabel {
    VeryStrong,
    Strong,
    Neutral,
    Weak,
    VeryWeak,
}

impl RelativeStrengthLabel {
    /// Classify an excess return expressed as a fraction.
    pub fn from_excess_return(excess: f64) -> Self {
        match excess {
            e if e > 0.20 => RelativeStrengthLabel::VeryStrong,
            e if e > 0.10 => RelativeStrengthLabel::Strong,
            e if e > -0.10 => RelativeStrengthLabel::Neutral,
            e if e > -0.20 => RelativeStrengthLabel::Weak,
            _ => RelativeStrengthLabel::VeryWeak,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            RelativeStrengthLabel::VeryStrong => "Very Strong",
            RelativeStrengthLabel::Strong => "Strong",
            RelativeStrengthLabel::Neutral => "Neutral",
            RelativeStrengthLabel::Weak => "Weak",
            RelativeStrengthLabel::VeryWeak => "Very Weak",
        }
    }
}

/// Trailing-return and relative-strength metrics. Returns are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumMetrics {
    pub return_3m: Measure,
    pub return_6m: Measure,
    pub return_12m: Measure,
    /// Weighted blend of the four most recent quarterly returns
    pub rs_composite: Measure,
    /// Rank of the 6-month return within the reference universe (0-100)
    pub rs_percentile: Measure,
    /// IBD-style relative-strength rating (1-99)
    pub rs_rating: Measure<u8>,
    pub excess_return_6m: Measure,
    pub relative_strength: Option<RelativeStrengthLabel>,
}

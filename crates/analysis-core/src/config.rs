use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::{AnalysisError, ValuationMethod};

const WEIGHT_SUM: f64 = 100.0;
const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Maximum points per scoring dimension. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub valuation: f64,
    pub financial_health: f64,
    pub growth: f64,
    pub momentum: f64,
    pub risk: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            valuation: 25.0,
            financial_health: 20.0,
            growth: 20.0,
            momentum: 20.0,
            risk: 15.0,
        }
    }
}

impl ScoreWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [self.valuation, self.financial_health, self.growth, self.momentum, self.risk]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.as_array().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::config("dimension weights must be finite and non-negative"));
        }
        let total = self.total();
        if (total - WEIGHT_SUM).abs() > WEIGHT_TOLERANCE {
            return Err(AnalysisError::config(format!(
                "dimension weights must sum to 100, got {total}"
            )));
        }
        Ok(())
    }
}

impl std::str::FromStr for ScoreWeights {
    type Err = AnalysisError;

    /// Parses "valuation,financial_health,growth,momentum,risk".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_list(s)?;
        match parts.as_slice() {
            [valuation, financial_health, growth, momentum, risk] => Ok(Self {
                valuation: *valuation,
                financial_health: *financial_health,
                growth: *growth,
                momentum: *momentum,
                risk: *risk,
            }),
            _ => Err(AnalysisError::config(format!(
                "expected 5 dimension weights, got {}",
                parts.len()
            ))),
        }
    }
}

/// Weights applied to the four most recent quarterly returns (most recent
/// first) when building the relative-strength composite.
///
/// There is no canonical public formula for the IBD blend; the default
/// doubles the most recent quarter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsWeights(pub [f64; 4]);

impl Default for RsWeights {
    fn default() -> Self {
        Self([0.4, 0.2, 0.2, 0.2])
    }
}

impl RsWeights {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.0.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::config("RS quarter weights must be finite and non-negative"));
        }
        if self.0.iter().sum::<f64>() <= 0.0 {
            return Err(AnalysisError::config("RS quarter weights must have a positive sum"));
        }
        Ok(())
    }
}

impl std::str::FromStr for RsWeights {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = parse_list(s)?;
        let weights: [f64; 4] = parts.as_slice().try_into().map_err(|_| {
            AnalysisError::config(format!("expected 4 RS quarter weights, got {}", parts.len()))
        })?;
        Ok(Self(weights))
    }
}

/// Range growth inputs are clamped to before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthClamp {
    pub min: f64,
    pub max: f64,
}

impl Default for GrowthClamp {
    fn default() -> Self {
        Self { min: -0.5, max: 1.0 }
    }
}

impl GrowthClamp {
    pub fn apply(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Immutable evaluation settings, passed explicitly into every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Replaces the snapshot's required return as the DCF/DDM discount rate
    pub discount_rate_override: Option<f64>,
    /// Perpetuity growth for the DCF terminal value
    pub terminal_growth_rate: f64,
    /// Peter Lynch growth ceiling
    pub growth_ceiling: f64,
    pub dcf_horizon_years: u32,
    pub weights: ScoreWeights,
    pub rs_weights: RsWeights,
    /// Valuation methods to run, in output order
    pub methods: Vec<ValuationMethod>,
    pub growth_clamp: GrowthClamp,
    /// Enables the CAPM discount-rate fallback when set
    pub risk_free_rate: Option<f64>,
    pub equity_risk_premium: f64,
    /// Floor applied to a CAPM-derived discount rate
    pub min_discount_rate: f64,
    /// Dividend growth assumption for the dividend discount model
    pub dividend_growth_rate: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            discount_rate_override: None,
            terminal_growth_rate: 0.03,
            growth_ceiling: 0.25,
            dcf_horizon_years: 5,
            weights: ScoreWeights::default(),
            rs_weights: RsWeights::default(),
            methods: ValuationMethod::CORE.to_vec(),
            growth_clamp: GrowthClamp::default(),
            risk_free_rate: None,
            equity_risk_premium: 0.055,
            min_discount_rate: 0.08,
            dividend_growth_rate: 0.05,
        }
    }
}

impl EvaluationConfig {
    /// Reject inconsistent settings before anything is computed.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.weights.validate()?;
        self.rs_weights.validate()?;

        if let Some(rate) = self.discount_rate_override {
            if !rate.is_finite() || rate <= 0.0 || rate >= 1.0 {
                return Err(AnalysisError::config(format!(
                    "discount rate override must be in (0, 1), got {rate}"
                )));
            }
        }
        if !self.terminal_growth_rate.is_finite() || self.terminal_growth_rate <= -1.0 {
            return Err(AnalysisError::config("terminal growth rate must be finite and above -100%"));
        }
        if !self.growth_ceiling.is_finite() || self.growth_ceiling <= 0.0 {
            return Err(AnalysisError::config("growth ceiling must be positive"));
        }
        if !(1..=50).contains(&self.dcf_horizon_years) {
            return Err(AnalysisError::config(format!(
                "DCF horizon must be between 1 and 50 years, got {}",
                self.dcf_horizon_years
            )));
        }
        for (i, method) in self.methods.iter().enumerate() {
            if self.methods[..i].contains(method) {
                return Err(AnalysisError::config(format!("valuation method {method} listed twice")));
            }
        }
        let clamp = self.growth_clamp;
        if !clamp.min.is_finite() || !clamp.max.is_finite() || clamp.min >= clamp.max {
            return Err(AnalysisError::config("growth clamp must satisfy min < max"));
        }
        if let Some(rf) = self.risk_free_rate {
            if !rf.is_finite() || rf < 0.0 {
                return Err(AnalysisError::config("risk-free rate must be finite and non-negative"));
            }
        }
        if !self.equity_risk_premium.is_finite() || self.equity_risk_premium < 0.0 {
            return Err(AnalysisError::config("equity risk premium must be finite and non-negative"));
        }
        if !self.min_discount_rate.is_finite() || self.min_discount_rate < 0.0 {
            return Err(AnalysisError::config("minimum discount rate must be finite and non-negative"));
        }
        if !self.dividend_growth_rate.is_finite() || self.dividend_growth_rate <= -1.0 {
            return Err(AnalysisError::config("dividend growth rate must be finite and above -100%"));
        }
        Ok(())
    }

    /// Build from environment variables, falling back to defaults, then validate.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            discount_rate_override: optional_env("VALUATION_DISCOUNT_RATE")?,
            terminal_growth_rate: env::var("VALUATION_TERMINAL_GROWTH")
                .unwrap_or_else(|_| defaults.terminal_growth_rate.to_string())
                .parse()
                .context("VALUATION_TERMINAL_GROWTH")?,
            growth_ceiling: env::var("VALUATION_GROWTH_CEILING")
                .unwrap_or_else(|_| defaults.growth_ceiling.to_string())
                .parse()
                .context("VALUATION_GROWTH_CEILING")?,
            dcf_horizon_years: env::var("VALUATION_DCF_YEARS")
                .unwrap_or_else(|_| defaults.dcf_horizon_years.to_string())
                .parse()
                .context("VALUATION_DCF_YEARS")?,
            weights: match env::var("SCORE_WEIGHTS") {
                Ok(raw) => raw.parse()?,
                Err(_) => defaults.weights,
            },
            rs_weights: match env::var("RS_QUARTER_WEIGHTS") {
                Ok(raw) => raw.parse()?,
                Err(_) => defaults.rs_weights,
            },
            methods: match env::var("VALUATION_METHODS") {
                Ok(raw) => raw
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(str::parse)
                    .collect::<Result<Vec<ValuationMethod>, _>>()?,
                Err(_) => defaults.methods,
            },
            growth_clamp: defaults.growth_clamp,
            risk_free_rate: optional_env("VALUATION_RISK_FREE_RATE")?,
            equity_risk_premium: env::var("VALUATION_EQUITY_RISK_PREMIUM")
                .unwrap_or_else(|_| defaults.equity_risk_premium.to_string())
                .parse()
                .context("VALUATION_EQUITY_RISK_PREMIUM")?,
            min_discount_rate: defaults.min_discount_rate,
            dividend_growth_rate: env::var("VALUATION_DIVIDEND_GROWTH")
                .unwrap_or_else(|_| defaults.dividend_growth_rate.to_string())
                .parse()
                .context("VALUATION_DIVIDEND_GROWTH")?,
        };

        config.validate()?;
        Ok(config)
    }
}

fn optional_env(key: &str) -> Result<Option<f64>> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            Ok(Some(raw.trim().parse().with_context(|| format!("{key} is not a number"))?))
        }
        _ => Ok(None),
    }
}

fn parse_list(s: &str) -> Result<Vec<f64>, AnalysisError> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| AnalysisError::config(format!("'{}' is not a number", part.trim())))
        })
        .collect()
}

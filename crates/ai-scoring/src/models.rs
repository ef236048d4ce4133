use analysis_core::ScoreWeights;
use serde::{Deserialize, Serialize};

/// The five scored dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Valuation,
    FinancialHealth,
    Growth,
    Momentum,
    Risk,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Valuation,
        Dimension::FinancialHealth,
        Dimension::Growth,
        Dimension::Momentum,
        Dimension::Risk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Valuation => "Valuation Attractiveness",
            Dimension::FinancialHealth => "Financial Health",
            Dimension::Growth => "Growth Potential",
            Dimension::Momentum => "Price Momentum",
            Dimension::Risk => "Risk Assessment",
        }
    }

    pub fn weight(&self, weights: &ScoreWeights) -> f64 {
        match self {
            Dimension::Valuation => weights.valuation,
            Dimension::FinancialHealth => weights.financial_health,
            Dimension::Growth => weights.growth,
            Dimension::Momentum => weights.momentum,
            Dimension::Risk => weights.risk,
        }
    }
}

/// One input to a dimension: its relative weight and its sub-score in [0, 1],
/// or `None` when the underlying metric is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub name: String,
    pub weight: f64,
    pub value: Option<f64>,
}

impl ComponentScore {
    pub fn new(name: &str, weight: f64, value: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            weight,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// Points earned, in [0, max]
    pub score: f64,
    /// Configured weight of the dimension
    pub max: f64,
    pub components: Vec<ComponentScore>,
    /// No component had a known value; score is the midpoint
    pub degraded: bool,
}

impl DimensionScore {
    /// Score as a fraction of the dimension weight
    pub fn fraction(&self) -> Option<f64> {
        if self.max > 0.0 {
            Some(self.score / self.max)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Watch,
    Avoid,
}

impl Recommendation {
    pub fn from_score(total: f64) -> Self {
        match total {
            s if s >= 90.0 => Recommendation::StrongBuy,
            s if s >= 75.0 => Recommendation::Buy,
            s if s >= 60.0 => Recommendation::Hold,
            s if s >= 40.0 => Recommendation::Watch,
            _ => Recommendation::Avoid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Watch => "Watch",
            Recommendation::Avoid => "Avoid",
        }
    }
}

/// Complete score for one security
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// In `Dimension::ALL` order
    pub dimensions: Vec<DimensionScore>,
    pub total: f64,
    pub recommendation: Recommendation,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

impl ScoreBreakdown {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    pub fn degraded(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.dimensions.iter().filter(|d| d.degraded).map(|d| d.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_tiers() {
        assert_eq!(Recommendation::from_score(95.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(90.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(80.0), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(60.0), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(45.0), Recommendation::Watch);
        assert_eq!(Recommendation::from_score(39.9), Recommendation::Avoid);
        assert_eq!(Recommendation::StrongBuy.as_str(), "Strong Buy");
    }

    #[test]
    fn test_dimension_weights() {
        let weights = ScoreWeights::default();
        let total: f64 = Dimension::ALL.iter().map(|d| d.weight(&weights)).sum();
        assert_eq!(total, 100.0);
        assert_eq!(Dimension::Valuation.weight(&weights), 25.0);
        assert_eq!(Dimension::Risk.as_str(), "Risk Assessment");
    }
}

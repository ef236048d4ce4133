//! Peer comparison: where a security ranks among its industry peers on each
//! valuation and quality metric, plus industry summary statistics.

use analysis_core::stats::{mean, median, min_max};
use analysis_core::NormalizedMetrics;
use serde::{Deserialize, Serialize};

/// Comparable metrics for one company. Unknown values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerMetrics {
    pub symbol: String,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub beta: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub profit_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub current_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl PeerMetrics {
    /// Derive comparable metrics from normalized inputs. Price/sales,
    /// EV/EBITDA and current ratio need revenue, enterprise value and balance
    /// sheet detail the snapshot does not carry, so they stay unknown.
    pub fn from_metrics(metrics: &NormalizedMetrics) -> Self {
        let per_price = |denominator: Option<f64>| {
            denominator
                .filter(|d| *d > 0.0)
                .map(|d| metrics.price / d)
                .filter(|v| v.is_finite())
        };
        Self {
            symbol: metrics.symbol.clone(),
            pe_ratio: metrics.pe_ratio,
            forward_pe: per_price(metrics.forward_eps),
            peg_ratio: metrics.peg_ratio,
            ev_ebitda: None,
            price_to_book: per_price(metrics.book_value_per_share),
            price_to_sales: None,
            debt_to_equity: metrics.debt_to_equity,
            beta: metrics.beta,
            return_on_equity: metrics.return_on_equity,
            profit_margin: metrics.net_margin,
            revenue_growth: metrics.revenue_growth_1y,
            earnings_growth: metrics.earnings_growth,
            current_ratio: None,
            dividend_yield: metrics.dividend_yield,
        }
    }

    /// `(name, value, direction)` for every ranked metric, in a fixed order.
    fn fields(&self) -> [(&'static str, Option<f64>, RankDirection); 14] {
        use RankDirection::*;
        [
            ("pe_ratio", self.pe_ratio, LowerIsBetter),
            ("forward_pe", self.forward_pe, LowerIsBetter),
            ("peg_ratio", self.peg_ratio, LowerIsBetter),
            ("ev_ebitda", self.ev_ebitda, LowerIsBetter),
            ("price_to_book", self.price_to_book, LowerIsBetter),
            ("price_to_sales", self.price_to_sales, LowerIsBetter),
            ("debt_to_equity", self.debt_to_equity, LowerIsBetter),
            ("beta", self.beta, LowerIsBetter),
            ("return_on_equity", self.return_on_equity, HigherIsBetter),
            ("profit_margin", self.profit_margin, HigherIsBetter),
            ("revenue_growth", self.revenue_growth, HigherIsBetter),
            ("earnings_growth", self.earnings_growth, HigherIsBetter),
            ("current_ratio", self.current_ratio, HigherIsBetter),
            ("dividend_yield", self.dividend_yield, HigherIsBetter),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDirection {
    LowerIsBetter,
    HigherIsBetter,
}

impl RankDirection {
    fn is_better(&self, a: f64, b: f64) -> bool {
        match self {
            RankDirection::LowerIsBetter => a < b,
            RankDirection::HigherIsBetter => a > b,
        }
    }
}

/// Target's standing on one metric among itself and the peers that report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRanking {
    pub metric: String,
    pub value: f64,
    pub direction: RankDirection,
    /// 1 is best; ties share the better position
    pub position: usize,
    pub total: usize,
    /// (total - position + 1) / total * 100
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryStats {
    pub metric: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerComparison {
    pub symbol: String,
    pub peer_count: usize,
    pub rankings: Vec<MetricRanking>,
    /// Computed over the target and its peers
    pub industry: Vec<IndustryStats>,
}

/// Rank `target` against `peers` metric by metric.
///
/// A metric the target does not report is not ranked. Industry statistics
/// cover every metric at least one company reports.
pub fn compare_with_peers(target: &PeerMetrics, peers: &[PeerMetrics]) -> PeerComparison {
    let peer_fields: Vec<_> = peers.iter().map(|p| p.fields()).collect();
    let mut rankings = Vec::new();
    let mut industry = Vec::new();

    for (i, (metric, target_value, direction)) in target.fields().into_iter().enumerate() {
        let target_value = target_value.filter(|v| v.is_finite());
        let peer_values: Vec<f64> = peer_fields
            .iter()
            .filter_map(|fields| fields[i].1)
            .filter(|v| v.is_finite())
            .collect();

        let mut all: Vec<f64> = peer_values.clone();
        all.extend(target_value);
        if let (Some(mean), Some(median), Some((min, max))) = (mean(&all), median(&all), min_max(&all)) {
            industry.push(IndustryStats {
                metric: metric.to_string(),
                count: all.len(),
                mean,
                median,
                min,
                max,
            });
        }

        if let Some(value) = target_value {
            let better = peer_values.iter().filter(|&&p| direction.is_better(p, value)).count();
            let position = better + 1;
            let total = peer_values.len() + 1;
            rankings.push(MetricRanking {
                metric: metric.to_string(),
                value,
                direction,
                position,
                total,
                percentile: (total - position + 1) as f64 / total as f64 * 100.0,
            });
        }
    }

    tracing::debug!(
        "{}: ranked on {} metrics against {} peers",
        target.symbol,
        rankings.len(),
        peers.len()
    );

    PeerComparison {
        symbol: target.symbol.clone(),
        peer_count: peers.len(),
        rankings,
        industry,
    }
}

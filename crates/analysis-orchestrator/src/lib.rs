use ai_scoring::{AiScoringEngine, ScoreBreakdown};
use analysis_core::{
    AnalysisError, DataProvider, EvaluationConfig, FinancialSnapshot, MomentumMetrics,
    NormalizedMetrics, PriceSeries, ReferenceUniverse, ReferenceUniverseProvider, ValuationResult,
};
use fundamental_analysis::FundamentalAnalysisEngine;
use momentum_analysis::MomentumAnalysisEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;

pub mod batch;
pub mod peers;

#[cfg(test)]
mod orchestrator_tests;

pub use batch::{evaluate_batch, rank_by_score, BatchEntry, BatchInput};
pub use peers::{compare_with_peers, IndustryStats, MetricRanking, PeerComparison, PeerMetrics, RankDirection};

/// Everything computed for one security in one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub symbol: String,
    pub metrics: NormalizedMetrics,
    pub valuations: Vec<ValuationResult>,
    pub momentum: MomentumMetrics,
    pub score: ScoreBreakdown,
}

/// Evaluate one security: normalize, value, measure momentum, score.
///
/// The configuration is validated before any computation runs. Valuation and
/// momentum are independent and run side by side.
pub fn evaluate(
    snapshot: &FinancialSnapshot,
    series: &PriceSeries,
    universe: &ReferenceUniverse,
    config: &EvaluationConfig,
) -> Result<Evaluation, AnalysisError> {
    config.validate()?;
    evaluate_validated(snapshot, series, universe, config)
}

/// `evaluate` for a configuration the caller has already validated.
pub(crate) fn evaluate_validated(
    snapshot: &FinancialSnapshot,
    series: &PriceSeries,
    universe: &ReferenceUniverse,
    config: &EvaluationConfig,
) -> Result<Evaluation, AnalysisError> {
    let (fundamental, momentum) = rayon::join(
        || FundamentalAnalysisEngine::new().analyze(snapshot, config),
        || MomentumAnalysisEngine::new().analyze(series, universe, &config.rs_weights),
    );
    let fundamental = fundamental?;

    let score = AiScoringEngine::new().score(
        &fundamental.metrics,
        &fundamental.valuations,
        &momentum,
        config,
    );

    tracing::info!(
        "Evaluated {}: score {:.1}/100 ({}), {}/{} valuations applicable",
        snapshot.symbol,
        score.total,
        score.recommendation.as_str(),
        fundamental.valuations.iter().filter(|v| v.is_applicable()).count(),
        fundamental.valuations.len()
    );

    Ok(Evaluation {
        symbol: snapshot.symbol.clone(),
        metrics: fundamental.metrics,
        valuations: fundamental.valuations,
        momentum,
        score,
    })
}

/// Provider-driven evaluation. All fetching completes before the pure
/// evaluation core runs.
pub struct ScoringOrchestrator {
    data_provider: Arc<dyn DataProvider>,
    universe_provider: Arc<dyn ReferenceUniverseProvider>,
    config: EvaluationConfig,
}

impl ScoringOrchestrator {
    /// Rejects an invalid configuration up front.
    pub fn new(
        data_provider: Arc<dyn DataProvider>,
        universe_provider: Arc<dyn ReferenceUniverseProvider>,
        config: EvaluationConfig,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            data_provider,
            universe_provider,
            config,
        })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub async fn evaluate_symbol(&self, symbol: &str) -> Result<Evaluation, AnalysisError> {
        tracing::debug!("Fetching inputs for {}", symbol);

        let (fetched, universe) = tokio::join!(
            self.data_provider.fetch(symbol),
            self.universe_provider.universe(),
        );
        let (snapshot, series) = fetched?;
        let universe = universe?;

        evaluate_validated(&snapshot, &series, &universe, &self.config)
    }

    /// Fetch and evaluate many symbols concurrently against one universe
    /// snapshot. Entries come back in input order; per-symbol failures are
    /// reported in their entry and do not abort the others.
    pub async fn evaluate_symbols(
        &self,
        symbols: &[String],
    ) -> Result<Vec<BatchEntry>, AnalysisError> {
        let universe = self.universe_provider.universe().await?;

        tracing::info!("Starting evaluation of {} symbols", symbols.len());

        let mut tasks = JoinSet::new();
        for (index, symbol) in symbols.iter().enumerate() {
            let provider = Arc::clone(&self.data_provider);
            let symbol = symbol.clone();
            tasks.spawn(async move { (index, provider.fetch(&symbol).await) });
        }

        let mut fetched: Vec<Option<_>> = symbols.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => fetched[index] = Some(result),
                Err(e) => tracing::error!("Fetch task error: {}", e),
            }
        }

        let entries: Vec<BatchEntry> = symbols
            .iter()
            .zip(fetched)
            .map(|(symbol, result)| {
                let result = match result {
                    Some(result) => result.and_then(|(snapshot, series)| {
                        evaluate_validated(&snapshot, &series, &universe, &self.config)
                    }),
                    None => Err(AnalysisError::Provider(format!("fetch task for {symbol} did not complete"))),
                };
                if let Err(e) = &result {
                    tracing::warn!("Failed to evaluate {}: {}", symbol, e);
                }
                BatchEntry::from_result(symbol.clone(), result)
            })
            .collect();

        tracing::info!(
            "Evaluation complete: {}/{} symbols scored",
            entries.iter().filter(|e| e.evaluation.is_some()).count(),
            symbols.len()
        );

        Ok(entries)
    }
}

use analysis_core::{AnalysisError, EvaluationConfig, FinancialSnapshot, PriceSeries, ReferenceUniverse};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{evaluate_validated, Evaluation};

/// Inputs for one security in a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    pub snapshot: FinancialSnapshot,
    pub prices: PriceSeries,
}

/// Outcome for one security in a batch; exactly one of `evaluation` and
/// `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub symbol: String,
    pub evaluation: Option<Evaluation>,
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn from_result(symbol: String, result: Result<Evaluation, AnalysisError>) -> Self {
        match result {
            Ok(evaluation) => Self {
                symbol,
                evaluation: Some(evaluation),
                error: None,
            },
            Err(e) => Self {
                symbol,
                evaluation: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.evaluation.is_some()
    }
}

/// Evaluate many securities in parallel against one shared universe.
///
/// An invalid configuration fails the whole batch before any work starts.
/// Otherwise every input yields an entry, in input order.
pub fn evaluate_batch(
    inputs: &[BatchInput],
    universe: &ReferenceUniverse,
    config: &EvaluationConfig,
) -> Result<Vec<BatchEntry>, AnalysisError> {
    config.validate()?;

    let entries: Vec<BatchEntry> = inputs
        .par_iter()
        .map(|input| {
            let result = evaluate_validated(&input.snapshot, &input.prices, universe, config);
            if let Err(e) = &result {
                tracing::warn!("Failed to evaluate {}: {}", input.snapshot.symbol, e);
            }
            BatchEntry::from_result(input.snapshot.symbol.clone(), result)
        })
        .collect();

    tracing::info!(
        "Batch complete: {}/{} securities scored",
        entries.iter().filter(|e| e.is_ok()).count(),
        inputs.len()
    );

    Ok(entries)
}

/// Best-first ordering by total score; ties keep their batch order.
pub fn rank_by_score(entries: &[BatchEntry]) -> Vec<&Evaluation> {
    let mut scored: Vec<&Evaluation> = entries.iter().filter_map(|e| e.evaluation.as_ref()).collect();
    scored.sort_by(|a, b| {
        b.score
            .total
            .partial_cmp(&a.score.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

#[cfg(test)]
mod tests {
    use crate::*;
    use ai_scoring::Dimension;
    use analysis_core::{
        AnalysisError, DataProvider, EvaluationConfig, FinancialSnapshot, Measure, PeerPerformance,
        PricePoint, PriceSeries, ReferenceUniverse, ReferenceUniverseProvider, ScoreWeights,
        ValuationMethod,
    };
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use std::sync::Arc;

    /// Closes chosen so the 3M return is +10% and the 6M return is +22%
    fn example_series() -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let mut closes = vec![100.0; 300];
        let n = closes.len();
        for close in closes.iter_mut().skip(n - 126) {
            *close = 110.9090909090909;
        }
        closes[n - 1] = 122.0;
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn short_series(len: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let points = (0..len)
            .map(|i| PricePoint {
                date: start + Duration::days(i as i64),
                close: 50.0 + i as f64,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn example_snapshot(symbol: &str) -> FinancialSnapshot {
        let mut s = FinancialSnapshot::new(symbol, 100.0);
        s.trailing_eps = Some(5.0);
        s.earnings_growth = Some(0.15);
        s.required_return = Some(0.08);
        s.free_cash_flow = Some(500.0);
        s.shares_outstanding = Some(100.0);
        s.total_debt = Some(40.0);
        s.total_equity = Some(100.0);
        s.return_on_equity = Some(0.18);
        s.beta = Some(1.1);
        s
    }

    fn universe() -> ReferenceUniverse {
        let peers = (0..10)
            .map(|i| PeerPerformance {
                symbol: format!("P{i}"),
                rs_composite: Some(-0.05 + 0.02 * i as f64),
                return_6m: Some(-0.10 + 0.04 * i as f64),
            })
            .collect();
        ReferenceUniverse {
            peers,
            benchmark_return_6m: Some(0.07),
        }
    }

    fn valuation<'a>(e: &'a Evaluation, method: ValuationMethod) -> &'a analysis_core::ValuationResult {
        e.valuations.iter().find(|v| v.method == method).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let e = evaluate(
            &example_snapshot("EXMPL"),
            &example_series(),
            &universe(),
            &EvaluationConfig::default(),
        )
        .unwrap();

        assert_relative_eq!(
            valuation(&e, ValuationMethod::Peg).fair_value.value().unwrap(),
            75.0,
            epsilon = 1e-9
        );
        let dcf = valuation(&e, ValuationMethod::Dcf).fair_value.value().unwrap();
        assert!(dcf.is_finite() && dcf > 0.0);

        assert_relative_eq!(e.momentum.return_3m.value().unwrap(), 0.10, epsilon = 1e-9);
        assert_relative_eq!(e.momentum.return_6m.value().unwrap(), 0.22, epsilon = 1e-9);
        assert_relative_eq!(e.momentum.excess_return_6m.value().unwrap(), 0.15, epsilon = 1e-9);

        let health = e.score.dimension(Dimension::FinancialHealth).unwrap();
        assert!(health.score > health.max / 2.0);
        assert!(e.score.total.is_finite());
        assert!((0.0..=100.0).contains(&e.score.total));
    }

    #[test]
    fn test_negative_growth_leaves_dcf_and_mean_reversion() {
        let mut s = example_snapshot("SHRINK");
        s.earnings_growth = Some(-0.05);
        s.historical_pe = Some(18.0);
        let e = evaluate(&s, &example_series(), &universe(), &EvaluationConfig::default()).unwrap();

        assert!(!valuation(&e, ValuationMethod::Peg).is_applicable());
        assert!(!valuation(&e, ValuationMethod::PeterLynch).is_applicable());
        assert!(valuation(&e, ValuationMethod::Dcf).is_applicable());
        assert!(valuation(&e, ValuationMethod::MeanReversion).is_applicable());
    }

    #[test]
    fn test_terminal_growth_at_discount_rate_disables_dcf() {
        let config = EvaluationConfig {
            terminal_growth_rate: 0.08,
            ..EvaluationConfig::default()
        };
        let e = evaluate(&example_snapshot("TG"), &example_series(), &universe(), &config).unwrap();
        assert!(matches!(
            valuation(&e, ValuationMethod::Dcf).fair_value,
            Measure::NotApplicable(_)
        ));
    }

    #[test]
    fn test_bad_weights_rejected_before_any_computation() {
        let config = EvaluationConfig {
            weights: ScoreWeights {
                valuation: 25.0,
                financial_health: 20.0,
                growth: 20.0,
                momentum: 20.0,
                risk: 5.0,
            },
            ..EvaluationConfig::default()
        };
        // An invalid snapshot would fail normalization; the config error wins.
        let bad = FinancialSnapshot::new("BAD", -1.0);
        let result = evaluate(&bad, &example_series(), &universe(), &config);
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_invalid_snapshot_rejected() {
        let bad = FinancialSnapshot::new("ZERO", 0.0);
        let result = evaluate(&bad, &example_series(), &universe(), &EvaluationConfig::default());
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn test_short_history_degrades_momentum_only() {
        let e = evaluate(
            &example_snapshot("NEW"),
            &short_series(30),
            &universe(),
            &EvaluationConfig::default(),
        )
        .unwrap();
        assert!(matches!(e.momentum.return_3m, Measure::InsufficientData { .. }));
        let momentum = e.score.dimension(Dimension::Momentum).unwrap();
        assert!(momentum.degraded);
        assert_relative_eq!(momentum.score, 10.0);
        assert!(!e.score.dimension(Dimension::FinancialHealth).unwrap().degraded);
    }

    #[test]
    fn test_identical_inputs_serialize_identically() {
        let run = || {
            let e = evaluate(
                &example_snapshot("SAME"),
                &example_series(),
                &universe(),
                &EvaluationConfig::default(),
            )
            .unwrap();
            serde_json::to_string(&e).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let inputs = vec![
            BatchInput {
                snapshot: example_snapshot("AAA"),
                prices: example_series(),
            },
            BatchInput {
                snapshot: FinancialSnapshot::new("BAD", f64::NAN),
                prices: example_series(),
            },
            BatchInput {
                snapshot: example_snapshot("CCC"),
                prices: short_series(10),
            },
        ];
        let entries = evaluate_batch(&inputs, &universe(), &EvaluationConfig::default()).unwrap();

        let symbols: Vec<&str> = entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BAD", "CCC"]);
        assert!(entries[0].is_ok());
        assert!(!entries[1].is_ok());
        assert!(entries[1].error.as_ref().unwrap().contains("Invalid input"));
        assert!(entries[2].is_ok());

        // Same inputs evaluated one at a time give the same result
        let single = evaluate(
            &inputs[0].snapshot,
            &inputs[0].prices,
            &universe(),
            &EvaluationConfig::default(),
        )
        .unwrap();
        assert_eq!(entries[0].evaluation.as_ref(), Some(&single));

        let ranked = rank_by_score(&entries);
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].score.total >= ranked[1].score.total);
    }

    #[test]
    fn test_batch_rejects_bad_config() {
        let config = EvaluationConfig {
            dcf_horizon_years: 0,
            ..EvaluationConfig::default()
        };
        let result = evaluate_batch(&[], &universe(), &config);
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }

    struct MockProvider;

    #[async_trait]
    impl DataProvider for MockProvider {
        async fn fetch(&self, symbol: &str) -> Result<(FinancialSnapshot, PriceSeries), AnalysisError> {
            match symbol {
                "MISSING" => Err(AnalysisError::Provider(format!("no data for {symbol}"))),
                "CRASH" => panic!("provider crashed on {symbol}"),
                _ => Ok((example_snapshot(symbol), example_series())),
            }
        }
    }

    struct MockUniverse;

    #[async_trait]
    impl ReferenceUniverseProvider for MockUniverse {
        async fn universe(&self) -> Result<ReferenceUniverse, AnalysisError> {
            Ok(universe())
        }
    }

    fn orchestrator() -> ScoringOrchestrator {
        ScoringOrchestrator::new(
            Arc::new(MockProvider),
            Arc::new(MockUniverse),
            EvaluationConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_symbol_matches_pure_path() {
        let via_provider = orchestrator().evaluate_symbol("MSFT").await.unwrap();
        let direct = evaluate(
            &example_snapshot("MSFT"),
            &example_series(),
            &universe(),
            &EvaluationConfig::default(),
        )
        .unwrap();
        assert_eq!(via_provider, direct);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let result = orchestrator().evaluate_symbol("MISSING").await;
        assert!(matches!(result, Err(AnalysisError::Provider(_))));
    }

    #[tokio::test]
    async fn test_evaluate_symbols_in_input_order() {
        let symbols: Vec<String> = ["ZZZ", "MISSING", "AAA"].iter().map(|s| s.to_string()).collect();
        let entries = orchestrator().evaluate_symbols(&symbols).await.unwrap();

        let order: Vec<&str> = entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(order, vec!["ZZZ", "MISSING", "AAA"]);
        assert!(entries[0].is_ok());
        assert!(entries[1].error.as_ref().unwrap().contains("no data"));
    }

    #[tokio::test]
    async fn test_panicking_fetch_still_yields_an_entry() {
        let symbols: Vec<String> = ["AAA", "CRASH", "BBB"].iter().map(|s| s.to_string()).collect();
        let entries = orchestrator().evaluate_symbols(&symbols).await.unwrap();

        let order: Vec<&str> = entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAA", "CRASH", "BBB"]);
        assert!(entries[0].is_ok());
        assert!(!entries[1].is_ok());
        assert!(entries[1].error.as_ref().unwrap().contains("did not complete"));
        assert!(entries[2].is_ok());
    }

    #[test]
    fn test_orchestrator_rejects_bad_config() {
        let config = EvaluationConfig {
            growth_ceiling: -1.0,
            ..EvaluationConfig::default()
        };
        let result = ScoringOrchestrator::new(Arc::new(MockProvider), Arc::new(MockUniverse), config);
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use analysis_core::{Measure, PeerPerformance, PricePoint, PriceSeries, ReferenceUniverse, RsWeights};
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    // Daily closes starting 2023-01-02, one point per day
    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
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

    fn linear_series(len: usize, start: f64, step: f64) -> PriceSeries {
        let closes: Vec<f64> = (0..len).map(|i| start + step * i as f64).collect();
        series_from(&closes)
    }

    fn universe(composites: &[f64], returns: &[f64], benchmark: Option<f64>) -> ReferenceUniverse {
        let peers = composites
            .iter()
            .zip(returns.iter())
            .enumerate()
            .map(|(i, (&c, &r))| PeerPerformance {
                symbol: format!("PEER{i}"),
                rs_composite: Some(c),
                return_6m: Some(r),
            })
            .collect();
        ReferenceUniverse {
            peers,
            benchmark_return_6m: benchmark,
        }
    }

    #[test]
    fn test_short_series_is_insufficient_not_zero() {
        let engine = MomentumAnalysisEngine::new();
        let series = linear_series(100, 100.0, 1.0);
        let m = engine.analyze(
            &series,
            &universe(&[0.1, 0.2], &[0.1, 0.2], Some(0.05)),
            &RsWeights::default(),
        );

        assert!(m.return_3m.is_available());
        assert_eq!(
            m.return_6m,
            Measure::InsufficientData {
                required: LOOKBACK_6M + 1,
                available: 100
            }
        );
        assert!(matches!(m.return_12m, Measure::InsufficientData { .. }));
        assert!(matches!(m.rs_composite, Measure::InsufficientData { .. }));
        assert!(matches!(m.rs_rating, Measure::InsufficientData { .. }));
        assert!(matches!(m.rs_percentile, Measure::InsufficientData { .. }));
        assert!(matches!(m.excess_return_6m, Measure::InsufficientData { .. }));
        assert!(m.relative_strength.is_none());
    }

    #[test]
    fn test_empty_series() {
        let m = MomentumAnalysisEngine::new().analyze(
            &PriceSeries::empty(),
            &ReferenceUniverse::default(),
            &RsWeights::default(),
        );
        assert_eq!(
            m.return_3m,
            Measure::InsufficientData {
                required: LOOKBACK_3M + 1,
                available: 0
            }
        );
    }

    #[test]
    fn test_full_history_returns() {
        let series = linear_series(253, 100.0, 1.0);
        let m = MomentumAnalysisEngine::new().analyze(
            &series,
            &ReferenceUniverse::default(),
            &RsWeights::default(),
        );

        // latest close 352; 63 days back 289; 126 back 226; 252 back 100
        assert_relative_eq!(m.return_3m.value().unwrap(), 63.0 / 289.0, epsilon = 1e-12);
        assert_relative_eq!(m.return_6m.value().unwrap(), 126.0 / 226.0, epsilon = 1e-12);
        assert_relative_eq!(m.return_12m.value().unwrap(), 252.0 / 100.0, epsilon = 1e-12);
        assert!(m.rs_composite.is_available());

        // No peers to rank against
        assert!(matches!(m.rs_rating, Measure::InsufficientData { .. }));
        assert!(!m.excess_return_6m.is_available());
    }

    #[test]
    fn test_equal_composites_receive_equal_ratings() {
        let engine = MomentumAnalysisEngine::new();
        let weights = RsWeights::default();
        let a = linear_series(253, 100.0, 0.5);
        let b = linear_series(253, 100.0, 0.5);

        let composite = rs_composite(&a.closes(), &weights).value().unwrap();
        let peers = universe(
            &[composite - 0.1, composite, composite + 0.1, composite],
            &[0.0, 0.1, 0.2, 0.3],
            None,
        );

        let ma = engine.analyze(&a, &peers, &weights);
        let mb = engine.analyze(&b, &peers, &weights);
        assert_eq!(ma.rs_rating, mb.rs_rating);

        // Peer order must not change the rating
        let mut reordered = peers.clone();
        reordered.peers.reverse();
        assert_eq!(engine.analyze(&a, &reordered, &weights).rs_rating, ma.rs_rating);
        assert_eq!(ma.rs_rating, Measure::Value(50));
    }

    #[test]
    fn test_rating_stays_in_range() {
        let engine = MomentumAnalysisEngine::new();
        let weights = RsWeights::default();
        let peers = universe(&[-0.5, -0.4, -0.3], &[-0.5, -0.4, -0.3], Some(-0.4));

        let strong = engine.analyze(&linear_series(253, 50.0, 2.0), &peers, &weights);
        assert_eq!(strong.rs_rating, Measure::Value(99));
        assert_relative_eq!(strong.rs_percentile.value().unwrap(), 100.0);
        assert_eq!(
            strong.relative_strength,
            Some(analysis_core::RelativeStrengthLabel::VeryStrong)
        );

        let weak = engine.analyze(&linear_series(253, 300.0, -1.0), &universe(&[0.5], &[0.5], None), &weights);
        assert_eq!(weak.rs_rating, Measure::Value(1));
    }

    #[test]
    fn test_configurable_quarter_weights() {
        // Flat for three quarters, then a rally in the most recent quarter
        let mut closes = vec![100.0; 190];
        closes.extend((1..=63).map(|i| 100.0 + i as f64));
        let recent_heavy = RsWeights([0.7, 0.1, 0.1, 0.1]);
        let equal = RsWeights([0.25, 0.25, 0.25, 0.25]);

        let heavy = rs_composite(&closes, &recent_heavy).value().unwrap();
        let flat = rs_composite(&closes, &equal).value().unwrap();
        assert_relative_eq!(heavy, 0.7 * 0.63, epsilon = 1e-12);
        assert_relative_eq!(flat, 0.25 * 0.63, epsilon = 1e-12);
    }

    #[test]
    fn test_build_reference_universe_preserves_order() {
        let weights = RsWeights::default();
        let peers = vec![
            ("AAA".to_string(), linear_series(253, 100.0, 1.0)),
            ("BBB".to_string(), linear_series(20, 100.0, 1.0)),
            ("CCC".to_string(), linear_series(253, 100.0, 0.2)),
        ];
        let benchmark = linear_series(127, 100.0, 0.1);

        let u = build_reference_universe(&peers, &weights, Some(&benchmark));
        let symbols: Vec<&str> = u.peers.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB", "CCC"]);
        assert!(u.peers[1].rs_composite.is_none());
        assert!(u.peers[1].return_6m.is_none());
        assert_eq!(u.composites().len(), 2);
        assert_relative_eq!(u.benchmark_return_6m.unwrap(), 12.6 / 100.0, epsilon = 1e-12);
    }
}

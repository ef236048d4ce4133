/// Distribution helpers shared by the momentum ranking and peer comparison.
///
/// Every function here returns `None` instead of a placeholder when the input
/// carries no information (empty slice, zero variance), so callers can keep
/// "unknown" distinct from a real zero.

/// Mean of a data slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Median of a data slice (average of the two middle values for even lengths).
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Smallest and largest value of a slice.
pub fn min_max(data: &[f64]) -> Option<(f64, f64)> {
    let first = *data.first()?;
    Some(data.iter().fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x))))
}

/// Percentile rank of `value` within `data` (0.0 to 1.0).
///
/// Midpoint interpolation: values equal to `value` count as half. The rank
/// depends only on the value and the set, so equal inputs always rank equally
/// regardless of where they sit in `data`.
pub fn percentile_rank(value: f64, data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let count_below = data.iter().filter(|&&x| x < value).count();
    let count_equal = data.iter().filter(|&&x| x == value).count();
    Some((count_below as f64 + 0.5 * count_equal as f64) / data.len() as f64)
}

/// Weighted average over `(value, weight)` pairs, skipping unknown values and
/// re-normalizing over the weights that remain.
pub fn weighted_mean(pairs: &[(Option<f64>, f64)]) -> Option<f64> {
    let (sum, weight) = pairs
        .iter()
        .filter_map(|(v, w)| v.map(|v| (v * w, *w)))
        .fold((0.0, 0.0), |(s, tw), (vw, w)| (s + vw, tw + w));
    if weight > 0.0 {
        Some(sum / weight)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_median() {
        let data = vec![4.0, 1.0, 3.0, 2.0];
        assert_relative_eq!(mean(&data).unwrap(), 2.5);
        assert_relative_eq!(median(&data).unwrap(), 2.5);
        assert_relative_eq!(median(&[5.0, 1.0, 3.0]).unwrap(), 3.0);
        assert!(mean(&[]).is_none());
        assert!(median(&[]).is_none());
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(min_max(&[]), None);
    }

    #[test]
    fn test_percentile_rank() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(percentile_rank(3.0, &data).unwrap(), 0.5);
        assert!(percentile_rank(5.0, &data).unwrap() > 0.8);
        assert!(percentile_rank(1.0, &data).unwrap() < 0.2);
        assert!(percentile_rank(1.0, &[]).is_none());
    }

    #[test]
    fn test_percentile_rank_ties_are_order_independent() {
        let a = vec![2.0, 1.0, 2.0, 3.0];
        let b = vec![3.0, 2.0, 2.0, 1.0];
        assert_eq!(percentile_rank(2.0, &a), percentile_rank(2.0, &b));
    }

    #[test]
    fn test_weighted_mean_renormalizes() {
        let pairs = [(Some(1.0), 3.0), (None, 5.0), (Some(0.0), 1.0)];
        assert_relative_eq!(weighted_mean(&pairs).unwrap(), 0.75);
        assert!(weighted_mean(&[(None, 1.0)]).is_none());
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileBand {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Nearest-rank selection at zero-based index `floor(n * fraction)`, without
/// interpolation. Sorts `values` in place.
pub fn nearest_rank(values: &mut [f64], fraction: f64) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    rank_of_sorted(values, fraction)
}

/// Sorts `values` once and reads all three ranks from it.
pub fn band(values: &mut [f64]) -> PercentileBand {
    values.sort_by(|a, b| a.total_cmp(b));
    PercentileBand {
        p10: rank_of_sorted(values, 0.10),
        p50: rank_of_sorted(values, 0.50),
        p90: rank_of_sorted(values, 0.90),
    }
}

fn rank_of_sorted(sorted: &[f64], fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    let rank = ((n as f64) * fraction).floor() as usize;
    sorted[rank.min(n - 1)]
}

/// Collapses `paths[simulation][year]` into one band per year index. All paths
/// are expected to have the same length; the shortest one bounds the output.
pub fn aggregate_yearly(paths: &[Vec<f64>]) -> Vec<PercentileBand> {
    let year_count = paths.iter().map(Vec::len).min().unwrap_or(0);
    let mut column = Vec::with_capacity(paths.len());

    (0..year_count)
        .map(|year| {
            column.clear();
            column.extend(paths.iter().map(|path| path[year]));
            band(&mut column)
        })
        .collect()
}

/// Share of terminal balances strictly above zero, in percent.
pub fn success_rate_percent(terminal_balances: &[f64]) -> f64 {
    if terminal_balances.is_empty() {
        return 0.0;
    }

    let successes = terminal_balances.iter().filter(|b| **b > 0.0).count();
    successes as f64 / terminal_balances.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    #[test]
    fn nearest_rank_uses_floor_without_interpolation() {
        let mut values = (1..=10).map(f64::from).rev().collect::<Vec<_>>();
        assert_eq!(nearest_rank(&mut values, 0.10), 2.0);
        assert_eq!(nearest_rank(&mut values, 0.50), 6.0);
        assert_eq!(nearest_rank(&mut values, 0.90), 10.0);
    }

    #[test]
    fn five_hundred_samples_pick_ranks_50_250_450() {
        let mut values = (0..500).map(f64::from).collect::<Vec<_>>();
        let b = band(&mut values);
        assert_eq!(b.p10, 50.0);
        assert_eq!(b.p50, 250.0);
        assert_eq!(b.p90, 450.0);
    }

    #[test]
    fn band_sorts_column_once_and_matches_individual_ranks() {
        let shuffled = [7.0, -3.0, 42.0, 0.5, 19.0, 11.0, -8.0, 3.0, 25.0, 1.0];
        let mut column = shuffled.to_vec();
        let b = band(&mut column);

        assert!(column.windows(2).all(|w| w[0] <= w[1]));
        for (fraction, expected) in [(0.10, b.p10), (0.50, b.p50), (0.90, b.p90)] {
            let mut fresh = shuffled.to_vec();
            assert_eq!(nearest_rank(&mut fresh, fraction), expected);
        }
        assert_eq!((b.p10, b.p50, b.p90), (-3.0, 7.0, 42.0));
    }

    #[test]
    fn empty_band_is_zero() {
        let b = band(&mut []);
        assert_eq!((b.p10, b.p50, b.p90), (0.0, 0.0, 0.0));
    }

    #[test]
    fn single_sample_collapses_all_percentiles() {
        let mut values = vec![-1234.5];
        let b = band(&mut values);
        assert_eq!(b.p10, -1234.5);
        assert_eq!(b.p50, -1234.5);
        assert_eq!(b.p90, -1234.5);
    }

    #[test]
    fn empty_input_yields_zero() {
        let mut values: Vec<f64> = Vec::new();
        assert_eq!(nearest_rank(&mut values, 0.5), 0.0);
        assert!(aggregate_yearly(&[]).is_empty());
        assert_eq!(success_rate_percent(&[]), 0.0);
    }

    #[test]
    fn aggregate_yearly_works_column_wise() {
        let paths = vec![
            vec![1.0, 30.0, 300.0],
            vec![1.0, 10.0, 100.0],
            vec![1.0, 20.0, 200.0],
        ];
        let bands = aggregate_yearly(&paths);
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].p50, 1.0);
        assert_eq!(bands[1].p10, 10.0);
        assert_eq!(bands[1].p50, 20.0);
        assert_eq!(bands[2].p90, 300.0);
    }

    #[test]
    fn success_rate_ignores_exact_zero() {
        let balances = [0.0, 1.0, -5.0, 10.0];
        assert_eq!(success_rate_percent(&balances), 50.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_band_is_ordered_and_drawn_from_input(
            values in vec(-1.0e7f64..1.0e7, 1..300)
        ) {
            let input = values.clone();
            let mut working = values;
            let b = band(&mut working);
            prop_assert!(b.p10 <= b.p50);
            prop_assert!(b.p50 <= b.p90);
            for v in [b.p10, b.p50, b.p90] {
                prop_assert!(input.contains(&v));
            }
        }

        #[test]
        fn prop_success_rate_matches_positive_fraction(
            values in vec(-1.0e6f64..1.0e6, 1..600)
        ) {
            let rate = success_rate_percent(&values);
            prop_assert!((0.0..=100.0).contains(&rate));
            let positives = values.iter().filter(|v| **v > 0.0).count();
            prop_assert_eq!(rate, positives as f64 / values.len() as f64 * 100.0);
        }
    }
}

use std::f64::consts::PI;

use rand::Rng;
use rand::distributions::{Distribution, Standard};

/// Uniform sample in `(0, 1]`. The underlying generator yields `[0, 1)`, so
/// flipping it keeps `ln` away from zero.
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let x: f64 = Standard.sample(rng);
    1.0 - x
}

/// One draw from `N(mean, std_dev²)` using the cosine branch of Box–Muller.
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u = open_unit(rng);
    let v = open_unit(rng);
    let z = (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos();
    z * std_dev + mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, proptest};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_moments(rng: &mut ChaCha8Rng, mean: f64, std_dev: f64, n: usize) -> (f64, f64) {
        let samples = (0..n)
            .map(|_| sample_normal(rng, mean, std_dev))
            .collect::<Vec<_>>();
        let sample_mean = samples.iter().sum::<f64>() / n as f64;
        let variance = samples
            .iter()
            .map(|x| (x - sample_mean).powi(2))
            .sum::<f64>()
            / (n as f64 - 1.0);
        (sample_mean, variance)
    }

    #[test]
    fn sample_mean_and_variance_match_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let (mean, variance) = sample_moments(&mut rng, 7.0, 15.0, 200_000);

        // Standard error of the mean is 15 / sqrt(200k) ~= 0.034.
        assert!((mean - 7.0).abs() < 0.2, "mean drifted: {mean}");
        assert!(
            (variance.sqrt() - 15.0).abs() < 0.2,
            "std dev drifted: {}",
            variance.sqrt()
        );
    }

    #[test]
    fn standard_normal_has_expected_tail_mass() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 100_000;
        let beyond_two_sigma = (0..n)
            .filter(|_| sample_normal(&mut rng, 0.0, 1.0).abs() > 2.0)
            .count();
        let share = beyond_two_sigma as f64 / n as f64;
        // ~4.55% of a normal distribution lies outside two standard deviations.
        assert!((0.040..0.051).contains(&share), "tail share was {share}");
    }

    #[test]
    fn zero_std_dev_returns_mean_exactly() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert_eq!(sample_normal(&mut rng, 7.0, 0.0), 7.0);
        }
    }

    #[test]
    fn open_unit_never_returns_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..10_000 {
            let u = open_unit(&mut rng);
            assert!(u > 0.0 && u <= 1.0);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_samples_are_finite(
            seed in any::<u64>(),
            mean in -50.0f64..50.0,
            std_dev in 0.0f64..60.0
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..32 {
                prop_assert!(sample_normal(&mut rng, mean, std_dev).is_finite());
            }
        }
    }
}

//! Property tests for the input sampler.

use mcuq_core::{InputVector, ParameterDomain, Sampler, SamplerConfig};
use proptest::prelude::*;

fn box_domain() -> impl Strategy<Value = (Vec<f64>, f64)> {
    (prop::collection::vec(-100.0f64..100.0, 1..6), 0.0f64..10.0)
}

fn interval_domain() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-50.0f64..50.0, 0.001f64..20.0), 1..6)
        .prop_map(|v| v.into_iter().map(|(lo, width)| (lo, lo + width)).collect())
}

proptest! {
    #[test]
    fn box_draws_stay_within_half_width((center, half_width) in box_domain(), seed in any::<u64>()) {
        let domain = ParameterDomain::hyper_box(center.clone(), half_width);
        let draws = Sampler::new(SamplerConfig::seeded(seed)).sample(&domain, 32).unwrap();

        prop_assert_eq!(draws.len(), 32);
        for x in &draws {
            prop_assert_eq!(x.dim(), center.len());
            for (xi, ci) in x.as_slice().iter().zip(&center) {
                // affine map of a unit-interval variate may round one ulp past the edge
                prop_assert!((xi - ci).abs() <= half_width * (1.0 + 1e-12) + 1e-12);
            }
        }
    }

    #[test]
    fn interval_draws_stay_half_open(bounds in interval_domain(), seed in any::<u64>()) {
        let domain = ParameterDomain::intervals(bounds.clone());
        let draws = Sampler::new(SamplerConfig::seeded(seed)).sample(&domain, 32).unwrap();

        for x in &draws {
            prop_assert!(domain.contains(x));
            for (xi, (lo, hi)) in x.as_slice().iter().zip(&bounds) {
                prop_assert!(*xi >= *lo && *xi < *hi);
            }
        }
    }

    #[test]
    fn seeded_draws_are_a_function_of_seed(bounds in interval_domain(), seed in any::<u64>(), n in 0usize..40) {
        let domain = ParameterDomain::intervals(bounds);
        let a: Vec<InputVector> = Sampler::new(SamplerConfig::seeded(seed)).sample(&domain, n).unwrap();
        let b: Vec<InputVector> = Sampler::new(SamplerConfig::seeded(seed)).sample(&domain, n).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn shorter_run_is_a_prefix_of_longer_run(bounds in interval_domain(), seed in any::<u64>(), n in 1usize..30) {
        let domain = ParameterDomain::intervals(bounds);
        let short = Sampler::new(SamplerConfig::seeded(seed)).sample(&domain, n).unwrap();
        let long = Sampler::new(SamplerConfig::seeded(seed)).sample(&domain, n + 10).unwrap();
        prop_assert_eq!(&long[..n], &short[..]);
    }
}

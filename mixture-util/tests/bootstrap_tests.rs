use mixture_util::bootstrap::*;
use mixture_util::random::SmallRngGenerator;
use mixture_util::{MixtureModel, ModelEstimate};

/// The bootstrap only needs the model and the number of p-values
fn published_estimate(lambda0: f64, r: f64, s: f64, k: usize) -> ModelEstimate {
    let model = MixtureModel::new(lambda0, r, s).unwrap();
    let sample: Vec<f64> = (0..k).map(|i| (i as f64 + 0.5) / k as f64).collect();
    ModelEstimate::new(model, &sample).unwrap()
}

fn assert_within_two_se(name: &str, prop: &Proportion, expected: f64) {
    let se = prop.standard_error();
    assert!(se.is_finite(), "{} SE is not finite", name);
    assert!(
        (prop.mean() - expected).abs() <= 2.0 * se,
        "{}: {} vs {} (SE {})",
        name,
        prop.mean(),
        expected,
        se
    );
}

#[test]
fn cr_scenario_matches_reference() -> anyhow::Result<()> {
    let estimate = published_estimate(0.88092, 1.39502, 3.64042, 12488);
    let bootstrap = BootstrapEstimator::standard(BootstrapConfiguration {
        number_of_iterations: 100,
        seed: 20060522,
    });

    let larger = bootstrap.estimate_proportions(&estimate, 5, 5, 10.0, 0.01)?;
    assert_within_two_se("TP", &larger.true_positive, 0.630357);
    assert_within_two_se("TN", &larger.true_negative, 0.893865);
    assert_within_two_se("EDR", &larger.expected_discovery, 0.127006);
    assert_eq!(larger.sample_size, 5.0);

    let smaller = bootstrap.estimate_proportions(&estimate, 5, 5, 3.0, 0.1)?;
    assert_within_two_se("TP", &smaller.true_positive, 0.039072);
    assert_within_two_se("TN", &smaller.true_negative, 0.872720);
    assert_within_two_se("EDR", &smaller.expected_discovery, 0.029884);
    Ok(())
}

#[test]
fn mountz_scenario_matches_reference() -> anyhow::Result<()> {
    let estimate = published_estimate(0.605, 0.539, 1.844, 12625);
    let bootstrap = BootstrapEstimator::standard(BootstrapConfiguration::default());

    let larger = bootstrap.estimate_proportions(&estimate, 3, 3, 10.0, 0.01)?;
    assert_within_two_se("TP", &larger.true_positive, 0.972166);
    assert_within_two_se("TN", &larger.true_negative, 0.777475);
    assert_within_two_se("EDR", &larger.expected_discovery, 0.564522);
    Ok(())
}

#[test]
fn boundary_mixtures() -> anyhow::Result<()> {
    let bootstrap = BootstrapEstimator::standard(BootstrapConfiguration::default());
    let mut rng = SmallRngGenerator::new(1);

    // no null p-values: A = C = 0
    let all_beta = MixtureModel::new(0.0, 1.39502, 3.64042)?;
    let counts = bootstrap.bootstrap_counts(&all_beta, 12488, 5.0, 10.0, 0.05, &mut rng);
    assert_eq!(counts.a, 0);
    assert_eq!(counts.c, 0);
    assert_eq!(counts.b + counts.d, 12488);

    // only null p-values: B = D = 0
    let all_null = MixtureModel::new(1.0, 1.39502, 3.64042)?;
    let counts = bootstrap.bootstrap_counts(&all_null, 12488, 5.0, 10.0, 0.05, &mut rng);
    assert_eq!(counts.b, 0);
    assert_eq!(counts.d, 0);
    assert_eq!(counts.a + counts.c, 12488);

    // every replicate lacks beta draws, so EDR is undefined
    let estimate = published_estimate(1.0, 1.39502, 3.64042, 500);
    let result = bootstrap.estimate_proportions(&estimate, 5, 5, 10.0, 0.05)?;
    assert_eq!(result.expected_discovery.num_defined(), 0);
    assert!(result.expected_discovery.mean().is_nan());
    assert!(result.expected_discovery.standard_error().is_nan());
    assert_eq!(result.true_negative.num_defined(), 100);
    Ok(())
}

#[test]
fn unequal_groups_use_harmonic_mean() -> anyhow::Result<()> {
    let estimate = published_estimate(0.8, 1.0, 3.0, 2000);
    let bootstrap = BootstrapEstimator::standard(BootstrapConfiguration {
        number_of_iterations: 20,
        seed: 1,
    });
    let result = bootstrap.estimate_proportions(&estimate, 20, 3, 10.0, 0.05)?;
    approx::assert_abs_diff_eq!(result.sample_size, 120.0 / 23.0, epsilon = 1e-12);
    assert!(result.true_positive.mean() > 0.0);
    Ok(())
}

#[test]
fn discovery_rate_grows_with_sample_size() -> anyhow::Result<()> {
    let estimate = published_estimate(0.88092, 1.39502, 3.64042, 12488);
    let bootstrap = BootstrapEstimator::standard(BootstrapConfiguration {
        number_of_iterations: 30,
        seed: 9,
    });

    let sizes = [2.0, 5.0, 10.0, 50.0];
    let results = bootstrap.estimate_grid(&estimate, 5, 5, &sizes, &[0.01])?;
    assert_eq!(results.len(), sizes.len());

    for pair in results.windows(2) {
        assert!(pair[0].projected_sample_size < pair[1].projected_sample_size);
        assert!(pair[0].expected_discovery.mean() < pair[1].expected_discovery.mean());
        assert!(pair[0].true_positive.mean() < pair[1].true_positive.mean());
    }
    Ok(())
}

#[test]
fn standard_grid_is_threshold_major() -> anyhow::Result<()> {
    let estimate = published_estimate(0.9, 1.0, 3.0, 300);
    let bootstrap = BootstrapEstimator::standard(BootstrapConfiguration {
        number_of_iterations: 2,
        seed: 5,
    });
    let results = bootstrap.estimate_standard_grid(&estimate, 4, 4)?;
    assert_eq!(
        results.len(),
        STANDARD_SAMPLE_SIZES.len() * STANDARD_THRESHOLDS.len()
    );
    assert_eq!(results[0].threshold, 0.1);
    assert_eq!(results[0].projected_sample_size, 2.0);
    assert_eq!(results[13].projected_sample_size, 100.0);
    assert_eq!(results[14].threshold, 0.05);
    Ok(())
}

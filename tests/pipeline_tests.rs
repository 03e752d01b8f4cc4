use feature_registration::config::{Config, MatchingConfig, RansacConfig};
use feature_registration::data::{generate, ScenarioParams};
use feature_registration::features::Feature;
use feature_registration::pipeline::RegistrationPipeline;
use feature_registration::registration::{RansacOutcome, SimilarityTransform};
use std::sync::atomic::Ordering;

#[test]
fn end_to_end_synthetic_scenario() {
    // 30 shared features (identical descriptors, mapped locations within
    // ~8px of their sources) plus 20 clutter features per side.
    let truth = SimilarityTransform::from_components(0.02, 1.01, 3.0, 2.0);
    let params = ScenarioParams {
        shared_points: 30,
        clutter_points: 20,
        descriptor_len: 32,
        field_size: 100.0,
        location_noise: 0.0,
        transform: truth,
        seed: 13,
    };
    let (set1, set2) = generate(&params).unwrap();
    assert_eq!(set1.len(), 50);
    assert_eq!(set2.len(), 50);

    let config = Config {
        matching: MatchingConfig {
            ratio_threshold: 0.8,
            use_spatial_gate: true,
            spatial_radius: 15.0,
        },
        ransac: RansacConfig {
            iterations: 200,
            sample_size: 4,
            max_epsilon: 2.0,
            seed: Some(99),
        },
    };

    let pipeline = RegistrationPipeline::new(config);
    let report = pipeline.register(&set1, &set2).unwrap();

    assert!(
        report.candidates.len() >= 25,
        "expected close to 30 candidates, got {}",
        report.candidates.len()
    );

    assert!(report.outcome.has_model());
    assert!(
        report.outcome.inliers().len() >= 25,
        "expected at least 25 inliers, got {}",
        report.outcome.inliers().len()
    );

    let estimated = report.outcome.transform();
    assert!((estimated.rotation() - truth.rotation()).abs() < 1e-3);
    assert!((estimated.scale() - truth.scale()).abs() / truth.scale() < 0.01);
    assert!((estimated.t1 - truth.t1).abs() / truth.t1.abs() < 0.01);
    assert!((estimated.t2 - truth.t2).abs() / truth.t2.abs() < 0.01);
}

#[test]
fn empty_feature_sets_produce_an_empty_report() {
    let pipeline = RegistrationPipeline::new(Config::default());
    let empty: Vec<Feature> = Vec::new();
    let report = pipeline.register(&empty, &empty).unwrap();

    assert!(report.candidates.is_empty());
    assert!(matches!(report.outcome, RansacOutcome::NoCandidates));
    assert!(report.outcome.inliers().is_empty());
    assert_eq!(report.outcome.transform(), SimilarityTransform::zero());
}

#[test]
fn cancellation_aborts_before_matching() {
    let pipeline = RegistrationPipeline::new(Config::default());
    pipeline.cancel_handle().store(true, Ordering::Relaxed);

    let (set1, set2) = generate(&ScenarioParams::default()).unwrap();
    let err = pipeline.register(&set1, &set2).unwrap_err();
    assert!(err.to_string().contains("cancelled"));
}

#[test]
fn seeded_runs_are_reproducible() {
    let params = ScenarioParams::default();
    let (set1, set2) = generate(&params).unwrap();

    let config = Config {
        ransac: RansacConfig {
            seed: Some(7),
            ..Default::default()
        },
        ..Default::default()
    };

    let first = RegistrationPipeline::new(config.clone())
        .register(&set1, &set2)
        .unwrap();
    let second = RegistrationPipeline::new(config)
        .register(&set1, &set2)
        .unwrap();

    assert_eq!(first.candidates, second.candidates);
    assert_eq!(first.outcome.transform(), second.outcome.transform());
    assert_eq!(first.outcome.inliers(), second.outcome.inliers());
}

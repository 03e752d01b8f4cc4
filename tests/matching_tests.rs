use feature_registration::config::MatchingConfig;
use feature_registration::features::{Feature, PointMatch};
use feature_registration::matching::{match_features, remove_ambiguous};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn feature(x: f64, y: f64, descriptor: Vec<f64>) -> Feature {
    Feature::new((x, y), 1.0, 0.0, descriptor)
}

fn no_gate(ratio: f64) -> MatchingConfig {
    MatchingConfig {
        ratio_threshold: ratio,
        use_spatial_gate: false,
        spatial_radius: 0.0,
    }
}

/// Paired sets where each feature's true partner is its descriptor
/// nearest-neighbor, with enough descriptor noise that ratio acceptance
/// varies across pairs. Targets are all distinct, so ambiguity removal
/// never interferes.
fn noisy_pairs(count: usize, seed: u64) -> (Vec<Feature>, Vec<Feature>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut set1 = Vec::new();
    let mut set2 = Vec::new();
    for i in 0..count {
        let descriptor: Vec<f64> = (0..16).map(|_| rng.gen_range(0.0..1.0)).collect();
        let noised: Vec<f64> = descriptor
            .iter()
            .map(|v| v + rng.gen_range(-0.05..0.05))
            .collect();
        set1.push(feature(i as f64, 0.0, descriptor));
        set2.push(feature(i as f64, 50.0, noised));
    }
    (set1, set2)
}

/// Each query sees exactly two gated candidates: its partner at a
/// controlled descriptor distance and a decoy at distance 1, so the
/// acceptance ratio climbs steadily across queries and every target stays
/// unique.
fn ratio_ladder(count: usize) -> (Vec<Feature>, Vec<Feature>, MatchingConfig) {
    let mut set1 = Vec::new();
    let mut set2 = Vec::new();
    for i in 0..count {
        let x = 100.0 * i as f64;
        let r = i as f64 / count as f64;
        set1.push(feature(x, 0.0, vec![0.0]));
        set2.push(feature(x, 10.0, vec![r]));
        set2.push(feature(x, -10.0, vec![1.0]));
    }
    let config = MatchingConfig {
        ratio_threshold: 1.0,
        use_spatial_gate: true,
        spatial_radius: 50.0,
    };
    (set1, set2, config)
}

#[test]
fn acceptance_is_monotone_in_ratio_threshold() {
    let (set1, set2, mut config) = ratio_ladder(40);

    config.ratio_threshold = 0.9;
    let loose = match_features(&set1, &set2, &config);
    config.ratio_threshold = 0.3;
    let strict = match_features(&set1, &set2, &config);

    assert!(!strict.is_empty());
    assert!(strict.len() < loose.len());
    for m in &strict {
        assert!(
            loose.contains(m),
            "match accepted at 0.3 missing from the 0.9 result"
        );
    }
}

#[test]
fn surviving_targets_are_unique() {
    // Two queries share the same best target; both of their matches must
    // go, the third survives.
    let set1 = vec![
        feature(0.0, 0.0, vec![0.0, 0.0]),
        feature(1.0, 0.0, vec![0.1, 0.0]),
        feature(2.0, 0.0, vec![5.0, 5.0]),
    ];
    let set2 = vec![
        feature(10.0, 0.0, vec![0.05, 0.0]),
        feature(11.0, 0.0, vec![5.0, 5.0]),
        feature(12.0, 0.0, vec![20.0, 20.0]),
    ];

    let matches = match_features(&set1, &set2, &no_gate(0.9));

    let mut targets: Vec<(u64, u64)> = matches
        .iter()
        .map(|m| (m.p2.0.to_bits(), m.p2.1.to_bits()))
        .collect();
    targets.sort_unstable();
    targets.dedup();
    assert_eq!(targets.len(), matches.len());
    assert!(matches.iter().all(|m| m.p2 != (10.0, 0.0)));
}

#[test]
fn ambiguity_removal_is_idempotent() {
    let candidates = vec![
        PointMatch::new((0.0, 0.0), (5.0, 5.0)),
        PointMatch::new((1.0, 0.0), (5.0, 5.0)),
        PointMatch::new((2.0, 0.0), (6.0, 6.0)),
        PointMatch::new((3.0, 0.0), (7.0, 7.0)),
        PointMatch::new((4.0, 0.0), (7.0, 7.0)),
        PointMatch::new((5.0, 0.0), (8.0, 8.0)),
    ];

    let once = remove_ambiguous(candidates);
    let twice = remove_ambiguous(once.clone());
    assert_eq!(once, twice);
    assert_eq!(once.len(), 2);
}

#[test]
fn gate_radius_zero_rejects_everything() {
    let (set1, set2) = noisy_pairs(10, 9);
    let config = MatchingConfig {
        ratio_threshold: 1.0,
        use_spatial_gate: true,
        spatial_radius: 0.0,
    };
    assert!(match_features(&set1, &set2, &config).is_empty());
}

#[test]
fn gate_requires_strictly_smaller_distance() {
    // Both candidates sit exactly on the gate boundary and must be
    // excluded; squared distance has to be strictly below radius².
    let set1 = vec![feature(0.0, 0.0, vec![0.0])];
    let set2 = vec![
        feature(5.0, 0.0, vec![0.0]),
        feature(0.0, 5.0, vec![0.1]),
    ];
    let config = MatchingConfig {
        ratio_threshold: 1.0,
        use_spatial_gate: true,
        spatial_radius: 5.0,
    };
    assert!(match_features(&set1, &set2, &config).is_empty());
}

#[test]
fn matcher_output_is_deterministic() {
    let (set1, set2) = noisy_pairs(30, 21);
    let a = match_features(&set1, &set2, &no_gate(0.8));
    let b = match_features(&set1, &set2, &no_gate(0.8));
    assert_eq!(a, b);
}

//! Synthetic feature scenarios with known ground truth.
//!
//! Used by the `register synth` command and the integration tests to
//! exercise matching and estimation without a real detector.

use crate::features::Feature;
use crate::registration::SimilarityTransform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Parameters for a synthetic registration scenario.
///
/// `shared_points` features appear in both collections with identical
/// descriptors, the second copy mapped through `transform` plus Gaussian
/// location noise. `clutter_points` unrelated features are added to each
/// side.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub shared_points: usize,
    pub clutter_points: usize,
    pub descriptor_len: usize,
    /// Locations are drawn uniformly from `[0, field_size)²`.
    pub field_size: f64,
    /// Standard deviation of the location noise on mapped points.
    pub location_noise: f64,
    pub transform: SimilarityTransform,
    pub seed: u64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            shared_points: 30,
            clutter_points: 20,
            descriptor_len: 32,
            field_size: 100.0,
            location_noise: 0.0,
            transform: SimilarityTransform::from_components(0.02, 1.01, 3.0, 2.0),
            seed: 7,
        }
    }
}

/// Generate the two feature collections of a scenario.
pub fn generate(params: &ScenarioParams) -> crate::Result<(Vec<Feature>, Vec<Feature>)> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let noise = Normal::new(0.0, params.location_noise)
        .map_err(|e| anyhow::anyhow!("invalid location_noise: {e}"))?;

    let mut set1 = Vec::with_capacity(params.shared_points + params.clutter_points);
    let mut set2 = Vec::with_capacity(params.shared_points + params.clutter_points);

    for _ in 0..params.shared_points {
        let location = random_location(&mut rng, params.field_size);
        let descriptor = random_descriptor(&mut rng, params.descriptor_len);

        set1.push(Feature::new(location, 1.0, 0.0, descriptor.clone()));

        let (mx, my) = params.transform.apply(location);
        let mapped = (mx + noise.sample(&mut rng), my + noise.sample(&mut rng));
        set2.push(Feature::new(mapped, 1.0, 0.0, descriptor));
    }

    for _ in 0..params.clutter_points {
        let location = random_location(&mut rng, params.field_size);
        let descriptor = random_descriptor(&mut rng, params.descriptor_len);
        set1.push(Feature::new(location, 1.0, 0.0, descriptor));

        let location = random_location(&mut rng, params.field_size);
        let descriptor = random_descriptor(&mut rng, params.descriptor_len);
        set2.push(Feature::new(location, 1.0, 0.0, descriptor));
    }

    Ok((set1, set2))
}

fn random_location(rng: &mut StdRng, field_size: f64) -> (f64, f64) {
    (rng.gen_range(0.0..field_size), rng.gen_range(0.0..field_size))
}

fn random_descriptor(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.gen_range(0.0..1.0)).collect()
}

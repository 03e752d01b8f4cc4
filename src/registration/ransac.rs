//! RANSAC driver over the closed-form Procrustes fit.

use super::similarity::{procrustes_fit, SimilarityTransform};
use crate::config::RansacConfig;
use crate::features::PointMatch;
use rand::Rng;
use serde::Serialize;

/// Outcome of a consensus estimation run.
///
/// The three cases are deliberately distinct: an empty candidate list, a
/// run where no trial produced a single inlier, and a successful model are
/// different facts and must not be conflated with a trivial zero-parameter
/// fit.
#[derive(Debug, Clone, Serialize)]
pub enum RansacOutcome {
    /// The candidate list was empty; there was nothing to estimate.
    NoCandidates,
    /// Every trial fit failed or classified zero inliers.
    NoConsensus,
    /// Consensus reached: refined transform plus its supporting inliers.
    Model {
        transform: SimilarityTransform,
        inliers: Vec<PointMatch>,
    },
}

impl RansacOutcome {
    /// The estimated transform, or the zero sentinel when no model exists.
    pub fn transform(&self) -> SimilarityTransform {
        match self {
            RansacOutcome::Model { transform, .. } => *transform,
            _ => SimilarityTransform::zero(),
        }
    }

    /// The supporting inlier subset, empty when no model exists.
    pub fn inliers(&self) -> &[PointMatch] {
        match self {
            RansacOutcome::Model { inliers, .. } => inliers,
            _ => &[],
        }
    }

    pub fn has_model(&self) -> bool {
        matches!(self, RansacOutcome::Model { .. })
    }
}

/// Estimate a similarity transform robust to outlier correspondences.
///
/// Every trial draws `sample_size` correspondences uniformly at random
/// **with replacement** from one shared generator, fits the closed-form
/// solver on the sample and scores the full candidate list by squared
/// residual against `max_epsilon²`. The best inlier mask (strictly more
/// inliers than any earlier trial) survives; after the last trial the
/// model is refit on its whole inlier subset.
///
/// A `sample_size` larger than the candidate count is accepted but
/// statistically meaningless, since replacement sampling still succeeds.
/// Degenerate trial fits simply contribute zero inliers.
pub fn estimate<R: Rng>(
    candidates: &[PointMatch],
    config: &RansacConfig,
    rng: &mut R,
) -> RansacOutcome {
    if candidates.is_empty() {
        return RansacOutcome::NoCandidates;
    }

    let n = candidates.len();
    let eps_sq = config.max_epsilon * config.max_epsilon;

    let mut best_count = 0usize;
    let mut best_mask = vec![false; n];
    let mut best_trial = SimilarityTransform::zero();
    let mut sample = Vec::with_capacity(config.sample_size);

    for _ in 0..config.iterations {
        sample.clear();
        for _ in 0..config.sample_size {
            sample.push(candidates[rng.gen_range(0..n)]);
        }

        let trial = match procrustes_fit(&sample) {
            Ok(z) => z,
            Err(_) => continue,
        };

        let mask: Vec<bool> = candidates
            .iter()
            .map(|m| trial.squared_residual(m) <= eps_sq)
            .collect();
        let count = mask.iter().filter(|&&inlier| inlier).count();

        // Ties keep the earlier result.
        if count > best_count {
            best_count = count;
            best_mask = mask;
            best_trial = trial;
        }
    }

    if best_count == 0 {
        return RansacOutcome::NoConsensus;
    }

    let inliers: Vec<PointMatch> = candidates
        .iter()
        .zip(&best_mask)
        .filter_map(|(m, &keep)| keep.then_some(*m))
        .collect();

    // Refine on the full inlier subset rather than the minimal sample.
    let transform = match procrustes_fit(&inliers) {
        Ok(z) => z,
        Err(err) => {
            tracing::warn!(%err, "refit on best inlier subset failed, keeping trial model");
            best_trial
        }
    };

    tracing::debug!(
        inliers = inliers.len(),
        candidates = n,
        "consensus reached"
    );
    RansacOutcome::Model { transform, inliers }
}

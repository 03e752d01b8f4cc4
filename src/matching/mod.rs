//! Ambiguity-resistant nearest-neighbor feature matching.
//!
//! One-directional pass: every feature of the first collection picks its
//! best descriptor match in the second collection, accepted under Lowe's
//! distance-ratio test and an optional spatial locality gate. A follow-up
//! pass removes every correspondence whose target point was claimed more
//! than once.

use crate::config::MatchingConfig;
use crate::features::{MatchableFeature, PointMatch};
use rayon::prelude::*;
use std::collections::HashMap;

/// Identify candidate correspondences between two feature collections.
///
/// Each feature of `set1` contributes at most one candidate; a feature of
/// `set2` may be claimed by several, and such shared targets are removed
/// afterwards by [`remove_ambiguous`]. Results are collected in `set1`
/// order, so the output is deterministic for a given input order even
/// though the outer scan runs in parallel.
pub fn match_features<F>(set1: &[F], set2: &[F], config: &MatchingConfig) -> Vec<PointMatch>
where
    F: MatchableFeature + Sync,
{
    let gate_sq = config.spatial_radius * config.spatial_radius;

    let candidates: Vec<PointMatch> = set1
        .par_iter()
        .filter_map(|f1| {
            let (x1, y1) = f1.location();
            let mut best: Option<&F> = None;
            let mut best_d = f64::INFINITY;
            let mut second_best_d = f64::INFINITY;

            for f2 in set2 {
                if config.use_spatial_gate {
                    let (x2, y2) = f2.location();
                    let dis2 = (x1 - x2) * (x1 - x2) + (y1 - y2) * (y1 - y2);
                    if dis2 >= gate_sq {
                        continue;
                    }
                }

                let d = f1.descriptor_distance(f2);
                if d < best_d {
                    second_best_d = best_d;
                    best_d = d;
                    best = Some(f2);
                } else if d < second_best_d {
                    second_best_d = d;
                }
            }

            // A lone candidate has no second-best to compare against and
            // is rejected outright.
            match best {
                Some(f2)
                    if second_best_d < f64::INFINITY
                        && best_d / second_best_d < config.ratio_threshold =>
                {
                    Some(PointMatch::new((x1, y1), f2.location()))
                }
                _ => None,
            }
        })
        .collect();

    let accepted = candidates.len();
    let unambiguous = remove_ambiguous(candidates);
    tracing::debug!(
        accepted,
        removed = accepted - unambiguous.len(),
        "preliminary matching pass complete"
    );
    unambiguous
}

/// Drop every correspondence whose target point is claimed more than once.
///
/// All members of a coincident group are discarded, not just the
/// duplicates: a shared target indicates an unreliable one-to-many mapping.
/// Comparison is exact coordinate equality on purpose; coincident targets
/// originate from literally the same feature's coordinates, never from
/// independently computed values.
pub fn remove_ambiguous(candidates: Vec<PointMatch>) -> Vec<PointMatch> {
    let mut claims: HashMap<(u64, u64), u32> = HashMap::with_capacity(candidates.len());
    for m in &candidates {
        *claims.entry(target_key(m)).or_insert(0) += 1;
    }
    candidates
        .into_iter()
        .filter(|m| claims[&target_key(m)] == 1)
        .collect()
}

fn target_key(m: &PointMatch) -> (u64, u64) {
    (m.p2.0.to_bits(), m.p2.1.to_bits())
}

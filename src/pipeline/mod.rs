//! Stage-oriented registration driver.
//!
//! Runs preliminary matching and consensus filtering over two externally
//! produced feature collections, timing each stage and honoring a
//! cooperative cancellation flag between stages. The core loops never
//! check the flag themselves.

use crate::config::Config;
use crate::features::{MatchableFeature, PointMatch};
use crate::matching::match_features;
use crate::registration::{estimate, RansacOutcome};
use crate::Result;
use anyhow::bail;
use instant::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// What one registration run produced, with per-stage timings.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
    pub candidates: Vec<PointMatch>,
    pub outcome: RansacOutcome,
    pub matching_time_ms: f32,
    pub ransac_time_ms: f32,
}

/// Drives matching and robust estimation with an immutable configuration.
///
/// Each pipeline owns its own working state, so independent runs need no
/// synchronization among concurrent callers.
pub struct RegistrationPipeline {
    config: Config,
    cancel: Arc<AtomicBool>,
}

impl RegistrationPipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag shared with the surrounding layer; setting it aborts the run
    /// before the next stage starts.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Match two feature collections and estimate the similarity
    /// transform relating them.
    pub fn register<F>(&self, set1: &[F], set2: &[F]) -> Result<RegistrationReport>
    where
        F: MatchableFeature + Sync,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("registration", %run_id);
        let _enter = span.enter();

        if self.cancelled() {
            bail!("registration cancelled before matching");
        }

        let start = Instant::now();
        let candidates = match_features(set1, set2, &self.config.matching);
        let matching_time_ms = start.elapsed().as_secs_f32() * 1000.0;
        tracing::info!(
            features1 = set1.len(),
            features2 = set2.len(),
            candidates = candidates.len(),
            elapsed_ms = matching_time_ms,
            "preliminary matching finished"
        );

        if self.cancelled() {
            bail!("registration cancelled before consensus filtering");
        }

        let mut rng = match self.config.ransac.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let start = Instant::now();
        let outcome = estimate(&candidates, &self.config.ransac, &mut rng);
        let ransac_time_ms = start.elapsed().as_secs_f32() * 1000.0;

        match &outcome {
            RansacOutcome::Model { transform, inliers } => tracing::info!(
                inliers = inliers.len(),
                a = transform.a,
                b = transform.b,
                t1 = transform.t1,
                t2 = transform.t2,
                elapsed_ms = ransac_time_ms,
                "similarity model estimated"
            ),
            RansacOutcome::NoConsensus => {
                tracing::warn!(
                    candidates = candidates.len(),
                    elapsed_ms = ransac_time_ms,
                    "no consensus found among correspondence candidates"
                )
            }
            RansacOutcome::NoCandidates => {
                tracing::warn!("no correspondence candidates to filter")
            }
        }

        Ok(RegistrationReport {
            candidates,
            outcome,
            matching_time_ms,
            ransac_time_ms,
        })
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

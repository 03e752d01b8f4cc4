//! Closed-form least-squares similarity fit (Procrustes analysis).

use crate::features::PointMatch;
use crate::Result;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

/// Parameters `z = (a, b, t1, t2)` of a 2D similarity transform.
///
/// Encodes the linear map `[[a, -b], [b, a]]` followed by the translation
/// `(t1, t2)`. Any rotation combined with a uniform scale has exactly this
/// matrix structure, so the four parameters cover the whole model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityTransform {
    pub a: f64,
    pub b: f64,
    pub t1: f64,
    pub t2: f64,
}

impl SimilarityTransform {
    /// The all-zero sentinel reported when no model was found.
    pub fn zero() -> Self {
        Self {
            a: 0.0,
            b: 0.0,
            t1: 0.0,
            t2: 0.0,
        }
    }

    /// Build from a rotation angle (radians), uniform scale and translation.
    pub fn from_components(rotation: f64, scale: f64, t1: f64, t2: f64) -> Self {
        Self {
            a: scale * rotation.cos(),
            b: scale * rotation.sin(),
            t1,
            t2,
        }
    }

    /// Map a point from the first image into the second.
    pub fn apply(&self, p: (f64, f64)) -> (f64, f64) {
        (
            self.a * p.0 - self.b * p.1 + self.t1,
            self.b * p.0 + self.a * p.1 + self.t2,
        )
    }

    /// Rotation angle in radians.
    pub fn rotation(&self) -> f64 {
        self.b.atan2(self.a)
    }

    /// Uniform scale factor.
    pub fn scale(&self) -> f64 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.t1, self.t2)
    }

    /// Squared distance between the mapped `p1` and the observed `p2`.
    pub fn squared_residual(&self, m: &PointMatch) -> f64 {
        let (x, y) = self.apply(m.p1);
        let dx = x - m.p2.0;
        let dy = y - m.p2.1;
        dx * dx + dy * dy
    }
}

/// Fit the similarity transform minimizing `Σ‖A(p1) − p2‖²`.
///
/// Stacks two rows per correspondence into the design matrix `B` and
/// solves the normal equations `(BᵗB) z = BᵗY` by inverting the 4×4
/// system. Needs at least two distinct, non-collinear correspondences;
/// degenerate input surfaces as an error, never as a silent wrong answer.
pub fn procrustes_fit(matches: &[PointMatch]) -> Result<SimilarityTransform> {
    if matches.len() < 2 {
        anyhow::bail!(
            "similarity fit needs at least 2 correspondences, got {}",
            matches.len()
        );
    }

    let n = matches.len();
    let mut design = DMatrix::<f64>::zeros(2 * n, 4);
    let mut observed = DVector::<f64>::zeros(2 * n);

    for (i, m) in matches.iter().enumerate() {
        let (x1, y1) = m.p1;
        let (x2, y2) = m.p2;

        design[(2 * i, 0)] = x1;
        design[(2 * i, 1)] = -y1;
        design[(2 * i, 2)] = 1.0;
        design[(2 * i + 1, 0)] = y1;
        design[(2 * i + 1, 1)] = x1;
        design[(2 * i + 1, 3)] = 1.0;

        observed[2 * i] = x2;
        observed[2 * i + 1] = y2;
    }

    let bt = design.transpose();
    let normal = &bt * &design;
    let rhs = &bt * &observed;

    let inverse = normal.try_inverse().ok_or_else(|| {
        anyhow::anyhow!("degenerate correspondence set: singular normal equations")
    })?;
    let z = inverse * rhs;

    Ok(SimilarityTransform {
        a: z[0],
        b: z[1],
        t1: z[2],
        t2: z[3],
    })
}

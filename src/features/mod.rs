use serde::Serialize;

/// A detected point of interest as produced by an external detector.
///
/// The registration core never creates these itself; it only reads them.
/// The descriptor length is fixed per run by whichever detector produced
/// the collection.
#[derive(Debug, Clone)]
pub struct Feature {
    pub location: (f64, f64),
    pub scale: f64,
    pub orientation: f64,
    pub descriptor: Vec<f64>,
}

impl Feature {
    pub fn new(location: (f64, f64), scale: f64, orientation: f64, descriptor: Vec<f64>) -> Self {
        Self {
            location,
            scale,
            orientation,
            descriptor,
        }
    }
}

/// Capability surface the matcher needs from a detector's output.
///
/// Keeps the matcher independent of any concrete detector: anything with a
/// 2D location and a symmetric, non-negative dissimilarity between
/// descriptors can be matched.
pub trait MatchableFeature {
    fn location(&self) -> (f64, f64);

    /// Dissimilarity between this feature's descriptor and another's.
    /// Must be symmetric; the triangle inequality is not required.
    fn descriptor_distance(&self, other: &Self) -> f64;
}

impl MatchableFeature for Feature {
    fn location(&self) -> (f64, f64) {
        self.location
    }

    fn descriptor_distance(&self, other: &Self) -> f64 {
        self.descriptor
            .iter()
            .zip(&other.descriptor)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

/// A claimed pairing between one location in each of two feature collections.
///
/// `p1` always originates from collection 1 and `p2` from collection 2.
/// Descriptor, scale and orientation are discarded once the matching
/// decision has been made.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointMatch {
    pub p1: (f64, f64),
    pub p2: (f64, f64),
}

impl PointMatch {
    pub fn new(p1: (f64, f64), p2: (f64, f64)) -> Self {
        Self { p1, p2 }
    }
}

//! Circle-fit result and detector configuration types.

use serde::{Deserialize, Serialize};

/// A fitted circle in the cross-section (x, z) plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleFit {
    /// Centre cross-track position, millimeters.
    pub cx: f64,
    /// Centre depth, millimeters.
    pub cz: f64,
    /// Radius, millimeters.
    pub radius: f64,
    /// Root-mean-square radial residual over the points used.
    pub rms: f64,
}

/// A detected pipe cross-section.
///
/// May be fed back as the `previous` argument of the next detection call to
/// bias its search region. That feedback is the only cross-call state in the
/// pipeline, and it is explicit caller-owned state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeDetection {
    /// Refined circle fitted to the winning inlier set.
    pub fit: CircleFit,
    /// Pipe diameter (2 x radius), millimeters.
    pub diameter: f64,
    /// First index of the inlier span in the source point sequence.
    pub inlier_start: usize,
    /// Last index of the inlier span in the source point sequence.
    ///
    /// The span is a bounding range for downstream highlighting; the inlier
    /// set itself is not necessarily contiguous.
    pub inlier_end: usize,
    /// Number of inliers behind the winning hypothesis.
    pub num_inliers: usize,
}

/// Configuration for randomized pipe detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Number of hypothesize-and-test iterations.
    pub max_iters: usize,
    /// Inlier distance tolerance around the hypothesized radius, millimeters.
    pub tolerance_mm: f64,
    /// Minimum number of input points to attempt detection at all.
    pub min_points: usize,
    /// Minimum inlier count for a hypothesis to produce a detection.
    pub min_inliers: usize,
    /// Minimum candidate count for the tracked search region; below this the
    /// full point set is searched instead.
    pub min_track_candidates: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            tolerance_mm: 8.0,
            min_points: 15,
            min_inliers: 15,
            min_track_candidates: 20,
            seed: 42,
        }
    }
}

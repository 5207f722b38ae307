//! Randomized robust pipe detection with frame-to-frame tracking.
//!
//! Hypothesize-and-test: sample three candidate points, construct their
//! circle, gate it against the expected radius and the camera-side geometry,
//! count inliers, and refit the best hypothesis algebraically. A previous
//! detection, when supplied by the caller, restricts the candidate set to a
//! window around the last centre.

use rand::Rng;
use rand::{rngs::StdRng, SeedableRng};

use super::fit::{circle_through_three, fit_circle_algebraic};
use super::types::{DetectConfig, PipeDetection};
use crate::geometry::WorldPoint;

/// Accepted relative radius deviation from the expected radius.
const RADIUS_DEVIATION_FRAC: f64 = 0.25;

/// Half-width of the tracked search window, in expected radii, around the
/// previous centre's cross-track position.
const TRACK_GATE_RADII: f64 = 1.5;

/// Detect a pipe cross-section in a triangulated point sequence.
///
/// Seeds a [`StdRng`] from the configuration for run-to-run reproducibility;
/// use [`detect_pipe_with_rng`] to supply a random source directly.
///
/// Returns `None` when fewer than `config.min_points` points are supplied or
/// no hypothesis satisfies the gates with `config.min_inliers` inliers.
/// Absence of a pipe is a normal outcome, not an error.
pub fn detect_pipe(
    points: &[WorldPoint],
    expected_diameter: f64,
    previous: Option<&PipeDetection>,
    config: &DetectConfig,
) -> Option<PipeDetection> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    detect_pipe_with_rng(points, expected_diameter, previous, config, &mut rng)
}

/// [`detect_pipe`] with an injectable random source.
pub fn detect_pipe_with_rng(
    points: &[WorldPoint],
    expected_diameter: f64,
    previous: Option<&PipeDetection>,
    config: &DetectConfig,
    rng: &mut impl Rng,
) -> Option<PipeDetection> {
    if points.len() < config.min_points {
        return None;
    }
    let expected_radius = expected_diameter / 2.0;
    if !(expected_radius.is_finite() && expected_radius > 0.0) {
        return None;
    }

    let candidates = candidate_indices(points, expected_radius, previous, config);

    let mut best_inliers: Vec<usize> = Vec::new();
    for _ in 0..config.max_iters {
        let Some([i, j, k]) = sample_triple(rng, candidates.len()) else {
            break;
        };
        let a = cross_section(&points[candidates[i]]);
        let b = cross_section(&points[candidates[j]]);
        let c = cross_section(&points[candidates[k]]);

        let Some((cx, cz)) = circle_through_three(a, b, c) else {
            continue;
        };
        let radius = ((a[0] - cx).powi(2) + (a[1] - cz).powi(2)).sqrt();
        if (radius - expected_radius).abs() > RADIUS_DEVIATION_FRAC * expected_radius {
            continue;
        }
        // The pipe bulges toward the camera: the centre must sit deeper than
        // the sampled arc points.
        if cz <= a[1].max(b[1]).max(c[1]) {
            continue;
        }

        let mut inliers = Vec::new();
        for &idx in &candidates {
            let p = &points[idx];
            let d = ((p.x - cx).powi(2) + (p.z - cz).powi(2)).sqrt();
            if (d - radius).abs() <= config.tolerance_mm {
                inliers.push(idx);
            }
        }
        if inliers.len() > best_inliers.len() {
            best_inliers = inliers;
        }
    }

    if best_inliers.len() < config.min_inliers {
        return None;
    }

    let inlier_points: Vec<[f64; 2]> = best_inliers
        .iter()
        .map(|&idx| cross_section(&points[idx]))
        .collect();
    let fit = fit_circle_algebraic(&inlier_points)?;
    let inlier_start = *best_inliers.first()?;
    let inlier_end = *best_inliers.last()?;

    Some(PipeDetection {
        fit,
        diameter: 2.0 * fit.radius,
        inlier_start,
        inlier_end,
        num_inliers: best_inliers.len(),
    })
}

/// Candidate indices for hypothesis sampling.
///
/// With a previous detection, restrict to points whose x lies inside the
/// tracking window; fall back to the full set when the window is too sparse
/// to be trustworthy.
fn candidate_indices(
    points: &[WorldPoint],
    expected_radius: f64,
    previous: Option<&PipeDetection>,
    config: &DetectConfig,
) -> Vec<usize> {
    if let Some(prev) = previous {
        let gate = TRACK_GATE_RADII * expected_radius;
        let tracked: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| (p.x - prev.fit.cx).abs() <= gate)
            .map(|(i, _)| i)
            .collect();
        if tracked.len() >= config.min_track_candidates {
            return tracked;
        }
    }
    (0..points.len()).collect()
}

/// Draw three pairwise-distinct indices from `0..n`, redrawing collisions.
fn sample_triple(rng: &mut impl Rng, n: usize) -> Option<[usize; 3]> {
    if n < 3 {
        return None;
    }
    let i = rng.gen_range(0..n);
    let mut j = rng.gen_range(0..n);
    while j == i {
        j = rng.gen_range(0..n);
    }
    let mut k = rng.gen_range(0..n);
    while k == i || k == j {
        k = rng.gen_range(0..n);
    }
    Some([i, j, k])
}

fn cross_section(p: &WorldPoint) -> [f64; 2] {
    [p.x, p.z]
}

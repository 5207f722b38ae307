//! Sparse-to-dense profile reconstruction.
//!
//! Some rigs report only a handful of columns (e.g. 8) out of a much larger
//! addressable width (e.g. 2048). These routines rebuild a dense per-column
//! profile for downstream geometry and display: [`interpolate`] is an
//! edge-preserving cubic Hermite fill, [`interpolate_gaussian`] a smoother
//! kernel-weighted reconstruction. Both are pure functions.

use crate::profile::ProfilePoint;

/// Dense reconstruction via cubic Hermite spline fill.
///
/// Valid source points are sorted by column and rescaled so the maximum
/// observed column maps to the last dense column. Between consecutive
/// samples, y_offset follows a cubic Hermite curve (tangents estimated from
/// neighboring samples) while intensity and width interpolate linearly,
/// clamped to [0, 255]. A filled column is valid iff its interpolated width
/// rounds above zero. Columns outside the sampled range hold the nearest
/// sample's values rather than extrapolating the curve.
pub fn interpolate(
    points: &[ProfilePoint],
    target_resolution: usize,
    image_width: u32,
) -> Vec<ProfilePoint> {
    let mut dense = empty_profile(target_resolution);
    if target_resolution == 0 {
        return dense;
    }

    let samples = scaled_samples(points, target_resolution, image_width);
    if samples.is_empty() {
        return dense;
    }

    // Place the scaled samples themselves.
    for s in &samples {
        dense[s.position] = ProfilePoint {
            column: s.position as u32,
            y_offset: s.y_offset,
            intensity: s.intensity,
            width: s.width,
        };
    }

    // Hermite fill between consecutive samples.
    for k in 0..samples.len().saturating_sub(1) {
        let s0 = &samples[k];
        let s1 = &samples[k + 1];
        let h = (s1.position - s0.position) as f64;
        if h <= 1.0 {
            continue;
        }
        let m0 = tangent(&samples, k);
        let m1 = tangent(&samples, k + 1);
        for column in s0.position + 1..s1.position {
            let t = (column - s0.position) as f64 / h;
            let y = hermite(s0.y_offset, s1.y_offset, m0 * h, m1 * h, t);
            let intensity = lerp_u8(s0.intensity, s1.intensity, t);
            let width = lerp_u8(s0.width, s1.width, t);
            dense[column] = ProfilePoint {
                column: column as u32,
                y_offset: y,
                intensity,
                width,
            };
        }
    }

    // Hold the nearest sample constant outside the sampled range.
    let first = &samples[0];
    for column in 0..first.position {
        dense[column] = ProfilePoint {
            column: column as u32,
            y_offset: first.y_offset,
            intensity: first.intensity,
            width: first.width,
        };
    }
    let last = &samples[samples.len() - 1];
    for column in last.position + 1..target_resolution {
        dense[column] = ProfilePoint {
            column: column as u32,
            y_offset: last.y_offset,
            intensity: last.intensity,
            width: last.width,
        };
    }

    dense
}

/// Dense reconstruction via Gaussian-kernel weighted averaging.
///
/// Every dense column is a kernel-weighted mean over all source samples,
/// with kernel width adaptive to source density:
/// `sigma = target_resolution / (4 * source_count)`. Produces smoother,
/// noise-like reconstructions than the spline fill at the cost of rounding
/// sharp edges.
pub fn interpolate_gaussian(
    points: &[ProfilePoint],
    target_resolution: usize,
    image_width: u32,
) -> Vec<ProfilePoint> {
    let mut dense = empty_profile(target_resolution);
    if target_resolution == 0 {
        return dense;
    }

    let samples = scaled_samples(points, target_resolution, image_width);
    if samples.is_empty() {
        return dense;
    }

    let sigma = (target_resolution as f64 / (4.0 * samples.len() as f64)).max(1e-9);
    let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);

    for (column, out) in dense.iter_mut().enumerate() {
        let mut weight_sum = 0.0;
        let mut y_sum = 0.0;
        let mut intensity_sum = 0.0;
        let mut width_sum = 0.0;
        for s in &samples {
            let d = column as f64 - s.position as f64;
            let w = (-d * d * inv_two_sigma_sq).exp();
            weight_sum += w;
            y_sum += w * s.y_offset;
            intensity_sum += w * s.intensity as f64;
            width_sum += w * s.width as f64;
        }
        if weight_sum <= f64::EPSILON {
            continue;
        }
        *out = ProfilePoint {
            column: column as u32,
            y_offset: y_sum / weight_sum,
            intensity: clamp_u8(intensity_sum / weight_sum),
            width: clamp_u8(width_sum / weight_sum),
        };
    }

    dense
}

// ── Internals ──────────────────────────────────────────────────────────────

/// A valid source point mapped onto the dense column grid.
struct ScaledSample {
    position: usize,
    y_offset: f64,
    intensity: u8,
    width: u8,
}

/// All-invalid dense profile of the requested length.
fn empty_profile(target_resolution: usize) -> Vec<ProfilePoint> {
    (0..target_resolution)
        .map(|column| ProfilePoint {
            column: column as u32,
            y_offset: 0.0,
            intensity: 0,
            width: 0,
        })
        .collect()
}

/// Filter to valid in-range points, sort by column, and rescale so the
/// maximum observed column lands on the last dense column. Duplicate scaled
/// positions keep the later sample.
fn scaled_samples(
    points: &[ProfilePoint],
    target_resolution: usize,
    image_width: u32,
) -> Vec<ScaledSample> {
    let mut valid: Vec<&ProfilePoint> = points
        .iter()
        .filter(|p| p.is_valid() && p.column < image_width.max(1))
        .collect();
    valid.sort_by_key(|p| p.column);

    let Some(max_column) = valid.last().map(|p| p.column) else {
        return Vec::new();
    };
    let scale = if max_column == 0 {
        0.0
    } else {
        (target_resolution - 1) as f64 / max_column as f64
    };

    let mut samples: Vec<ScaledSample> = Vec::with_capacity(valid.len());
    for p in valid {
        let position = ((p.column as f64 * scale).round() as usize).min(target_resolution - 1);
        let sample = ScaledSample {
            position,
            y_offset: p.y_offset,
            intensity: p.intensity,
            width: p.width,
        };
        match samples.last_mut() {
            Some(prev) if prev.position == position => *prev = sample,
            _ => samples.push(sample),
        }
    }
    samples
}

/// Finite-difference tangent estimate at sample `k` (one-sided at the ends).
fn tangent(samples: &[ScaledSample], k: usize) -> f64 {
    let lo = if k == 0 { 0 } else { k - 1 };
    let hi = (k + 1).min(samples.len() - 1);
    if hi == lo {
        return 0.0;
    }
    let dy = samples[hi].y_offset - samples[lo].y_offset;
    let dx = (samples[hi].position - samples[lo].position) as f64;
    dy / dx
}

/// Cubic Hermite basis evaluation on t in [0, 1] with endpoint tangents
/// already scaled by the segment length.
fn hermite(y0: f64, y1: f64, m0: f64, m1: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    (2.0 * t3 - 3.0 * t2 + 1.0) * y0
        + (t3 - 2.0 * t2 + t) * m0
        + (-2.0 * t3 + 3.0 * t2) * y1
        + (t3 - t2) * m1
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    clamp_u8(a as f64 + (b as f64 - a as f64) * t)
}

fn clamp_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(column: u32, y_offset: f64, intensity: u8, width: u8) -> ProfilePoint {
        ProfilePoint {
            column,
            y_offset,
            intensity,
            width,
        }
    }

    #[test]
    fn empty_input_yields_all_invalid() {
        let dense = interpolate(&[], 64, 2048);
        assert_eq!(dense.len(), 64);
        assert!(dense.iter().all(|p| !p.is_valid()));
    }

    #[test]
    fn knots_are_reproduced_exactly() {
        let source = vec![
            point(0, 100.0, 50, 10),
            point(1024, 150.0, 80, 12),
            point(2047, 120.0, 60, 11),
        ];
        let dense = interpolate(&source, 256, 2048);
        assert_eq!(dense.len(), 256);
        assert_relative_eq!(dense[0].y_offset, 100.0);
        assert_relative_eq!(dense[255].y_offset, 120.0);
        // 1024 * 255/2047 rounds to 128.
        assert_relative_eq!(dense[128].y_offset, 150.0);
        assert_eq!(dense[128].intensity, 80);
    }

    #[test]
    fn fill_is_valid_where_width_interpolates_positive() {
        let source = vec![point(0, 10.0, 100, 8), point(100, 20.0, 100, 8)];
        let dense = interpolate(&source, 101, 2048);
        assert!(dense.iter().all(|p| p.is_valid()));
        // Linear width between equal endpoints stays constant.
        assert_eq!(dense[50].width, 8);
        // Monotone y between the two samples.
        assert!(dense[50].y_offset > 10.0 && dense[50].y_offset < 20.0);
    }

    #[test]
    fn edges_hold_nearest_sample() {
        let source = vec![point(512, 42.0, 77, 5), point(1536, 99.0, 33, 6)];
        let dense = interpolate(&source, 128, 2048);
        let first_pos = (512.0 * 127.0 / 1536.0_f64).round() as usize;
        for column in 0..first_pos {
            assert_relative_eq!(dense[column].y_offset, 42.0);
            assert_eq!(dense[column].intensity, 77);
            assert_eq!(dense[column].width, 5);
        }
        assert_relative_eq!(dense[127].y_offset, 99.0);
    }

    #[test]
    fn invalid_and_out_of_range_points_are_ignored() {
        let source = vec![
            point(10, 5.0, 10, 1),
            point(20, 1000.0, 10, 0), // no return
            point(5000, 7.0, 10, 3),  // beyond image width
            point(30, 6.0, 10, 2),
        ];
        let dense = interpolate(&source, 31, 2048);
        // The invalid/out-of-range samples must not influence the curve.
        assert!(dense.iter().all(|p| p.y_offset <= 6.5));
    }

    #[test]
    fn hermite_is_linear_for_collinear_samples() {
        let source = vec![
            point(0, 0.0, 0, 1),
            point(50, 50.0, 0, 1),
            point(100, 100.0, 0, 1),
        ];
        let dense = interpolate(&source, 101, 2048);
        for (column, p) in dense.iter().enumerate() {
            assert_relative_eq!(p.y_offset, column as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn gaussian_single_source_is_constant() {
        let source = vec![point(100, 33.0, 120, 9)];
        let dense = interpolate_gaussian(&source, 64, 2048);
        assert_eq!(dense.len(), 64);
        for p in &dense {
            assert_relative_eq!(p.y_offset, 33.0, epsilon = 1e-9);
            assert_eq!(p.width, 9);
            assert!(p.is_valid());
        }
    }

    #[test]
    fn gaussian_blends_between_samples() {
        let source = vec![point(0, 0.0, 0, 10), point(100, 100.0, 200, 10)];
        let dense = interpolate_gaussian(&source, 100, 2048);
        // Ends pull toward their nearest sample, midpoint sits between.
        assert!(dense[0].y_offset < 1.0);
        assert!(dense[99].y_offset > 99.0);
        assert!(dense[50].y_offset > 25.0 && dense[50].y_offset < 75.0);
    }

    #[test]
    fn gaussian_empty_input_yields_all_invalid() {
        let dense = interpolate_gaussian(&[], 16, 2048);
        assert!(dense.iter().all(|p| !p.is_valid()));
    }
}

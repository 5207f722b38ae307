//! Closed-form circle fitting.
//!
//! Exact three-point construction for hypothesis generation, and an
//! algebraic least-squares refinement minimizing
//! `sum (x^2 + z^2 + D*x + E*z + F)^2` over the inlier set.

use super::types::CircleFit;

/// Determinant threshold below which three points count as collinear.
const COLLINEAR_EPS: f64 = 1e-6;

/// Determinant threshold below which the normal-equation system is singular.
const SINGULAR_EPS: f64 = 1e-12;

/// Centre of the unique circle through three points, via perpendicular
/// bisector intersection. Near-collinear triples return `None`.
pub fn circle_through_three(
    a: [f64; 2],
    b: [f64; 2],
    c: [f64; 2],
) -> Option<(f64, f64)> {
    let d = 2.0 * ((b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]));
    if d.abs() < COLLINEAR_EPS {
        return None;
    }
    let a_sq = a[0] * a[0] + a[1] * a[1];
    let b_sq = b[0] * b[0] + b[1] * b[1];
    let c_sq = c[0] * c[0] + c[1] * c[1];
    let ux = ((b_sq - a_sq) * (c[1] - a[1]) - (c_sq - a_sq) * (b[1] - a[1])) / d;
    let uz = ((c_sq - a_sq) * (b[0] - a[0]) - (b_sq - a_sq) * (c[0] - a[0])) / d;
    Some((ux, uz))
}

/// Algebraic least-squares circle fit.
///
/// Solves the 3x3 normal equations of `x^2 + z^2 + D*x + E*z + F = 0` by
/// determinant-based elimination; centre = (-D/2, -E/2), radius =
/// sqrt((D^2 + E^2)/4 - F). Returns `None` when the system is singular or
/// the radius squared comes out non-positive.
pub fn fit_circle_algebraic(points: &[[f64; 2]]) -> Option<CircleFit> {
    if points.len() < 3 {
        return None;
    }

    let n = points.len() as f64;
    let mut sx = 0.0;
    let mut sz = 0.0;
    let mut sxx = 0.0;
    let mut szz = 0.0;
    let mut sxz = 0.0;
    let mut sr = 0.0;
    let mut sxr = 0.0;
    let mut szr = 0.0;
    for &[x, z] in points {
        let r = x * x + z * z;
        sx += x;
        sz += z;
        sxx += x * x;
        szz += z * z;
        sxz += x * z;
        sr += r;
        sxr += x * r;
        szr += z * r;
    }

    // Normal equations A * [D, E, F]^T = rhs.
    let a = [[sxx, sxz, sx], [sxz, szz, sz], [sx, sz, n]];
    let rhs = [-sxr, -szr, -sr];

    let det = det3(&a);
    if det.abs() < SINGULAR_EPS {
        return None;
    }
    let d = det3(&replace_column(&a, 0, &rhs)) / det;
    let e = det3(&replace_column(&a, 1, &rhs)) / det;
    let f = det3(&replace_column(&a, 2, &rhs)) / det;

    let cx = -d / 2.0;
    let cz = -e / 2.0;
    let radius_sq = (d * d + e * e) / 4.0 - f;
    if !(radius_sq.is_finite() && radius_sq > 0.0) {
        return None;
    }
    let radius = radius_sq.sqrt();

    Some(CircleFit {
        cx,
        cz,
        radius,
        rms: rms_radial_residual(cx, cz, radius, points),
    })
}

/// Root-mean-square distance-from-circle over a point set.
pub fn rms_radial_residual(cx: f64, cz: f64, radius: f64, points: &[[f64; 2]]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = points
        .iter()
        .map(|&[x, z]| {
            let d = ((x - cx).powi(2) + (z - cz).powi(2)).sqrt() - radius;
            d * d
        })
        .sum();
    (sum_sq / points.len() as f64).sqrt()
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn replace_column(m: &[[f64; 3]; 3], col: usize, v: &[f64; 3]) -> [[f64; 3]; 3] {
    let mut out = *m;
    for row in 0..3 {
        out[row][col] = v[row];
    }
    out
}

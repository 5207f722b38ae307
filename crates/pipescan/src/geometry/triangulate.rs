//! Pixel-to-world triangulation: per-pixel camera rays intersected with the
//! laser's world plane.

use nalgebra::Vector3;

use super::{rig_rotation, LaserPlane, PoseConfig, WorldPoint};

/// Rejects near-parallel ray/plane pairs.
const PARALLEL_EPS: f64 = 1e-12;

/// Micrometers to millimeters.
const UM_TO_MM: f64 = 1e-3;

/// Triangulate valid (column, y_offset) pixel pairs into world points.
///
/// The camera is a pinhole with principal point at the image centre. For a
/// pixel (u, v) the camera-local ray direction is
/// `((u - cx) * px / f, (cy - v) * px / f, 1)` normalized; v grows downward,
/// hence the decreasing local Y. The ray is rotated into the world frame by
/// the camera rig rotation and intersected with the laser plane.
///
/// A pixel whose ray misses the plane, or whose intersection does not lie
/// deeper than the camera (z > camera z), produces no output sample. The
/// output preserves the order of accepted inputs but is not index-aligned
/// with the input arrays.
pub fn triangulate(columns: &[u32], rows: &[f64], pose: &PoseConfig) -> Vec<WorldPoint> {
    let n = columns.len().min(rows.len());
    let mut points = Vec::with_capacity(n);
    if n == 0 {
        return points;
    }

    let focal = pose.focal_length_mm;
    if !(focal.is_finite() && focal > 0.0) {
        return points;
    }
    let px_mm = pose.pixel_size_um * UM_TO_MM;
    let cx = pose.image_width as f64 / 2.0;
    let cy = pose.effective_image_height() as f64 / 2.0;

    let camera_rotation = rig_rotation(&pose.camera_orientation);
    let origin = pose.camera_origin();
    let plane = LaserPlane::from_pose(pose);

    for (&u, &v) in columns.iter().zip(rows.iter()).take(n) {
        let local = Vector3::new(
            (u as f64 - cx) * px_mm / focal,
            (cy - v) * px_mm / focal,
            1.0,
        );
        let direction = camera_rotation * local.normalize();

        let denom = plane.normal.dot(&direction);
        if denom.abs() < PARALLEL_EPS {
            continue;
        }
        let t = plane.normal.dot(&(plane.point - origin)) / denom;
        if !t.is_finite() {
            continue;
        }
        let p = origin + direction * t;
        // Surfaces must lie in front of, not behind, the camera.
        if p.z <= origin.z {
            continue;
        }
        points.push(WorldPoint::from(p));
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::OrientationDeg;
    use approx::assert_relative_eq;

    /// Camera at origin looking along +z, level laser plane 500 mm below.
    fn level_pose() -> PoseConfig {
        PoseConfig::default()
    }

    #[test]
    fn intersections_land_on_the_laser_plane() {
        let pose = level_pose();
        let cy = pose.effective_image_height() as f64 / 2.0;
        // Pixels below the principal point look down toward the plane.
        let columns = vec![900, 1024, 1300];
        let rows = vec![cy + 120.0, cy + 200.0, cy + 90.0];

        let points = triangulate(&columns, &rows, &pose);
        assert_eq!(points.len(), 3);
        let plane = LaserPlane::from_pose(&pose);
        for p in &points {
            assert_relative_eq!(p.y, pose.laser_position[1], epsilon = 1e-9);
            assert_relative_eq!(plane.residual(p), 0.0, epsilon = 1e-9);
            assert!(p.z > 0.0);
        }
        // Columns left of centre have negative cross-track x.
        assert!(points[0].x < 0.0);
        assert!(points[2].x > 0.0);
    }

    #[test]
    fn rays_away_from_the_plane_are_dropped() {
        let pose = level_pose();
        let cy = pose.effective_image_height() as f64 / 2.0;
        // One pixel looks up (away from the plane below), one looks down.
        let columns = vec![1024, 1024];
        let rows = vec![cy - 150.0, cy + 150.0];

        let points = triangulate(&columns, &rows, &pose);
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].y, pose.laser_position[1], epsilon = 1e-9);
    }

    #[test]
    fn plane_behind_camera_yields_empty() {
        let mut pose = level_pose();
        // Pitch the laser so its plane becomes z = laser_z, behind the camera.
        pose.laser_orientation = OrientationDeg {
            pitch: 90.0,
            roll: 0.0,
            yaw: 0.0,
        };
        pose.laser_position = [0.0, 0.0, -100.0];

        let cy = pose.effective_image_height() as f64 / 2.0;
        let columns = vec![512, 1024, 1536];
        let rows = vec![cy - 100.0, cy + 10.0, cy + 100.0];
        assert!(triangulate(&columns, &rows, &pose).is_empty());
    }

    #[test]
    fn output_order_follows_accepted_input_order() {
        let pose = level_pose();
        let cy = pose.effective_image_height() as f64 / 2.0;
        let columns = vec![500, 1024, 1024, 1600];
        let rows = vec![cy + 50.0, cy - 50.0, cy + 80.0, cy + 50.0];

        let points = triangulate(&columns, &rows, &pose);
        // The up-looking pixel drops out; order of the rest is preserved.
        assert_eq!(points.len(), 3);
        assert!(points[0].x < points[1].x);
        assert!(points[1].x < points[2].x);
    }

    #[test]
    fn mismatched_input_lengths_use_common_prefix() {
        let pose = level_pose();
        let cy = pose.effective_image_height() as f64 / 2.0;
        let columns = vec![1024, 1100];
        let rows = vec![cy + 100.0];
        let points = triangulate(&columns, &rows, &pose);
        assert_eq!(points.len(), 1);
    }
}

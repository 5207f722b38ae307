//! World-frame geometry: sensor pose model and the laser plane.
//!
//! All positions are millimeters in a common world frame: x cross-track,
//! y elevation, z depth (larger z = farther from the camera). Orientations
//! are degrees. The rig mounting conventions live here as named helpers so
//! every consumer reproduces them exactly.

mod synthetic;
mod triangulate;

pub use synthetic::synthetic_pipe_profile;
pub use triangulate::triangulate;

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Principal-point fallback when the pose does not carry an image height.
pub const DEFAULT_IMAGE_HEIGHT: u32 = 1088;

/// Laser fan plane normal in the laser's local frame.
///
/// The fan is modelled as lying in the local XY plane emitting along +Z; the
/// 90-degree mounting rotation of the unit flips its effective normal to -Y.
const LASER_LOCAL_NORMAL: [f64; 3] = [0.0, -1.0, 0.0];

// ── Types ──────────────────────────────────────────────────────────────────

/// A triangulated point in world millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Cross-track position.
    pub x: f64,
    /// Elevation.
    pub y: f64,
    /// Depth; larger values are farther from the camera.
    pub z: f64,
}

impl WorldPoint {
    /// Construct from components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub(crate) fn coords(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3<f64>> for WorldPoint {
    fn from(v: Vector3<f64>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Orientation in degrees, rig convention (see [`rig_rotation`]).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationDeg {
    /// Tilt about the x axis; positive tilts the optical axis look-down.
    pub pitch: f64,
    /// Rotation about the z axis.
    pub roll: f64,
    /// Rotation about the y axis.
    pub yaw: f64,
}

/// Static camera + laser pose and optics, owned by the caller and passed by
/// value per triangulation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseConfig {
    /// Camera position [x, y, z] in world millimeters.
    pub camera_position: [f64; 3],
    /// Camera orientation, degrees.
    pub camera_orientation: OrientationDeg,
    /// Laser position [x, y, z] in world millimeters.
    pub laser_position: [f64; 3],
    /// Laser orientation, degrees.
    pub laser_orientation: OrientationDeg,
    /// Focal length in millimeters.
    pub focal_length_mm: f64,
    /// Pixel pitch in micrometers.
    pub pixel_size_um: f64,
    /// Sensor width in pixels.
    pub image_width: u32,
    /// Sensor height in pixels; [`DEFAULT_IMAGE_HEIGHT`] when unknown.
    #[serde(default)]
    pub image_height: Option<u32>,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            camera_position: [0.0, 0.0, 0.0],
            camera_orientation: OrientationDeg::default(),
            laser_position: [0.0, -500.0, 0.0],
            laser_orientation: OrientationDeg::default(),
            focal_length_mm: 16.0,
            pixel_size_um: 4.8,
            image_width: 2048,
            image_height: Some(DEFAULT_IMAGE_HEIGHT),
        }
    }
}

impl PoseConfig {
    pub(crate) fn camera_origin(&self) -> Vector3<f64> {
        Vector3::from(self.camera_position)
    }

    /// Image height with the documented fallback applied.
    pub fn effective_image_height(&self) -> u32 {
        self.image_height.unwrap_or(DEFAULT_IMAGE_HEIGHT)
    }
}

/// The laser's world plane: anchored at the laser position, normal obtained
/// by rotating [`LASER_LOCAL_NORMAL`] through the laser's rig rotation.
#[derive(Debug, Clone, Copy)]
pub struct LaserPlane {
    /// Unit plane normal in world coordinates.
    pub normal: Vector3<f64>,
    /// A point on the plane (the laser position).
    pub point: Vector3<f64>,
}

impl LaserPlane {
    /// Build the world plane from a pose configuration.
    pub fn from_pose(pose: &PoseConfig) -> Self {
        let rotation = rig_rotation(&pose.laser_orientation);
        Self {
            normal: rotation * Vector3::from(LASER_LOCAL_NORMAL),
            point: Vector3::from(pose.laser_position),
        }
    }

    /// Signed plane-equation residual of a world point; zero on the plane.
    pub fn residual(&self, p: &WorldPoint) -> f64 {
        self.normal.dot(&(p.coords() - self.point))
    }
}

// ── Rig conventions ────────────────────────────────────────────────────────

/// Build the world rotation for a rig orientation.
///
/// Rig convention: pitch is negated before conversion to radians (positive
/// pitch tilts the optical axis in the sensor's natural look-down sense),
/// then rotations apply in intrinsic X (pitch), Y (yaw), Z (roll) order.
pub(crate) fn rig_rotation(o: &OrientationDeg) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), (-o.pitch).to_radians())
        * Rotation3::from_axis_angle(&Vector3::y_axis(), o.yaw.to_radians())
        * Rotation3::from_axis_angle(&Vector3::z_axis(), o.roll.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_orientation_gives_identity_rotation() {
        let r = rig_rotation(&OrientationDeg::default());
        let v = r * Vector3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(v.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn pitch_is_negated_before_rotation() {
        // +90 degrees rig pitch applies Rx(-90), mapping +Z onto +Y.
        let r = rig_rotation(&OrientationDeg {
            pitch: 90.0,
            roll: 0.0,
            yaw: 0.0,
        });
        let v = r * Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn level_laser_plane_is_horizontal() {
        let pose = PoseConfig::default();
        let plane = LaserPlane::from_pose(&pose);
        assert_relative_eq!(plane.normal.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(plane.normal.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.normal.z, 0.0, epsilon = 1e-12);

        let on_plane = WorldPoint::new(123.0, pose.laser_position[1], 456.0);
        assert_relative_eq!(plane.residual(&on_plane), 0.0, epsilon = 1e-12);
        let off_plane = WorldPoint::new(0.0, pose.laser_position[1] + 10.0, 0.0);
        assert_relative_eq!(plane.residual(&off_plane).abs(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn image_height_fallback() {
        let mut pose = PoseConfig::default();
        pose.image_height = None;
        assert_eq!(pose.effective_image_height(), DEFAULT_IMAGE_HEIGHT);
        pose.image_height = Some(720);
        assert_eq!(pose.effective_image_height(), 720);
    }
}

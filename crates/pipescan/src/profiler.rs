//! High-level pipeline API.
//!
//! [`PipeProfiler`] is the primary entry point for processing decoded sensor
//! files: it wraps a pose configuration and a [`DetectConfig`] and runs
//! pixel extraction, triangulation, and pipe detection per profile, threading
//! each detection into the next profile's search as the explicit
//! previous-result bias.

use serde::{Deserialize, Serialize};

use crate::circle::{detect_pipe, DetectConfig, PipeDetection};
use crate::geometry::{triangulate, PoseConfig, WorldPoint};
use crate::interp::interpolate;
use crate::profile::{BinFileData, LaserProfile};

/// Result of running the pipeline over one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResult {
    /// Index of the source profile within the file.
    pub profile_index: usize,
    /// Triangulated world points, in accepted-pixel order.
    pub points: Vec<WorldPoint>,
    /// Pipe detection, when one satisfied the constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<PipeDetection>,
}

/// End-to-end profile-to-detection pipeline.
///
/// Create once, process many profiles. All state lives in the configuration;
/// frame-to-frame tracking state is passed explicitly per call.
///
/// # Examples
///
/// ```no_run
/// use pipescan::{PipeProfiler, PoseConfig};
///
/// let bytes = std::fs::read("scan.bin")?;
/// let data = pipescan::decode(&bytes)?;
/// let profiler = PipeProfiler::new(PoseConfig::default(), 300.0);
/// for result in profiler.process_file(&data) {
///     if let Some(det) = result.detection {
///         println!("profile {}: diameter {:.1} mm", result.profile_index, det.diameter);
///     }
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct PipeProfiler {
    pose: PoseConfig,
    expected_diameter_mm: f64,
    config: DetectConfig,
}

impl PipeProfiler {
    /// Create a profiler with default detection settings.
    pub fn new(pose: PoseConfig, expected_diameter_mm: f64) -> Self {
        Self {
            pose,
            expected_diameter_mm,
            config: DetectConfig::default(),
        }
    }

    /// Create with full detection-config control.
    pub fn with_config(pose: PoseConfig, expected_diameter_mm: f64, config: DetectConfig) -> Self {
        Self {
            pose,
            expected_diameter_mm,
            config,
        }
    }

    /// The pose configuration in use.
    pub fn pose(&self) -> &PoseConfig {
        &self.pose
    }

    /// Access the detection configuration.
    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Mutable access for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut DetectConfig {
        &mut self.config
    }

    /// Detect a pipe in an already-triangulated point sequence.
    pub fn detect(
        &self,
        points: &[WorldPoint],
        previous: Option<&PipeDetection>,
    ) -> Option<PipeDetection> {
        detect_pipe(points, self.expected_diameter_mm, previous, &self.config)
    }

    /// Run triangulation and detection over one decoded profile.
    pub fn process_profile(
        &self,
        profile: &LaserProfile,
        previous: Option<&PipeDetection>,
    ) -> ProfileResult {
        let (columns, rows) = profile.pixel_coords();
        self.process_coords(profile.index, &columns, &rows, previous)
    }

    /// Like [`Self::process_profile`], but reconstructs a dense per-column
    /// profile first. The dense resolution is the sensor width, so the
    /// reconstructed columns stay valid pixel coordinates for triangulation.
    pub fn process_profile_dense(
        &self,
        profile: &LaserProfile,
        previous: Option<&PipeDetection>,
    ) -> ProfileResult {
        let width = self.pose.image_width;
        let dense = interpolate(&profile.points, width as usize, width);
        let mut columns = Vec::new();
        let mut rows = Vec::new();
        for p in dense.iter().filter(|p| p.is_valid()) {
            columns.push(p.column);
            rows.push(p.y_offset);
        }
        self.process_coords(profile.index, &columns, &rows, previous)
    }

    fn process_coords(
        &self,
        profile_index: usize,
        columns: &[u32],
        rows: &[f64],
        previous: Option<&PipeDetection>,
    ) -> ProfileResult {
        let points = triangulate(columns, rows, &self.pose);
        let detection = self.detect(&points, previous);
        tracing::debug!(
            profile = profile_index,
            points = points.len(),
            detected = detection.is_some(),
            "profile processed"
        );
        ProfileResult {
            profile_index,
            points,
            detection,
        }
    }

    /// Process every profile of a decoded file in scan order, threading each
    /// detection into the next profile's search region.
    pub fn process_file(&self, data: &BinFileData) -> Vec<ProfileResult> {
        self.process_file_impl(data, false)
    }

    /// [`Self::process_file`] with dense profile reconstruction per profile.
    pub fn process_file_dense(&self, data: &BinFileData) -> Vec<ProfileResult> {
        self.process_file_impl(data, true)
    }

    fn process_file_impl(&self, data: &BinFileData, dense: bool) -> Vec<ProfileResult> {
        let mut results = Vec::with_capacity(data.profile_count());
        let mut previous: Option<PipeDetection> = None;
        for profile in &data.profiles {
            let result = if dense {
                self.process_profile_dense(profile, previous.as_ref())
            } else {
                self.process_profile(profile, previous.as_ref())
            };
            if result.detection.is_some() {
                previous = result.detection;
            }
            results.push(result);
        }
        let hits = results.iter().filter(|r| r.detection.is_some()).count();
        tracing::info!(
            profiles = results.len(),
            detections = hits,
            "file processed"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::synthetic_pipe_profile;
    use crate::profile::{FileHeader, ProfilePoint};
    use approx::assert_relative_eq;

    #[test]
    fn detects_pipe_in_synthetic_cloud() {
        let pose = PoseConfig::default();
        let diameter = 320.0;
        // The arc is only ~1/4 of the sweep; give the sampler enough rounds
        // to make a pure-arc triple a statistical certainty.
        let config = DetectConfig {
            max_iters: 1000,
            ..DetectConfig::default()
        };
        let profiler = PipeProfiler::with_config(pose, diameter, config);
        let points = synthetic_pipe_profile(&pose, diameter, 40.0, 400);

        let det = profiler.detect(&points, None).expect("synthetic pipe");
        assert!((det.diameter - diameter).abs() / diameter < 0.05);
        assert_relative_eq!(det.fit.cx, 40.0, epsilon = 5.0);
    }

    /// Helper: a decoded file whose single profile triangulates to nothing.
    fn empty_file() -> BinFileData {
        BinFileData {
            header: FileHeader {
                format: crate::profile::SUPPORTED_FORMAT,
                version: 1,
                header_size: 12,
                points_per_profile: 4,
                reserved0: 0,
                reserved1: 0,
            },
            profiles: vec![LaserProfile {
                index: 0,
                comment: None,
                comment_raw: None,
                points: (0..4)
                    .map(|column| ProfilePoint {
                        column,
                        y_offset: 0.0,
                        intensity: 0,
                        width: 0,
                    })
                    .collect(),
                valid_count: 0,
                byte_offset: 12,
            }],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn empty_profiles_yield_no_detection() {
        let profiler = PipeProfiler::new(PoseConfig::default(), 300.0);
        let results = profiler.process_file(&empty_file());
        assert_eq!(results.len(), 1);
        assert!(results[0].points.is_empty());
        assert!(results[0].detection.is_none());
    }

    #[test]
    fn dense_processing_fills_sparse_profiles() {
        let pose = PoseConfig::default();
        let cy = pose.effective_image_height() as f64 / 2.0;
        // A sparse flat seabed line: a handful of columns, constant height.
        let profile = LaserProfile {
            index: 0,
            comment: None,
            comment_raw: None,
            points: [0u32, 400, 900, 1500, 2047]
                .iter()
                .map(|&column| ProfilePoint {
                    column,
                    y_offset: cy + 150.0,
                    intensity: 200,
                    width: 6,
                })
                .collect(),
            valid_count: 5,
            byte_offset: 12,
        };

        let profiler = PipeProfiler::new(pose, 300.0);
        let sparse = profiler.process_profile(&profile, None);
        let dense = profiler.process_profile_dense(&profile, None);
        assert_eq!(sparse.points.len(), 5);
        // Reconstruction fills every sensor column of the spanned range.
        assert!(dense.points.len() > 1000);
        // A flat line is not a pipe in either rendition.
        assert!(sparse.detection.is_none());
        assert!(dense.detection.is_none());
    }

    #[test]
    fn config_is_tunable_after_construction() {
        let mut profiler = PipeProfiler::new(PoseConfig::default(), 300.0);
        profiler.config_mut().tolerance_mm = 12.0;
        assert_eq!(profiler.config().tolerance_mm, 12.0);
    }
}

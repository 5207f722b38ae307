//! pipescan — laser triangulation profile decoding and robust pipe detection.
//!
//! Reconstructs 3D seabed cross-sections from a triangulation-laser imaging
//! rig's binary profile files and fits pipe cross-sections to them, tolerant
//! of clutter, noise, and truncated input. The pipeline stages are:
//!
//! 1. **Profile** – binary file decoding into typed per-column samples,
//!    with partial-success recovery on truncated input.
//! 2. **Interp** – sparse-to-dense profile reconstruction (cubic Hermite
//!    fill or Gaussian-kernel smoothing).
//! 3. **Geometry** – pinhole ray / laser-plane triangulation under the rig's
//!    pose conventions, plus a synthetic demo profile generator.
//! 4. **Circle** – randomized robust circle fitting with frame-to-frame
//!    tracking and algebraic refinement.
//!
//! # Public API
//! - [`PipeProfiler`] as the end-to-end entry point
//! - [`decode`] / [`triangulate`] / [`detect_pipe`] for direct stage access
//! - [`PoseConfig`] and [`DetectConfig`] for tuning
//!
//! Every stage is a pure transform: no I/O, no hidden state. The only
//! cross-call state is the previous detection, passed explicitly by the
//! caller.

mod circle;
mod geometry;
mod interp;
mod profile;
mod profiler;

pub use circle::{
    circle_through_three, detect_pipe, detect_pipe_with_rng, fit_circle_algebraic,
    rms_radial_residual, CircleFit, DetectConfig, PipeDetection,
};
pub use geometry::{
    synthetic_pipe_profile, triangulate, LaserPlane, OrientationDeg, PoseConfig, WorldPoint,
    DEFAULT_IMAGE_HEIGHT,
};
pub use interp::{interpolate, interpolate_gaussian};
pub use profile::{
    decode, BinFileData, DecodeWarning, FileHeader, FormatError, LaserProfile, ProfilePoint,
    MAX_PROFILES, SUPPORTED_FORMAT, SUPPORTED_VERSION,
};
pub use profiler::{PipeProfiler, ProfileResult};

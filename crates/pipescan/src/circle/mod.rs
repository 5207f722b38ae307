//! Robust circle fitting in the cross-section (x, z) plane.
//!
//! [`fit_circle_algebraic`] is the closed-form least-squares refinement;
//! [`detect_pipe`] wraps it in a randomized hypothesize-and-test search with
//! optional frame-to-frame tracking.

mod fit;
mod ransac;
mod types;

pub use fit::{circle_through_three, fit_circle_algebraic, rms_radial_residual};
pub use ransac::{detect_pipe, detect_pipe_with_rng};
pub use types::{CircleFit, DetectConfig, PipeDetection};

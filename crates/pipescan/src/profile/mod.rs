//! Profile data model: decoded headers, per-column samples, and diagnostics.
//!
//! A sensor file is a fixed big-endian header followed by a sequence of
//! profiles. Each profile carries one optional free-form comment and exactly
//! `points_per_profile` per-column samples. File order is scan order.

mod decode;

pub use decode::{
    decode, DecodeWarning, FormatError, MAX_PROFILES, SUPPORTED_FORMAT, SUPPORTED_VERSION,
};

// ── Types ──────────────────────────────────────────────────────────────────

/// Fixed file header preceding the first profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileHeader {
    /// Format tag; only [`SUPPORTED_FORMAT`] is accepted.
    pub format: u8,
    /// Layout version; a mismatch is a warning, not an error.
    pub version: u8,
    /// Byte length of the header block before the first profile.
    pub header_size: u16,
    /// Number of point records per profile.
    pub points_per_profile: u16,
    /// Reserved field, carried through verbatim.
    pub reserved0: u16,
    /// Reserved field, carried through verbatim.
    pub reserved1: u16,
}

/// One per-column laser return sample.
///
/// `y_offset` is the decoded 12.4 fixed-point vertical pixel position of the
/// laser line in this column. A zero `width` marks "no return".
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfilePoint {
    /// Column index within the profile (cross-track pixel position).
    pub column: u32,
    /// Vertical pixel position of the return, in sensor pixel rows.
    pub y_offset: f64,
    /// Return intensity, 0–255.
    pub intensity: u8,
    /// Return pulse width, 0–255; 0 means the column saw no return.
    pub width: u8,
}

impl ProfilePoint {
    /// Whether this column carries a real return.
    pub fn is_valid(&self) -> bool {
        self.width > 0
    }
}

/// One decoded scan line of laser range samples.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LaserProfile {
    /// Sequence index within the file (scan order).
    pub index: usize,
    /// Structured comment metadata, when the comment text parsed as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<serde_json::Value>,
    /// Raw comment text, kept even when structured parsing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_raw: Option<String>,
    /// Exactly `points_per_profile` per-column samples.
    pub points: Vec<ProfilePoint>,
    /// Number of valid (width > 0) samples.
    pub valid_count: usize,
    /// Byte offset where this profile began, for diagnostics.
    pub byte_offset: usize,
}

impl LaserProfile {
    /// Extract (column, y_offset) pairs of the valid samples, in ascending
    /// column order (column order is implicit from the point index).
    pub fn pixel_coords(&self) -> (Vec<u32>, Vec<f64>) {
        let mut columns = Vec::with_capacity(self.valid_count);
        let mut rows = Vec::with_capacity(self.valid_count);
        for p in self.points.iter().filter(|p| p.is_valid()) {
            columns.push(p.column);
            rows.push(p.y_offset);
        }
        (columns, rows)
    }
}

/// A fully decoded sensor file: header, profiles in scan order, and any
/// advisory warnings collected along the way.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BinFileData {
    /// The decoded file header.
    pub header: FileHeader,
    /// Profiles in file (scan) order.
    pub profiles: Vec<LaserProfile>,
    /// Advisory diagnostics; never cause a decode to fail.
    #[serde(skip)]
    pub warnings: Vec<DecodeWarning>,
}

impl BinFileData {
    /// Total number of decoded profiles.
    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }
}

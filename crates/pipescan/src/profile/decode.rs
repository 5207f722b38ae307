//! Binary sensor-file decoder.
//!
//! Layout (all multi-byte fields big-endian):
//!
//! ```text
//! Header (header_size bytes, >= 12):
//!   bytes 0-1: format:u8 << 8 | version:u8
//!   bytes 2-3: header_size:u16
//!   bytes 4-5: points_per_profile:u16
//!   bytes 6-7: reserved0:u16
//!   bytes 8-9: reserved1:u16
//! Then repeated profiles until EOF or corruption:
//!   2 bytes: comment_length:i16
//!   C bytes: UTF-8 text, optionally JSON, NUL-padded
//!   P x 4 bytes: point records (y_offset_raw:u16, intensity:u8, width:u8)
//! ```
//!
//! Only a structurally invalid header is fatal. Truncation mid-profile stops
//! decoding and returns everything parsed so far, with a warning on the
//! result.

use super::{BinFileData, FileHeader, LaserProfile, ProfilePoint};

/// The single supported format tag.
pub const SUPPORTED_FORMAT: u8 = 2;

/// Layout version this decoder was written against. Other versions decode
/// with a [`DecodeWarning::VersionMismatch`].
pub const SUPPORTED_VERSION: u8 = 1;

/// Minimum byte length of a valid header.
const MIN_HEADER_LEN: usize = 12;

/// Bytes per point record: u16 y_offset + u8 intensity + u8 width.
const POINT_RECORD_LEN: usize = 4;

/// Fixed-point scale of the y_offset field (12.4 format).
const Y_OFFSET_SCALE: f64 = 16.0;

/// Hard cap on decoded profiles, bounding the loop on corrupt input.
pub const MAX_PROFILES: usize = 100_000;

// ── Errors and warnings ────────────────────────────────────────────────────

/// Fatal decode failures. Raised only for a structurally invalid header;
/// everything past a valid header degrades to warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Buffer shorter than the minimum header size.
    TooShort {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        got: usize,
    },
    /// Format tag is not the supported value.
    UnsupportedFormat {
        /// The one accepted tag.
        expected: u8,
        /// Tag found in the file.
        got: u8,
    },
    /// Header declares zero points per profile, which cannot describe data.
    EmptyProfile,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort { needed, got } => {
                write!(f, "file too short: need {} bytes, got {}", needed, got)
            }
            Self::UnsupportedFormat { expected, got } => {
                write!(f, "unsupported format tag {} (expected {})", got, expected)
            }
            Self::EmptyProfile => write!(f, "header declares zero points per profile"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Advisory decode diagnostics. Collected on [`BinFileData::warnings`];
/// decoding always continues (or stops cleanly) after recording one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// Layout version differs from the one this decoder targets.
    VersionMismatch {
        /// Version the decoder was written against.
        expected: u8,
        /// Version found in the file.
        got: u8,
    },
    /// The buffer ended mid-profile; all prior profiles were kept.
    Truncated {
        /// Index the truncated profile would have had.
        profile_index: usize,
        /// Byte offset where the truncated profile began.
        offset: usize,
    },
    /// Comment text was not valid structured (JSON) data; raw text kept.
    CommentParse {
        /// Profile whose comment failed to parse.
        profile_index: usize,
    },
}

impl std::fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VersionMismatch { expected, got } => {
                write!(f, "version {} differs from expected {}", got, expected)
            }
            Self::Truncated {
                profile_index,
                offset,
            } => write!(
                f,
                "file truncated in profile {} at byte {}",
                profile_index, offset
            ),
            Self::CommentParse { profile_index } => {
                write!(f, "profile {} comment is not structured data", profile_index)
            }
        }
    }
}

// ── Decoder ────────────────────────────────────────────────────────────────

/// Decode a raw sensor file buffer.
///
/// Fails only when the header is structurally invalid. Truncated or
/// partially corrupt bodies return every fully parsed profile together with
/// advisory warnings.
pub fn decode(bytes: &[u8]) -> Result<BinFileData, FormatError> {
    if bytes.len() < MIN_HEADER_LEN {
        return Err(FormatError::TooShort {
            needed: MIN_HEADER_LEN,
            got: bytes.len(),
        });
    }

    let tag = read_u16(bytes, 0);
    let format = (tag >> 8) as u8;
    let version = (tag & 0xff) as u8;
    if format != SUPPORTED_FORMAT {
        return Err(FormatError::UnsupportedFormat {
            expected: SUPPORTED_FORMAT,
            got: format,
        });
    }

    let header = FileHeader {
        format,
        version,
        header_size: read_u16(bytes, 2),
        points_per_profile: read_u16(bytes, 4),
        reserved0: read_u16(bytes, 6),
        reserved1: read_u16(bytes, 8),
    };
    if header.points_per_profile == 0 {
        return Err(FormatError::EmptyProfile);
    }

    let mut warnings = Vec::new();
    if header.version != SUPPORTED_VERSION {
        warnings.push(DecodeWarning::VersionMismatch {
            expected: SUPPORTED_VERSION,
            got: header.version,
        });
    }

    // A header_size below the fixed minimum would overlap the header fields
    // themselves; start profiles no earlier than the minimum.
    let mut offset = (header.header_size as usize).max(MIN_HEADER_LEN);
    let points_per_profile = header.points_per_profile as usize;
    let mut profiles = Vec::new();

    while offset < bytes.len() && profiles.len() < MAX_PROFILES {
        let profile_start = offset;
        let index = profiles.len();

        let Some(comment_len) = try_read_i16(bytes, offset) else {
            warnings.push(DecodeWarning::Truncated {
                profile_index: index,
                offset: profile_start,
            });
            break;
        };
        offset += 2;

        let mut comment = None;
        let mut comment_raw = None;
        if comment_len > 0 {
            let len = comment_len as usize;
            if bytes.len() - offset < len {
                warnings.push(DecodeWarning::Truncated {
                    profile_index: index,
                    offset: profile_start,
                });
                break;
            }
            let text = String::from_utf8_lossy(&bytes[offset..offset + len]);
            let text = text.trim_end_matches('\0');
            if !text.is_empty() {
                match serde_json::from_str::<serde_json::Value>(text) {
                    Ok(value) => comment = Some(value),
                    Err(_) => warnings.push(DecodeWarning::CommentParse {
                        profile_index: index,
                    }),
                }
                comment_raw = Some(text.to_owned());
            }
            offset += len;
        }

        let body_len = points_per_profile * POINT_RECORD_LEN;
        if bytes.len() - offset < body_len {
            warnings.push(DecodeWarning::Truncated {
                profile_index: index,
                offset: profile_start,
            });
            break;
        }

        let mut points = Vec::with_capacity(points_per_profile);
        let mut valid_count = 0usize;
        for column in 0..points_per_profile {
            let record = offset + column * POINT_RECORD_LEN;
            let raw = read_u16(bytes, record);
            let width = bytes[record + 3];
            if width > 0 {
                valid_count += 1;
            }
            points.push(ProfilePoint {
                column: column as u32,
                y_offset: raw as f64 / Y_OFFSET_SCALE,
                intensity: bytes[record + 2],
                width,
            });
        }
        offset += body_len;

        profiles.push(LaserProfile {
            index,
            comment,
            comment_raw,
            points,
            valid_count,
            byte_offset: profile_start,
        });
    }

    Ok(BinFileData {
        header,
        profiles,
        warnings,
    })
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

fn try_read_i16(bytes: &[u8], offset: usize) -> Option<i16> {
    if bytes.len() - offset < 2 {
        return None;
    }
    Some(i16::from_be_bytes([bytes[offset], bytes[offset + 1]]))
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for time parsing and timeline edits.

use crate::ids::{ClipId, MarkerId, TrackId};
use crate::time::RationalTime;
use thiserror::Error;

/// Errors produced while parsing or constructing time values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeError {
    /// Frame rate is zero, negative or not finite
    #[error("Invalid frame rate: {0}")]
    InvalidRate(f64),

    /// Timecode string could not be parsed
    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),
}

/// Errors produced by edit operations.
///
/// The display strings are surfaced verbatim to callers of the session,
/// so they are kept short and stable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// Track does not exist in the timeline
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Clip does not exist in the timeline
    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    /// Marker does not exist in the timeline
    #[error("Marker not found: {0}")]
    MarkerNotFound(MarkerId),

    /// Track is locked against edits
    #[error("Track is locked: {0}")]
    TrackLocked(TrackId),

    /// Split point is not strictly inside the clip
    #[error("Split time {time} is outside clip {clip_id}")]
    InvalidSplitPoint {
        /// Clip being split
        clip_id: ClipId,
        /// Requested split time
        time: RationalTime,
    },

    /// Trim would leave the clip in an invalid state
    #[error("Invalid trim: {0}")]
    InvalidTrim(String),

    /// Duration is zero or negative
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Time value is out of range for the operation
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// Property value rejected
    #[error("Invalid property value: {0}")]
    InvalidProperty(String),

    /// Track index is past the end of the stack
    #[error("Track index {index} out of range (track count {len})")]
    TrackIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current number of tracks
        len: usize,
    },
}

/// Result type for edit operations
pub type Result<T> = std::result::Result<T, EditError>;

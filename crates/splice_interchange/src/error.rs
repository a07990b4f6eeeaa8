// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serialization and migration errors.

use thiserror::Error;

/// Errors produced while reading or writing timeline documents
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// Malformed JSON or a field of the wrong shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload lacks a field every document must carry
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Payload was written by an unknown format version
    #[error("Unsupported version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the payload
        found: u64,
        /// Version this build reads
        supported: u32,
    },

    /// Legacy clip record cannot be placed on a timeline
    #[error("Invalid legacy clip {id}: {reason}")]
    InvalidLegacyClip {
        /// Legacy clip ID
        id: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for interchange operations
pub type Result<T> = std::result::Result<T, InterchangeError>;

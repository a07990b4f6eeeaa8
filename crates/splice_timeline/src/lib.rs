// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-accurate timeline model for Splice.
//!
//! This crate provides the editing core:
//! - Exact rational time arithmetic
//! - Stack / track / item document tree
//! - Pure structural edit operations
//! - Timeline validation
//!
//! ## Architecture
//!
//! A [`Timeline`] is an immutable value. Every edit in [`edit`] takes a
//! timeline by reference and returns a new one; tracks are reference
//! counted, so a new timeline shares every track the edit did not touch
//! with its predecessor.

pub mod edit;
pub mod error;
pub mod ids;
pub mod item;
pub mod media;
pub mod time;
pub mod timeline;
pub mod track;
pub mod validate;

/// Free-form metadata attached to model nodes, in insertion order
pub type Metadata = indexmap::IndexMap<String, serde_json::Value>;

pub use edit::{ClipProperty, TrimEdge, MAX_VOLUME};
pub use error::{EditError, Result, TimeError};
pub use ids::{ClipId, ItemId, MarkerId, MediaRefId, TimelineId, TrackId};
pub use item::{Clip, Gap, TrackItem, Transition};
pub use media::{GeneratorKind, MediaReference};
pub use time::{RationalTime, TimeRange, TimecodeFormat, DEFAULT_RATE};
pub use timeline::{
    ClipLocation, Marker, MarkerColor, Stack, Timeline, TimelineSettings, SCHEMA_VERSION,
};
pub use track::{Track, TrackKind};
pub use validate::{has_errors, has_overlaps, validate_timeline, Severity, Violation};

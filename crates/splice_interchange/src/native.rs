// SPDX-License-Identifier: MIT OR Apache-2.0
//! Native JSON format.
//!
//! The native format is the timeline tree serialized as-is. Readers reject
//! payloads without an `id` or `tracks` field and any schema version other
//! than the one this build writes; nothing is silently upgraded.
//!
//! Loading is verbatim for any tree the edit engine produced. Trees written
//! elsewhere are repaired on the way in: runs of adjacent gaps are merged
//! and zero-length gaps are dropped, with a warning logged for each
//! repaired track.

use crate::error::{InterchangeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use splice_timeline::{Timeline, SCHEMA_VERSION};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current project envelope version
pub const PROJECT_FORMAT_VERSION: u32 = 1;

/// A timeline wrapped with the project it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    /// Envelope format version
    pub version: u32,
    /// Owning project
    pub project_id: String,
    /// Unix timestamp (seconds) of the save
    pub saved_at: u64,
    /// The timeline
    pub timeline: Timeline,
}

impl ProjectDocument {
    /// Wrap a timeline, stamping the current time
    pub fn new(project_id: impl Into<String>, timeline: Timeline) -> Self {
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        Self {
            version: PROJECT_FORMAT_VERSION,
            project_id: project_id.into(),
            saved_at,
            timeline,
        }
    }
}

/// Serialize a timeline to native JSON
pub fn to_json(timeline: &Timeline) -> Result<String> {
    Ok(serde_json::to_string_pretty(timeline)?)
}

/// Deserialize a timeline from native JSON.
///
/// Adjacent gaps are merged into one and zero-length gaps are dropped, so
/// the result satisfies the edit engine's invariants even if the writer
/// did not. Item durations and the overall track lengths are unchanged by
/// the repair.
pub fn from_json(json: &str) -> Result<Timeline> {
    let value: Value = serde_json::from_str(json)?;
    timeline_from_value(value)
}

fn timeline_from_value(mut value: Value) -> Result<Timeline> {
    let object = value
        .as_object_mut()
        .ok_or(InterchangeError::MissingField("id"))?;
    for field in ["id", "tracks"] {
        if !object.contains_key(field) {
            return Err(InterchangeError::MissingField(field));
        }
    }

    let version = object
        .entry("schemaVersion")
        .or_insert_with(|| Value::from(SCHEMA_VERSION));
    check_version(version, SCHEMA_VERSION)?;

    let timeline: Timeline = serde_json::from_value(value)?;
    let normalized = timeline.normalized();
    for (before, after) in timeline.tracks(None).zip(normalized.tracks(None)) {
        if before.item_count() != after.item_count() {
            tracing::warn!(
                track = %before.id,
                items = before.item_count(),
                kept = after.item_count(),
                "Repaired gap run in loaded track"
            );
        }
    }
    Ok(normalized)
}

fn check_version(value: &Value, supported: u32) -> Result<()> {
    let found = value.as_u64().ok_or(InterchangeError::UnsupportedVersion {
        found: 0,
        supported,
    })?;
    if found != u64::from(supported) {
        return Err(InterchangeError::UnsupportedVersion { found, supported });
    }
    Ok(())
}

/// Serialize a timeline inside a project envelope
pub fn serialize_project(project_id: &str, timeline: &Timeline) -> Result<String> {
    let document = ProjectDocument::new(project_id, timeline.clone());
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Deserialize a project envelope, validating both it and its timeline
pub fn deserialize_project(json: &str) -> Result<ProjectDocument> {
    let mut value: Value = serde_json::from_str(json)?;
    let object = value
        .as_object_mut()
        .ok_or(InterchangeError::MissingField("version"))?;

    check_version(
        object
            .get("version")
            .ok_or(InterchangeError::MissingField("version"))?,
        PROJECT_FORMAT_VERSION,
    )?;
    let timeline = timeline_from_value(
        object
            .remove("timeline")
            .ok_or(InterchangeError::MissingField("timeline"))?,
    )?;

    let project_id = object
        .get("projectId")
        .and_then(Value::as_str)
        .ok_or(InterchangeError::MissingField("projectId"))?
        .to_string();
    let saved_at = object.get("savedAt").and_then(Value::as_u64).unwrap_or(0);

    tracing::debug!(%project_id, timeline_id = %timeline.id, "Deserialized project");
    Ok(ProjectDocument {
        version: PROJECT_FORMAT_VERSION,
        project_id,
        saved_at,
        timeline,
    })
}

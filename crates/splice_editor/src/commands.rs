// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edit commands.
//!
//! Every structural edit is an [`EditOp`] value. Ops are serializable so a
//! caller can queue, log or replay them, and each one dispatches into a
//! single pure mutator from `splice_timeline::edit`.

use serde::{Deserialize, Serialize};
use splice_timeline::edit;
use splice_timeline::{
    Clip, ClipId, ClipProperty, EditError, Marker, MarkerId, RationalTime, Timeline, TrackId,
    TrackKind, TrimEdge,
};
use thiserror::Error;

/// Trait for commands that turn one timeline into the next
pub trait EditorCommand {
    /// Get a description of this command
    fn description(&self) -> String;

    /// Execute the command against a snapshot
    fn execute(&self, timeline: &Timeline) -> Result<CommandOutput, CommandError>;
}

/// Error type for command execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// The engine refused the edit
    #[error(transparent)]
    Edit(#[from] EditError),

    /// The edit produced a timeline with error-level violations
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// ID of an object created by an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum CreatedId {
    /// Second half of a split clip
    Clip(ClipId),
    /// New track
    Track(TrackId),
    /// New marker
    Marker(MarkerId),
}

/// Result of executing a command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// The edited timeline
    pub timeline: Timeline,
    /// ID created by the edit, if any
    pub created: Option<CreatedId>,
}

impl From<Timeline> for CommandOutput {
    fn from(timeline: Timeline) -> Self {
        Self { timeline, created: None }
    }
}

/// A structural edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditOp {
    /// Insert a clip at a time
    InsertClip {
        /// Target track
        track_id: TrackId,
        /// Clip to insert
        clip: Clip,
        /// Where to insert it
        insert_time: RationalTime,
    },
    /// Insert a clip at the end of a track
    AppendClip {
        /// Target track
        track_id: TrackId,
        /// Clip to append
        clip: Clip,
    },
    /// Move one edge of a clip
    TrimClip {
        /// Clip to trim
        clip_id: ClipId,
        /// Edge to move
        edge: TrimEdge,
        /// Amount to move it by
        delta: RationalTime,
    },
    /// Move a clip, possibly to another track
    MoveClip {
        /// Clip to move
        clip_id: ClipId,
        /// Destination track
        target_track_id: TrackId,
        /// Destination time
        target_time: RationalTime,
    },
    /// Split a clip in two
    SplitClip {
        /// Clip to split
        clip_id: ClipId,
        /// Timeline time of the cut
        split_time: RationalTime,
    },
    /// Remove a clip
    DeleteClip {
        /// Clip to remove
        clip_id: ClipId,
        /// Close the hole instead of leaving a gap
        ripple: bool,
    },
    /// Add an empty track
    AddTrack {
        /// Track kind
        kind: TrackKind,
        /// Stack position, or the default placement
        #[serde(default)]
        at_index: Option<usize>,
        /// Track name, or a numbered default
        #[serde(default)]
        name: Option<String>,
    },
    /// Remove a track
    RemoveTrack {
        /// Track to remove
        track_id: TrackId,
    },
    /// Rename a track
    RenameTrack {
        /// Track to rename
        track_id: TrackId,
        /// New name
        name: String,
    },
    /// Change track flags
    SetTrackFlags {
        /// Track to change
        track_id: TrackId,
        /// New muted flag
        #[serde(default)]
        muted: Option<bool>,
        /// New locked flag
        #[serde(default)]
        locked: Option<bool>,
    },
    /// Add a marker
    AddMarker {
        /// Marker to add
        marker: Marker,
    },
    /// Remove a marker
    RemoveMarker {
        /// Marker to remove
        marker_id: MarkerId,
    },
    /// Move a marker
    MoveMarker {
        /// Marker to move
        marker_id: MarkerId,
        /// New start time
        new_start: RationalTime,
    },
    /// Set a clip property
    SetClipProperty {
        /// Clip to change
        clip_id: ClipId,
        /// Property and value
        property: ClipProperty,
    },
}

impl EditorCommand for EditOp {
    fn description(&self) -> String {
        match self {
            Self::InsertClip { clip, .. } => format!("Insert clip '{}'", clip.name),
            Self::AppendClip { clip, .. } => format!("Append clip '{}'", clip.name),
            Self::TrimClip { edge, .. } => match edge {
                TrimEdge::Start => "Trim clip start".to_string(),
                TrimEdge::End => "Trim clip end".to_string(),
            },
            Self::MoveClip { .. } => "Move clip".to_string(),
            Self::SplitClip { .. } => "Split clip".to_string(),
            Self::DeleteClip { ripple: true, .. } => "Ripple delete clip".to_string(),
            Self::DeleteClip { ripple: false, .. } => "Delete clip".to_string(),
            Self::AddTrack { kind, .. } => format!("Add {} track", kind.name().to_lowercase()),
            Self::RemoveTrack { .. } => "Remove track".to_string(),
            Self::RenameTrack { name, .. } => format!("Rename track to '{name}'"),
            Self::SetTrackFlags { .. } => "Change track flags".to_string(),
            Self::AddMarker { marker } => format!("Add marker '{}'", marker.name),
            Self::RemoveMarker { .. } => "Remove marker".to_string(),
            Self::MoveMarker { .. } => "Move marker".to_string(),
            Self::SetClipProperty { property, .. } => match property {
                ClipProperty::Volume(_) => "Set clip volume".to_string(),
                ClipProperty::Name(_) => "Rename clip".to_string(),
                ClipProperty::Enabled(_) => "Toggle clip".to_string(),
            },
        }
    }

    fn execute(&self, timeline: &Timeline) -> Result<CommandOutput, CommandError> {
        let output: CommandOutput = match self {
            Self::InsertClip {
                track_id,
                clip,
                insert_time,
            } => edit::insert_clip(timeline, *track_id, clip.clone(), *insert_time)?.into(),
            Self::AppendClip { track_id, clip } => {
                edit::append_clip(timeline, *track_id, clip.clone())?.into()
            }
            Self::TrimClip {
                clip_id,
                edge,
                delta,
            } => edit::trim_clip(timeline, *clip_id, *edge, *delta)?.into(),
            Self::MoveClip {
                clip_id,
                target_track_id,
                target_time,
            } => edit::move_clip(timeline, *clip_id, *target_track_id, *target_time)?.into(),
            Self::SplitClip {
                clip_id,
                split_time,
            } => {
                let (timeline, second) = edit::split_clip(timeline, *clip_id, *split_time)?;
                CommandOutput {
                    timeline,
                    created: Some(CreatedId::Clip(second)),
                }
            }
            Self::DeleteClip { clip_id, ripple } => {
                edit::delete_clip(timeline, *clip_id, *ripple)?.into()
            }
            Self::AddTrack {
                kind,
                at_index,
                name,
            } => {
                let (timeline, track_id) =
                    edit::add_track(timeline, *kind, *at_index, name.clone())?;
                CommandOutput {
                    timeline,
                    created: Some(CreatedId::Track(track_id)),
                }
            }
            Self::RemoveTrack { track_id } => edit::remove_track(timeline, *track_id)?.into(),
            Self::RenameTrack { track_id, name } => {
                edit::rename_track(timeline, *track_id, name.as_str())?.into()
            }
            Self::SetTrackFlags {
                track_id,
                muted,
                locked,
            } => edit::set_track_flags(timeline, *track_id, *muted, *locked)?.into(),
            Self::AddMarker { marker } => {
                let (timeline, marker_id) = edit::add_marker(timeline, marker.clone())?;
                CommandOutput {
                    timeline,
                    created: Some(CreatedId::Marker(marker_id)),
                }
            }
            Self::RemoveMarker { marker_id } => edit::remove_marker(timeline, *marker_id)?.into(),
            Self::MoveMarker {
                marker_id,
                new_start,
            } => edit::move_marker(timeline, *marker_id, *new_start)?.into(),
            Self::SetClipProperty { clip_id, property } => {
                edit::set_clip_property(timeline, *clip_id, property.clone())?.into()
            }
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_timeline::{MediaReference, TimeRange, TimelineSettings};

    fn secs(s: i64) -> RationalTime {
        RationalTime::from_frames(s * 30, 30.0)
    }

    #[test]
    fn test_dispatch_split_reports_created_id() {
        let timeline = Timeline::with_default_tracks("Cmd", TimelineSettings::default());
        let track_id = timeline.tracks(Some(TrackKind::Video)).next().unwrap().id;
        let clip = Clip::new(
            "A",
            MediaReference::external("a.mp4"),
            TimeRange::new(secs(0), secs(4)),
        );
        let clip_id = clip.id;

        let inserted = EditOp::AppendClip { track_id, clip }.execute(&timeline).unwrap();
        assert!(inserted.created.is_none());

        let split = EditOp::SplitClip {
            clip_id,
            split_time: secs(1),
        };
        assert_eq!(split.description(), "Split clip");
        let output = split.execute(&inserted.timeline).unwrap();
        let Some(CreatedId::Clip(second)) = output.created else {
            panic!("split should report the new clip");
        };
        assert!(output.timeline.find_clip(second).is_some());
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let timeline = Timeline::with_default_tracks("Cmd", TimelineSettings::default());
        let clip_id = ClipId::new();
        let err = EditOp::DeleteClip { clip_id, ripple: true }
            .execute(&timeline)
            .unwrap_err();
        assert_eq!(err, CommandError::Edit(EditError::ClipNotFound(clip_id)));
        assert_eq!(err.to_string(), format!("Clip not found: {clip_id}"));
    }

    #[test]
    fn test_op_serialization() {
        let track_id = TrackId::new();
        let op = EditOp::SetTrackFlags {
            track_id,
            muted: Some(true),
            locked: None,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "setTrackFlags");
        assert_eq!(json["trackId"], track_id.to_string());

        let parsed: EditOp = serde_json::from_str(
            r#"{"op": "setClipProperty", "clipId": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "property": {"property": "volume", "value": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(parsed.description(), "Set clip volume");
    }
}

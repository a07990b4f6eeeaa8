// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline document: settings, the track stack, markers and queries.

use crate::ids::{ClipId, MarkerId, TimelineId, TrackId};
use crate::item::Clip;
use crate::time::{RationalTime, TimeRange};
use crate::track::{Track, TrackKind};
use crate::Metadata;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Current native schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Output settings of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineSettings {
    /// Frames per second
    pub frame_rate: f64,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Audio sample rate in Hz
    pub sample_rate: u32,
    /// Audio channel count
    pub channels: u16,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            width: 1920,
            height: 1080,
            sample_rate: 48_000,
            channels: 2,
        }
    }
}

/// Ordered collection of tracks.
///
/// Tracks are reference counted so snapshots share every track an edit
/// did not touch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stack {
    /// Stack name
    #[serde(default)]
    pub name: String,
    /// Tracks, bottom to top
    pub tracks: Vec<Arc<Track>>,
}

/// Marker color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarkerColor {
    /// Red
    #[default]
    Red,
    /// Pink
    Pink,
    /// Orange
    Orange,
    /// Yellow
    Yellow,
    /// Green
    Green,
    /// Cyan
    Cyan,
    /// Blue
    Blue,
    /// Purple
    Purple,
    /// Magenta
    Magenta,
    /// Black
    Black,
    /// White
    White,
}

impl MarkerColor {
    /// Name used by the interchange format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Pink => "PINK",
            Self::Orange => "ORANGE",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Cyan => "CYAN",
            Self::Blue => "BLUE",
            Self::Purple => "PURPLE",
            Self::Magenta => "MAGENTA",
            Self::Black => "BLACK",
            Self::White => "WHITE",
        }
    }
}

/// Named annotation over a range of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Unique marker ID
    pub id: MarkerId,
    /// Marker name
    pub name: String,
    /// Range the marker covers
    pub marked_range: TimeRange,
    /// Marker color
    #[serde(default)]
    pub color: MarkerColor,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Marker {
    /// Create a new marker
    pub fn new(name: impl Into<String>, marked_range: TimeRange) -> Self {
        Self {
            id: MarkerId::new(),
            name: name.into(),
            marked_range,
            color: MarkerColor::default(),
            metadata: Metadata::new(),
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: MarkerColor) -> Self {
        self.color = color;
        self
    }
}

/// A clip found in the timeline, with its track and item index
#[derive(Debug, Clone, Copy)]
pub struct ClipLocation<'a> {
    /// The clip
    pub clip: &'a Clip,
    /// Track holding the clip
    pub track: &'a Track,
    /// Item index within the track
    pub index: usize,
}

/// The edit document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Timeline name
    pub name: String,
    /// Native schema version
    pub schema_version: u32,
    /// Timecode of the first frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_start_time: Option<RationalTime>,
    /// Track stack
    pub tracks: Stack,
    /// Timeline markers
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// Output settings
    #[serde(default)]
    pub settings: TimelineSettings,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Timeline {
    /// Create an empty timeline without tracks
    pub fn new(name: impl Into<String>, settings: TimelineSettings) -> Self {
        Self {
            id: TimelineId::new(),
            name: name.into(),
            schema_version: SCHEMA_VERSION,
            global_start_time: None,
            tracks: Stack {
                name: "tracks".to_string(),
                tracks: Vec::new(),
            },
            markers: Vec::new(),
            settings,
            metadata: Metadata::new(),
        }
    }

    /// Create a timeline with one empty video and one empty audio track
    pub fn with_default_tracks(name: impl Into<String>, settings: TimelineSettings) -> Self {
        let mut timeline = Self::new(name, settings);
        timeline.tracks.tracks = vec![
            Arc::new(Track::new("Video 1", TrackKind::Video, 0)),
            Arc::new(Track::new("Audio 1", TrackKind::Audio, 0)),
        ];
        timeline
    }

    /// Frame rate of the timeline
    pub fn rate(&self) -> f64 {
        self.settings.frame_rate
    }

    /// Zero at the timeline's rate
    pub fn zero(&self) -> RationalTime {
        RationalTime::zero(self.rate())
    }

    /// Tracks, optionally filtered by kind
    pub fn tracks(&self, kind: Option<TrackKind>) -> impl Iterator<Item = &Track> {
        self.tracks
            .tracks
            .iter()
            .map(AsRef::as_ref)
            .filter(move |t| kind.map_or(true, |k| t.kind == k))
    }

    /// Get a track by ID
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks(None).find(|t| t.id == track_id)
    }

    /// Position of a track in the stack
    pub fn track_position(&self, track_id: TrackId) -> Option<usize> {
        self.tracks.tracks.iter().position(|t| t.id == track_id)
    }

    /// Get a track by its display index among tracks of `kind`
    pub fn track_by_index(&self, kind: TrackKind, index: usize) -> Option<&Track> {
        self.tracks(Some(kind)).find(|t| t.index == index)
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.tracks.len()
    }

    /// Find a clip anywhere in the timeline
    pub fn find_clip(&self, clip_id: ClipId) -> Option<ClipLocation<'_>> {
        self.tracks(None).find_map(|track| {
            track
                .find_clip(clip_id)
                .map(|(index, clip)| ClipLocation { clip, track, index })
        })
    }

    /// All clips in stack order
    pub fn all_clips(&self) -> Vec<&Clip> {
        self.tracks(None).flat_map(Track::clips).collect()
    }

    /// Get clip count
    pub fn clip_count(&self) -> usize {
        self.tracks(None).map(Track::clip_count).sum()
    }

    /// Timeline range covered by a clip
    pub fn clip_position(&self, clip_id: ClipId) -> Option<TimeRange> {
        let location = self.find_clip(clip_id)?;
        location.track.item_range(location.index)
    }

    /// Clip on a track covering `time`
    pub fn clip_at_time(&self, track_id: TrackId, time: &RationalTime) -> Option<&Clip> {
        self.track(track_id)?
            .item_at_time(time)
            .and_then(|(_, item)| item.as_clip())
    }

    /// Duration of the longest track
    pub fn duration(&self) -> RationalTime {
        self.tracks(None)
            .map(Track::duration)
            .fold(self.zero(), RationalTime::max)
    }

    /// Get a marker by ID
    pub fn marker(&self, marker_id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == marker_id)
    }

    /// Copy with gap runs merged on every track that needs it
    pub fn normalized(&self) -> Timeline {
        let mut timeline = self.clone();
        for track in &mut timeline.tracks.tracks {
            let has_empty_gap = track
                .items
                .iter()
                .any(|i| i.is_gap() && i.duration().is_zero());
            if track.has_adjacent_gaps() || has_empty_gap {
                Arc::make_mut(track).merge_gaps();
            }
        }
        timeline
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions.
//!
//! Item positions are never stored: item `i` starts at the sum of the
//! durations of items `0..i`. Replacing one item therefore never touches
//! the stored state of its neighbours.

use crate::ids::{ClipId, TrackId};
use crate::item::{Clip, TrackItem};
use crate::time::{RationalTime, TimeRange, DEFAULT_RATE};
use crate::Metadata;
use serde::{Deserialize, Serialize};

/// Kind of track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Picture
    Video,
    /// Sound
    Audio,
}

impl TrackKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
        }
    }
}

/// Ordered sequence of items of one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Track kind
    pub kind: TrackKind,
    /// Display index among tracks of the same kind
    pub index: usize,
    /// Items in playback order
    pub items: Vec<TrackItem>,
    /// Whether the track is muted
    #[serde(default)]
    pub muted: bool,
    /// Whether the track is locked
    #[serde(default)]
    pub locked: bool,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Track {
    /// Create a new empty track
    pub fn new(name: impl Into<String>, kind: TrackKind, index: usize) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            kind,
            index,
            items: Vec::new(),
            muted: false,
            locked: false,
            metadata: Metadata::new(),
        }
    }

    /// Total duration: the sum of all item durations
    pub fn duration(&self) -> RationalTime {
        sum_durations(&self.items)
    }

    /// Start time of item `index`, derived from the items before it
    pub fn item_start_time(&self, index: usize) -> RationalTime {
        self.item_range(index)
            .map_or_else(|| self.duration(), |range| range.start_time)
    }

    /// Timeline range covered by item `index`
    pub fn item_range(&self, index: usize) -> Option<TimeRange> {
        self.items_with_ranges().nth(index).map(|(range, _)| range)
    }

    /// Iterate over items together with their derived timeline ranges
    pub fn items_with_ranges(&self) -> impl Iterator<Item = (TimeRange, &TrackItem)> {
        let mut elapsed: Option<RationalTime> = None;
        self.items.iter().map(move |item| {
            let duration = item.duration();
            let start = elapsed.unwrap_or_else(|| RationalTime::zero(duration.rate));
            elapsed = Some(start + duration);
            (TimeRange::new(start, duration), item)
        })
    }

    /// Find a clip by ID, returning its item index
    pub fn find_clip(&self, clip_id: ClipId) -> Option<(usize, &Clip)> {
        self.items
            .iter()
            .enumerate()
            .find_map(|(i, item)| item.as_clip().filter(|c| c.id == clip_id).map(|c| (i, c)))
    }

    /// All clips on this track
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.items.iter().filter_map(TrackItem::as_clip)
    }

    /// Item covering `time` (inclusive start, exclusive end)
    pub fn item_at_time(&self, time: &RationalTime) -> Option<(usize, &TrackItem)> {
        self.items_with_ranges()
            .enumerate()
            .find(|(_, (range, _))| range.contains_time(time))
            .map(|(i, (_, item))| (i, item))
    }

    /// Items overlapping a range, with their timeline ranges
    pub fn items_in_range(&self, range: &TimeRange) -> Vec<(TimeRange, &TrackItem)> {
        self.items_with_ranges()
            .filter(|(item_range, _)| item_range.overlaps(range))
            .collect()
    }

    /// Get item count
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Get clip count
    pub fn clip_count(&self) -> usize {
        self.clips().count()
    }

    /// Check if the track has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge runs of consecutive gaps and drop zero-length gaps
    pub fn merge_gaps(&mut self) {
        let mut merged: Vec<TrackItem> = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            if let TrackItem::Gap(gap) = &item {
                if gap.duration().is_zero() {
                    continue;
                }
                if let Some(TrackItem::Gap(previous)) = merged.last_mut() {
                    previous.source_range.duration = previous.duration() + gap.duration();
                    continue;
                }
            }
            merged.push(item);
        }
        self.items = merged;
    }

    /// True if two gaps sit next to each other
    pub fn has_adjacent_gaps(&self) -> bool {
        self.items.windows(2).any(|pair| pair[0].is_gap() && pair[1].is_gap())
    }
}

fn sum_durations(items: &[TrackItem]) -> RationalTime {
    items
        .iter()
        .map(TrackItem::duration)
        .reduce(|total, duration| total + duration)
        .unwrap_or(RationalTime::zero(DEFAULT_RATE))
}

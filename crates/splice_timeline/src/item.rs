// SPDX-License-Identifier: MIT OR Apache-2.0
//! Items that live on a track: clips, gaps and transitions.

use crate::ids::{ClipId, ItemId};
use crate::media::MediaReference;
use crate::time::{RationalTime, TimeRange};
use crate::Metadata;
use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// A piece of media placed on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Display name
    pub name: String,
    /// Media this clip plays
    pub media_reference: MediaReference,
    /// Portion of the media used by the clip
    pub source_range: TimeRange,
    /// Playback volume multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Disabled clips stay on the track but are skipped by renderers
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Clip {
    /// Create a new clip
    pub fn new(
        name: impl Into<String>,
        media_reference: MediaReference,
        source_range: TimeRange,
    ) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            media_reference,
            source_range,
            volume: None,
            enabled: true,
            metadata: Metadata::new(),
        }
    }

    /// Set the volume
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Duration of the clip on the timeline
    pub fn duration(&self) -> RationalTime {
        self.source_range.duration
    }
}

/// Empty filler time on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    /// Unique item ID
    pub id: ItemId,
    /// Start is always zero; only the duration matters
    pub source_range: TimeRange,
}

impl Gap {
    /// Create a gap of the given duration
    pub fn new(duration: RationalTime) -> Self {
        Self {
            id: ItemId::new(),
            source_range: TimeRange::new(RationalTime::zero(duration.rate), duration),
        }
    }

    /// Duration of the gap
    pub fn duration(&self) -> RationalTime {
        self.source_range.duration
    }
}

/// Transition between two neighbouring items.
///
/// Transitions overlap their neighbours and occupy no track time of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Unique item ID
    pub id: ItemId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Transition type, e.g. `SMPTE_Dissolve`
    pub kind: String,
    /// Overlap into the preceding item
    pub in_offset: RationalTime,
    /// Overlap into the following item
    pub out_offset: RationalTime,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Transition {
    /// Create a transition
    pub fn new(kind: impl Into<String>, in_offset: RationalTime, out_offset: RationalTime) -> Self {
        Self {
            id: ItemId::new(),
            name: String::new(),
            kind: kind.into(),
            in_offset,
            out_offset,
            metadata: Metadata::new(),
        }
    }
}

/// Anything that can be placed on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrackItem {
    /// Media clip
    Clip(Clip),
    /// Filler
    Gap(Gap),
    /// Transition metadata
    Transition(Transition),
}

impl TrackItem {
    /// Track time consumed by this item
    pub fn duration(&self) -> RationalTime {
        match self {
            Self::Clip(clip) => clip.duration(),
            Self::Gap(gap) => gap.duration(),
            Self::Transition(transition) => RationalTime::zero(transition.in_offset.rate),
        }
    }

    /// Get as a clip if possible
    pub fn as_clip(&self) -> Option<&Clip> {
        match self {
            Self::Clip(clip) => Some(clip),
            Self::Gap(_) | Self::Transition(_) => None,
        }
    }

    /// Get as a mutable clip if possible
    pub fn as_clip_mut(&mut self) -> Option<&mut Clip> {
        match self {
            Self::Clip(clip) => Some(clip),
            Self::Gap(_) | Self::Transition(_) => None,
        }
    }

    /// True for gaps
    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Gap(_))
    }

    /// True for clips
    pub fn is_clip(&self) -> bool {
        matches!(self, Self::Clip(_))
    }
}

impl From<Clip> for TrackItem {
    fn from(clip: Clip) -> Self {
        Self::Clip(clip)
    }
}

impl From<Gap> for TrackItem {
    fn from(gap: Gap) -> Self {
        Self::Gap(gap)
    }
}

impl From<Transition> for TrackItem {
    fn from(transition: Transition) -> Self {
        Self::Transition(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_starts_at_zero() {
        let gap = Gap::new(RationalTime::from_frames(90, 30.0));
        assert!(gap.source_range.start_time.is_zero());
        assert_eq!(gap.duration().value, 90);
    }

    #[test]
    fn test_transition_occupies_no_time() {
        let transition = Transition::new(
            "SMPTE_Dissolve",
            RationalTime::from_frames(10, 30.0),
            RationalTime::from_frames(10, 30.0),
        );
        assert!(TrackItem::from(transition).duration().is_zero());
    }

    #[test]
    fn test_item_tag() {
        let item = TrackItem::from(Gap::new(RationalTime::from_frames(1, 24.0)));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "Gap");
        assert_eq!(json["sourceRange"]["duration"]["rate"], 24.0);
    }
}

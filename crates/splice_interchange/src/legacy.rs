// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion to and from the legacy flat clip list.
//!
//! Older consumers store a project as a flat list of clips, each carrying
//! its track ID and absolute start time in seconds. Migration rebuilds the
//! track tree from that list; [`to_legacy_format`] flattens it back.

use crate::error::{InterchangeError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use splice_timeline::{
    Clip, Gap, MediaRefId, MediaReference, Metadata, RationalTime, TimeRange, Timeline,
    TimelineSettings, Track, TrackItem, TrackKind,
};
use std::sync::Arc;

/// Clip metadata key holding the legacy record ID
pub const LEGACY_ID_KEY: &str = "legacyId";
/// Clip metadata key holding the legacy asset ID
pub const ASSET_ID_KEY: &str = "assetId";
/// Clip metadata key holding the legacy embedded asset
pub const EMBEDDED_ASSET_KEY: &str = "embeddedAsset";
/// Track metadata key holding the legacy track ID
pub const LEGACY_TRACK_KEY: &str = "legacyTrackId";

/// Asset description inlined into a legacy clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedAsset {
    /// Where the asset lives
    pub url: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// MIME type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Metadata,
}

/// One record of the legacy clip list. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyClip {
    /// Clip ID
    pub id: String,
    /// Owning project
    pub project_id: String,
    /// Asset the clip plays
    pub asset_id: String,
    /// Track the clip sits on
    pub track_id: String,
    /// Absolute start on the timeline
    pub start_time: f64,
    /// Length on the timeline
    pub duration: f64,
    /// Offset into the asset
    pub in_point: f64,
    /// Volume multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Inlined asset description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_asset: Option<EmbeddedAsset>,
}

impl LegacyClip {
    fn invalid(&self, reason: impl Into<String>) -> InterchangeError {
        InterchangeError::InvalidLegacyClip {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }

    fn check(&self) -> Result<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(self.invalid(format!("duration {} is not positive", self.duration)));
        }
        if !(self.start_time.is_finite() && self.start_time >= 0.0) {
            return Err(self.invalid(format!("start time {} is negative", self.start_time)));
        }
        if !(self.in_point.is_finite() && self.in_point >= 0.0) {
            return Err(self.invalid(format!("in point {} is negative", self.in_point)));
        }
        Ok(())
    }

    /// Track kind, judged from the track ID and embedded MIME type
    fn kind(&self) -> TrackKind {
        let audio_mime = self
            .embedded_asset
            .as_ref()
            .and_then(|a| a.mime_type.as_deref())
            .is_some_and(|m| m.starts_with("audio/"));
        if audio_mime || self.track_id.to_ascii_lowercase().contains("audio") {
            TrackKind::Audio
        } else {
            TrackKind::Video
        }
    }

    fn to_clip(&self, rate: f64) -> Result<Clip> {
        let duration = RationalTime::from_seconds(self.duration, rate);
        if !duration.is_positive() {
            return Err(self.invalid("shorter than one frame"));
        }

        let reference = match &self.embedded_asset {
            Some(asset) => MediaReference::External {
                id: MediaRefId::new(),
                target_url: asset.url.clone(),
                mime_type: asset.mime_type.clone(),
                available_range: None,
                metadata: Metadata::new(),
            },
            None => MediaReference::external(format!("asset:{}", self.asset_id)),
        };
        let name = self
            .embedded_asset
            .as_ref()
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| self.asset_id.clone());

        let mut clip = Clip::new(
            name,
            reference,
            TimeRange::new(RationalTime::from_seconds(self.in_point, rate), duration),
        );
        clip.volume = self.volume;
        clip.metadata.insert(LEGACY_ID_KEY.into(), self.id.clone().into());
        clip.metadata.insert(ASSET_ID_KEY.into(), self.asset_id.clone().into());
        if let Some(asset) = &self.embedded_asset {
            clip.metadata
                .insert(EMBEDDED_ASSET_KEY.into(), serde_json::to_value(asset)?);
        }
        Ok(clip)
    }
}

/// Build a timeline from a legacy clip list.
///
/// Clips are grouped by track ID and sorted by start time; whenever a clip
/// starts after the running cursor a gap fills the difference. The result
/// always has at least one video and one audio track.
pub fn migrate_from_legacy(
    clips: &[LegacyClip],
    name: &str,
    settings: TimelineSettings,
) -> Result<Timeline> {
    let rate = settings.frame_rate;
    let mut groups: IndexMap<&str, Vec<&LegacyClip>> = IndexMap::new();
    for clip in clips {
        clip.check()?;
        groups.entry(clip.track_id.as_str()).or_default().push(clip);
    }

    let mut tracks: Vec<Track> = Vec::with_capacity(groups.len() + 2);
    for (legacy_track_id, mut group) in groups {
        group.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        let kind = group[0].kind();

        let mut track = Track::new(String::new(), kind, 0);
        track
            .metadata
            .insert(LEGACY_TRACK_KEY.into(), Value::from(legacy_track_id));

        let mut cursor = RationalTime::zero(rate);
        for legacy in group {
            let start = RationalTime::from_seconds(legacy.start_time, rate);
            if start.is_greater_than(&cursor) {
                track.items.push(Gap::new(start - cursor).into());
                cursor = start;
            } else if start.is_less_than(&cursor) {
                tracing::warn!(
                    clip = %legacy.id,
                    track = legacy_track_id,
                    "Overlapping legacy clip moved to end of previous clip"
                );
            }
            let clip = legacy.to_clip(rate)?;
            cursor = cursor + clip.duration();
            track.items.push(clip.into());
        }
        tracks.push(track);
    }

    for kind in [TrackKind::Video, TrackKind::Audio] {
        if !tracks.iter().any(|t| t.kind == kind) {
            tracks.push(Track::new(String::new(), kind, 0));
        }
    }
    tracks.sort_by_key(|t| t.kind == TrackKind::Audio);

    let mut counters = [0_usize; 2];
    for track in &mut tracks {
        let counter = &mut counters[usize::from(track.kind == TrackKind::Audio)];
        track.index = *counter;
        track.name = format!("{} {}", track.kind.name(), *counter + 1);
        *counter += 1;
    }

    let mut timeline = Timeline::new(name, settings);
    timeline.tracks.tracks = tracks.into_iter().map(Arc::new).collect();
    let timeline = timeline.normalized();

    tracing::info!(
        clips = clips.len(),
        tracks = timeline.track_count(),
        "Migrated legacy clip list"
    );
    Ok(timeline)
}

fn metadata_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(Value::as_str)
}

/// Flatten a timeline into legacy clip records, deriving absolute starts
/// from the items before each clip.
pub fn to_legacy_format(timeline: &Timeline, project_id: &str) -> Vec<LegacyClip> {
    let mut records = Vec::with_capacity(timeline.clip_count());

    for track in timeline.tracks(None) {
        let track_id = metadata_str(&track.metadata, LEGACY_TRACK_KEY)
            .map_or_else(|| track.id.to_string(), str::to_string);

        for (range, item) in track.items_with_ranges() {
            let TrackItem::Clip(clip) = item else {
                continue;
            };
            let asset_id = metadata_str(&clip.metadata, ASSET_ID_KEY)
                .map(str::to_string)
                .or_else(|| clip.media_reference.target_url().map(str::to_string))
                .unwrap_or_else(|| clip.media_reference.id().to_string());
            let embedded_asset = clip
                .metadata
                .get(EMBEDDED_ASSET_KEY)
                .and_then(|v| serde_json::from_value(v.clone()).ok());

            records.push(LegacyClip {
                id: metadata_str(&clip.metadata, LEGACY_ID_KEY)
                    .map_or_else(|| clip.id.to_string(), str::to_string),
                project_id: project_id.to_string(),
                asset_id,
                track_id: track_id.clone(),
                start_time: range.start_time.to_seconds(),
                duration: clip.duration().to_seconds(),
                in_point: clip.source_range.start_time.to_seconds(),
                volume: clip.volume,
                embedded_asset,
            });
        }
    }

    records
}

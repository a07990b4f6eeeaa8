// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural edit operations.
//!
//! Every operation is a pure function: it takes a timeline by reference and
//! returns a new one, leaving the input untouched. Only the track that
//! changes is copied; every other track stays shared with the input.

use crate::error::{EditError, Result};
use crate::ids::{ClipId, MarkerId, TrackId};
use crate::item::{Clip, Gap, TrackItem};
use crate::time::{RationalTime, TimeRange};
use crate::timeline::{Marker, Timeline};
use crate::track::{Track, TrackKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum clip volume multiplier
pub const MAX_VOLUME: f64 = 2.0;

/// Which end of a clip a trim moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimEdge {
    /// Move the in point
    Start,
    /// Move the out point
    End,
}

/// Clip property that can be set directly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "camelCase")]
pub enum ClipProperty {
    /// Volume multiplier in `0.0..=MAX_VOLUME`
    Volume(f64),
    /// Display name
    Name(String),
    /// Enabled flag
    Enabled(bool),
}

/// Copy the timeline and hand the copy of one track to `f`.
fn edit_track<R>(
    timeline: &Timeline,
    track_id: TrackId,
    respect_lock: bool,
    f: impl FnOnce(&mut Track) -> Result<R>,
) -> Result<(Timeline, R)> {
    let position = timeline
        .track_position(track_id)
        .ok_or(EditError::TrackNotFound(track_id))?;
    if respect_lock && timeline.tracks.tracks[position].locked {
        return Err(EditError::TrackLocked(track_id));
    }

    let mut next = timeline.clone();
    let track = Arc::make_mut(&mut next.tracks.tracks[position]);
    let output = f(track)?;
    Ok((next, output))
}

fn locate_clip(timeline: &Timeline, clip_id: ClipId) -> Result<(TrackId, usize, TimeRange)> {
    let location = timeline
        .find_clip(clip_id)
        .ok_or(EditError::ClipNotFound(clip_id))?;
    let range = location
        .track
        .item_range(location.index)
        .ok_or(EditError::ClipNotFound(clip_id))?;
    Ok((location.track.id, location.index, range))
}

fn clip_at(track: &mut Track, index: usize, clip_id: ClipId) -> Result<&mut Clip> {
    track
        .items
        .get_mut(index)
        .and_then(TrackItem::as_clip_mut)
        .ok_or(EditError::ClipNotFound(clip_id))
}

/// Insert a clip on a track at `insert_time`.
///
/// - On an item boundary the clip goes there; past the end of the track a
///   gap is synthesized first.
/// - Inside a gap the gap is split around the clip.
/// - Inside a clip the new clip is placed right after that clip. Existing
///   clips are never overwritten or truncated.
pub fn insert_clip(
    timeline: &Timeline,
    track_id: TrackId,
    clip: Clip,
    insert_time: RationalTime,
) -> Result<Timeline> {
    if !clip.duration().is_positive() {
        return Err(EditError::InvalidDuration(format!(
            "clip {} has duration {}",
            clip.id,
            clip.duration()
        )));
    }
    if clip.source_range.start_time.is_negative() {
        return Err(EditError::InvalidTime(format!(
            "clip {} starts before its media",
            clip.id
        )));
    }
    if insert_time.is_negative() {
        return Err(EditError::InvalidTime(format!(
            "insert time {insert_time} is negative"
        )));
    }

    let clip_id = clip.id;
    let (next, ()) = edit_track(timeline, track_id, true, |track| {
        insert_into_track(track, clip, insert_time);
        Ok(())
    })?;
    tracing::debug!(%clip_id, %track_id, %insert_time, "Inserted clip");
    Ok(next)
}

fn insert_into_track(track: &mut Track, clip: Clip, time: RationalTime) {
    // Walk at the track's own rate so existing durations are never rounded.
    let ranges: Vec<TimeRange> = track.items_with_ranges().map(|(range, _)| range).collect();

    for (index, range) in ranges.iter().enumerate() {
        let start = range.start_time;
        let end = range.end_time();

        if time.is_equal_to(&start) {
            track.items.insert(index, clip.into());
            track.merge_gaps();
            return;
        }

        if time.is_greater_than(&start) && time.is_less_than(&end) {
            if let TrackItem::Gap(gap) = &track.items[index] {
                let length = gap.duration();
                let zero = RationalTime::zero(length.rate);
                let before = (time.rescale(length.rate) - start.rescale(length.rate))
                    .clamp(zero, length);
                let after = length - before;
                track.items.splice(
                    index..=index,
                    [Gap::new(before).into(), clip.into(), Gap::new(after).into()],
                );
            } else {
                track.items.insert(index + 1, clip.into());
            }
            track.merge_gaps();
            return;
        }
    }

    let elapsed = ranges
        .last()
        .map_or_else(|| RationalTime::zero(time.rate), TimeRange::end_time);
    let pad = time.rescale(elapsed.rate) - elapsed;
    if pad.is_positive() {
        track.items.push(Gap::new(pad).into());
    }
    track.items.push(clip.into());
    track.merge_gaps();
}

/// Insert a clip at the end of a track
pub fn append_clip(timeline: &Timeline, track_id: TrackId, clip: Clip) -> Result<Timeline> {
    let end = timeline
        .track(track_id)
        .ok_or(EditError::TrackNotFound(track_id))?
        .duration();
    insert_clip(timeline, track_id, clip, end)
}

/// Move one edge of a clip by `delta`.
///
/// A start trim shifts the source in point and shortens the clip by the
/// same amount; an end trim only changes the duration.
pub fn trim_clip(
    timeline: &Timeline,
    clip_id: ClipId,
    edge: TrimEdge,
    delta: RationalTime,
) -> Result<Timeline> {
    let (track_id, index, _) = locate_clip(timeline, clip_id)?;

    let (next, ()) = edit_track(timeline, track_id, true, |track| {
        let clip = clip_at(track, index, clip_id)?;
        let range = clip.source_range;
        let (start, duration) = match edge {
            TrimEdge::Start => (range.start_time + delta, range.duration - delta),
            TrimEdge::End => (range.start_time, range.duration + delta),
        };

        if !duration.is_positive() {
            return Err(EditError::InvalidTrim(format!(
                "clip {clip_id} would have duration {duration}"
            )));
        }
        if start.is_negative() {
            return Err(EditError::InvalidTrim(format!(
                "clip {clip_id} would start before its media"
            )));
        }

        clip.source_range = TimeRange::new(start, duration);
        Ok(())
    })?;
    Ok(next)
}

/// Move a clip to `target_time` on `target_track_id`.
///
/// Performed as a ripple delete followed by an insert; the clip keeps its ID.
pub fn move_clip(
    timeline: &Timeline,
    clip_id: ClipId,
    target_track_id: TrackId,
    target_time: RationalTime,
) -> Result<Timeline> {
    let clip = timeline
        .find_clip(clip_id)
        .ok_or(EditError::ClipNotFound(clip_id))?
        .clip
        .clone();
    if timeline.track(target_track_id).is_none() {
        return Err(EditError::TrackNotFound(target_track_id));
    }

    let removed = delete_clip(timeline, clip_id, true)?;
    let moved = insert_clip(&removed, target_track_id, clip, target_time)?;
    tracing::debug!(%clip_id, %target_track_id, %target_time, "Moved clip");
    Ok(moved)
}

/// Split a clip in two at `split_time`, returning the new second half's ID.
///
/// The first half keeps the original ID. The second half's source range
/// starts where the first half's ends, so both reference contiguous media.
pub fn split_clip(
    timeline: &Timeline,
    clip_id: ClipId,
    split_time: RationalTime,
) -> Result<(Timeline, ClipId)> {
    let (track_id, index, range) = locate_clip(timeline, clip_id)?;
    let invalid = || EditError::InvalidSplitPoint {
        clip_id,
        time: split_time,
    };
    let interior = split_time.is_greater_than(&range.start_time)
        && split_time.is_less_than(&range.end_time());
    if !interior {
        return Err(invalid());
    }

    let (next, second_id) = edit_track(timeline, track_id, true, |track| {
        let first = clip_at(track, index, clip_id)?;
        let original = first.duration();
        let first_duration = (split_time - range.start_time).rescale(original.rate);
        let second_duration = original - first_duration;
        if !first_duration.is_positive() || !second_duration.is_positive() {
            return Err(invalid());
        }

        let mut second = first.clone();
        second.id = ClipId::new();
        second.source_range = TimeRange::new(
            first.source_range.start_time + first_duration,
            second_duration,
        );
        first.source_range.duration = first_duration;

        let second_id = second.id;
        track.items.insert(index + 1, second.into());
        Ok(second_id)
    })?;

    tracing::debug!(%clip_id, %second_id, %split_time, "Split clip");
    Ok((next, second_id))
}

/// Remove a clip.
///
/// A ripple delete closes the hole; otherwise a gap of the same duration
/// takes the clip's place. Adjacent gaps are merged either way.
pub fn delete_clip(timeline: &Timeline, clip_id: ClipId, ripple: bool) -> Result<Timeline> {
    let (track_id, index, _) = locate_clip(timeline, clip_id)?;

    let (next, ()) = edit_track(timeline, track_id, true, |track| {
        if ripple {
            track.items.remove(index);
        } else {
            let duration = track.items[index].duration();
            track.items[index] = Gap::new(duration).into();
        }
        track.merge_gaps();
        Ok(())
    })?;

    tracing::debug!(%clip_id, ripple, "Deleted clip");
    Ok(next)
}

/// Renumber display indices per kind, copying only tracks whose index changes
fn reindex_tracks(timeline: &mut Timeline) {
    let mut video = 0;
    let mut audio = 0;
    for track in &mut timeline.tracks.tracks {
        let counter = match track.kind {
            TrackKind::Video => &mut video,
            TrackKind::Audio => &mut audio,
        };
        if track.index != *counter {
            Arc::make_mut(track).index = *counter;
        }
        *counter += 1;
    }
}

/// Add an empty track.
///
/// Without an explicit position, video tracks go after the last video
/// track and audio tracks go to the end of the stack.
pub fn add_track(
    timeline: &Timeline,
    kind: TrackKind,
    at_index: Option<usize>,
    name: Option<String>,
) -> Result<(Timeline, TrackId)> {
    let tracks = &timeline.tracks.tracks;
    let position = match at_index {
        Some(index) if index > tracks.len() => {
            return Err(EditError::TrackIndexOutOfRange {
                index,
                len: tracks.len(),
            });
        }
        Some(index) => index,
        None => match kind {
            TrackKind::Video => tracks
                .iter()
                .rposition(|t| t.kind == TrackKind::Video)
                .map_or(0, |p| p + 1),
            TrackKind::Audio => tracks.len(),
        },
    };

    let ordinal = timeline.tracks(Some(kind)).count();
    let name = name.unwrap_or_else(|| format!("{} {}", kind.name(), ordinal + 1));
    let track = Track::new(name, kind, ordinal);
    let track_id = track.id;

    let mut next = timeline.clone();
    next.tracks.tracks.insert(position, Arc::new(track));
    reindex_tracks(&mut next);

    tracing::debug!(%track_id, kind = kind.name(), position, "Added track");
    Ok((next, track_id))
}

/// Remove a track and everything on it
pub fn remove_track(timeline: &Timeline, track_id: TrackId) -> Result<Timeline> {
    let position = timeline
        .track_position(track_id)
        .ok_or(EditError::TrackNotFound(track_id))?;
    if timeline.tracks.tracks[position].locked {
        return Err(EditError::TrackLocked(track_id));
    }

    let mut next = timeline.clone();
    next.tracks.tracks.remove(position);
    reindex_tracks(&mut next);
    Ok(next)
}

/// Rename a track
pub fn rename_track(
    timeline: &Timeline,
    track_id: TrackId,
    name: impl Into<String>,
) -> Result<Timeline> {
    let name = name.into();
    let (next, ()) = edit_track(timeline, track_id, false, |track| {
        track.name = name;
        Ok(())
    })?;
    Ok(next)
}

/// Change a track's muted and locked flags; `None` leaves a flag as is
pub fn set_track_flags(
    timeline: &Timeline,
    track_id: TrackId,
    muted: Option<bool>,
    locked: Option<bool>,
) -> Result<Timeline> {
    let (next, ()) = edit_track(timeline, track_id, false, |track| {
        if let Some(muted) = muted {
            track.muted = muted;
        }
        if let Some(locked) = locked {
            track.locked = locked;
        }
        Ok(())
    })?;
    Ok(next)
}

fn check_marker_range(range: &TimeRange) -> Result<()> {
    if range.start_time.is_negative() || range.duration.is_negative() {
        return Err(EditError::InvalidTime(format!("marker range {range} is negative")));
    }
    Ok(())
}

fn sort_markers(markers: &mut [Marker]) {
    markers.sort_by(|a, b| a.marked_range.start_time.compare(&b.marked_range.start_time));
}

/// Add a marker, keeping markers ordered by start time
pub fn add_marker(timeline: &Timeline, marker: Marker) -> Result<(Timeline, MarkerId)> {
    check_marker_range(&marker.marked_range)?;

    let marker_id = marker.id;
    let mut next = timeline.clone();
    next.markers.push(marker);
    sort_markers(&mut next.markers);
    Ok((next, marker_id))
}

/// Remove a marker
pub fn remove_marker(timeline: &Timeline, marker_id: MarkerId) -> Result<Timeline> {
    if timeline.marker(marker_id).is_none() {
        return Err(EditError::MarkerNotFound(marker_id));
    }
    let mut next = timeline.clone();
    next.markers.retain(|m| m.id != marker_id);
    Ok(next)
}

/// Move a marker to a new start time, keeping its duration
pub fn move_marker(
    timeline: &Timeline,
    marker_id: MarkerId,
    new_start: RationalTime,
) -> Result<Timeline> {
    let mut next = timeline.clone();
    let marker = next
        .markers
        .iter_mut()
        .find(|m| m.id == marker_id)
        .ok_or(EditError::MarkerNotFound(marker_id))?;
    let range = TimeRange::new(new_start, marker.marked_range.duration);
    check_marker_range(&range)?;
    marker.marked_range = range;
    sort_markers(&mut next.markers);
    Ok(next)
}

/// Set a single clip property
pub fn set_clip_property(
    timeline: &Timeline,
    clip_id: ClipId,
    property: ClipProperty,
) -> Result<Timeline> {
    if let ClipProperty::Volume(volume) = property {
        if !(volume.is_finite() && (0.0..=MAX_VOLUME).contains(&volume)) {
            return Err(EditError::InvalidProperty(format!(
                "volume {volume} is outside 0..={MAX_VOLUME}"
            )));
        }
    }

    let (track_id, index, _) = locate_clip(timeline, clip_id)?;
    let (next, ()) = edit_track(timeline, track_id, true, |track| {
        let clip = clip_at(track, index, clip_id)?;
        match property {
            ClipProperty::Volume(volume) => clip.volume = Some(volume),
            ClipProperty::Name(name) => clip.name = name,
            ClipProperty::Enabled(enabled) => clip.enabled = enabled,
        }
        Ok(())
    })?;
    Ok(next)
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! One-way export to OpenTimelineIO JSON.
//!
//! Every node carries an `OTIO_SCHEMA` tag. Splice-only state (IDs, volume,
//! settings) is kept under a `splice` key in the node's metadata so other
//! tools can ignore it. There is no importer.

use crate::error::Result;
use serde_json::{json, Map, Value};
use splice_timeline::{
    Clip, Gap, Marker, MediaReference, Metadata, RationalTime, TimeRange, Timeline, Track,
    TrackItem, TrackKind, Transition,
};

/// Namespace for Splice metadata inside OTIO nodes
pub const METADATA_NAMESPACE: &str = "splice";

fn rational_time(time: &RationalTime) -> Value {
    json!({
        "OTIO_SCHEMA": "RationalTime.1",
        "rate": time.rate,
        "value": time.value as f64,
    })
}

fn time_range(range: &TimeRange) -> Value {
    json!({
        "OTIO_SCHEMA": "TimeRange.1",
        "duration": rational_time(&range.duration),
        "start_time": rational_time(&range.start_time),
    })
}

fn optional_range(range: Option<&TimeRange>) -> Value {
    range.map_or(Value::Null, time_range)
}

/// Copy user metadata, adding the namespaced Splice entry when present
fn metadata(user: &Metadata, splice: Option<Value>) -> Value {
    let mut map: Map<String, Value> = user.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    if let Some(splice) = splice {
        map.insert(METADATA_NAMESPACE.to_string(), splice);
    }
    Value::Object(map)
}

fn media_reference(reference: &MediaReference) -> Value {
    match reference {
        MediaReference::External {
            id,
            target_url,
            mime_type,
            available_range,
            metadata: user,
        } => json!({
            "OTIO_SCHEMA": "ExternalReference.1",
            "name": "",
            "target_url": target_url,
            "available_range": optional_range(available_range.as_ref()),
            "metadata": metadata(user, Some(json!({ "id": id, "mimeType": mime_type }))),
        }),
        MediaReference::Missing {
            id,
            original_url,
            reason,
            available_range,
            metadata: user,
        } => json!({
            "OTIO_SCHEMA": "MissingReference.1",
            "name": "",
            "available_range": optional_range(available_range.as_ref()),
            "metadata": metadata(
                user,
                Some(json!({ "id": id, "originalUrl": original_url, "reason": reason })),
            ),
        }),
        MediaReference::Generator {
            id,
            kind,
            parameters,
            available_range,
            metadata: user,
        } => json!({
            "OTIO_SCHEMA": "GeneratorReference.1",
            "name": "",
            "generator_kind": kind.name(),
            "parameters": metadata(parameters, None),
            "available_range": optional_range(available_range.as_ref()),
            "metadata": metadata(user, Some(json!({ "id": id }))),
        }),
    }
}

fn clip(clip: &Clip) -> Value {
    json!({
        "OTIO_SCHEMA": "Clip.1",
        "name": clip.name,
        "source_range": time_range(&clip.source_range),
        "media_reference": media_reference(&clip.media_reference),
        "enabled": clip.enabled,
        "effects": [],
        "markers": [],
        "metadata": metadata(&clip.metadata, Some(json!({ "id": clip.id, "volume": clip.volume }))),
    })
}

fn gap(gap: &Gap) -> Value {
    json!({
        "OTIO_SCHEMA": "Gap.1",
        "name": "",
        "source_range": time_range(&gap.source_range),
        "effects": [],
        "markers": [],
        "metadata": {},
    })
}

fn transition(transition: &Transition) -> Value {
    json!({
        "OTIO_SCHEMA": "Transition.1",
        "name": transition.name,
        "transition_type": transition.kind,
        "in_offset": rational_time(&transition.in_offset),
        "out_offset": rational_time(&transition.out_offset),
        "metadata": metadata(&transition.metadata, None),
    })
}

fn marker(marker: &Marker) -> Value {
    json!({
        "OTIO_SCHEMA": "Marker.2",
        "name": marker.name,
        "marked_range": time_range(&marker.marked_range),
        "color": marker.color.name(),
        "metadata": metadata(&marker.metadata, Some(json!({ "id": marker.id }))),
    })
}

fn track(track: &Track) -> Value {
    let children: Vec<Value> = track
        .items
        .iter()
        .map(|item| match item {
            TrackItem::Clip(c) => clip(c),
            TrackItem::Gap(g) => gap(g),
            TrackItem::Transition(t) => transition(t),
        })
        .collect();
    let kind = match track.kind {
        TrackKind::Video => "Video",
        TrackKind::Audio => "Audio",
    };

    json!({
        "OTIO_SCHEMA": "Track.1",
        "name": track.name,
        "kind": kind,
        "enabled": !track.muted,
        "source_range": null,
        "children": children,
        "effects": [],
        "markers": [],
        "metadata": metadata(
            &track.metadata,
            Some(json!({ "id": track.id, "index": track.index, "locked": track.locked })),
        ),
    })
}

/// Project a timeline onto OTIO nodes
pub fn to_otio_value(timeline: &Timeline) -> Value {
    let stack = &timeline.tracks;
    let tracks: Vec<Value> = stack.tracks.iter().map(|t| track(t)).collect();
    let markers: Vec<Value> = timeline.markers.iter().map(marker).collect();

    json!({
        "OTIO_SCHEMA": "Timeline.1",
        "name": timeline.name,
        "global_start_time": timeline.global_start_time.as_ref().map(rational_time),
        "tracks": {
            "OTIO_SCHEMA": "Stack.1",
            "name": stack.name,
            "source_range": null,
            "children": tracks,
            "effects": [],
            "markers": markers,
            "metadata": {},
        },
        "metadata": metadata(
            &timeline.metadata,
            Some(json!({
                "id": timeline.id,
                "schemaVersion": timeline.schema_version,
                "settings": timeline.settings,
            })),
        ),
    })
}

/// Export a timeline as pretty-printed OTIO JSON
pub fn export_otio(timeline: &Timeline) -> Result<String> {
    let json = serde_json::to_string_pretty(&to_otio_value(timeline))?;
    tracing::info!(timeline_id = %timeline.id, bytes = json.len(), "Exported OTIO");
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_timeline::edit::{add_marker, append_clip, insert_clip};
    use splice_timeline::{GeneratorKind, TimelineSettings};

    fn frames(n: i64) -> RationalTime {
        RationalTime::from_frames(n, 24.0)
    }

    fn sample() -> Timeline {
        let settings = TimelineSettings {
            frame_rate: 24.0,
            ..TimelineSettings::default()
        };
        let mut timeline = Timeline::with_default_tracks("Export", settings);
        timeline.global_start_time = Some(RationalTime::from_frames(86_400, 24.0));
        let video = timeline.tracks(Some(TrackKind::Video)).next().unwrap().id;
        let audio = timeline.tracks(Some(TrackKind::Audio)).next().unwrap().id;

        let shot = Clip::new(
            "Shot 1",
            MediaReference::external("file:///media/shot1.mov"),
            TimeRange::new(frames(10), frames(48)),
        );
        let timeline = insert_clip(&timeline, video, shot, frames(24)).unwrap();
        let lost = Clip::new(
            "Lost",
            MediaReference::missing(Some("file:///gone.wav".into()), "offline"),
            TimeRange::new(frames(0), frames(24)),
        );
        let timeline = append_clip(&timeline, audio, lost).unwrap();
        let bars = Clip::new(
            "Bars",
            MediaReference::generator(GeneratorKind::Bars),
            TimeRange::new(frames(0), frames(12)),
        );
        let timeline = append_clip(&timeline, video, bars).unwrap();
        add_marker(&timeline, Marker::new("Cue", TimeRange::new(frames(30), frames(0))))
            .unwrap()
            .0
    }

    #[test]
    fn test_schema_tags() {
        let value = to_otio_value(&sample());
        assert_eq!(value["OTIO_SCHEMA"], "Timeline.1");
        assert_eq!(value["tracks"]["OTIO_SCHEMA"], "Stack.1");
        assert_eq!(value["global_start_time"]["value"], 86_400.0);

        let video = &value["tracks"]["children"][0];
        assert_eq!(video["OTIO_SCHEMA"], "Track.1");
        assert_eq!(video["kind"], "Video");

        let children = video["children"].as_array().unwrap();
        let schemas: Vec<_> = children.iter().map(|c| c["OTIO_SCHEMA"].as_str().unwrap()).collect();
        assert_eq!(schemas, vec!["Gap.1", "Clip.1", "Clip.1"]);
        assert_eq!(children[1]["media_reference"]["OTIO_SCHEMA"], "ExternalReference.1");
        assert_eq!(children[1]["media_reference"]["target_url"], "file:///media/shot1.mov");
        assert_eq!(children[2]["media_reference"]["OTIO_SCHEMA"], "GeneratorReference.1");
        assert_eq!(children[2]["media_reference"]["generator_kind"], "bars");

        let range = &children[1]["source_range"];
        assert_eq!(range["OTIO_SCHEMA"], "TimeRange.1");
        assert_eq!(range["start_time"]["OTIO_SCHEMA"], "RationalTime.1");
        assert_eq!(range["start_time"]["value"], 10.0);
        assert_eq!(range["duration"]["rate"], 24.0);

        let audio = &value["tracks"]["children"][1];
        assert_eq!(audio["children"][0]["media_reference"]["OTIO_SCHEMA"], "MissingReference.1");
        assert_eq!(value["tracks"]["markers"][0]["OTIO_SCHEMA"], "Marker.2");
        assert_eq!(value["tracks"]["markers"][0]["color"], "RED");
    }

    #[test]
    fn test_splice_metadata_namespace() {
        let timeline = sample();
        let value = to_otio_value(&timeline);
        let splice = &value["metadata"][METADATA_NAMESPACE];
        assert_eq!(splice["id"], timeline.id.to_string());
        assert_eq!(splice["settings"]["frameRate"], 24.0);
    }

    #[test]
    fn test_transition_node() {
        let mut timeline = sample();
        let track = std::sync::Arc::make_mut(&mut timeline.tracks.tracks[0]);
        track
            .items
            .insert(2, Transition::new("SMPTE_Dissolve", frames(6), frames(6)).into());

        let value = to_otio_value(&timeline);
        let node = &value["tracks"]["children"][0]["children"][2];
        assert_eq!(node["OTIO_SCHEMA"], "Transition.1");
        assert_eq!(node["transition_type"], "SMPTE_Dissolve");
        assert_eq!(node["in_offset"]["value"], 6.0);
    }

    #[test]
    fn test_export_is_valid_json() {
        let json = export_otio(&sample()).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["name"], "Export");
    }
}

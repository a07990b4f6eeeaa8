// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline validation.
//!
//! Validation never fails: it collects every violation it finds and leaves
//! the decision to accept a degraded timeline to the caller.

use crate::ids::{ClipId, TrackId};
use crate::item::TrackItem;
use crate::time::RationalTime;
use crate::timeline::Timeline;
use std::fmt;

/// How serious a violation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Timeline is structurally broken
    Error,
    /// Timeline is usable but degraded
    Warning,
}

/// A single problem found by [`validate_timeline`]
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A clip or gap with zero or negative duration
    NonPositiveDuration {
        /// Track holding the item
        track_id: TrackId,
        /// Item index
        index: usize,
        /// Offending duration
        duration: RationalTime,
    },
    /// A clip whose media could not be resolved
    MissingMedia {
        /// Track holding the clip
        track_id: TrackId,
        /// The clip
        clip_id: ClipId,
    },
    /// Two gaps next to each other
    AdjacentGaps {
        /// Track holding the gaps
        track_id: TrackId,
        /// Index of the first gap
        index: usize,
    },
    /// A clip that starts before its media
    NegativeSourceStart {
        /// Track holding the clip
        track_id: TrackId,
        /// The clip
        clip_id: ClipId,
    },
    /// A transition with a negative in or out offset
    NegativeTransitionOffset {
        /// Track holding the transition
        track_id: TrackId,
        /// Item index
        index: usize,
    },
}

impl Violation {
    /// Severity of this violation
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingMedia { .. } => Severity::Warning,
            Self::NonPositiveDuration { .. }
            | Self::AdjacentGaps { .. }
            | Self::NegativeSourceStart { .. }
            | Self::NegativeTransitionOffset { .. } => Severity::Error,
        }
    }

    /// True for error severity
    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveDuration {
                track_id,
                index,
                duration,
            } => write!(f, "Item {index} on track {track_id} has non-positive duration {duration}"),
            Self::MissingMedia { clip_id, .. } => {
                write!(f, "Clip {clip_id} references missing media")
            }
            Self::AdjacentGaps { track_id, index } => {
                write!(f, "Adjacent gaps at item {index} on track {track_id}")
            }
            Self::NegativeSourceStart { clip_id, .. } => {
                write!(f, "Clip {clip_id} starts before its media")
            }
            Self::NegativeTransitionOffset { track_id, index } => {
                write!(f, "Transition {index} on track {track_id} has a negative offset")
            }
        }
    }
}

/// Scan a timeline for violations
pub fn validate_timeline(timeline: &Timeline) -> Vec<Violation> {
    let mut violations = Vec::new();

    for track in timeline.tracks(None) {
        let track_id = track.id;
        for (index, item) in track.items.iter().enumerate() {
            match item {
                TrackItem::Clip(clip) => {
                    if !clip.duration().is_positive() {
                        violations.push(Violation::NonPositiveDuration {
                            track_id,
                            index,
                            duration: clip.duration(),
                        });
                    }
                    if clip.source_range.start_time.is_negative() {
                        violations.push(Violation::NegativeSourceStart {
                            track_id,
                            clip_id: clip.id,
                        });
                    }
                    if clip.media_reference.is_missing() {
                        violations.push(Violation::MissingMedia {
                            track_id,
                            clip_id: clip.id,
                        });
                    }
                }
                TrackItem::Gap(gap) => {
                    if !gap.duration().is_positive() {
                        violations.push(Violation::NonPositiveDuration {
                            track_id,
                            index,
                            duration: gap.duration(),
                        });
                    }
                }
                TrackItem::Transition(transition) => {
                    if transition.in_offset.is_negative() || transition.out_offset.is_negative() {
                        violations.push(Violation::NegativeTransitionOffset { track_id, index });
                    }
                }
            }
        }

        violations.extend(
            track
                .items
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| pair[0].is_gap() && pair[1].is_gap())
                .map(|(index, _)| Violation::AdjacentGaps { track_id, index }),
        );
    }

    violations
}

/// True if any violation has error severity
pub fn has_errors(violations: &[Violation]) -> bool {
    violations.iter().any(Violation::is_error)
}

/// Items on a track can never overlap: positions are derived from
/// durations. Kept as an explicit sanity check.
pub fn has_overlaps(_timeline: &Timeline) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Clip, Gap, Transition};
    use crate::media::MediaReference;
    use crate::time::TimeRange;
    use crate::timeline::TimelineSettings;
    use std::sync::Arc;

    fn frames(n: i64) -> RationalTime {
        RationalTime::from_frames(n, 30.0)
    }

    fn timeline_with(items: Vec<TrackItem>) -> (Timeline, TrackId) {
        let mut timeline = Timeline::with_default_tracks("Check", TimelineSettings::default());
        let track = Arc::make_mut(&mut timeline.tracks.tracks[0]);
        track.items = items;
        let track_id = track.id;
        (timeline, track_id)
    }

    #[test]
    fn test_clean_timeline() {
        let clip = Clip::new(
            "ok",
            MediaReference::external("ok.mp4"),
            TimeRange::new(frames(0), frames(30)),
        );
        let (timeline, _) = timeline_with(vec![clip.into(), Gap::new(frames(10)).into()]);
        assert!(validate_timeline(&timeline).is_empty());
        assert!(!has_overlaps(&timeline));
    }

    #[test]
    fn test_collects_every_violation() {
        let missing = Clip::new(
            "gone",
            MediaReference::missing(None, "offline"),
            TimeRange::new(frames(-5), frames(30)),
        );
        let missing_id = missing.id;
        let transition = Transition::new("SMPTE_Dissolve", frames(-1), frames(5));
        let (timeline, track_id) = timeline_with(vec![
            missing.into(),
            Gap::new(frames(0)).into(),
            Gap::new(frames(3)).into(),
            transition.into(),
        ]);

        let violations = validate_timeline(&timeline);
        assert_eq!(violations.len(), 5);
        assert!(violations.contains(&Violation::MissingMedia {
            track_id,
            clip_id: missing_id
        }));
        assert!(violations.contains(&Violation::NegativeSourceStart {
            track_id,
            clip_id: missing_id
        }));
        assert!(violations.contains(&Violation::AdjacentGaps { track_id, index: 1 }));
        assert!(violations.contains(&Violation::NegativeTransitionOffset { track_id, index: 3 }));
        assert!(has_errors(&violations));
    }

    #[test]
    fn test_missing_media_is_only_a_warning() {
        let clip = Clip::new(
            "gone",
            MediaReference::missing(Some("a.mov".into()), "offline"),
            TimeRange::new(frames(0), frames(30)),
        );
        let (timeline, _) = timeline_with(vec![clip.into()]);
        let violations = validate_timeline(&timeline);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity(), Severity::Warning);
        assert!(!has_errors(&violations));
        assert!(violations[0].to_string().contains("missing media"));
    }
}

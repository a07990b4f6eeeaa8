// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edit session.
//!
//! A session owns the live timeline snapshot of one open project, its
//! undo/redo history and the listeners to notify after each change. It
//! assumes a single writer: concurrent callers must serialize through a
//! [`SharedSession`]. Snapshots handed out earlier stay valid and
//! unchanged no matter what the session does next.

use crate::commands::{CommandError, CreatedId, EditOp, EditorCommand};
use crate::config::EditorConfig;
use crate::history::{History, HistoryStats};
use crate::store::{ProjectStore, StoreError};
use parking_lot::Mutex;
use serde::Serialize;
use splice_interchange::{legacy, native, otio, InterchangeError, LegacyClip};
use splice_timeline::{validate_timeline, Severity, Timeline};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Session shared between threads; the mutex is the single-writer gate
pub type SharedSession = Arc<Mutex<EditSession>>;

/// Listener called with each new snapshot
pub type Listener = Box<dyn Fn(&Arc<Timeline>) + Send>;

/// Handle returned by [`EditSession::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of an edit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditResult {
    /// Whether the edit was committed
    pub success: bool,
    /// Why it was not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// ID created by the edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<CreatedId>,
}

impl EditResult {
    fn committed(created: Option<CreatedId>) -> Self {
        Self {
            success: true,
            error: None,
            created,
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            created: None,
        }
    }
}

/// Live timeline plus undo/redo history for one project
pub struct EditSession {
    active: Arc<Timeline>,
    history: History,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("timeline", &self.active.id)
            .field("history", &self.history.stats())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EditSession {
    /// Start a session on a timeline
    pub fn new(timeline: Timeline, config: &EditorConfig) -> Self {
        Self {
            active: Arc::new(timeline),
            history: History::with_max_depth(config.history_depth),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Open a stored project
    pub fn open(
        store: &dyn ProjectStore,
        project_id: &str,
        config: &EditorConfig,
    ) -> Result<Self, StoreError> {
        let serialized = store
            .load(project_id)?
            .ok_or_else(|| StoreError::NotFound(project_id.to_string()))?;
        let document = native::deserialize_project(&serialized)?;
        tracing::info!(
            project_id,
            timeline = %document.timeline.name,
            clips = document.timeline.clip_count(),
            "Opened project"
        );
        Ok(Self::new(document.timeline, config))
    }

    /// Save the active timeline to a store
    pub fn save(&self, store: &dyn ProjectStore, project_id: &str) -> Result<(), StoreError> {
        let serialized = native::serialize_project(project_id, &self.active)?;
        if let Err(e) = store.save(project_id, &serialized) {
            tracing::error!(project_id, "Failed to save project: {e}");
            return Err(e);
        }
        tracing::info!(project_id, bytes = serialized.len(), "Saved project");
        Ok(())
    }

    /// Wrap the session for sharing between threads
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Current snapshot
    pub fn active_timeline(&self) -> Arc<Timeline> {
        Arc::clone(&self.active)
    }

    /// Apply one edit.
    ///
    /// The edited timeline is validated before anything is committed; a
    /// failed or invalid edit leaves the live snapshot and history untouched.
    pub fn apply_edit(&mut self, op: &EditOp) -> EditResult {
        let description = op.description();
        tracing::debug!(%description, "Dispatching edit");

        match op.execute(&self.active).and_then(|output| {
            check(&output.timeline)?;
            Ok(output)
        }) {
            Ok(output) => {
                self.commit(output.timeline, description);
                EditResult::committed(output.created)
            }
            Err(e) => {
                tracing::warn!(%description, "Edit rejected: {e}");
                EditResult::failed(e)
            }
        }
    }

    /// Apply edits in order, stopping at the first failure.
    ///
    /// Edits before the failure stay committed; each is undoable on its own.
    pub fn apply_edits(&mut self, ops: &[EditOp]) -> Vec<EditResult> {
        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            let result = self.apply_edit(op);
            let failed = !result.success;
            results.push(result);
            if failed {
                break;
            }
        }
        results
    }

    /// Replace the whole timeline as one undoable edit
    pub fn replace_timeline(
        &mut self,
        timeline: Timeline,
        description: impl Into<String>,
    ) -> EditResult {
        let description = description.into();
        if let Err(e) = check(&timeline) {
            tracing::warn!(%description, "Replacement rejected: {e}");
            return EditResult::failed(e);
        }
        self.commit(timeline, description);
        EditResult::committed(None)
    }

    fn commit(&mut self, timeline: Timeline, description: String) {
        let previous = std::mem::replace(&mut self.active, Arc::new(timeline));
        self.history.record(description, previous);
        self.notify();
    }

    /// Undo the last edit. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(Arc::clone(&self.active)) {
            Ok(snapshot) => {
                self.active = snapshot;
                self.notify();
                true
            }
            Err(e) => {
                tracing::debug!("{e}");
                false
            }
        }
    }

    /// Redo the last undone edit. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(Arc::clone(&self.active)) {
            Ok(snapshot) => {
                self.active = snapshot;
                self.notify();
                true
            }
            Err(e) => {
                tracing::debug!("{e}");
                false
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Description of the edit `undo` would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    /// Description of the edit `redo` would reapply
    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    /// History statistics
    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    /// Register a listener for committed changes
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&Arc<Timeline>) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Call every listener; a panicking listener is logged and skipped
    fn notify(&self) {
        for (id, listener) in &self.listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&self.active))).is_err() {
                tracing::error!(subscription = id.0, "Timeline listener panicked");
            }
        }
    }

    /// Active timeline as interchange JSON
    pub fn export_as_interchange(&self) -> Result<String, InterchangeError> {
        otio::export_otio(&self.active)
    }

    /// Active timeline as a legacy clip list
    pub fn to_legacy_clips(&self, project_id: &str) -> Vec<LegacyClip> {
        legacy::to_legacy_format(&self.active, project_id)
    }

    /// Replace the active timeline with one migrated from a legacy clip list.
    ///
    /// The replacement keeps the active timeline's settings and is undoable.
    pub fn sync_from_legacy(&mut self, clips: &[LegacyClip], name: &str) -> EditResult {
        match legacy::migrate_from_legacy(clips, name, self.active.settings) {
            Ok(timeline) => self.replace_timeline(timeline, "Sync from legacy clips"),
            Err(e) => {
                tracing::warn!("Legacy sync rejected: {e}");
                EditResult::failed(e)
            }
        }
    }
}

/// Reject error-level violations, logging warnings
fn check(timeline: &Timeline) -> Result<(), CommandError> {
    let violations = validate_timeline(timeline);
    for warning in violations.iter().filter(|v| v.severity() == Severity::Warning) {
        tracing::warn!("{warning}");
    }

    let errors: Vec<String> = violations
        .iter()
        .filter(|v| v.is_error())
        .map(ToString::to_string)
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CommandError::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use splice_timeline::{
        Clip, ClipId, ClipProperty, MediaReference, RationalTime, TimeRange, TimelineSettings,
        TrackId, TrackKind,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn secs(s: i64) -> RationalTime {
        RationalTime::from_frames(s * 30, 30.0)
    }

    fn clip(name: &str, duration: i64) -> Clip {
        Clip::new(
            name,
            MediaReference::external(format!("{name}.mp4")),
            TimeRange::new(secs(0), secs(duration)),
        )
    }

    fn session() -> (EditSession, TrackId) {
        let timeline = Timeline::with_default_tracks("Session", TimelineSettings::default());
        let track_id = timeline.tracks(Some(TrackKind::Video)).next().unwrap().id;
        (EditSession::new(timeline, &EditorConfig::default()), track_id)
    }

    #[test]
    fn test_unknown_clip_leaves_snapshot_untouched() {
        let (mut session, track_id) = session();
        session.apply_edit(&EditOp::AppendClip {
            track_id,
            clip: clip("a", 5),
        });
        let before = session.active_timeline();
        let before_json = native::to_json(&before).unwrap();

        let missing = ClipId::new();
        let result = session.apply_edit(&EditOp::DeleteClip {
            clip_id: missing,
            ripple: true,
        });

        assert_eq!(
            result,
            EditResult {
                success: false,
                error: Some(format!("Clip not found: {missing}")),
                created: None,
            }
        );
        assert!(Arc::ptr_eq(&before, &session.active_timeline()));
        assert_eq!(native::to_json(&session.active_timeline()).unwrap(), before_json);
        assert_eq!(session.history_stats().undo_count, 1);
    }

    #[test]
    fn test_undo_redo_restore_exact_snapshots() {
        let (mut session, track_id) = session();
        let original = session.active_timeline();

        assert!(session.apply_edit(&EditOp::AppendClip {
            track_id,
            clip: clip("a", 5),
        })
        .success);
        let edited = session.active_timeline();
        assert_eq!(session.undo_description(), Some("Append clip 'a'"));

        assert!(session.undo());
        assert!(Arc::ptr_eq(&session.active_timeline(), &original));
        assert!(session.can_redo());

        assert!(session.redo());
        assert!(Arc::ptr_eq(&session.active_timeline(), &edited));
        assert!(!session.redo());
    }

    #[test]
    fn test_undo_redo_noop_when_empty() {
        let (mut session, _) = session();
        let before = session.active_timeline();
        assert!(!session.can_undo());
        assert!(!session.undo());
        assert!(!session.redo());
        assert!(Arc::ptr_eq(&before, &session.active_timeline()));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let (mut session, track_id) = session();
        session.apply_edit(&EditOp::AppendClip {
            track_id,
            clip: clip("a", 1),
        });
        session.undo();
        assert!(session.can_redo());

        session.apply_edit(&EditOp::AppendClip {
            track_id,
            clip: clip("b", 1),
        });
        assert!(!session.can_redo());
    }

    #[test]
    fn test_apply_edits_stops_at_first_failure() {
        let (mut session, track_id) = session();
        let results = session.apply_edits(&[
            EditOp::AppendClip {
                track_id,
                clip: clip("a", 2),
            },
            EditOp::SplitClip {
                clip_id: ClipId::new(),
                split_time: secs(1),
            },
            EditOp::AppendClip {
                track_id,
                clip: clip("never", 2),
            },
        ]);

        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(session.active_timeline().clip_count(), 1);
        assert_eq!(session.history_stats().undo_count, 1);
    }

    #[test]
    fn test_split_reports_created_clip() {
        let (mut session, track_id) = session();
        let first = clip("a", 5);
        let first_id = first.id;
        session.apply_edit(&EditOp::AppendClip { track_id, clip: first });

        let result = session.apply_edit(&EditOp::SplitClip {
            clip_id: first_id,
            split_time: secs(3),
        });
        let Some(CreatedId::Clip(second_id)) = result.created else {
            panic!("expected a created clip, got {result:?}");
        };
        let timeline = session.active_timeline();
        assert_eq!(timeline.find_clip(second_id).unwrap().clip.source_range.start_time, secs(3));
    }

    #[test]
    fn test_listeners_survive_panics() {
        let (mut session, track_id) = session();
        let calls = Arc::new(AtomicUsize::new(0));

        session.subscribe(|_| panic!("listener bug"));
        let counter = Arc::clone(&calls);
        let id = session.subscribe(move |timeline| {
            assert_eq!(timeline.clip_count(), counter.load(Ordering::SeqCst) % 2 + 1);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.apply_edit(&EditOp::AppendClip {
            track_id,
            clip: clip("a", 1),
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        session.apply_edit(&EditOp::DeleteClip {
            clip_id: ClipId::new(),
            ripple: true,
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.undo();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_media_is_accepted() {
        let (mut session, track_id) = session();
        let offline = Clip::new(
            "offline",
            MediaReference::missing(None, "not uploaded"),
            TimeRange::new(secs(0), secs(2)),
        );
        let result = session.apply_edit(&EditOp::AppendClip { track_id, clip: offline });
        assert!(result.success);
    }

    #[test]
    fn test_invalid_property_rejected() {
        let (mut session, track_id) = session();
        let first = clip("a", 5);
        let clip_id = first.id;
        session.apply_edit(&EditOp::AppendClip { track_id, clip: first });

        let result = session.apply_edit(&EditOp::SetClipProperty {
            clip_id,
            property: ClipProperty::Volume(-1.0),
        });
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Invalid property value"));
    }

    #[test]
    fn test_history_depth_from_config() {
        let timeline = Timeline::with_default_tracks("Deep", TimelineSettings::default());
        let track_id = timeline.tracks(Some(TrackKind::Video)).next().unwrap().id;
        let config = EditorConfig {
            history_depth: 2,
            ..EditorConfig::default()
        };
        let mut session = EditSession::new(timeline, &config);
        for i in 0..4 {
            session.apply_edit(&EditOp::AppendClip {
                track_id,
                clip: clip(&format!("c{i}"), 1),
            });
        }
        assert_eq!(session.history_stats().undo_count, 2);
        assert!(session.undo() && session.undo());
        assert!(!session.undo());
        assert_eq!(session.active_timeline().clip_count(), 2);
    }

    #[test]
    fn test_legacy_round_trip_through_session() {
        let (mut session, track_id) = session();
        session.apply_edit(&EditOp::AppendClip {
            track_id,
            clip: clip("a", 2),
        });
        session.apply_edit(&EditOp::AppendClip {
            track_id,
            clip: clip("b", 3),
        });

        let clips = session.to_legacy_clips("proj");
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[1].start_time, 2.0);

        let result = session.sync_from_legacy(&clips, "Synced");
        assert!(result.success);
        assert_eq!(session.active_timeline().name, "Synced");
        assert_eq!(session.active_timeline().clip_count(), 2);
        assert_eq!(session.undo_description(), Some("Sync from legacy clips"));

        let interchange = session.export_as_interchange().unwrap();
        assert!(interchange.contains("\"OTIO_SCHEMA\": \"Timeline.1\""));
    }

    #[test]
    fn test_open_and_save() {
        let store = MemoryStore::new();
        let config = EditorConfig::default();
        assert!(matches!(
            EditSession::open(&store, "p1", &config),
            Err(StoreError::NotFound(_))
        ));

        let (mut session, track_id) = session();
        session.apply_edit(&EditOp::AppendClip {
            track_id,
            clip: clip("a", 2),
        });
        session.save(&store, "p1").unwrap();

        let reopened = EditSession::open(&store, "p1", &config).unwrap();
        assert_eq!(*reopened.active_timeline(), *session.active_timeline());
        assert!(!reopened.can_undo());
    }

    #[test]
    fn test_shared_session() {
        let (session, track_id) = session();
        let shared = session.into_shared();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    shared.lock().apply_edit(&EditOp::AppendClip {
                        track_id,
                        clip: clip(&format!("t{i}"), 1),
                    })
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().success);
        }

        let session = shared.lock();
        assert_eq!(session.active_timeline().clip_count(), 4);
        assert_eq!(session.history_stats().undo_count, 4);
    }
}

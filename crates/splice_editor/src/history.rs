// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history of timeline snapshots.
//!
//! Timelines are immutable and share untouched tracks, so history entries
//! hold whole snapshots behind an `Arc` instead of diffs. Undoing swaps the
//! live snapshot with the one on top of the undo stack.

use serde::Serialize;
use splice_timeline::Timeline;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Default undo history depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Unique operation ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OperationId(u64);

impl OperationId {
    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// One undoable step: the snapshot to return to and what the step did
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Operation ID
    pub id: OperationId,
    /// Human-readable description
    pub description: String,
    /// Timeline on the other side of the step
    pub snapshot: Arc<Timeline>,
    /// Unix timestamp (seconds)
    pub timestamp: u64,
}

/// History statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    /// Entries in the undo stack
    pub undo_count: usize,
    /// Entries in the redo stack
    pub redo_count: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Bounded undo/redo stacks
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    next_id: u64,
    max_depth: usize,
}

impl History {
    /// Create a history with the default depth
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with a custom maximum depth (at least one)
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_id: 1,
            max_depth: max_depth.max(1),
        }
    }

    fn entry(&mut self, description: String, snapshot: Arc<Timeline>) -> HistoryEntry {
        let id = OperationId(self.next_id);
        self.next_id += 1;
        HistoryEntry {
            id,
            description,
            snapshot,
            timestamp: now(),
        }
    }

    /// Record a committed edit, keeping the snapshot from before it.
    ///
    /// Clears the redo stack and evicts the oldest entries past the
    /// maximum depth.
    pub fn record(&mut self, description: impl Into<String>, before: Arc<Timeline>) -> OperationId {
        let entry = self.entry(description.into(), before);
        let id = entry.id;

        self.redo_stack.clear();
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::debug!(id = evicted.id.value(), "Evicted oldest history entry");
            }
        }

        tracing::debug!(
            id = id.value(),
            undo_depth = self.undo_stack.len(),
            "Recorded history entry"
        );
        id
    }

    /// Undo the last step, returning the snapshot to restore.
    ///
    /// `current` becomes the redo entry.
    pub fn undo(&mut self, current: Arc<Timeline>) -> Result<Arc<Timeline>> {
        let entry = self
            .undo_stack
            .pop_back()
            .ok_or(HistoryError::NothingToUndo)?;

        tracing::debug!(id = entry.id.value(), description = %entry.description, "Undo");
        let redo = self.entry(entry.description, current);
        self.redo_stack.push_back(redo);
        Ok(entry.snapshot)
    }

    /// Redo the last undone step, returning the snapshot to restore.
    ///
    /// `current` becomes the undo entry.
    pub fn redo(&mut self, current: Arc<Timeline>) -> Result<Arc<Timeline>> {
        let entry = self
            .redo_stack
            .pop_back()
            .ok_or(HistoryError::NothingToRedo)?;

        tracing::debug!(id = entry.id.value(), description = %entry.description, "Redo");
        let undo = self.entry(entry.description, current);
        self.undo_stack.push_back(undo);
        Ok(entry.snapshot)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            max_depth: self.max_depth,
        }
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description.as_str())
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_timeline::TimelineSettings;

    fn snapshot(name: &str) -> Arc<Timeline> {
        Arc::new(Timeline::with_default_tracks(name, TimelineSettings::default()))
    }

    #[test]
    fn test_undo_redo_swaps_snapshots() {
        let mut history = History::new();
        let first = snapshot("first");
        let second = snapshot("second");

        history.record("Rename", first.clone());
        assert_eq!(history.undo_description(), Some("Rename"));

        let restored = history.undo(second.clone()).unwrap();
        assert!(Arc::ptr_eq(&restored, &first));
        assert_eq!(history.redo_description(), Some("Rename"));

        let redone = history.redo(restored).unwrap();
        assert!(Arc::ptr_eq(&redone, &second));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks() {
        let mut history = History::new();
        assert_eq!(history.undo(snapshot("x")).unwrap_err(), HistoryError::NothingToUndo);
        assert_eq!(history.redo(snapshot("x")).unwrap_err(), HistoryError::NothingToRedo);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new();
        history.record("One", snapshot("a"));
        history.undo(snapshot("b")).unwrap();
        assert!(history.can_redo());

        history.record("Two", snapshot("c"));
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_depth_limit_evicts_oldest() {
        let mut history = History::with_max_depth(3);
        for i in 0..5 {
            history.record(format!("Edit {i}"), snapshot("s"));
        }
        let stats = history.stats();
        assert_eq!(stats.undo_count, 3);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(history.undo_description(), Some("Edit 4"));

        history.clear();
        assert_eq!(history.stats(), HistoryStats { undo_count: 0, redo_count: 0, max_depth: 3 });
    }
}

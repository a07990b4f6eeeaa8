// SPDX-License-Identifier: MIT OR Apache-2.0
//! Splice edit session.
//!
//! Wraps the pure edit engine of `splice_timeline` with:
//! - Bounded undo/redo history
//! - Serializable edit commands
//! - Change notification
//! - Persistence checkpoints and configuration

pub mod commands;
pub mod config;
pub mod history;
pub mod logging;
pub mod session;
pub mod store;

pub use commands::{CommandError, CreatedId, EditOp, EditorCommand};
pub use config::{ConfigError, EditorConfig};
pub use history::{History, HistoryError, HistoryStats};
pub use session::{EditResult, EditSession, SharedSession, SubscriptionId};
pub use store::{FileStore, MemoryStore, ProjectStore, StoreError};

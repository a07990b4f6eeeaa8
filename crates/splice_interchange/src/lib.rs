// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline file formats for Splice.
//!
//! - Native JSON round trip and the project envelope
//! - One-way OpenTimelineIO export
//! - Legacy flat clip-list migration, both directions
//! - External asset extraction
//!
//! These are only used at session boundaries (load, save, conversion),
//! never in the middle of an edit.

pub mod assets;
pub mod error;
pub mod legacy;
pub mod native;
pub mod otio;

pub use assets::{collect_asset_metadata, extract_asset_refs, AssetRef};
pub use error::{InterchangeError, Result};
pub use legacy::{migrate_from_legacy, to_legacy_format, EmbeddedAsset, LegacyClip};
pub use native::{
    deserialize_project, from_json, serialize_project, to_json, ProjectDocument,
    PROJECT_FORMAT_VERSION,
};
pub use otio::{export_otio, to_otio_value};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed identifiers for timeline objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an ID from its string form
            pub fn parse(s: &str) -> Option<Self> {
                Uuid::parse_str(s).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a timeline
    TimelineId
);
define_id!(
    /// Unique identifier for a track
    TrackId
);
define_id!(
    /// Unique identifier for a clip
    ClipId
);
define_id!(
    /// Unique identifier for a gap or transition
    ItemId
);
define_id!(
    /// Unique identifier for a marker
    MarkerId
);
define_id!(
    /// Unique identifier for a media reference
    MediaRefId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ClipId::new(), ClipId::new());
    }

    #[test]
    fn test_parse_display_roundtrip() {
        let id = TrackId::new();
        assert_eq!(TrackId::parse(&id.to_string()), Some(id));
        assert_eq!(TrackId::parse("not-a-uuid"), None);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = MarkerId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}

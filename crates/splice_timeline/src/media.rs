// SPDX-License-Identifier: MIT OR Apache-2.0
//! Media references owned by clips.

use crate::ids::MediaRefId;
use crate::time::TimeRange;
use crate::Metadata;
use serde::{Deserialize, Serialize};

/// Kind of synthetic media produced by a generator reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// Black video
    Black,
    /// Solid color
    Color,
    /// Color bars
    Bars,
    /// Test tone
    Tone,
    /// Silent audio
    Silence,
}

impl GeneratorKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Color => "color",
            Self::Bars => "bars",
            Self::Tone => "tone",
            Self::Silence => "silence",
        }
    }
}

/// Where a clip's media comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum MediaReference {
    /// Media addressed by URL
    External {
        /// Reference ID
        id: MediaRefId,
        /// Location of the media
        target_url: String,
        /// MIME type, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        /// Portion of the media that exists
        #[serde(default, skip_serializing_if = "Option::is_none")]
        available_range: Option<TimeRange>,
        /// Free-form metadata
        #[serde(default)]
        metadata: Metadata,
    },
    /// Media that could not be resolved
    Missing {
        /// Reference ID
        id: MediaRefId,
        /// URL the media used to live at
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original_url: Option<String>,
        /// Why the media is missing
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// Portion of the media that existed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        available_range: Option<TimeRange>,
        /// Free-form metadata
        #[serde(default)]
        metadata: Metadata,
    },
    /// Synthetic media
    Generator {
        /// Reference ID
        id: MediaRefId,
        /// What the generator produces
        kind: GeneratorKind,
        /// Generator parameters (color, frequency, ...)
        #[serde(default)]
        parameters: Metadata,
        /// Portion of the media that exists
        #[serde(default, skip_serializing_if = "Option::is_none")]
        available_range: Option<TimeRange>,
        /// Free-form metadata
        #[serde(default)]
        metadata: Metadata,
    },
}

impl MediaReference {
    /// External reference to a URL
    pub fn external(target_url: impl Into<String>) -> Self {
        Self::External {
            id: MediaRefId::new(),
            target_url: target_url.into(),
            mime_type: None,
            available_range: None,
            metadata: Metadata::new(),
        }
    }

    /// Placeholder for media that could not be found
    pub fn missing(original_url: Option<String>, reason: impl Into<String>) -> Self {
        Self::Missing {
            id: MediaRefId::new(),
            original_url,
            reason: Some(reason.into()),
            available_range: None,
            metadata: Metadata::new(),
        }
    }

    /// Generator reference with no parameters
    pub fn generator(kind: GeneratorKind) -> Self {
        Self::Generator {
            id: MediaRefId::new(),
            kind,
            parameters: Metadata::new(),
            available_range: None,
            metadata: Metadata::new(),
        }
    }

    /// Reference ID
    pub fn id(&self) -> MediaRefId {
        match self {
            Self::External { id, .. }
            | Self::Missing { id, .. }
            | Self::Generator { id, .. } => *id,
        }
    }

    /// Available range, if recorded
    pub fn available_range(&self) -> Option<&TimeRange> {
        match self {
            Self::External { available_range, .. }
            | Self::Missing { available_range, .. }
            | Self::Generator { available_range, .. } => available_range.as_ref(),
        }
    }

    /// Metadata map
    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::External { metadata, .. }
            | Self::Missing { metadata, .. }
            | Self::Generator { metadata, .. } => metadata,
        }
    }

    /// URL of external media
    pub fn target_url(&self) -> Option<&str> {
        match self {
            Self::External { target_url, .. } => Some(target_url),
            Self::Missing { .. } | Self::Generator { .. } => None,
        }
    }

    /// MIME type of external media
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::External { mime_type, .. } => mime_type.as_deref(),
            Self::Missing { .. } | Self::Generator { .. } => None,
        }
    }

    /// True for unresolved media
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let external = MediaReference::external("https://cdn.example.com/a.mp4");
        assert_eq!(external.target_url(), Some("https://cdn.example.com/a.mp4"));
        assert!(!external.is_missing());

        let missing = MediaReference::missing(Some("file:///gone.mov".into()), "deleted");
        assert!(missing.is_missing());
        assert_eq!(missing.target_url(), None);

        let generator = MediaReference::generator(GeneratorKind::Bars);
        assert!(generator.available_range().is_none());
        assert_ne!(generator.id(), external.id());
    }

    #[test]
    fn test_tagged_serialization() {
        let reference = MediaReference::generator(GeneratorKind::Silence);
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["type"], "Generator");
        assert_eq!(json["kind"], "silence");

        let external = MediaReference::External {
            id: MediaRefId::new(),
            target_url: "a.mp4".into(),
            mime_type: Some("video/mp4".into()),
            available_range: None,
            metadata: Metadata::new(),
        };
        let json = serde_json::to_value(&external).unwrap();
        assert_eq!(json["targetUrl"], "a.mp4");
        assert_eq!(json["mimeType"], "video/mp4");
        let back: MediaReference = serde_json::from_value(json).unwrap();
        assert_eq!(back, external);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! External media referenced by a timeline.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use splice_timeline::{ClipId, Timeline};

/// One external media URL and the clips that play it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    /// Media URL
    pub url: String,
    /// MIME type from the first clip that declared one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Clips referencing the URL, in stack order
    pub clip_ids: Vec<ClipId>,
}

/// Every external media URL, deduplicated, in first-seen order
pub fn extract_asset_refs(timeline: &Timeline) -> Vec<String> {
    collect_asset_metadata(timeline)
        .into_iter()
        .map(|asset| asset.url)
        .collect()
}

/// Every external media URL with its MIME type and referencing clips
pub fn collect_asset_metadata(timeline: &Timeline) -> Vec<AssetRef> {
    let mut assets: IndexMap<&str, AssetRef> = IndexMap::new();

    for clip in timeline.all_clips() {
        let Some(url) = clip.media_reference.target_url() else {
            continue;
        };
        let asset = assets.entry(url).or_insert_with(|| AssetRef {
            url: url.to_string(),
            mime_type: None,
            clip_ids: Vec::new(),
        });
        if asset.mime_type.is_none() {
            asset.mime_type = clip.media_reference.mime_type().map(str::to_string);
        }
        asset.clip_ids.push(clip.id);
    }

    assets.into_values().collect()
}

//! Out-of-band description of media-blob fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureFields, FeatureType, MediaKind};

/// Top-level field name → description of its media blob type.
///
/// Built from the feature tree alone, never from data, and carried through
/// storage unchanged so a reader can tell image columns from audio columns
/// without looking at the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodeMetadata(pub BTreeMap<String, String>);

impl DecodeMetadata {
    /// Scan the top-level fields of `root` for media blobs.
    pub fn from_features(root: &FeatureFields) -> Self {
        Self(
            root.iter()
                .filter_map(|field| match &field.feature {
                    FeatureType::MediaBlob(kind) => {
                        Some((field.name.clone(), kind.description().to_string()))
                    }
                    _ => None,
                })
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Modality recorded for `field`, if it is a media blob.
    pub fn media_kind(&self, field: &str) -> Option<MediaKind> {
        self.get(field).and_then(MediaKind::from_description)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

//! Schema-level side metadata written alongside materialized batches.

use std::collections::{BTreeMap, HashMap};

use arrow::datatypes::Schema;
use feat2arrow_core::DecodeMetadata;
use serde::{Deserialize, Serialize};

/// Schema metadata key holding the whole [`TaskMetadata`] as JSON.
pub const METADATA_KEY: &str = "metadata";
/// Schema metadata key holding only the [`DecodeMetadata`] map as JSON.
pub const DECODE_META_KEY: &str = "decode_meta";

/// Dataset-level description stored in the output schema's metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskMetadata {
    pub class_names: Vec<String>,
    pub decode_meta: DecodeMetadata,
    pub misc: BTreeMap<String, serde_json::Value>,
}

impl TaskMetadata {
    pub fn new(decode_meta: DecodeMetadata) -> Self {
        Self {
            decode_meta,
            ..Self::default()
        }
    }

    /// Schema metadata entries for this description.
    pub fn to_schema_metadata(&self) -> Result<HashMap<String, String>, serde_json::Error> {
        Ok(HashMap::from([
            (METADATA_KEY.to_string(), serde_json::to_string(self)?),
            (
                DECODE_META_KEY.to_string(),
                serde_json::to_string(&self.decode_meta)?,
            ),
        ]))
    }

    /// Copy of `schema` with this description merged into its metadata.
    pub fn attach_to_schema(&self, schema: &Schema) -> Result<Schema, serde_json::Error> {
        let mut metadata = schema.metadata().clone();
        metadata.extend(self.to_schema_metadata()?);
        Ok(schema.clone().with_metadata(metadata))
    }

    /// Read the description back from a schema.
    ///
    /// A schema without the [`METADATA_KEY`] entry falls back to the
    /// [`DECODE_META_KEY`] entry alone, then to the default.
    pub fn from_schema(schema: &Schema) -> Result<Self, serde_json::Error> {
        let metadata = schema.metadata();
        if let Some(json) = metadata.get(METADATA_KEY) {
            return serde_json::from_str(json);
        }
        match metadata.get(DECODE_META_KEY) {
            Some(json) => Ok(Self::new(serde_json::from_str(json)?)),
            None => Ok(Self::default()),
        }
    }
}

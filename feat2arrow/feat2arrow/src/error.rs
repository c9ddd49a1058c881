//! Error types for the dataset driver.

use feat2arrow_arrow::ConvertError;
use feat2arrow_core::SchemaError;

/// Errors produced by [`FeatureDataset`](crate::FeatureDataset).
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The feature tree cannot be flattened.
    #[error("schema derivation failed: {0}")]
    Schema(#[from] SchemaError),

    /// A batch could not be materialized.
    #[error("batch materialization failed: {0}")]
    Convert(#[from] ConvertError),

    /// I/O error while opening or reading a record file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON-lines record could not be parsed.
    #[error("invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A JSON-lines record is not a JSON object.
    #[error("record on line {line} is not a JSON object")]
    NotAnObject { line: usize },

    /// Task metadata could not be written to or read from a schema.
    #[error("invalid task metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// An error returned by the user-supplied callback in
    /// [`FeatureDataset::for_each_record_batch`](crate::FeatureDataset::for_each_record_batch).
    #[error(transparent)]
    Callback(Box<dyn std::error::Error + Send + Sync>),
}

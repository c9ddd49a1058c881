//! Nested feature datasets to flat Arrow record batches.
//!
//! [`FeatureDataset`] derives the flat schema of a feature tree once and
//! streams materialized batches of at most `batch_size` rows to a callback.
//! The produced schema carries [`TaskMetadata`] so a reader can recover the
//! media columns' modality later.

mod dataset;
mod error;
mod jsonl;
mod metadata;

pub use dataset::{DEFAULT_BATCH_SIZE, FeatureDataset, FeatureDatasetBuilder};
pub use error::DatasetError;
pub use feat2arrow_arrow as arrow;
pub use feat2arrow_core as core;
pub use jsonl::{JsonlRecords, json_to_value, jsonl_records, read_jsonl_records};
pub use metadata::{DECODE_META_KEY, METADATA_KEY, TaskMetadata};

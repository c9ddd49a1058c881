//! Arrow integration layer for `feat2arrow`.
//!
//! This crate focuses on three responsibilities:
//! 1. Convert the flat column IR (`Columns`) produced by
//!    [`derive_schema`](feat2arrow_core::derive_schema) into an Arrow `Schema`.
//! 2. Convert values between row records and Arrow arrays, including the
//!    columnar source layout of a feature tree.
//! 3. Materialize flat `RecordBatch`es from nested source batches with
//!    [`BatchMaterializer`], applying the per-type conversion rules
//!    (categorical decoding, media resolution).
//!
//! # Typical Flow
//! ```rust
//! use feat2arrow_arrow::{BatchMaterializer, MaterializeMode, SourceBatch};
//! use feat2arrow_core::{FeatureFields, FeatureType, ScalarKind, Value, derive_schema};
//!
//! let root = FeatureFields::from_pairs([("id", FeatureType::Scalar(ScalarKind::Int64))]);
//! let derived = derive_schema(&root, 0).unwrap();
//! let materializer =
//!     BatchMaterializer::new(root, derived, MaterializeMode::Correctness).unwrap();
//! let rows = vec![Value::structure([("id", Value::I64(1))])];
//! let batch = materializer.materialize(SourceBatch::Rows(&rows)).unwrap();
//! assert_eq!(batch.num_rows(), 1);
//! ```
pub mod arrow_convert;
pub mod convert;
pub mod error;
pub mod materialize;
pub mod schema_convert;

/// Re-exports from [`arrow_convert`].
pub use arrow_convert::{
    NullStructFill, array_to_values, build_array, build_array_with_fill, records_to_source_batch,
};
/// Re-exports from [`convert`].
pub use convert::{
    MediaFailurePolicy, RawColumn, convert_column, convert_value, encode_png, resolve_media,
};
/// Re-exports from [`error`].
pub use error::{ConvertError, MediaError};
/// Re-exports from [`materialize`].
pub use materialize::{BatchMaterializer, MaterializeMode, SourceBatch};
/// Re-exports from [`schema_convert`].
pub use schema_convert::{
    BINARY_ENCODING, ENCODING_METADATA_KEY, columns_to_arrow_schema, source_data_type,
    source_schema,
};

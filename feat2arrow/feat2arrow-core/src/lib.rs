//! Arrow-independent core types for `feat2arrow`.
//!
//! This crate provides the declared nested schema ([`FeatureType`]), the
//! row-level record representation ([`Value`]), the flat column schema IR
//! ([`Columns`] / [`ColumnType`]) and the schema deriver ([`derive_schema`])
//! that turns the former into the latter.

mod derive;
mod error;
mod feature;
mod metadata;
mod schema;
mod value;

pub use derive::{
    DeriveOptions, DerivedSchema, derive_schema, derive_schema_with, normalize_expansion_depth,
};
pub use error::{SchemaError, ValueTypeError};
pub use feature::{FeatureField, FeatureFields, FeatureType, MediaKind, ScalarKind};
pub use metadata::DecodeMetadata;
pub use schema::{
    Column, ColumnField, ColumnOrigin, ColumnType, Columns, Expansion, ExpansionKind,
    ExpansionMap, format_columns,
};
pub use value::{AudioSamples, PixelBuffer, PixelLayout, Value};

//! Error types for schema derivation and value access.

/// Error returned by [`derive_schema`](crate::derive_schema).
///
/// Every variant names the offending field path (`parent.child`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A struct feature declares no sub-fields.
    #[error("struct feature '{path}' has no fields")]
    EmptyStruct { path: String },

    /// A categorical feature declares an empty label vocabulary.
    #[error("categorical feature '{path}' has no label names")]
    EmptyLabels { path: String },

    /// Two sibling fields share a name.
    #[error("duplicate field name '{path}'")]
    DuplicateField { path: String },

    /// Flattening produced a column name that is already taken.
    #[error("derived column '{name}' (from '{path}') collides with an existing column")]
    ColumnCollision { name: String, path: String },
}

/// A [`Value`](crate::Value) did not have the variant a consumer expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: String,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

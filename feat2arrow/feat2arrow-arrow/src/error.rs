use arrow::{datatypes::DataType, error::ArrowError};
use feat2arrow_core::{MediaKind, PixelLayout, ValueTypeError};
use thiserror::Error;

/// Failure to resolve one media element to a binary payload.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to read media file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("decoded audio buffers have no byte encoding; provide bytes or a file path")]
    DecodedAudio,
    /// `expected` is `None` when the declared dimensions overflow `usize`.
    #[error("{width}x{height} {layout:?} pixel buffer size mismatch ({actual} bytes)")]
    PixelBufferSize {
        width: u32,
        height: u32,
        layout: PixelLayout,
        expected: Option<usize>,
        actual: usize,
    },
    #[error("failed to encode pixel buffer as PNG: {0}")]
    Png(#[from] png::EncodingError),
    #[error("{kind:?} element cannot be resolved from a {actual} value")]
    Unsupported {
        kind: MediaKind,
        actual: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("value type mismatch: {0}")]
    ValueType(#[from] ValueTypeError),
    #[error("categorical code {code} is outside the {labels} declared labels")]
    LabelOutOfRange { code: i128, labels: usize },
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("source column '{0}' not found")]
    MissingColumn(String),
    #[error("field '{0}' is not declared in the feature tree")]
    MissingFeature(String),
    #[error("unsupported Arrow data type: {0}")]
    UnsupportedType(DataType),
    #[error("column '{column}': {source}")]
    Column {
        column: String,
        #[source]
        source: Box<ConvertError>,
    },
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

impl ConvertError {
    pub(crate) fn in_column(self, column: &str) -> Self {
        ConvertError::Column {
            column: column.to_string(),
            source: Box::new(self),
        }
    }
}

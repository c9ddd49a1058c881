//! The declared, recursively-typed feature tree describing a dataset's records.

use std::{
    fmt::{Display, Formatter, Result},
    ops::Deref,
};

/// Primitive kinds carried by [`FeatureType::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Binary,
}

impl ScalarKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt8 => "uint8",
            ScalarKind::UInt16 => "uint16",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::String => "string",
            ScalarKind::Binary => "binary",
        }
    }
}

/// Kind of media carried by [`FeatureType::MediaBlob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// Human-readable description recorded in [`DecodeMetadata`](crate::DecodeMetadata).
    ///
    /// Downstream readers match on the leading `Image` / `Audio` token, so the
    /// shape of these strings is part of the persisted metadata contract.
    pub fn description(&self) -> &'static str {
        match self {
            MediaKind::Image => "Image(mode=None, decode=True)",
            MediaKind::Audio => "Audio(sampling_rate=None, decode=True, stream_index=None)",
        }
    }

    /// Recover the media kind from a [`description`](Self::description).
    pub fn from_description(description: &str) -> Option<Self> {
        if description.starts_with("Image") {
            Some(MediaKind::Image)
        } else if description.starts_with("Audio") {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }
}

/// Declared type of one feature in the nested schema.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureType {
    /// Primitive passed through unchanged.
    Scalar(ScalarKind),
    /// Integer code in `[0, names.len())`, materialized as its label.
    CategoricalLabel(Vec<String>),
    /// Image or audio value resolved to a single binary payload.
    MediaBlob(MediaKind),
    /// Variable-length list of `inner`.
    Sequence(Box<FeatureType>),
    /// Fixed set of named sub-features, in declaration order.
    Struct(FeatureFields),
}

impl FeatureType {
    pub fn sequence(inner: FeatureType) -> Self {
        FeatureType::Sequence(Box::new(inner))
    }

    pub fn categorical<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        FeatureType::CategoricalLabel(names.into_iter().map(Into::into).collect())
    }

    pub fn structure<S, I>(fields: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, FeatureType)>,
    {
        FeatureType::Struct(FeatureFields::from_pairs(fields))
    }

    /// Whether materialization must rewrite values of this type (categorical
    /// decoding or media resolution anywhere in the subtree).
    pub fn needs_conversion(&self) -> bool {
        match self {
            FeatureType::Scalar(_) => false,
            FeatureType::CategoricalLabel(_) | FeatureType::MediaBlob(_) => true,
            FeatureType::Sequence(inner) => inner.needs_conversion(),
            FeatureType::Struct(fields) => fields.iter().any(|f| f.feature.needs_conversion()),
        }
    }

    /// Label for a categorical code, or `None` if the code is out of range.
    pub fn label(&self, code: i64) -> Option<&str> {
        match self {
            FeatureType::CategoricalLabel(names) => usize::try_from(code)
                .ok()
                .and_then(|i| names.get(i))
                .map(String::as_str),
            _ => None,
        }
    }
}

impl Display for FeatureType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            FeatureType::Scalar(kind) => write!(f, "Value({})", kind.type_name()),
            FeatureType::CategoricalLabel(names) => {
                write!(f, "ClassLabel(num_classes={})", names.len())
            }
            FeatureType::MediaBlob(kind) => f.write_str(kind.description()),
            FeatureType::Sequence(inner) => write!(f, "Sequence({inner})"),
            FeatureType::Struct(fields) => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.feature)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// One named entry of a [`FeatureType::Struct`] or of the dataset root.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureField {
    pub name: String,
    pub feature: FeatureType,
}

impl FeatureField {
    pub fn new(name: impl Into<String>, feature: FeatureType) -> Self {
        Self {
            name: name.into(),
            feature,
        }
    }
}

/// Ordered collection of [`FeatureField`] used for struct members and the
/// dataset root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureFields(pub Vec<FeatureField>);

impl FeatureFields {
    pub fn new(fields: Vec<FeatureField>) -> Self {
        Self(fields)
    }

    pub fn from_pairs<S, I>(fields: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, FeatureType)>,
    {
        Self(
            fields
                .into_iter()
                .map(|(name, feature)| FeatureField::new(name, feature))
                .collect(),
        )
    }

    /// Look up a field's type by name.
    pub fn get(&self, name: &str) -> Option<&FeatureType> {
        self.0
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.feature)
    }

    pub fn as_slice(&self) -> &[FeatureField] {
        &self.0
    }
}

impl From<Vec<FeatureField>> for FeatureFields {
    fn from(value: Vec<FeatureField>) -> Self {
        Self(value)
    }
}

impl Deref for FeatureFields {
    type Target = [FeatureField];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

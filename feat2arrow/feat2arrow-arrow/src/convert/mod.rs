//! Per-type column conversion shared by both materialization modes.
//!
//! Categorical codes become labels and media elements become binary
//! payloads, at any nesting depth. Everything else passes through and is
//! only cast to the column's declared type.

pub(crate) mod media;

use arrow::{array::ArrayRef, compute::cast, datatypes::DataType};
use feat2arrow_core::{FeatureType, Value};
use log::warn;

pub use media::{encode_png, resolve_media};

use crate::{
    arrow_convert::{array_to_values, build_array},
    error::ConvertError,
};

/// What to do with a media element that cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFailurePolicy {
    /// Fail the whole batch.
    #[default]
    Fail,
    /// Write null for the element and log a warning.
    NullWithWarning,
}

/// One extracted source column, before conversion.
#[derive(Debug, Clone)]
pub enum RawColumn {
    /// One value per row (correctness-first extraction).
    Values(Vec<Value>),
    /// A projected Arrow array in source layout (throughput-first extraction).
    Array(ArrayRef),
}

impl RawColumn {
    pub fn len(&self) -> usize {
        match self {
            RawColumn::Values(values) => values.len(),
            RawColumn::Array(array) => array.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convert one raw column of `feature` into an array of type `target`.
pub fn convert_column(
    raw: RawColumn,
    feature: &FeatureType,
    target: &DataType,
    policy: MediaFailurePolicy,
) -> Result<ArrayRef, ConvertError> {
    if !feature.needs_conversion() {
        return match raw {
            RawColumn::Values(values) => build_array(target, &values),
            RawColumn::Array(array) => Ok(cast(&array, target)?),
        };
    }

    let values = match raw {
        RawColumn::Values(values) => values,
        RawColumn::Array(array) => array_to_values(array.as_ref())?,
    };
    let converted = values
        .iter()
        .map(|value| convert_value(value, feature, policy))
        .collect::<Result<Vec<_>, _>>()?;
    build_array(target, &converted)
}

/// Convert a single value of `feature`.
///
/// Label strings given to a categorical feature are returned unchanged, so
/// converting an already-converted value is a no-op. Struct entries with no
/// declared sub-feature are kept as they are.
pub fn convert_value(
    value: &Value,
    feature: &FeatureType,
    policy: MediaFailurePolicy,
) -> Result<Value, ConvertError> {
    if value.is_null() || !feature.needs_conversion() {
        return Ok(value.clone());
    }

    match (feature, value) {
        (FeatureType::CategoricalLabel(_), Value::String(_)) => Ok(value.clone()),
        (FeatureType::CategoricalLabel(names), _) => {
            let code = value
                .as_i128()
                .ok_or_else(|| value.type_mismatch("categorical code"))?;
            i64::try_from(code)
                .ok()
                .and_then(|code| feature.label(code))
                .map(Value::string)
                .ok_or(ConvertError::LabelOutOfRange {
                    code,
                    labels: names.len(),
                })
        }
        (FeatureType::MediaBlob(kind), _) => match media::resolve_media(value, *kind) {
            Ok(bytes) => Ok(bytes.map_or(Value::Null, Value::Bytes)),
            Err(ConvertError::Media(err)) if policy == MediaFailurePolicy::NullWithWarning => {
                warn!("writing null for unresolvable {kind:?} element: {err}");
                Ok(Value::Null)
            }
            Err(err) => Err(err),
        },
        (FeatureType::Sequence(inner), Value::List(items)) => items
            .iter()
            .map(|item| convert_value(item, inner, policy))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        (FeatureType::Sequence(_), _) => Err(value.type_mismatch("List").into()),
        (FeatureType::Struct(fields), Value::Struct(entries)) => entries
            .iter()
            .map(|(key, entry)| {
                let entry = match fields.get(key) {
                    Some(sub) => convert_value(entry, sub, policy)?,
                    None => entry.clone(),
                };
                Ok((key.clone(), entry))
            })
            .collect::<Result<Vec<_>, ConvertError>>()
            .map(Value::Struct),
        (FeatureType::Struct(_), _) => Err(value.type_mismatch("Struct").into()),
        (FeatureType::Scalar(_), _) => Ok(value.clone()),
    }
}

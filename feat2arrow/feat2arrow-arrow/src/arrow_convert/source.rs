use std::sync::Arc;

use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use feat2arrow_core::{FeatureFields, FeatureType, MediaKind, Value};
use log::warn;

use super::{append::NullStructFill, build_array_with_fill};
use crate::{
    convert::{MediaFailurePolicy, media::encode_png},
    error::{ConvertError, MediaError},
    schema_convert::source_schema,
};

/// Build the columnar source form of `rows` under `root`.
///
/// Each top-level feature becomes one column of its
/// [`source_data_type`](crate::source_data_type). Media values are normalized
/// to `{bytes, path}` structs (decoded pixel buffers are PNG-encoded). A null
/// or absent struct is written as a null slot whose children hold zero
/// values, the way columnar writers lay out struct children.
pub fn records_to_source_batch(
    root: &FeatureFields,
    rows: &[Value],
) -> Result<RecordBatch, ConvertError> {
    records_to_source_batch_with(root, rows, MediaFailurePolicy::Fail)
}

/// [`records_to_source_batch`] with an explicit policy for media elements
/// that have no stored form.
pub(crate) fn records_to_source_batch_with(
    root: &FeatureFields,
    rows: &[Value],
    policy: MediaFailurePolicy,
) -> Result<RecordBatch, ConvertError> {
    let schema = Arc::new(source_schema(root));
    let mut arrays = Vec::with_capacity(root.len());

    for (field, arrow_field) in root.iter().zip(schema.fields()) {
        let values = rows
            .iter()
            .map(|row| {
                let value = row.get(&field.name)?.unwrap_or(&Value::Null);
                to_source_value(value, &field.feature, policy)
            })
            .collect::<Result<Vec<_>, ConvertError>>()
            .map_err(|e| e.in_column(&field.name))?;
        let array =
            build_array_with_fill(arrow_field.data_type(), &values, NullStructFill::Default)
                .map_err(|e| e.in_column(&field.name))?;
        arrays.push(array);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}

/// Rewrite media elements of `value` into the stored `{bytes, path}` form.
fn to_source_value(
    value: &Value,
    feature: &FeatureType,
    policy: MediaFailurePolicy,
) -> Result<Value, ConvertError> {
    if value.is_null() || !feature.needs_conversion() {
        return Ok(value.clone());
    }

    Ok(match (feature, value) {
        (FeatureType::MediaBlob(kind), _) => match to_media_ref(value, *kind) {
            Ok(media) => media,
            Err(err) if policy == MediaFailurePolicy::NullWithWarning => {
                warn!("writing null for unstorable {kind:?} element: {err}");
                Value::Null
            }
            Err(err) => return Err(err.into()),
        },
        (FeatureType::Sequence(inner), Value::List(items)) => Value::List(
            items
                .iter()
                .map(|item| to_source_value(item, inner, policy))
                .collect::<Result<_, _>>()?,
        ),
        (FeatureType::Struct(fields), Value::Struct(entries)) => Value::Struct(
            entries
                .iter()
                .map(|(key, entry)| {
                    let entry = match fields.get(key) {
                        Some(sub) => to_source_value(entry, sub, policy)?,
                        None => entry.clone(),
                    };
                    Ok((key.clone(), entry))
                })
                .collect::<Result<_, ConvertError>>()?,
        ),
        _ => value.clone(),
    })
}

fn to_media_ref(value: &Value, kind: MediaKind) -> Result<Value, MediaError> {
    Ok(match (kind, value) {
        (MediaKind::Image, Value::Image(pixels)) => Value::media_bytes(encode_png(pixels)?),
        (MediaKind::Audio, Value::Audio(_)) => return Err(MediaError::DecodedAudio),
        (_, Value::Bytes(bytes)) => Value::media_bytes(bytes),
        (_, Value::String(path)) => Value::media_path(path),
        (_, Value::Struct(_)) => value.clone(),
        (_, other) => {
            return Err(MediaError::Unsupported {
                kind,
                actual: other.variant_name(),
            });
        }
    })
}

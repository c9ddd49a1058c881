//! Conversion between row [`Value`]s and Arrow arrays.
//!
//! Arrays are built against an explicit Arrow data type with dynamically
//! typed builders; struct values are matched to struct fields by name, so a
//! missing key and an explicit null both land as null.

mod append;
mod builder;
mod read;
mod scalar;
mod source;

use arrow::{array::ArrayRef, datatypes::DataType};
use feat2arrow_core::Value;

pub use append::NullStructFill;
pub use read::array_to_values;
pub(crate) use read::value_at;
pub use source::records_to_source_batch;
pub(crate) use source::records_to_source_batch_with;

use crate::error::ConvertError;

/// Build an array of type `dt` from `values`. Null struct slots get null
/// children.
pub fn build_array(dt: &DataType, values: &[Value]) -> Result<ArrayRef, ConvertError> {
    build_array_with_fill(dt, values, NullStructFill::Null)
}

/// Build an array of type `dt` from `values`, filling the children of null
/// struct slots according to `fill`.
pub fn build_array_with_fill(
    dt: &DataType,
    values: &[Value],
    fill: NullStructFill,
) -> Result<ArrayRef, ConvertError> {
    let mut builder = builder::make_builder(dt, values.len())?;
    for value in values {
        append::append_value_to_builder(&mut builder, dt, value, fill)?;
    }
    Ok(builder.finish())
}

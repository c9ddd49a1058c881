use std::sync::Arc;

use arrow::{
    array::{Array, AsArray},
    datatypes::{
        DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
        UInt16Type, UInt32Type, UInt64Type,
    },
};
use feat2arrow_core::Value;

use crate::error::ConvertError;

/// Read every slot of `array` back into row values.
///
/// Struct slots honor the parent validity: a null struct reads as
/// [`Value::Null`] whatever its children hold.
pub fn array_to_values(array: &dyn Array) -> Result<Vec<Value>, ConvertError> {
    (0..array.len()).map(|i| value_at(array, i)).collect()
}

pub(crate) fn value_at(array: &dyn Array, index: usize) -> Result<Value, ConvertError> {
    if array.is_null(index) {
        return Ok(Value::Null);
    }

    Ok(match array.data_type() {
        DataType::Null => Value::Null,
        DataType::Boolean => Value::Bool(array.as_boolean().value(index)),
        DataType::Int8 => Value::I8(array.as_primitive::<Int8Type>().value(index)),
        DataType::Int16 => Value::I16(array.as_primitive::<Int16Type>().value(index)),
        DataType::Int32 => Value::I32(array.as_primitive::<Int32Type>().value(index)),
        DataType::Int64 => Value::I64(array.as_primitive::<Int64Type>().value(index)),
        DataType::UInt8 => Value::U8(array.as_primitive::<UInt8Type>().value(index)),
        DataType::UInt16 => Value::U16(array.as_primitive::<UInt16Type>().value(index)),
        DataType::UInt32 => Value::U32(array.as_primitive::<UInt32Type>().value(index)),
        DataType::UInt64 => Value::U64(array.as_primitive::<UInt64Type>().value(index)),
        DataType::Float32 => Value::F32(array.as_primitive::<Float32Type>().value(index)),
        DataType::Float64 => Value::F64(array.as_primitive::<Float64Type>().value(index)),
        DataType::Utf8 => Value::string(array.as_string::<i32>().value(index)),
        DataType::LargeUtf8 => Value::string(array.as_string::<i64>().value(index)),
        DataType::Binary => Value::bytes(array.as_binary::<i32>().value(index)),
        DataType::LargeBinary => Value::bytes(array.as_binary::<i64>().value(index)),
        DataType::List(_) => {
            let items = array.as_list::<i32>().value(index);
            Value::List(array_to_values(items.as_ref())?)
        }
        DataType::LargeList(_) => {
            let items = array.as_list::<i64>().value(index);
            Value::List(array_to_values(items.as_ref())?)
        }
        DataType::Struct(fields) => {
            let struct_array = array.as_struct();
            let entries = fields
                .iter()
                .zip(struct_array.columns())
                .map(|(field, column)| {
                    Ok((
                        Arc::from(field.name().as_str()),
                        value_at(column.as_ref(), index)?,
                    ))
                })
                .collect::<Result<Vec<_>, ConvertError>>()?;
            Value::Struct(entries)
        }
        other => return Err(ConvertError::UnsupportedType(other.clone())),
    })
}

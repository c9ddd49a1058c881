use arrow::datatypes::DataType;
use feat2arrow_core::{Value, ValueTypeError};

pub(super) enum ScalarValue<'a> {
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Utf8(Option<&'a str>),
    Binary(Option<&'a [u8]>),
    LargeBinary(Option<&'a [u8]>),
}

/// Interpret `value` as a scalar of type `dt`.
///
/// Returns `Ok(None)` for compound data types.
pub(super) fn scalar_value_for_datatype<'a>(
    dt: &DataType,
    value: &'a Value,
) -> Result<Option<ScalarValue<'a>>, ValueTypeError> {
    Ok(Some(match dt {
        DataType::Boolean => ScalarValue::Boolean(value.try_bool()?),
        DataType::Int8 => ScalarValue::Int8(value.try_i8()?),
        DataType::Int16 => ScalarValue::Int16(value.try_i16()?),
        DataType::Int32 => ScalarValue::Int32(value.try_i32()?),
        DataType::Int64 => ScalarValue::Int64(value.try_i64()?),
        DataType::UInt8 => ScalarValue::UInt8(value.try_u8()?),
        DataType::UInt16 => ScalarValue::UInt16(value.try_u16()?),
        DataType::UInt32 => ScalarValue::UInt32(value.try_u32()?),
        DataType::UInt64 => ScalarValue::UInt64(value.try_u64()?),
        DataType::Float32 => ScalarValue::Float32(value.try_f32()?),
        DataType::Float64 => ScalarValue::Float64(value.try_f64()?),
        DataType::Utf8 => ScalarValue::Utf8(value.try_str()?),
        DataType::Binary => ScalarValue::Binary(value.try_bytes()?),
        DataType::LargeBinary => ScalarValue::LargeBinary(value.try_bytes()?),
        _ => return Ok(None),
    }))
}

/// Zero value of `dt`, written into the children of a null struct slot in
/// the columnar source layout.
pub(super) fn default_value(dt: &DataType) -> Value {
    match dt {
        DataType::Boolean => Value::Bool(false),
        DataType::Int8 => Value::I8(0),
        DataType::Int16 => Value::I16(0),
        DataType::Int32 => Value::I32(0),
        DataType::Int64 => Value::I64(0),
        DataType::UInt8 => Value::U8(0),
        DataType::UInt16 => Value::U16(0),
        DataType::UInt32 => Value::U32(0),
        DataType::UInt64 => Value::U64(0),
        DataType::Float32 => Value::F32(0.0),
        DataType::Float64 => Value::F64(0.0),
        DataType::Utf8 => Value::string(""),
        DataType::Binary | DataType::LargeBinary => Value::bytes(b""),
        DataType::List(_) => Value::List(Vec::new()),
        DataType::Struct(fields) => Value::Struct(
            fields
                .iter()
                .map(|f| (f.name().as_str().into(), default_value(f.data_type())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

use arrow::{
    array::{
        ArrayBuilder, BinaryBuilder, BooleanBuilder, Float32Builder, Float64Builder, Int8Builder,
        Int16Builder, Int32Builder, Int64Builder, LargeBinaryBuilder, ListBuilder, StringBuilder,
        StructBuilder, UInt8Builder, UInt16Builder, UInt32Builder, UInt64Builder,
    },
    datatypes::{DataType, Fields},
};
use feat2arrow_core::Value;

use super::scalar::{ScalarValue, default_value, scalar_value_for_datatype};
use crate::error::ConvertError;

/// What the children of a null struct slot receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullStructFill {
    /// Children are null as well.
    Null,
    /// Children hold their type's zero value (columnar source layout).
    Default,
}

macro_rules! cast_builder {
    ($b:expr, $T:ty) => {
        $b.as_any_mut()
            .downcast_mut::<$T>()
            .expect(concat!("expected builder type: ", stringify!($T)))
    };
}

fn append_scalar_dyn(builder: &mut Box<dyn ArrayBuilder>, scalar: &ScalarValue<'_>) {
    match scalar {
        ScalarValue::Boolean(v) => cast_builder!(builder, BooleanBuilder).append_option(*v),
        ScalarValue::Int8(v) => cast_builder!(builder, Int8Builder).append_option(*v),
        ScalarValue::Int16(v) => cast_builder!(builder, Int16Builder).append_option(*v),
        ScalarValue::Int32(v) => cast_builder!(builder, Int32Builder).append_option(*v),
        ScalarValue::Int64(v) => cast_builder!(builder, Int64Builder).append_option(*v),
        ScalarValue::UInt8(v) => cast_builder!(builder, UInt8Builder).append_option(*v),
        ScalarValue::UInt16(v) => cast_builder!(builder, UInt16Builder).append_option(*v),
        ScalarValue::UInt32(v) => cast_builder!(builder, UInt32Builder).append_option(*v),
        ScalarValue::UInt64(v) => cast_builder!(builder, UInt64Builder).append_option(*v),
        ScalarValue::Float32(v) => cast_builder!(builder, Float32Builder).append_option(*v),
        ScalarValue::Float64(v) => cast_builder!(builder, Float64Builder).append_option(*v),
        ScalarValue::Utf8(v) => cast_builder!(builder, StringBuilder).append_option(*v),
        ScalarValue::Binary(v) => cast_builder!(builder, BinaryBuilder).append_option(*v),
        ScalarValue::LargeBinary(v) => {
            cast_builder!(builder, LargeBinaryBuilder).append_option(*v)
        }
    }
}

fn append_list_elements(
    child_builder: &mut Box<dyn ArrayBuilder>,
    elem_dt: &DataType,
    value: &Value,
    fill: NullStructFill,
) -> Result<bool, ConvertError> {
    match value {
        Value::List(items) => {
            for item in items {
                append_value_to_builder(child_builder, elem_dt, item, fill)?;
            }
            Ok(true)
        }
        Value::Null => Ok(false),
        _ => Err(value.type_mismatch("List").into()),
    }
}

fn append_struct_fields(
    sb: &mut StructBuilder,
    fields: &Fields,
    value: &Value,
    fill: NullStructFill,
) -> Result<bool, ConvertError> {
    match value {
        Value::Struct(_) => {
            for (i, field) in fields.iter().enumerate() {
                let child = value.get(field.name())?.unwrap_or(&Value::Null);
                append_value_to_struct_field(sb, i, field.data_type(), child, fill)?;
            }
            Ok(true)
        }
        Value::Null => {
            for (i, field) in fields.iter().enumerate() {
                let child = match fill {
                    NullStructFill::Null => Value::Null,
                    NullStructFill::Default => default_value(field.data_type()),
                };
                append_value_to_struct_field(sb, i, field.data_type(), &child, fill)?;
            }
            Ok(false)
        }
        _ => Err(value.type_mismatch("Struct").into()),
    }
}

pub(super) fn append_value_to_builder(
    builder: &mut Box<dyn ArrayBuilder>,
    dt: &DataType,
    value: &Value,
    fill: NullStructFill,
) -> Result<(), ConvertError> {
    if let Some(scalar) = scalar_value_for_datatype(dt, value)? {
        append_scalar_dyn(builder, &scalar);
        return Ok(());
    }

    match dt {
        DataType::List(field) => {
            let b = cast_builder!(builder, ListBuilder<Box<dyn ArrayBuilder>>);
            let valid = append_list_elements(b.values(), field.data_type(), value, fill)?;
            b.append(valid);
        }
        DataType::Struct(fields) => {
            let b = cast_builder!(builder, StructBuilder);
            let valid = append_struct_fields(b, fields, value, fill)?;
            b.append(valid);
        }
        other => return Err(ConvertError::UnsupportedType(other.clone())),
    }
    Ok(())
}

fn append_value_to_struct_field(
    sb: &mut StructBuilder,
    index: usize,
    dt: &DataType,
    value: &Value,
    fill: NullStructFill,
) -> Result<(), ConvertError> {
    append_value_to_builder(&mut sb.field_builders_mut()[index], dt, value, fill)
}

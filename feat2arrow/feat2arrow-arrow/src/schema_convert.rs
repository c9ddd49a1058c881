use std::{collections::HashMap, sync::Arc};

use arrow::datatypes::{DataType, Field, Fields, Schema};
use feat2arrow_core::{
    Column, ColumnType, Columns, FeatureFields, FeatureType, ScalarKind,
};

/// Field-level metadata key telling storage how to encode a column.
pub const ENCODING_METADATA_KEY: &str = "lance:encoding";
/// [`ENCODING_METADATA_KEY`] value for opaque media payloads.
pub const BINARY_ENCODING: &str = "binary";

// ---------------------------------------------------------------------------
// Convert flat column IR to the target Arrow schema
// ---------------------------------------------------------------------------

/// Converts the flat column IR into an Arrow `Schema`.
///
/// All fields are nullable. Media columns become `LargeBinary` annotated with
/// [`ENCODING_METADATA_KEY`] = [`BINARY_ENCODING`].
pub fn columns_to_arrow_schema(columns: &Columns) -> Schema {
    let fields: Vec<Field> = columns.iter().map(column_to_arrow_field).collect();
    Schema::new(fields)
}

fn column_to_arrow_field(column: &Column) -> Field {
    let field = Field::new(&column.name, column_type_to_datatype(&column.column_type), true);
    if column.column_type == ColumnType::Blob {
        field.with_metadata(HashMap::from([(
            ENCODING_METADATA_KEY.to_string(),
            BINARY_ENCODING.to_string(),
        )]))
    } else {
        field
    }
}

pub fn column_type_to_datatype(column_type: &ColumnType) -> DataType {
    match column_type {
        ColumnType::Bool => DataType::Boolean,
        ColumnType::I8 => DataType::Int8,
        ColumnType::I16 => DataType::Int16,
        ColumnType::I32 => DataType::Int32,
        ColumnType::I64 => DataType::Int64,
        ColumnType::U8 => DataType::UInt8,
        ColumnType::U16 => DataType::UInt16,
        ColumnType::U32 => DataType::UInt32,
        ColumnType::U64 => DataType::UInt64,
        ColumnType::F32 => DataType::Float32,
        ColumnType::F64 => DataType::Float64,
        ColumnType::String => DataType::Utf8,
        ColumnType::Bytes => DataType::Binary,
        ColumnType::Blob => DataType::LargeBinary,
        ColumnType::List(item) => list_of(column_type_to_datatype(item)),
        ColumnType::Struct(children) => DataType::Struct(
            children
                .iter()
                .map(|c| Field::new(&c.name, column_type_to_datatype(&c.column_type), true))
                .collect::<Fields>(),
        ),
    }
}

// ---------------------------------------------------------------------------
// Source (pre-conversion) layout of a feature tree
// ---------------------------------------------------------------------------

/// Arrow schema of the columnar source form of `root`, one field per
/// top-level feature.
pub fn source_schema(root: &FeatureFields) -> Schema {
    let fields: Vec<Field> = root
        .iter()
        .map(|f| Field::new(&f.name, source_data_type(&f.feature), true))
        .collect();
    Schema::new(fields)
}

/// Storage type of a feature before conversion: categorical codes are
/// `Int64`, media blobs are `Struct{bytes: Binary, path: Utf8}`.
pub fn source_data_type(feature: &FeatureType) -> DataType {
    match feature {
        FeatureType::Scalar(kind) => scalar_datatype(*kind),
        FeatureType::CategoricalLabel(_) => DataType::Int64,
        FeatureType::MediaBlob(_) => DataType::Struct(Fields::from(vec![
            Field::new("bytes", DataType::Binary, true),
            Field::new("path", DataType::Utf8, true),
        ])),
        FeatureType::Sequence(inner) => list_of(source_data_type(inner)),
        FeatureType::Struct(fields) => DataType::Struct(
            fields
                .iter()
                .map(|f| Field::new(&f.name, source_data_type(&f.feature), true))
                .collect::<Fields>(),
        ),
    }
}

fn scalar_datatype(kind: ScalarKind) -> DataType {
    match kind {
        ScalarKind::Bool => DataType::Boolean,
        ScalarKind::Int8 => DataType::Int8,
        ScalarKind::Int16 => DataType::Int16,
        ScalarKind::Int32 => DataType::Int32,
        ScalarKind::Int64 => DataType::Int64,
        ScalarKind::UInt8 => DataType::UInt8,
        ScalarKind::UInt16 => DataType::UInt16,
        ScalarKind::UInt32 => DataType::UInt32,
        ScalarKind::UInt64 => DataType::UInt64,
        ScalarKind::Float32 => DataType::Float32,
        ScalarKind::Float64 => DataType::Float64,
        ScalarKind::String => DataType::Utf8,
        ScalarKind::Binary => DataType::Binary,
    }
}

pub(crate) fn list_of(item: DataType) -> DataType {
    DataType::List(Arc::new(Field::new("item", item, true)))
}

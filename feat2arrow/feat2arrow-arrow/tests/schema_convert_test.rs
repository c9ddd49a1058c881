use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Fields};
use feat2arrow_arrow::{
    BINARY_ENCODING, ENCODING_METADATA_KEY, columns_to_arrow_schema, source_schema,
};
use feat2arrow_core::{FeatureFields, FeatureType, MediaKind, ScalarKind, derive_schema};

fn item(dt: DataType) -> DataType {
    DataType::List(Arc::new(Field::new("item", dt, true)))
}

fn features() -> FeatureFields {
    FeatureFields::from_pairs([
        ("id", FeatureType::Scalar(ScalarKind::Int64)),
        ("label", FeatureType::categorical(["neg", "pos"])),
        ("image", FeatureType::MediaBlob(MediaKind::Image)),
        ("tags", FeatureType::sequence(FeatureType::Scalar(ScalarKind::String))),
        (
            "meta",
            FeatureType::structure([
                ("a", FeatureType::Scalar(ScalarKind::Int32)),
                ("b", FeatureType::categorical(["x", "y"])),
            ]),
        ),
    ])
}

#[test]
fn columns_to_arrow_schema_maps_every_column_type() {
    let derived = derive_schema(&features(), 0).unwrap();
    let schema = columns_to_arrow_schema(&derived.columns);

    assert_eq!(schema.fields().len(), 5);
    assert_eq!(schema.field(0).data_type(), &DataType::Int64);
    assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
    assert_eq!(schema.field(2).data_type(), &DataType::LargeBinary);
    assert_eq!(schema.field(3).data_type(), &item(DataType::Utf8));
    assert_eq!(
        schema.field(4).data_type(),
        &DataType::Struct(Fields::from(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Utf8, true),
        ]))
    );
    assert!(schema.fields().iter().all(|f| f.is_nullable()));
}

#[test]
fn media_columns_carry_binary_encoding_metadata() {
    let derived = derive_schema(&features(), 0).unwrap();
    let schema = columns_to_arrow_schema(&derived.columns);

    let image = schema.field_with_name("image").unwrap();
    assert_eq!(
        image.metadata().get(ENCODING_METADATA_KEY).map(String::as_str),
        Some(BINARY_ENCODING)
    );
    assert!(schema.field_with_name("id").unwrap().metadata().is_empty());
    assert!(schema.field_with_name("meta").unwrap().metadata().is_empty());
}

#[test]
fn expanded_columns_keep_sub_field_types() {
    let derived = derive_schema(&features(), 1).unwrap();
    let schema = columns_to_arrow_schema(&derived.columns);

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, ["id", "label", "image", "tags", "meta_a", "meta_b"]);
    assert_eq!(schema.field(4).data_type(), &DataType::Int32);
    assert_eq!(schema.field(5).data_type(), &DataType::Utf8);
}

#[test]
fn source_schema_uses_stored_layout() {
    let schema = source_schema(&features());

    assert_eq!(schema.field(1).data_type(), &DataType::Int64);
    assert_eq!(
        schema.field(2).data_type(),
        &DataType::Struct(Fields::from(vec![
            Field::new("bytes", DataType::Binary, true),
            Field::new("path", DataType::Utf8, true),
        ]))
    );
    assert_eq!(
        schema.field(4).data_type(),
        &DataType::Struct(Fields::from(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Int64, true),
        ]))
    );
}

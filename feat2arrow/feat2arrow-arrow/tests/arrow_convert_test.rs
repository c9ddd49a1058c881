use std::sync::Arc;

use arrow::{
    array::{Array, BinaryArray, Int32Array, Int64Array, StringArray, StructArray},
    datatypes::{DataType, Field, Fields},
};
use feat2arrow_arrow::{
    ConvertError, MediaError, NullStructFill, array_to_values, build_array,
    build_array_with_fill, records_to_source_batch,
};
use feat2arrow_core::{
    AudioSamples, FeatureFields, FeatureType, MediaKind, PixelBuffer, PixelLayout, ScalarKind,
    Value,
};

fn pair_type() -> DataType {
    DataType::Struct(Fields::from(vec![
        Field::new("a", DataType::Int32, true),
        Field::new("b", DataType::Utf8, true),
    ]))
}

fn pair_rows() -> Vec<Value> {
    vec![
        Value::structure([("a", Value::I32(1)), ("b", Value::string("one"))]),
        Value::structure([("a", Value::I32(2))]),
        Value::structure([("a", Value::Null), ("b", Value::string("three"))]),
        Value::Null,
    ]
}

fn child<'a, T: 'static>(array: &'a StructArray, name: &str) -> &'a T {
    array
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<T>()
        .unwrap()
}

#[test]
fn build_array_treats_absent_keys_and_nulls_alike() {
    let array = build_array(&pair_type(), &pair_rows()).unwrap();
    let array = array.as_any().downcast_ref::<StructArray>().unwrap();

    assert_eq!(array.len(), 4);
    assert!(array.is_valid(0));
    assert!(array.is_null(3));

    let a = child::<Int32Array>(array, "a");
    assert_eq!(a.iter().collect::<Vec<_>>(), [Some(1), Some(2), None, None]);
    let b = child::<StringArray>(array, "b");
    assert_eq!(b.iter().collect::<Vec<_>>(), [Some("one"), None, Some("three"), None]);
}

#[test]
fn default_fill_writes_zero_values_under_null_structs() {
    let array =
        build_array_with_fill(&pair_type(), &pair_rows(), NullStructFill::Default).unwrap();
    let array = array.as_any().downcast_ref::<StructArray>().unwrap();

    assert!(array.is_null(3));
    let a = child::<Int32Array>(array, "a");
    assert_eq!(a.value(3), 0);
    assert!(a.is_valid(3));
    let b = child::<StringArray>(array, "b");
    assert_eq!(b.value(3), "");

    // Reading back honors the parent validity.
    let values = array_to_values(array).unwrap();
    assert_eq!(values[3], Value::Null);
    assert_eq!(
        values[1],
        Value::structure([("a", Value::I32(2)), ("b", Value::Null)])
    );
}

#[test]
fn build_array_narrows_integers_and_rejects_overflow() {
    let array = build_array(&DataType::Int32, &[Value::I64(7), Value::U8(3)]).unwrap();
    let array = array.as_any().downcast_ref::<Int32Array>().unwrap();
    assert_eq!(array.iter().collect::<Vec<_>>(), [Some(7), Some(3)]);

    let err = build_array(&DataType::Int8, &[Value::I64(300)]).unwrap_err();
    assert!(matches!(err, ConvertError::ValueType(_)));
}

#[test]
fn build_array_rejects_mismatched_variants() {
    let err = build_array(&DataType::Utf8, &[Value::I32(1)]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "value type mismatch: expected String, got I32"
    );
}

#[test]
fn array_to_values_reads_lists() {
    let dt = DataType::List(Arc::new(Field::new("item", DataType::Int64, true)));
    let values = vec![
        Value::List(vec![Value::I64(1), Value::Null]),
        Value::Null,
        Value::List(vec![]),
    ];
    let array = build_array(&dt, &values).unwrap();

    assert_eq!(array_to_values(array.as_ref()).unwrap(), values);
}

#[test]
fn records_to_source_batch_stores_codes_and_media_refs() {
    let root = FeatureFields::from_pairs([
        ("label", FeatureType::categorical(["a", "b"])),
        ("image", FeatureType::MediaBlob(MediaKind::Image)),
        ("score", FeatureType::Scalar(ScalarKind::Float64)),
    ]);
    let rows = vec![
        Value::structure([
            ("label", Value::I64(1)),
            ("image", Value::string("/data/cat.png")),
            ("score", Value::F64(0.5)),
        ]),
        Value::structure([("image", Value::bytes([1_u8, 2, 3]))]),
    ];

    let batch = records_to_source_batch(&root, &rows).unwrap();
    assert_eq!(batch.num_rows(), 2);

    let label = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(label.iter().collect::<Vec<_>>(), [Some(1), None]);

    let image = batch
        .column(1)
        .as_any()
        .downcast_ref::<StructArray>()
        .unwrap();
    let path = child::<StringArray>(image, "path");
    assert_eq!(path.iter().collect::<Vec<_>>(), [Some("/data/cat.png"), None]);
    let bytes = child::<BinaryArray>(image, "bytes");
    assert!(bytes.is_null(0));
    assert_eq!(bytes.value(1), &[1, 2, 3]);
}

#[test]
fn records_to_source_batch_encodes_pixel_buffers() {
    let root = FeatureFields::from_pairs([("image", FeatureType::MediaBlob(MediaKind::Image))]);
    let pixels = PixelBuffer::new(2, 1, PixelLayout::Rgb, vec![255_u8, 0, 0, 0, 255, 0]);
    let rows = vec![Value::structure([("image", Value::Image(pixels))])];

    let batch = records_to_source_batch(&root, &rows).unwrap();
    let image = batch
        .column(0)
        .as_any()
        .downcast_ref::<StructArray>()
        .unwrap();
    let bytes = child::<BinaryArray>(image, "bytes");
    assert!(bytes.value(0).starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn records_to_source_batch_rejects_decoded_audio() {
    let root = FeatureFields::from_pairs([("audio", FeatureType::MediaBlob(MediaKind::Audio))]);
    let samples = AudioSamples {
        sampling_rate: 16_000,
        samples: Arc::from(vec![0.0_f32, 0.5]),
    };
    let rows = vec![Value::structure([("audio", Value::Audio(samples))])];

    let err = records_to_source_batch(&root, &rows).unwrap_err();
    match err {
        ConvertError::Column { column, source } => {
            assert_eq!(column, "audio");
            assert!(matches!(
                *source,
                ConvertError::Media(MediaError::DecodedAudio)
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

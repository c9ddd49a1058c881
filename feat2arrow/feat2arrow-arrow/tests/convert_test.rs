use std::{fs, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, Int64Array, LargeBinaryArray, ListArray, StringArray},
    datatypes::{DataType, Field},
};
use feat2arrow_arrow::{
    ConvertError, MediaError, MediaFailurePolicy, RawColumn, convert_column, convert_value,
    encode_png, resolve_media,
};
use feat2arrow_core::{FeatureType, MediaKind, PixelBuffer, PixelLayout, ScalarKind, Value};

fn animals() -> FeatureType {
    FeatureType::categorical(["cat", "dog", "bird"])
}

fn strings(array: &ArrayRef) -> Vec<Option<&str>> {
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
        .iter()
        .collect()
}

#[test]
fn categorical_codes_decode_to_labels_and_keep_nulls() {
    let raw = RawColumn::Values(vec![Value::I64(0), Value::Null, Value::I64(2), Value::I32(1)]);
    let array =
        convert_column(raw, &animals(), &DataType::Utf8, MediaFailurePolicy::Fail).unwrap();

    assert_eq!(strings(&array), [Some("cat"), None, Some("bird"), Some("dog")]);
}

#[test]
fn categorical_codes_decode_from_arrays() {
    let codes: ArrayRef = Arc::new(Int64Array::from(vec![Some(1), None, Some(0)]));
    let array = convert_column(
        RawColumn::Array(codes),
        &animals(),
        &DataType::Utf8,
        MediaFailurePolicy::Fail,
    )
    .unwrap();

    assert_eq!(strings(&array), [Some("dog"), None, Some("cat")]);
}

#[test]
fn out_of_range_codes_are_errors() {
    for code in [3, -1] {
        let err = convert_value(&Value::I64(code), &animals(), MediaFailurePolicy::Fail)
            .unwrap_err();
        match err {
            ConvertError::LabelOutOfRange { code: c, labels } => {
                assert_eq!(c, i128::from(code));
                assert_eq!(labels, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn sequence_of_categorical_keeps_null_elements() {
    let feature = FeatureType::sequence(animals());
    let target = DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)));
    let raw = RawColumn::Values(vec![
        Value::List(vec![Value::I64(0), Value::Null, Value::I64(1)]),
        Value::Null,
        Value::List(vec![]),
    ]);

    let array = convert_column(raw, &feature, &target, MediaFailurePolicy::Fail).unwrap();
    let list = array.as_any().downcast_ref::<ListArray>().unwrap();

    assert!(list.is_valid(0));
    assert!(list.is_null(1));
    assert!(list.is_valid(2));
    assert_eq!(list.value_offsets(), &[0, 3, 3, 3]);
    assert_eq!(strings(&list.value(0)), [Some("cat"), None, Some("dog")]);
}

#[test]
fn sequence_of_struct_decodes_only_categorical_sub_fields() {
    let feature = FeatureType::sequence(FeatureType::structure([
        ("kind", animals()),
        ("score", FeatureType::Scalar(ScalarKind::Float32)),
    ]));
    let value = Value::List(vec![
        Value::structure([("kind", Value::I64(2)), ("score", Value::F32(0.5))]),
        Value::structure([("kind", Value::Null)]),
    ]);

    let once = convert_value(&value, &feature, MediaFailurePolicy::Fail).unwrap();
    assert_eq!(
        once,
        Value::List(vec![
            Value::structure([("kind", Value::string("bird")), ("score", Value::F32(0.5))]),
            Value::structure([("kind", Value::Null)]),
        ])
    );

    let twice = convert_value(&once, &feature, MediaFailurePolicy::Fail).unwrap();
    assert_eq!(twice, once);

    let null = convert_value(&Value::Null, &feature, MediaFailurePolicy::Fail).unwrap();
    assert_eq!(null, Value::Null);
}

#[test]
fn media_resolves_from_path_and_bytes_alike() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.bin");
    fs::write(&path, b"payload").unwrap();
    let path = path.to_str().unwrap();

    let from_path = resolve_media(&Value::string(path), MediaKind::Image).unwrap();
    let from_struct = resolve_media(&Value::media_path(path), MediaKind::Image).unwrap();
    let from_bytes = resolve_media(&Value::bytes(b"payload"), MediaKind::Image).unwrap();

    assert_eq!(from_path.as_deref(), Some(&b"payload"[..]));
    assert_eq!(from_struct, from_path);
    assert_eq!(from_bytes, from_path);
}

#[test]
fn media_resolution_order_depends_on_kind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    fs::write(&path, b"on disk").unwrap();
    let both = Value::structure([
        ("bytes", Value::bytes(b"embedded")),
        ("path", Value::string(path.to_str().unwrap())),
    ]);

    let image = resolve_media(&both, MediaKind::Image).unwrap();
    let audio = resolve_media(&both, MediaKind::Audio).unwrap();

    assert_eq!(image.as_deref(), Some(&b"embedded"[..]));
    assert_eq!(audio.as_deref(), Some(&b"on disk"[..]));
}

#[test]
fn empty_media_references_resolve_to_null() {
    let empty = Value::structure([("bytes", Value::bytes(b"")), ("path", Value::string(""))]);
    assert_eq!(resolve_media(&empty, MediaKind::Image).unwrap(), None);
    assert_eq!(resolve_media(&empty, MediaKind::Audio).unwrap(), None);
    assert_eq!(resolve_media(&Value::bytes(b""), MediaKind::Audio).unwrap(), None);
    assert_eq!(resolve_media(&Value::Null, MediaKind::Audio).unwrap(), None);
}

#[test]
fn missing_media_file_follows_failure_policy() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");
    let value = Value::media_path(missing.to_str().unwrap());
    let feature = FeatureType::MediaBlob(MediaKind::Image);

    let err = convert_value(&value, &feature, MediaFailurePolicy::Fail).unwrap_err();
    assert!(matches!(err, ConvertError::Media(MediaError::Read { .. })));

    let nulled = convert_value(&value, &feature, MediaFailurePolicy::NullWithWarning).unwrap();
    assert_eq!(nulled, Value::Null);
}

#[test]
fn media_column_converts_to_large_binary() {
    let raw = RawColumn::Values(vec![Value::bytes([1_u8, 2]), Value::Null]);
    let array = convert_column(
        raw,
        &FeatureType::MediaBlob(MediaKind::Audio),
        &DataType::LargeBinary,
        MediaFailurePolicy::Fail,
    )
    .unwrap();
    let array = array.as_any().downcast_ref::<LargeBinaryArray>().unwrap();

    assert_eq!(array.value(0), &[1, 2]);
    assert!(array.is_null(1));
}

#[test]
fn encode_png_writes_header_with_dimensions() {
    let pixels = PixelBuffer::new(3, 2, PixelLayout::Gray, vec![0_u8; 6]);
    let png = encode_png(&pixels).unwrap();

    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(&png[12..16], b"IHDR");
    assert_eq!(u32::from_be_bytes(png[16..20].try_into().unwrap()), 3);
    assert_eq!(u32::from_be_bytes(png[20..24].try_into().unwrap()), 2);
}

#[test]
fn encode_png_rejects_short_buffers() {
    let pixels = PixelBuffer::new(2, 2, PixelLayout::Rgba, vec![0_u8; 15]);
    let err = encode_png(&pixels).unwrap_err();

    assert!(matches!(
        err,
        MediaError::PixelBufferSize {
            expected: Some(16),
            actual: 15,
            ..
        }
    ));
}

#[test]
fn encode_png_rejects_overflowing_dimensions() {
    let pixels = PixelBuffer::new(u32::MAX, u32::MAX, PixelLayout::Rgba, vec![0_u8; 4]);
    let err = encode_png(&pixels).unwrap_err();

    assert!(matches!(
        err,
        MediaError::PixelBufferSize {
            expected: None,
            actual: 4,
            ..
        }
    ));
}

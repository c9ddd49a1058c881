use feat2arrow_core::{
    ColumnField, ColumnType, FeatureType, PixelBuffer, PixelLayout, ScalarKind, Value,
};

#[test]
fn value_string_creates_arc_str_value() {
    let value = Value::string("hello");
    match value {
        Value::String(s) => assert_eq!(&*s, "hello"),
        other => panic!("unexpected value variant: {:?}", other),
    }
}

#[test]
fn struct_lookup_distinguishes_absent_from_null() {
    let record = Value::structure([("a", Value::I64(1)), ("b", Value::Null)]);

    assert_eq!(record.get("a").unwrap(), Some(&Value::I64(1)));
    assert_eq!(record.get("b").unwrap(), Some(&Value::Null));
    assert_eq!(record.get("c").unwrap(), None);
    assert_eq!(Value::Null.get("a").unwrap(), None);
    assert!(Value::I32(3).get("a").is_err());
}

#[test]
fn integer_access_narrows_when_value_fits() {
    assert_eq!(Value::I64(42).try_i32().unwrap(), Some(42));
    assert_eq!(Value::U8(7).try_i64().unwrap(), Some(7));
    assert_eq!(Value::Null.try_u16().unwrap(), None);
    assert!(Value::I64(300).try_u8().is_err());
    assert!(Value::I64(-1).try_u64().is_err());
    assert!(Value::string("1").try_i64().is_err());
}

#[test]
fn float_access_accepts_any_numeric() {
    assert_eq!(Value::I64(2).try_f64().unwrap(), Some(2.0));
    assert_eq!(Value::F64(0.5).try_f32().unwrap(), Some(0.5));
    assert!(Value::Bool(true).try_f64().is_err());
}

#[test]
fn type_mismatch_reports_both_sides() {
    let err = Value::Bool(true).try_str().unwrap_err();
    assert_eq!(err.expected, "String");
    assert_eq!(err.actual, "Bool");
    assert_eq!(err.to_string(), "expected String, got Bool");
}

#[test]
fn pixel_buffer_expected_len_follows_layout() {
    let buffer = PixelBuffer::new(4, 2, PixelLayout::Rgba, vec![0u8; 32]);
    assert_eq!(buffer.expected_len(), Some(32));
    assert_eq!(PixelLayout::GrayAlpha.channels(), 2);
}

#[test]
fn pixel_buffer_expected_len_reports_overflow() {
    let buffer = PixelBuffer::new(u32::MAX, u32::MAX, PixelLayout::Rgba, Vec::<u8>::new());
    assert_eq!(buffer.expected_len(), None);
}

#[test]
fn needs_conversion_looks_through_nesting() {
    assert!(!FeatureType::Scalar(ScalarKind::Int64).needs_conversion());
    assert!(FeatureType::sequence(FeatureType::categorical(["a"])).needs_conversion());
    assert!(
        FeatureType::structure([
            ("x", FeatureType::Scalar(ScalarKind::Int64)),
            ("y", FeatureType::categorical(["a"])),
        ])
        .needs_conversion()
    );
    assert!(
        !FeatureType::sequence(FeatureType::structure([(
            "x",
            FeatureType::Scalar(ScalarKind::Float32)
        )]))
        .needs_conversion()
    );
}

#[test]
fn categorical_label_lookup() {
    let feature = FeatureType::categorical(["neg", "pos"]);
    assert_eq!(feature.label(1), Some("pos"));
    assert_eq!(feature.label(2), None);
    assert_eq!(feature.label(-1), None);
}

#[test]
fn column_field_new_sets_all_fields() {
    let field = ColumnField::new("count", ColumnType::I64);
    assert_eq!(field.name, "count");
    assert_eq!(field.column_type, ColumnType::I64);
}

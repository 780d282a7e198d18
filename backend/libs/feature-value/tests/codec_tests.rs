/// Integration tests for the feature value wire codec
use feature_value::{
    codec, decode, decode_repeated, encode, encode_repeated, Int32List, Null, Payload,
    RepeatedValue, UnknownField, Val, Value, ValueError, ValueType, WireType,
};

/// One representative payload for every variant
fn representative_values() -> Vec<Value> {
    let cases: Vec<(ValueType, Payload)> = vec![
        (ValueType::Bytes, vec![0u8, 1, 2, 255].into()),
        (ValueType::String, "héllo wörld".into()),
        (ValueType::Int32, (-42i32).into()),
        (ValueType::Int64, (i64::MAX).into()),
        (ValueType::Double, std::f64::consts::PI.into()),
        (ValueType::Float, (-1.25f32).into()),
        (ValueType::Bool, true.into()),
        (ValueType::UnixTimestamp, 1_700_000_000i64.into()),
        (ValueType::BytesList, vec![b"ab".to_vec(), Vec::new(), vec![0xff]].into()),
        (ValueType::StringList, vec!["a", "", "ccc"].into()),
        (ValueType::Int32List, vec![0i32, -1, i32::MAX, i32::MIN].into()),
        (ValueType::Int64List, vec![1i64, -1, 1 << 50].into()),
        (ValueType::DoubleList, vec![0.5f64, -0.0, f64::INFINITY].into()),
        (ValueType::FloatList, vec![1.0f32, f32::MIN_POSITIVE].into()),
        (ValueType::BoolList, vec![true, false, true].into()),
        (ValueType::UnixTimestampList, vec![0i64, 1_700_000_000].into()),
        (ValueType::Null, Null::Null.into()),
    ];

    cases
        .into_iter()
        .map(|(variant, payload)| Value::construct(variant, payload).unwrap())
        .collect()
}

// ==================== Round-trip ====================

#[test]
fn test_round_trip_every_variant() {
    let values = representative_values();
    assert_eq!(values.len(), ValueType::VARIANTS.len());

    for value in values {
        let buf = encode(&value).unwrap();
        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded, value, "round trip of {:?}", value.discriminant());
        assert_eq!(decoded.discriminant(), value.discriminant());
    }
}

#[test]
fn test_round_trip_empty_lists() {
    let empties = vec![
        Value::construct(ValueType::BytesList, Vec::<Vec<u8>>::new()).unwrap(),
        Value::construct(ValueType::StringList, Vec::<String>::new()).unwrap(),
        Value::construct(ValueType::Int32List, Vec::<i32>::new()).unwrap(),
        Value::construct(ValueType::DoubleList, Vec::<f64>::new()).unwrap(),
        Value::construct(ValueType::UnixTimestampList, Vec::<i64>::new()).unwrap(),
    ];

    for value in empties {
        let decoded = decode(&encode(&value).unwrap()).unwrap();
        // Present-but-empty, never confused with unset
        assert!(decoded.is_set());
        assert_eq!(decoded, value);
    }
}

#[test]
fn test_round_trip_nan_is_bit_exact_but_unequal() {
    let value = Value::construct(ValueType::Double, f64::NAN).unwrap();
    let decoded = decode(&encode(&value).unwrap()).unwrap();

    // IEEE-754: NaN != NaN, so the decoded value does not compare equal
    assert_ne!(decoded, value);
    match decoded.val {
        Some(Val::DoubleVal(v)) => assert_eq!(v.to_bits(), f64::NAN.to_bits()),
        other => panic!("expected double, got {:?}", other),
    }

    let value = Value::construct(ValueType::FloatList, vec![f32::NAN, 1.0]).unwrap();
    let decoded = decode(&encode(&value).unwrap()).unwrap();
    assert_ne!(decoded, value);
    match decoded.val {
        Some(Val::FloatListVal(list)) => {
            assert!(list.val[0].is_nan());
            assert_eq!(list.val[1], 1.0);
        }
        other => panic!("expected float list, got {:?}", other),
    }
}

#[test]
fn test_unset_round_trip() {
    let buf = encode(&Value::unset()).unwrap();
    assert!(buf.is_empty());

    let decoded = decode(&buf).unwrap();
    assert_eq!(decoded.discriminant(), ValueType::Invalid);
    assert!(!decoded.is_set());
    assert!(decoded.unknown_fields.is_empty());
}

// ==================== Concrete scenarios ====================

#[test]
fn test_int32_scenario() {
    let buf = encode(&Value::construct(ValueType::Int32, 42i32).unwrap()).unwrap();
    let decoded = decode(&buf).unwrap();

    assert_eq!(decoded.discriminant(), ValueType::Int32);
    assert_eq!(decoded.access_as(ValueType::Int32), Some(&Val::Int32Val(42)));
    assert_eq!(decoded.access_as(ValueType::String), None);
}

#[test]
fn test_string_list_scenario() {
    let value = Value::construct(ValueType::StringList, vec!["a", "bb", "ccc"]).unwrap();
    let buf = encode(&value).unwrap();
    assert_eq!(buf, hex::decode("620c0a01610a0262620a03636363").unwrap());

    match decode(&buf).unwrap().val {
        Some(Val::StringListVal(list)) => assert_eq!(list.val, ["a", "bb", "ccc"]),
        other => panic!("expected string list, got {:?}", other),
    }
}

// ==================== RepeatedValue ====================

#[test]
fn test_repeated_value_preserves_order() {
    let v1 = Value::construct(ValueType::Int64, 1i64).unwrap();
    let v2 = Value::construct(ValueType::String, "two").unwrap();
    let v3 = Value::construct(ValueType::BoolList, vec![true, false]).unwrap();
    let repeated = RepeatedValue::new(vec![v1.clone(), v2.clone(), v3.clone()]);

    let decoded = decode_repeated(&encode_repeated(&repeated).unwrap()).unwrap();
    assert_eq!(decoded.val, vec![v1, v2, v3]);
}

#[test]
fn test_repeated_value_keeps_unset_entries() {
    let repeated = RepeatedValue::new(vec![
        Value::unset(),
        Value::construct(ValueType::Null, Payload::Null).unwrap(),
        Value::unset(),
    ]);
    let buf = encode_repeated(&repeated).unwrap();
    assert_eq!(buf, hex::decode("0a000a039801000a00").unwrap());

    let decoded = decode_repeated(&buf).unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded, repeated);
}

#[test]
fn test_empty_repeated_value() {
    let buf = encode_repeated(&RepeatedValue::default()).unwrap();
    assert!(buf.is_empty());
    assert!(decode_repeated(&buf).unwrap().is_empty());
}

// ==================== Duplicate tags ====================

#[test]
fn test_duplicate_scalar_tag_last_wins() {
    // int32_val = 1, then int32_val = 2
    let buf = hex::decode("18011802").unwrap();
    let decoded = decode(&buf).unwrap();
    assert_eq!(decoded.val, Some(Val::Int32Val(2)));
}

#[test]
fn test_different_variant_tags_last_wins() {
    // int32_val = 1, then string_val = "x"
    let buf = hex::decode("18011201 78".replace(' ', "")).unwrap();
    let decoded = decode(&buf).unwrap();
    assert_eq!(decoded.discriminant(), ValueType::String);
    assert_eq!(decoded.access_as(ValueType::Int32), None);

    // Re-encoding writes only the surviving variant
    assert_eq!(encode(&decoded).unwrap(), hex::decode("120178").unwrap());
}

// ==================== Truncation ====================

#[test]
fn test_truncation_is_rejected_for_every_variant() {
    for value in representative_values() {
        let buf = encode(&value).unwrap();
        assert!(!buf.is_empty());

        let truncated = &buf[..buf.len() - 1];
        match decode(truncated) {
            Err(ValueError::MalformedWire(_)) => {}
            other => panic!(
                "truncated {:?} should be malformed, got {:?}",
                value.discriminant(),
                other
            ),
        }
    }
}

#[test]
fn test_truncation_of_repeated_value_is_rejected() {
    let repeated: RepeatedValue = representative_values().into_iter().collect();
    let buf = encode_repeated(&repeated).unwrap();
    let err = decode_repeated(&buf[..buf.len() - 1]).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_malformed_inputs() {
    // length prefix larger than the buffer
    assert!(decode(&hex::decode("1205616263").unwrap()).is_err());
    // varint that never terminates
    assert!(decode(&[0x18, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).is_err());
    // truncated fixed64
    assert!(decode(&hex::decode("29000000").unwrap()).is_err());
    // field number 0
    assert!(decode(&[0x00, 0x01]).is_err());
    // invalid wire type 7
    assert!(decode(&[0x1f]).is_err());
}

// ==================== Unknown fields ====================

#[test]
fn test_unknown_tag_is_tolerated_and_preserved() {
    // int32_val = 7, then field 100 (length-delimited "new")
    let buf = hex::decode("1807a206036e6577").unwrap();
    let decoded = decode(&buf).unwrap();

    assert_eq!(decoded.access_as(ValueType::Int32), Some(&Val::Int32Val(7)));
    assert_eq!(decoded.unknown_fields.len(), 1);

    let field = decoded.unknown_fields.iter().next().unwrap();
    assert_eq!(field.tag(), 100);
    assert_eq!(field.wire_type(), WireType::LengthDelimited);
    assert_eq!(field.data(), b"new");

    // Passing through this build does not lose the newer field
    assert_eq!(encode(&decoded).unwrap(), buf);
}

#[test]
fn test_reserved_tags_are_treated_as_unknown() {
    // field 9 varint 1, field 10 fixed32, then bool_val = true
    let buf = hex::decode("48015501020304 3801".replace(' ', "")).unwrap();
    let decoded = decode(&buf).unwrap();

    assert_eq!(decoded.val, Some(Val::BoolVal(true)));
    assert_eq!(decoded.unknown_fields.by_tag(9).count(), 1);
    assert_eq!(decoded.unknown_fields.by_tag(10).count(), 1);
}

#[test]
fn test_unknown_fields_inside_repeated_value() {
    // entry [int32_val = 1], then top-level field 2 varint 5
    let buf = hex::decode("0a0218011005").unwrap();
    let decoded = decode_repeated(&buf).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded.unknown_fields.len(), 1);
    assert_eq!(encode_repeated(&decoded).unwrap(), buf);
}

#[test]
fn test_unknown_null_enum_number_survives() {
    let buf = hex::decode("980102").unwrap();
    let decoded = decode(&buf).unwrap();
    assert_eq!(decoded.discriminant(), ValueType::Null);
    assert_eq!(decoded.val, Some(Val::NullVal(2)));
    assert_eq!(encode(&decoded).unwrap(), buf);
}

#[test]
fn test_hand_built_unknown_fields_never_encode_undecodable_bytes() {
    let mut unset_with_variant_tag = Value::unset();
    unset_with_variant_tag
        .unknown_fields
        .push(UnknownField::new(3, WireType::LengthDelimited, "abc").unwrap());

    let mut list = Int32List::from(vec![7, 8]);
    list.unknown_fields
        .push(UnknownField::new(1, WireType::SixtyFourBit, vec![0u8; 8]).unwrap());
    let list_with_element_tag = Value::from(Val::Int32ListVal(list));

    let mut unset_with_free_tag = Value::unset();
    unset_with_free_tag
        .unknown_fields
        .push(UnknownField::new(20, WireType::LengthDelimited, "abc").unwrap());

    for value in [unset_with_variant_tag, list_with_element_tag, unset_with_free_tag] {
        match encode(&value) {
            Ok(buf) => assert_eq!(decode(&buf).unwrap(), value),
            Err(err) => assert!(err.is_programming_error(), "unexpected {:?}", err),
        }
    }

    let mut repeated = RepeatedValue::new(vec![Value::unset()]);
    repeated
        .unknown_fields
        .push(UnknownField::new(1, WireType::Varint, vec![0x05u8]).unwrap());
    let err = encode_repeated(&repeated).unwrap_err();
    assert_eq!(err, ValueError::ConflictingUnknownField { tag: 1 });
}

// ==================== Interop ====================

#[test]
fn test_json_representation_uses_wire_field_names() {
    let value = Value::construct(ValueType::Int64List, vec![1i64, 2]).unwrap();
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json, serde_json::json!({ "val": { "int64_list_val": { "val": [1, 2] } } }));

    let back: Value = serde_json::from_value(json).unwrap();
    assert_eq!(back, value);

    let unset = serde_json::to_string(&Value::unset()).unwrap();
    assert_eq!(unset, "{}");
}

#[test]
fn test_codec_module_paths() {
    let value = Value::construct(ValueType::Float, 0.5f32).unwrap();
    assert_eq!(codec::encoded_len(&value), 5);
    assert_eq!(codec::decode(&codec::encode(&value).unwrap()).unwrap(), value);
}

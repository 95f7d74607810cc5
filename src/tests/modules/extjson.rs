use std::convert::TryFrom;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::{
    bson,
    doc,
    oid::ObjectId,
    spec::BinarySubtype,
    tests::LOCK,
    Binary,
    Bson,
    DateTime,
    Decimal128,
    Document,
    JavaScriptCodeWithScope,
    Regex,
    Timestamp,
};

#[test]
fn canonical_round_trip() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! {
        "double": 10.5,
        "whole_double": 2.0,
        "string": "text",
        "document": { "nested": true },
        "array": [1, "two", null],
        "binary": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
        "oid": ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap(),
        "bool": false,
        "datetime": DateTime::from_millis(1_590_972_160_292),
        "old_datetime": DateTime::from_millis(-42),
        "regex": Regex { pattern: "ab+".to_string(), options: "im".to_string() },
        "code": Bson::JavaScriptCode("function() {}".to_string()),
        "code_w_scope": JavaScriptCodeWithScope {
            code: "function(x) {}".to_string(),
            scope: doc! { "x": 1 },
        },
        "symbol": Bson::Symbol("sym".to_string()),
        "int32": 5i32,
        "timestamp": Timestamp { time: 1, increment: 2 },
        "int64": 18_014_398_509_481_984i64,
        "decimal": "2.5E+5".parse::<Decimal128>().unwrap(),
        "undefined": Bson::Undefined,
        "min_key": Bson::MinKey,
        "max_key": Bson::MaxKey,
    };

    let value = Bson::Document(doc.clone()).into_canonical_extjson();
    let parsed = Bson::try_from(value).unwrap();
    assert_eq!(parsed, Bson::Document(doc));
}

#[test]
fn relaxed_round_trip() {
    let _guard = LOCK.run_concurrently();

    // values chosen so the relaxed profile's numeric collapse is lossless
    let doc = doc! {
        "int32": 5i32,
        "int64_big": (i64::MAX - 1),
        "double": 10.5,
        "string": "text",
        "datetime": DateTime::from_millis(1_590_972_160_292),
        "binary": Binary { subtype: BinarySubtype::Generic, bytes: vec![255, 255] },
        "array": [{ "nested": "yes" }],
    };

    let value = Bson::Document(doc.clone()).into_relaxed_extjson();
    let parsed = Bson::try_from(value).unwrap();
    assert_eq!(parsed, Bson::Document(doc));
}

#[test]
fn canonical_wrappers() {
    let _guard = LOCK.run_concurrently();

    assert_eq!(
        Bson::Int32(5).into_canonical_extjson(),
        json!({ "$numberInt": "5" })
    );
    assert_eq!(
        Bson::Int64(5).into_canonical_extjson(),
        json!({ "$numberLong": "5" })
    );
    assert_eq!(
        Bson::Double(5.0).into_canonical_extjson(),
        json!({ "$numberDouble": "5.0" })
    );
    assert_eq!(
        Bson::Double(f64::INFINITY).into_canonical_extjson(),
        json!({ "$numberDouble": "Infinity" })
    );
    assert_eq!(
        Bson::Double(f64::NAN).into_canonical_extjson(),
        json!({ "$numberDouble": "NaN" })
    );
    assert_eq!(
        Bson::DateTime(DateTime::from_millis(42)).into_canonical_extjson(),
        json!({ "$date": { "$numberLong": "42" } })
    );
    assert_eq!(
        Bson::MinKey.into_canonical_extjson(),
        json!({ "$minKey": 1 })
    );
    assert_eq!(
        Bson::Undefined.into_canonical_extjson(),
        json!({ "$undefined": true })
    );
}

#[test]
fn relaxed_numbers() {
    let _guard = LOCK.run_concurrently();

    assert_eq!(Bson::Int32(5).into_relaxed_extjson(), json!(5));
    assert_eq!(Bson::Int64(5).into_relaxed_extjson(), json!(5i64));
    assert_eq!(Bson::Double(10.5).into_relaxed_extjson(), json!(10.5));

    // 2^53 is exactly representable in a double and stays plain
    let max_safe = 1i64 << 53;
    assert_eq!(
        Bson::Int64(max_safe).into_relaxed_extjson(),
        json!(max_safe)
    );
    // one past it keeps the wrapper
    assert_eq!(
        Bson::Int64(max_safe + 1).into_relaxed_extjson(),
        json!({ "$numberLong": "9007199254740993" })
    );
    assert_eq!(
        Bson::Int64(-max_safe - 1).into_relaxed_extjson(),
        json!({ "$numberLong": "-9007199254740993" })
    );
}

#[test]
fn relaxed_datetime_range() {
    let _guard = LOCK.run_concurrently();

    assert_eq!(
        Bson::DateTime(DateTime::from_millis(978_312_200_000)).into_relaxed_extjson(),
        json!({ "$date": "2001-01-01T01:23:20Z" })
    );
    assert_eq!(
        Bson::DateTime(DateTime::from_millis(978_312_200_123)).into_relaxed_extjson(),
        json!({ "$date": "2001-01-01T01:23:20.123Z" })
    );

    // pre-epoch dates fall back to the canonical wrapper
    assert_eq!(
        Bson::DateTime(DateTime::from_millis(-1)).into_relaxed_extjson(),
        json!({ "$date": { "$numberLong": "-1" } })
    );

    // so do dates past the year 9999
    let year_10000 = 253_402_300_800_000i64;
    assert_eq!(
        Bson::DateTime(DateTime::from_millis(year_10000)).into_relaxed_extjson(),
        json!({ "$date": { "$numberLong": "253402300800000" } })
    );
}

#[test]
fn parse_relaxed_datetime_string() {
    let _guard = LOCK.run_concurrently();

    let parsed = Bson::try_from(json!({ "$date": "2001-01-01T01:23:20Z" })).unwrap();
    assert_eq!(
        parsed,
        Bson::DateTime(DateTime::from_millis(978_312_200_000))
    );

    let parsed = Bson::try_from(json!({ "$date": "2001-01-01T01:23:20.500Z" })).unwrap();
    assert_eq!(
        parsed,
        Bson::DateTime(DateTime::from_millis(978_312_200_500))
    );
}

#[test]
fn decimal_wrapper_to_bytes() {
    let _guard = LOCK.run_concurrently();

    let value = json!({ "d": { "$numberDecimal": "1.2E+10" } });
    let doc = Document::try_from(value.as_object().unwrap().clone()).unwrap();

    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();

    let mut expected = vec![0x18, 0x00, 0x00, 0x00, 0x13, 0x64, 0x00];
    expected.extend_from_slice(&12u64.to_le_bytes());
    expected.extend_from_slice(&0x3052_0000_0000_0000u64.to_le_bytes());
    expected.push(0x00);
    assert_eq!(buf, expected);
}

#[test]
fn binary_wrapper() {
    let _guard = LOCK.run_concurrently();

    let value = json!({ "$binary": { "base64": "//8=", "subType": "00" } });
    let parsed = Bson::try_from(value.clone()).unwrap();
    assert_eq!(
        parsed,
        Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![0xFF, 0xFF],
        })
    );

    // both profiles re-encode to the identical wrapper
    assert_eq!(parsed.clone().into_relaxed_extjson(), value);
    assert_eq!(parsed.into_canonical_extjson(), value);
}

#[test]
fn legacy_binary_forms() {
    let _guard = LOCK.run_concurrently();

    let expected = Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: vec![0xFF, 0xFF],
    });

    let parsed = Bson::try_from(json!({ "$binary": "//8=", "$type": "00" })).unwrap();
    assert_eq!(parsed, expected);

    let parsed = Bson::try_from(json!({ "$binary": "//8=", "$type": 0 })).unwrap();
    assert_eq!(parsed, expected);

    let parsed = Bson::try_from(json!({ "$binary": "//8=", "$type": "5" })).unwrap();
    assert_eq!(
        parsed,
        Bson::Binary(Binary {
            subtype: BinarySubtype::Md5,
            bytes: vec![0xFF, 0xFF],
        })
    );
}

#[test]
fn uuid_shorthand() {
    let _guard = LOCK.run_concurrently();

    let parsed =
        Bson::try_from(json!({ "$uuid": "73ffd264-44b3-4c69-90e8-e7d1dfc035d4" })).unwrap();
    let binary = match &parsed {
        Bson::Binary(b) => b,
        other => panic!("expected binary, got {:?}", other),
    };
    assert_eq!(binary.subtype, BinarySubtype::Uuid);
    assert_eq!(binary.bytes.len(), 16);
    assert_eq!(binary.bytes[0], 0x73);

    assert!(Bson::try_from(json!({ "$uuid": "not-a-uuid" })).is_err());
}

#[test]
fn reserved_subtype_rejected() {
    let _guard = LOCK.run_concurrently();

    let err =
        Bson::try_from(json!({ "$binary": { "base64": "AA==", "subType": "09" } })).unwrap_err();
    assert!(err.is_data_corrupted());
}

#[test]
fn code_with_and_without_scope() {
    let _guard = LOCK.run_concurrently();

    let parsed = Bson::try_from(json!({ "$code": "function() {}" })).unwrap();
    assert_eq!(parsed, Bson::JavaScriptCode("function() {}".to_string()));

    let parsed =
        Bson::try_from(json!({ "$code": "function(x) {}", "$scope": { "x": 1 } })).unwrap();
    assert_eq!(
        parsed,
        Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
            code: "function(x) {}".to_string(),
            scope: doc! { "x": 1 },
        })
    );
}

#[test]
fn regex_options_are_sorted() {
    let _guard = LOCK.run_concurrently();

    let rx = Bson::RegularExpression(Regex {
        pattern: "ab+".to_string(),
        options: "mix".to_string(),
    });
    assert_eq!(
        rx.into_relaxed_extjson(),
        json!({ "$regularExpression": { "pattern": "ab+", "options": "imx" } })
    );
}

#[test]
fn error_messages_carry_key_paths() {
    let _guard = LOCK.run_concurrently();

    let value = json!({ "a": { "b": { "$numberInt": 5 } } });
    let err = Bson::try_from(value).unwrap_err();
    assert!(err.is_data_corrupted());
    assert!(
        err.to_string().starts_with("a.b: "),
        "unexpected message: {}",
        err
    );

    let value = json!({ "outer": [ { "$numberLong": "not a number" } ] });
    let err = Bson::try_from(value).unwrap_err();
    assert!(
        err.to_string().starts_with("outer.0: "),
        "unexpected message: {}",
        err
    );
}

#[test]
fn plain_document_with_dollarless_keys() {
    let _guard = LOCK.run_concurrently();

    let value = json!({ "x": 5, "y": { "$numberInt": "5" }, "z": { "subdoc": "hello" } });
    let parsed = Bson::try_from(value).unwrap();
    assert_eq!(
        parsed,
        bson!({ "x": 5, "y": 5, "z": { "subdoc": "hello" } })
    );
}

#[test]
fn mixed_profiles_parse() {
    let _guard = LOCK.run_concurrently();

    let value = json!({
        "canonical": { "$numberLong": "42" },
        "relaxed": 42.5,
        "date": { "$date": { "$numberLong": "1590972160292" } },
    });
    let parsed = Document::try_from(value.as_object().unwrap().clone()).unwrap();
    assert_eq!(parsed.get_i64("canonical").unwrap(), 42);
    assert_eq!(parsed.get_f64("relaxed").unwrap(), 42.5);
    assert_eq!(
        parsed.get_datetime("date").unwrap(),
        &DateTime::from_millis(1_590_972_160_292)
    );
}

#[test]
fn preserves_key_order() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "zebra": 1, "apple": 2, "mango": 3 };
    let value: Value = Bson::Document(doc.clone()).into_canonical_extjson();
    let text = serde_json::to_string(&value).unwrap();
    let reparsed: Value = serde_json::from_str(&text).unwrap();
    let round_tripped = Bson::try_from(reparsed).unwrap();

    let keys: Vec<_> = match &round_tripped {
        Bson::Document(d) => d.keys().cloned().collect(),
        other => panic!("expected document, got {:?}", other),
    };
    assert_eq!(keys, vec!["zebra", "apple", "mango"]);
}

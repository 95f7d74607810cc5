use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::{
    doc,
    oid::ObjectId,
    spec::BinarySubtype,
    tests::LOCK,
    Binary,
    Bson,
    DateTime,
    DbPointer,
    Decimal128,
    Document,
    JavaScriptCodeWithScope,
    Regex,
    Timestamp,
};

fn round_trip(doc: &Document) -> Document {
    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();
    Document::from_reader(buf.as_slice()).unwrap()
}

#[test]
fn hello_world_bytes() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "hello": "world" };
    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();

    let expected = vec![
        0x16, 0x00, 0x00, 0x00, 0x02, 0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x00, 0x06, 0x00, 0x00, 0x00,
        0x77, 0x6F, 0x72, 0x6C, 0x64, 0x00, 0x00,
    ];
    assert_eq!(buf, expected);

    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn array_document_bytes() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "BSON": ["awesome", 5.05, 1986] };
    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();

    let expected = vec![
        0x31, 0x00, 0x00, 0x00, // total size
        0x04, 0x42, 0x53, 0x4F, 0x4E, 0x00, // array "BSON"
        0x26, 0x00, 0x00, 0x00, // inner document size
        0x02, 0x30, 0x00, // string "0"
        0x08, 0x00, 0x00, 0x00, 0x61, 0x77, 0x65, 0x73, 0x6F, 0x6D, 0x65, 0x00,
        0x01, 0x31, 0x00, // double "1"
        0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x14, 0x40,
        0x10, 0x32, 0x00, // int32 "2"
        0xC2, 0x07, 0x00, 0x00, 0x00, 0x00,
    ];
    assert_eq!(buf, expected);

    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn length_prefix_matches_byte_length() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! {
        "a": 1,
        "nested": { "b": [true, null, "x"] },
        "d": 2.5,
    };
    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();

    let prefix = i32::from_le_bytes(buf[0..4].try_into().unwrap());
    assert_eq!(prefix as usize, buf.len());
    assert_eq!(*buf.last().unwrap(), 0);
}

#[test]
fn every_type_round_trips() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! {
        "double": 10.5,
        "string": "text",
        "document": { "nested": true },
        "array": [1, 2, 3],
        "binary": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
        "binary_old": Binary { subtype: BinarySubtype::BinaryOld, bytes: vec![4, 5] },
        "binary_user": Binary { subtype: BinarySubtype::UserDefined(0x80), bytes: vec![6] },
        "uuid": Binary { subtype: BinarySubtype::Uuid, bytes: vec![0; 16] },
        "undefined": Bson::Undefined,
        "oid": ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap(),
        "bool": true,
        "datetime": DateTime::from_millis(-42),
        "null": null,
        "regex": Regex { pattern: "ab+".to_string(), options: "im".to_string() },
        "code": Bson::JavaScriptCode("function() {}".to_string()),
        "symbol": Bson::Symbol("sym".to_string()),
        "code_w_scope": JavaScriptCodeWithScope {
            code: "function(x) { return x; }".to_string(),
            scope: doc! { "x": 1 },
        },
        "int32": i32::MIN,
        "timestamp": Timestamp { time: 1_565_545_664, increment: 3 },
        "int64": i64::MAX,
        "decimal128": "1.5E+10".parse::<Decimal128>().unwrap(),
        "min_key": Bson::MinKey,
        "max_key": Bson::MaxKey,
        "db_pointer": DbPointer {
            namespace: "db.coll".to_string(),
            id: ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap(),
        },
    };

    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn old_binary_inner_length() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "b": Binary { subtype: BinarySubtype::BinaryOld, bytes: vec![1, 2, 3] } };
    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();

    // outer length 7, subtype 0x02, inner length 3
    assert_eq!(&buf[7..16], &[7, 0, 0, 0, 0x02, 3, 0, 0, 0]);

    // corrupt the inner length
    buf[12] = 9;
    assert!(Document::from_reader(buf.as_slice())
        .unwrap_err()
        .is_malformed_value());
}

#[test]
fn invalid_boolean_byte() {
    let _guard = LOCK.run_concurrently();

    let mut buf = Vec::new();
    doc! { "b": true }.to_writer(&mut buf).unwrap();
    let value_offset = buf.len() - 2;
    assert_eq!(buf[value_offset], 0x01);

    buf[value_offset] = 0x02;
    assert!(Document::from_reader(buf.as_slice())
        .unwrap_err()
        .is_malformed_value());
}

#[test]
fn invalid_string_length() {
    let _guard = LOCK.run_concurrently();

    let mut buf = Vec::new();
    doc! { "s": "abc" }.to_writer(&mut buf).unwrap();
    // declared string length of zero cannot cover the terminator
    buf[7..11].copy_from_slice(&0i32.to_le_bytes());
    assert!(Document::from_reader(buf.as_slice()).is_err());
}

#[test]
fn unknown_element_tag() {
    let _guard = LOCK.run_concurrently();

    let mut buf = Vec::new();
    doc! { "i": 1 }.to_writer(&mut buf).unwrap();
    buf[4] = 0x20;
    assert!(Document::from_reader(buf.as_slice())
        .unwrap_err()
        .is_malformed_value());
}

#[test]
fn interior_null_key_rejected() {
    let _guard = LOCK.run_concurrently();

    let mut doc = Document::new();
    doc.insert("bad\0key", 1);
    let mut buf = Vec::new();
    assert!(doc.to_writer(&mut buf).unwrap_err().is_invalid_argument());
}

#[test]
fn duplicate_keys_resolve_to_first() {
    let _guard = LOCK.run_concurrently();

    // craft a document with two "a" entries by hand
    let mut elements = Vec::new();
    for value in [1i32, 2] {
        elements.push(0x10);
        elements.extend_from_slice(b"a\0");
        elements.extend_from_slice(&value.to_le_bytes());
    }
    let mut buf = ((elements.len() + 5) as i32).to_le_bytes().to_vec();
    buf.extend_from_slice(&elements);
    buf.push(0);

    let doc = Document::from_reader(buf.as_slice()).unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.get_i32("a").unwrap(), 1);
}

#[test]
fn size_limit_boundary() {
    let _guard = LOCK.run_concurrently();

    // 4 (length) + 1 (type) + 2 (key) + 4 (len) + 1 (subtype) + payload + 1 (terminator)
    let payload_len = 16 * 1024 * 1024 - 13;

    let fits = doc! {
        "a": Binary { subtype: BinarySubtype::Generic, bytes: vec![0u8; payload_len] }
    };
    let mut buf = Vec::new();
    fits.to_writer(&mut buf).unwrap();
    assert_eq!(buf.len(), 16 * 1024 * 1024);

    let too_large = doc! {
        "a": Binary { subtype: BinarySubtype::Generic, bytes: vec![0u8; payload_len + 1] }
    };
    assert!(too_large
        .to_writer(&mut Vec::new())
        .unwrap_err()
        .is_document_too_large());
}

#[test]
fn reserved_subtype_rejected_on_read() {
    let _guard = LOCK.run_concurrently();

    let mut buf = Vec::new();
    doc! { "b": Binary { subtype: BinarySubtype::Generic, bytes: vec![1] } }
        .to_writer(&mut buf)
        .unwrap();
    // the subtype byte follows the four length bytes of the binary payload
    buf[11] = 0x09;
    assert!(Document::from_reader(buf.as_slice())
        .unwrap_err()
        .is_malformed_value());
}

fn arb_bson() -> impl Strategy<Value = Bson> {
    let leaf = prop_oneof![
        any::<i32>().prop_map(Bson::Int32),
        any::<i64>().prop_map(Bson::Int64),
        any::<bool>().prop_map(Bson::Boolean),
        (-1.0e10f64..1.0e10).prop_map(Bson::Double),
        "[a-zA-Z0-9]{0,12}".prop_map(Bson::String),
        proptest::sample::select(vec![Bson::Null, Bson::MinKey, Bson::MaxKey, Bson::Undefined]),
        any::<[u8; 12]>().prop_map(|b| Bson::ObjectId(ObjectId::from_bytes(b))),
        any::<i64>().prop_map(|ms| Bson::DateTime(DateTime::from_millis(ms))),
        (any::<u32>(), any::<u32>()).prop_map(|(time, increment)| Bson::Timestamp(Timestamp {
            time,
            increment
        })),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(|bytes| Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes
        })),
    ];

    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Bson::Array),
            proptest::collection::vec(("[a-zA-Z0-9]{1,8}", inner), 0..6)
                .prop_map(|pairs| Bson::Document(pairs.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn arbitrary_document_round_trips(value in arb_bson()) {
        let doc = doc! { "value": value };
        let mut buf = Vec::new();
        doc.to_writer(&mut buf).unwrap();
        let decoded = Document::from_reader(buf.as_slice()).unwrap();
        prop_assert_eq!(decoded, doc);
    }
}

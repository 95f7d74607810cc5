use pretty_assertions::assert_eq;

use crate::{
    doc,
    oid::ObjectId,
    raw::{RawBinaryRef, RawBsonRef, RawDocument, RawDocumentBuf},
    spec::BinarySubtype,
    tests::LOCK,
    Binary,
    DateTime,
    Timestamp,
};

#[test]
fn envelope_validation() {
    let _guard = LOCK.run_concurrently();

    // too short
    assert!(RawDocument::from_bytes(b"\x04\x00\x00\x00").is_err());
    // length prefix disagrees with the buffer length
    assert!(RawDocument::from_bytes(b"\x06\x00\x00\x00\x00").is_err());
    // missing trailing NUL
    assert!(RawDocument::from_bytes(b"\x05\x00\x00\x00\x01").is_err());
    // minimal empty document
    let doc = RawDocument::from_bytes(b"\x05\x00\x00\x00\x00").unwrap();
    assert!(doc.is_empty());
    assert!(doc.iter().next().is_none());
}

#[test]
fn iteration() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "crate": "wirebson", "year": 2021, "stable": true };
    let raw = RawDocumentBuf::from_document(&doc).unwrap();

    let mut iter = raw.iter();

    let (key, value) = iter.next().unwrap().unwrap();
    assert_eq!(key, "crate");
    assert_eq!(value.as_str(), Some("wirebson"));

    let (key, value) = iter.next().unwrap().unwrap();
    assert_eq!(key, "year");
    assert_eq!(value.as_i32(), Some(2021));

    let (key, value) = iter.next().unwrap().unwrap();
    assert_eq!(key, "stable");
    assert_eq!(value.as_bool(), Some(true));

    assert!(iter.next().is_none());
}

#[test]
fn iterator_poisons_after_error() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "ok": 1, "bad": 2, "unreached": 3 };
    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();

    // corrupt the second element's type tag
    let second_offset = 4 + 1 + 3 + 4;
    buf[second_offset] = 0x20;

    let raw = RawDocument::from_bytes(&buf).unwrap();
    let mut iter = raw.iter();

    assert!(iter.next().unwrap().is_ok());
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn keyed_access_returns_first_duplicate() {
    let _guard = LOCK.run_concurrently();

    let mut raw = RawDocumentBuf::empty();
    raw.append("a", RawBsonRef::Int32(1)).unwrap();
    raw.append("a", RawBsonRef::Int32(2)).unwrap();

    assert_eq!(raw.get_i32("a").unwrap(), Some(1));
    assert_eq!(raw.iter().count(), 2);

    let doc = raw.to_document().unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.get_i32("a").unwrap(), 1);
}

#[test]
fn append_matches_serializer() {
    let _guard = LOCK.run_concurrently();

    let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    let doc = doc! {
        "double": 2.5,
        "string": "hi",
        "bool": false,
        "datetime": DateTime::from_millis(99),
        "int32": 7i32,
        "int64": 8i64,
        "timestamp": Timestamp { time: 1, increment: 2 },
        "oid": oid,
        "binary": Binary { subtype: BinarySubtype::Generic, bytes: vec![9, 9] },
        "null": null,
    };
    let mut expected = Vec::new();
    doc.to_writer(&mut expected).unwrap();

    let mut raw = RawDocumentBuf::empty();
    raw.append("double", 2.5).unwrap();
    raw.append("string", "hi").unwrap();
    raw.append("bool", false).unwrap();
    raw.append("datetime", DateTime::from_millis(99)).unwrap();
    raw.append("int32", 7i32).unwrap();
    raw.append("int64", 8i64).unwrap();
    raw.append("timestamp", Timestamp { time: 1, increment: 2 })
        .unwrap();
    raw.append("oid", oid).unwrap();
    raw.append(
        "binary",
        RawBinaryRef {
            subtype: BinarySubtype::Generic,
            bytes: &[9, 9],
        },
    )
    .unwrap();
    raw.append("null", RawBsonRef::Null).unwrap();

    assert_eq!(raw.as_bytes(), expected.as_slice());
    assert_eq!(raw.to_document().unwrap(), doc);
}

#[test]
fn nested_document_access() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "goodbye": { "cruel": "world" } };
    let raw = RawDocumentBuf::from_document(&doc).unwrap();

    let value = raw
        .get_document("goodbye")
        .unwrap()
        .unwrap()
        .get_str("cruel")
        .unwrap();
    assert_eq!(value, Some("world"));
}

#[test]
fn array_view() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "arr": [1, "two", true] };
    let raw = RawDocumentBuf::from_document(&doc).unwrap();

    let arr = raw.get_array("arr").unwrap().unwrap();
    assert_eq!(arr.get(0).unwrap().unwrap().as_i32(), Some(1));
    assert_eq!(arr.get(1).unwrap().unwrap().as_str(), Some("two"));
    assert_eq!(arr.get(2).unwrap().unwrap().as_bool(), Some(true));
    assert!(arr.get(3).unwrap().is_none());

    let values: Vec<_> = arr.into_iter().collect::<crate::error::Result<_>>().unwrap();
    assert_eq!(values.len(), 3);

    // the array is a view over the same bytes as its document form
    assert_eq!(
        arr.as_doc().get_str("1").unwrap(),
        Some("two")
    );
}

#[test]
fn old_binary_wrong_inner_length() {
    let _guard = LOCK.run_concurrently();

    let doc = doc! { "b": Binary { subtype: BinarySubtype::BinaryOld, bytes: vec![1, 2, 3] } };
    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();
    buf[12] = 9; // inner length no longer agrees with the outer one

    let raw = RawDocument::from_bytes(&buf).unwrap();
    assert!(raw.get("b").is_err());
}

#[test]
fn append_key_with_interior_null() {
    let _guard = LOCK.run_concurrently();

    let mut raw = RawDocumentBuf::empty();
    let before = raw.as_bytes().to_vec();
    assert!(raw.append("bad\0key", RawBsonRef::Int32(1)).is_err());
    // the failed append leaves the document untouched
    assert_eq!(raw.as_bytes(), before.as_slice());
}

#[test]
fn append_past_size_limit() {
    let _guard = LOCK.run_concurrently();

    let huge = vec![0u8; 16 * 1024 * 1024];
    let mut raw = RawDocumentBuf::empty();
    let err = raw
        .append(
            "a",
            RawBinaryRef {
                subtype: BinarySubtype::Generic,
                bytes: &huge,
            },
        )
        .unwrap_err();
    assert!(err.is_document_too_large());
    assert_eq!(raw.as_bytes(), b"\x05\x00\x00\x00\x00");
}

#[test]
fn typed_getter_mismatch() {
    let _guard = LOCK.run_concurrently();

    let raw = RawDocumentBuf::from_document(&doc! { "s": "text" }).unwrap();
    assert!(raw.get_i32("s").unwrap_err().is_value_access_unexpected_type());
    assert_eq!(raw.get_i32("missing").unwrap(), None);
}

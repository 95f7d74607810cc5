use pretty_assertions::assert_eq;

use crate::{
    bson,
    doc,
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    tests::LOCK,
    Binary,
    Bson,
    Regex,
    Timestamp,
};

#[test]
fn element_types() {
    let _guard = LOCK.run_concurrently();

    assert_eq!(Bson::Double(1.5).element_type(), ElementType::Double);
    assert_eq!(
        Bson::String("hi".to_string()).element_type(),
        ElementType::String
    );
    assert_eq!(bson!([1, 2]).element_type(), ElementType::Array);
    assert_eq!(bson!({ "a": 1 }).element_type(), ElementType::EmbeddedDocument);
    assert_eq!(Bson::Boolean(true).element_type(), ElementType::Boolean);
    assert_eq!(Bson::Null.element_type(), ElementType::Null);
    assert_eq!(Bson::Int32(1).element_type(), ElementType::Int32);
    assert_eq!(Bson::Int64(1).element_type(), ElementType::Int64);
    assert_eq!(Bson::MinKey.element_type(), ElementType::MinKey);
    assert_eq!(Bson::MaxKey.element_type(), ElementType::MaxKey);
    assert_eq!(Bson::Undefined.element_type(), ElementType::Undefined);
    assert_eq!(
        Bson::ObjectId(ObjectId::new()).element_type(),
        ElementType::ObjectId
    );
    assert_eq!(ElementType::ObjectId as u8, 0x07);
    assert_eq!(ElementType::MaxKey as u8, 0x7F);
    assert_eq!(ElementType::MinKey as u8, 0xFF);
    assert_eq!(ElementType::Decimal128 as u8, 0x13);
}

#[test]
fn from_impls() {
    let _guard = LOCK.run_concurrently();

    assert_eq!(Bson::from(1.5f64), Bson::Double(1.5));
    assert_eq!(Bson::from(1.5f32), Bson::Double(1.5));
    assert_eq!(Bson::from("hello"), Bson::String("hello".to_string()));
    assert_eq!(Bson::from(5i32), Bson::Int32(5));
    assert_eq!(Bson::from(5i64), Bson::Int64(5));
    assert_eq!(Bson::from(5u32), Bson::Int32(5));
    assert_eq!(Bson::from(u32::MAX), Bson::Int64(u32::MAX as i64));
    assert_eq!(Bson::from(true), Bson::Boolean(true));
    assert_eq!(Bson::from(None::<i32>), Bson::Null);
    assert_eq!(Bson::from(Some("s")), Bson::String("s".to_string()));
    assert_eq!(
        Bson::from(vec![1i32, 2]),
        Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)])
    );
}

#[test]
fn accessors() {
    let _guard = LOCK.run_concurrently();

    let value = Bson::Int32(5);
    assert_eq!(value.as_i32(), Some(5));
    assert_eq!(value.as_bool(), None);
    assert_eq!(value.as_i64(), None);

    let value = bson!([true]);
    assert_eq!(value.as_array().map(|arr| arr.len()), Some(1));

    let ts = Bson::Timestamp(Timestamp {
        time: 1,
        increment: 2,
    });
    assert_eq!(
        ts.as_timestamp(),
        Some(Timestamp {
            time: 1,
            increment: 2
        })
    );

    assert_eq!(Bson::Null.as_null(), Some(()));
    assert_eq!(
        Bson::String("x".to_string()).as_str(),
        Some("x")
    );
}

#[test]
fn display() {
    let _guard = LOCK.run_concurrently();

    assert_eq!(format!("{}", bson!("hi")), "\"hi\"");
    assert_eq!(format!("{}", bson!(5)), "5");
    assert_eq!(format!("{}", bson!(10.0)), "10.0");
    assert_eq!(format!("{}", bson!(null)), "null");
    assert_eq!(format!("{}", bson!([1, "two"])), "[1, \"two\"]");
    assert_eq!(
        format!("{}", doc! { "a": 1, "b": { "c": true } }),
        "{ \"a\": 1, \"b\": { \"c\": true } }"
    );
    assert_eq!(
        format!(
            "{}",
            Bson::RegularExpression(Regex {
                pattern: "ab+".to_string(),
                options: "i".to_string()
            })
        ),
        "/ab+/i"
    );
}

#[test]
fn macro_literals() {
    let _guard = LOCK.run_concurrently();

    let key = "computed";
    let doc = doc! {
        "string": "text",
        "int": 42,
        "nested": { "array": [1, null, { "deep": true }] },
        key: 1.5,
        "trailing": "comma",
    };

    assert_eq!(doc.get_str("string").unwrap(), "text");
    assert_eq!(doc.get_i32("int").unwrap(), 42);
    assert_eq!(doc.get_f64("computed").unwrap(), 1.5);

    let nested = doc.get_document("nested").unwrap();
    let arr = nested.get_array("array").unwrap();
    assert_eq!(arr[0], Bson::Int32(1));
    assert_eq!(arr[1], Bson::Null);
    assert_eq!(arr[2], bson!({ "deep": true }));

    let bin = Binary {
        subtype: BinarySubtype::Generic,
        bytes: vec![1, 2, 3],
    };
    let doc = doc! { "bin": bin.clone() };
    assert_eq!(doc.get("bin"), Some(&Bson::Binary(bin)));
}

use pretty_assertions::assert_eq;

use crate::{doc, oid::ObjectId, spec::BinarySubtype, tests::LOCK, Binary, Bson, Document, Timestamp};

#[test]
fn ordered_insert() {
    let _guard = LOCK.run_concurrently();
    let mut doc = Document::new();
    doc.insert("first".to_owned(), Bson::Int32(1));
    doc.insert("second".to_owned(), Bson::String("foo".to_owned()));
    doc.insert("alphanumeric".to_owned(), Bson::String("bar".to_owned()));

    let expected_keys = vec![
        "first".to_owned(),
        "second".to_owned(),
        "alphanumeric".to_owned(),
    ];

    let keys: Vec<_> = doc.iter().map(|(key, _)| key.to_owned()).collect();
    assert_eq!(expected_keys, keys);
}

#[test]
fn ordered_insert_shorthand() {
    let _guard = LOCK.run_concurrently();
    let mut doc = Document::new();
    doc.insert("first", 1i32);
    doc.insert("second", "foo");
    doc.insert("alphanumeric", "bar".to_owned());

    let expected_keys = vec![
        "first".to_owned(),
        "second".to_owned(),
        "alphanumeric".to_owned(),
    ];

    let keys: Vec<_> = doc.iter().map(|(key, _)| key.to_owned()).collect();
    assert_eq!(expected_keys, keys);
}

#[test]
fn replacement_preserves_position() {
    let _guard = LOCK.run_concurrently();
    let mut doc = doc! { "a": 1, "b": 2, "c": 3 };
    doc.insert("b", "replaced");

    let keys: Vec<_> = doc.keys().cloned().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(doc.get_str("b").unwrap(), "replaced");
}

#[test]
fn remove_preserves_relative_order() {
    let _guard = LOCK.run_concurrently();
    let mut doc = doc! { "a": 1, "b": 2, "c": 3 };
    assert_eq!(doc.remove("b"), Some(Bson::Int32(2)));
    assert_eq!(doc.remove("b"), None);

    let keys: Vec<_> = doc.keys().cloned().collect();
    assert_eq!(keys, vec!["a", "c"]);
}

#[test]
fn getters() {
    let _guard = LOCK.run_concurrently();
    let datetime = crate::DateTime::from_millis(1_609_459_200_000);
    let binary = vec![0, 1, 2, 3, 4];
    let mut doc = doc! {
        "floating_point": 10.0,
        "string": "a value",
        "array": [10, 20, 30],
        "doc": { "key": 1 },
        "bool": true,
        "i32": 1i32,
        "i64": 1i64,
        "datetime": datetime,
        "binary": Binary { subtype: BinarySubtype::Generic, bytes: binary.clone() }
    };

    assert_eq!(None, doc.get("nonsense"));
    assert!(doc
        .get_str("nonsense")
        .unwrap_err()
        .is_value_access_not_present());
    assert!(doc
        .get_str("floating_point")
        .unwrap_err()
        .is_value_access_unexpected_type());

    assert_eq!(Some(&Bson::Double(10.0)), doc.get("floating_point"));
    assert_eq!(10.0, doc.get_f64("floating_point").unwrap());

    assert_eq!(
        Some(&Bson::String("a value".to_string())),
        doc.get("string")
    );
    assert_eq!("a value", doc.get_str("string").unwrap());

    let array = vec![Bson::Int32(10), Bson::Int32(20), Bson::Int32(30)];
    assert_eq!(Some(&Bson::Array(array.clone())), doc.get("array"));
    assert_eq!(&array, doc.get_array("array").unwrap());

    let embedded = doc! { "key": 1 };
    assert_eq!(Some(&Bson::Document(embedded.clone())), doc.get("doc"));
    assert_eq!(&embedded, doc.get_document("doc").unwrap());

    assert_eq!(Some(&Bson::Boolean(true)), doc.get("bool"));
    assert!(doc.get_bool("bool").unwrap());

    assert_eq!(Some(&Bson::Int32(1)), doc.get("i32"));
    assert_eq!(1i32, doc.get_i32("i32").unwrap());

    assert_eq!(Some(&Bson::Int64(1)), doc.get("i64"));
    assert_eq!(1i64, doc.get_i64("i64").unwrap());

    assert_eq!(&datetime, doc.get_datetime("datetime").unwrap());

    assert_eq!(&binary, doc.get_binary_generic("binary").unwrap());

    doc.insert(
        "timestamp",
        Bson::Timestamp(Timestamp {
            time: 0,
            increment: 100,
        }),
    );
    assert_eq!(
        Timestamp {
            time: 0,
            increment: 100
        },
        doc.get_timestamp("timestamp").unwrap()
    );

    let oid = ObjectId::new();
    doc.insert("oid", oid);
    assert_eq!(oid, doc.get_object_id("oid").unwrap());

    assert!(doc.get_i64("i32").unwrap_err().is_value_access_unexpected_type());
}

#[test]
fn positional_access() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "a": 1, "b": 2, "c": 3 };

    let (key, value) = doc.get_index(1).unwrap();
    assert_eq!(key, "b");
    assert_eq!(value, &Bson::Int32(2));

    assert!(doc.get_index(3).is_none());
}

#[test]
fn slicing() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "a": 1, "b": 2, "c": 3, "d": 4 };

    assert_eq!(doc.slice(1..3), doc! { "b": 2, "c": 3 });
    assert_eq!(doc.slice(..), doc.clone());
    assert_eq!(doc.slice(2..), doc! { "c": 3, "d": 4 });
    // out-of-range bounds clamp rather than fail
    assert_eq!(doc.slice(2..100), doc! { "c": 3, "d": 4 });
    assert_eq!(doc.slice(100..200), Document::new());
    #[allow(clippy::reversed_empty_ranges)]
    let empty = doc.slice(3..1);
    assert_eq!(empty, Document::new());
}

#[test]
fn sequence_projections() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "a": 1, "b": 2, "c": 3, "d": 4 };

    assert_eq!(doc.drop_first(1), doc! { "b": 2, "c": 3, "d": 4 });
    assert_eq!(doc.drop_first(10), Document::new());
    assert_eq!(doc.drop_last(2), doc! { "a": 1, "b": 2 });
    assert_eq!(doc.prefix(2), doc! { "a": 1, "b": 2 });
    assert_eq!(doc.prefix(10), doc.clone());
    assert_eq!(doc.suffix(1), doc! { "d": 4 });

    let prefix = doc.prefix_while(|_, v| matches!(v, Bson::Int32(i) if *i < 3));
    assert_eq!(prefix, doc! { "a": 1, "b": 2 });

    let dropped = doc.drop_while(|_, v| matches!(v, Bson::Int32(i) if *i < 3));
    assert_eq!(dropped, doc! { "c": 3, "d": 4 });
}

#[test]
fn map_and_filter_collect_back() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "a": 1, "b": 2, "c": 3 };

    let doubled: Document = doc
        .iter()
        .map(|(k, v)| {
            let doubled = v.as_i32().map(|i| i * 2).map(Bson::Int32);
            (k.clone(), doubled.unwrap_or_else(|| v.clone()))
        })
        .collect();
    assert_eq!(doubled, doc! { "a": 2, "b": 4, "c": 6 });

    let odd: Document = doc
        .iter()
        .filter(|(_, v)| matches!(v, Bson::Int32(i) if i % 2 == 1))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    assert_eq!(odd, doc! { "a": 1, "c": 3 });
}

#[test]
fn split_by_separator() {
    let _guard = LOCK.run_concurrently();
    let doc = doc! { "a": 1, "sep": 0, "b": 2, "sep2": 0, "c": 3 };
    let is_sep = |_: &str, v: &Bson| v == &Bson::Int32(0);

    let parts = doc.split(None, true, is_sep);
    assert_eq!(parts, vec![doc! { "a": 1 }, doc! { "b": 2 }, doc! { "c": 3 }]);

    // adjacent separators produce an empty fragment unless omitted
    let doc = doc! { "sep": 0, "sep2": 0, "a": 1 };
    let parts = doc.split(None, false, is_sep);
    assert_eq!(
        parts,
        vec![Document::new(), Document::new(), doc! { "a": 1 }]
    );
    let parts = doc.split(None, true, is_sep);
    assert_eq!(parts, vec![doc! { "a": 1 }]);

    // a split limit keeps later separators as ordinary entries
    let doc = doc! { "a": 1, "sep": 0, "b": 2, "sep2": 0, "c": 3 };
    let parts = doc.split(Some(1), true, is_sep);
    assert_eq!(
        parts,
        vec![doc! { "a": 1 }, doc! { "b": 2, "sep2": 0, "c": 3 }]
    );
}

#[test]
fn entry_api() {
    let _guard = LOCK.run_concurrently();
    let mut doc = doc! { "counter": 1 };

    let value = doc.entry("counter".to_string()).or_insert(Bson::Int32(100));
    assert_eq!(value, &mut Bson::Int32(1));

    doc.entry("new".to_string())
        .or_insert_with(|| Bson::String("inserted".to_string()));
    assert_eq!(doc.get_str("new").unwrap(), "inserted");
}

//! Deserialization and serialization of [MongoDB Extended JSON v2](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/)
//!
//! ## Overview of Extended JSON
//!
//! Extended JSON (abbreviated extJSON) is a format of JSON that allows for
//! the encoding of BSON type information. Normal JSON cannot unambiguously
//! represent all BSON types losslessly, so an extension was designed to
//! include conventions for representing those types.
//!
//! For example, a BSON binary is represented by the following format:
//! ```text
//! {
//!    "$binary": {
//!        "base64": <base64 encoded payload as a string>,
//!        "subType": <subtype as a one or two character hex string>,
//!    }
//! }
//! ```
//!
//! ### Canonical and Relaxed Modes
//!
//! There are two modes of extJSON: "canonical" and "relaxed". They are the
//! same except for the following differences:
//!   - In relaxed mode, BSON numbers that fit losslessly into a JSON number
//!     are represented by the JSON number type rather than the object
//!     notation.
//!   - In relaxed mode, the string in the datetime object notation is RFC
//!     3339 (ISO-8601) formatted, provided the date lies between the years
//!     1970 and 9999 inclusive.
//!
//! ```rust
//! use wirebson::bson;
//!
//! let doc = bson!({ "x": 5, "d": wirebson::DateTime::from_millis(978_312_200_000) });
//!
//! println!("relaxed: {}", doc.clone().into_relaxed_extjson());
//! // relaxed: {"x":5,"d":{"$date":"2001-01-01T01:23:20Z"}}
//!
//! println!("canonical: {}", doc.into_canonical_extjson());
//! // canonical: {"x":{"$numberInt":"5"},"d":{"$date":{"$numberLong":"978312200000"}}}
//! ```
//!
//! Canonical mode is useful when BSON values need to be round tripped
//! without losing any type information. Relaxed mode is more useful when
//! debugging or logging BSON data.
//!
//! ## Deserializing Extended JSON
//!
//! Extended JSON can be deserialized using [`Bson`](crate::Bson)'s
//! `TryFrom<serde_json::Value>` implementation. This implementation accepts
//! both canonical and relaxed extJSON, and the two modes can even be mixed
//! within a single representation. The legacy `{"$binary": "...", "$type":
//! "..."}` and `{"$uuid": "..."}` forms are accepted as well.
//!
//! ```rust
//! use serde_json::json;
//! use wirebson::Bson;
//!
//! let json_doc = json!({ "x": 5i32, "y": { "$numberInt": "5" }, "z": { "subdoc": "hello" } });
//! let bson: Bson = json_doc.try_into().unwrap(); // Bson::Document(...)
//!
//! let json_date = json!({ "$date": { "$numberLong": "1590972160292" } });
//! let bson_date: Bson = json_date.try_into().unwrap(); // Bson::DateTime(...)
//!
//! let invalid_ext_json = json!({ "$numberLong": 5 });
//! Bson::try_from(invalid_ext_json).expect_err("5 should be a string");
//! ```
//!
//! Failures below the root of the JSON tree are reported with the dotted key
//! path of the offending node, e.g. `"a.b: expected i32 as a string"`.
//!
//! ## Serializing to Extended JSON
//!
//! Extended JSON can be created via [`Bson`](crate::Bson)'s
//! `Into<serde_json::Value>` implementation (which produces relaxed
//! extJSON), [`Bson::into_relaxed_extjson`](crate::Bson::into_relaxed_extjson),
//! and [`Bson::into_canonical_extjson`](crate::Bson::into_canonical_extjson);
//! the resulting [`serde_json::Value`] renders to text through `serde_json`.

mod json;
pub(crate) mod models;

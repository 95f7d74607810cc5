//! BSON, short for Binary JSON, is a binary-encoded serialization of
//! JSON-like documents. Like JSON, BSON supports the embedding of documents
//! and arrays within other documents and arrays. BSON also contains
//! extensions that allow representation of data types that are not part of
//! the JSON spec. For example, BSON has a datetime type and a binary data
//! type.
//!
//! ```text
//! // JSON equivalent
//! {"hello": "world"}
//!
//! // BSON encoding
//! \x16\x00\x00\x00                   // total document size
//! \x02                               // 0x02 = type String
//! hello\x00                          // field name
//! \x06\x00\x00\x00world\x00          // field value
//! \x00                               // 0x00 = type EOO ('end of object')
//! ```
//!
//! BSON is the primary data representation for [MongoDB](https://www.mongodb.com/).
//! For more information about BSON itself, see [bsonspec.org](http://bsonspec.org).
//!
//! ## BSON values
//!
//! Many different types can be represented as a BSON value, including 32-bit
//! and 64-bit signed integers, 64-bit floating point numbers, strings,
//! datetimes, embedded documents, and more. The possible BSON values are
//! modeled in this crate by the [`Bson`] enum.
//!
//! [`Bson`] values can be instantiated directly or via the [`bson!`] macro:
//!
//! ```rust
//! use wirebson::{bson, Bson};
//!
//! let string = Bson::String("hello world".to_string());
//! let int = Bson::Int32(5);
//! let array = Bson::Array(vec![Bson::Int32(5), Bson::Boolean(false)]);
//!
//! let string: Bson = "hello world".into();
//! let int: Bson = 5i32.into();
//!
//! let string = bson!("hello world");
//! let int = bson!(5);
//! let array = bson!([5, false]);
//! ```
//!
//! [`Bson`] has a number of helper methods for accessing the underlying
//! native Rust types:
//!
//! ```rust
//! use wirebson::{bson, Bson};
//!
//! let value = Bson::Int32(5);
//! let int = value.as_i32(); // Some(5)
//! let bool = value.as_bool(); // None
//! ```
//!
//! ## BSON documents
//!
//! BSON documents are ordered maps of UTF-8 encoded strings to BSON values.
//! This crate models them via the [`Document`] struct, constructed either
//! from a byte stream containing BSON data or via the [`doc!`] macro:
//!
//! ```rust
//! use wirebson::{doc, Document};
//!
//! let bytes = hex::decode("0C0000001069000100000000").unwrap();
//! let from_bytes = Document::from_reader(bytes.as_slice()).unwrap(); // { "i": 1 }
//!
//! let doc = doc! {
//!    "hello": "world",
//!    "int": 5,
//!    "subdoc": { "cat": true },
//! };
//! ```
//!
//! Serialization goes the other way through [`Document::to_writer`].
//!
//! ## Raw documents
//!
//! The [`raw`] module exposes documents kept in their serialized byte form,
//! which parse lazily on access and can be built up by appending:
//! [`RawDocument`], [`RawDocumentBuf`], and the borrowed value type
//! [`RawBsonRef`].
//!
//! ## Extended JSON
//!
//! The two standardized textual representations of BSON, canonical and
//! relaxed Extended JSON, are supported through
//! [`Bson::into_canonical_extjson`], [`Bson::into_relaxed_extjson`], and
//! `TryFrom<serde_json::Value>`; see the [`extjson`] module documentation.

pub mod document;
pub mod error;
pub mod extjson;
pub mod oid;
pub mod raw;
pub mod spec;

mod base64;
mod binary;
mod bson;
mod datetime;
mod de;
mod decimal128;
mod macros;
mod ser;
#[cfg(test)]
mod tests;

pub use crate::{
    binary::Binary,
    bson::{Array, Bson, DbPointer, JavaScriptCodeWithScope, Regex, Timestamp},
    datetime::DateTime,
    decimal128::Decimal128,
    document::Document,
    error::{Error, ErrorKind, Result},
    raw::{RawArray, RawBsonRef, RawDocument, RawDocumentBuf},
    spec::{BinarySubtype, ElementType},
};

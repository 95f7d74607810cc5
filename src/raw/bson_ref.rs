//! Borrowed BSON values referencing raw bytes stored elsewhere.

use std::convert::TryFrom;

use super::{RawArray, RawDocument};
use crate::{
    bson::{DbPointer, JavaScriptCodeWithScope, Regex, Timestamp},
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    Binary,
    Bson,
    DateTime,
    Decimal128,
};

/// A BSON value referencing raw bytes stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawBsonRef<'a> {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(&'a str),
    /// Array
    Array(&'a RawArray),
    /// Embedded document
    Document(&'a RawDocument),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(RawRegexRef<'a>),
    /// JavaScript code
    JavaScriptCode(&'a str),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef<'a>),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(RawBinaryRef<'a>),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Symbol (Deprecated)
    Symbol(&'a str),
    /// [128-bit decimal floating point](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.rst)
    Decimal128(Decimal128),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(RawDbPointerRef<'a>),
}

impl<'a> RawBsonRef<'a> {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        match *self {
            RawBsonRef::Double(..) => ElementType::Double,
            RawBsonRef::String(..) => ElementType::String,
            RawBsonRef::Array(..) => ElementType::Array,
            RawBsonRef::Document(..) => ElementType::EmbeddedDocument,
            RawBsonRef::Boolean(..) => ElementType::Boolean,
            RawBsonRef::Null => ElementType::Null,
            RawBsonRef::RegularExpression(..) => ElementType::RegularExpression,
            RawBsonRef::JavaScriptCode(..) => ElementType::JavaScriptCode,
            RawBsonRef::JavaScriptCodeWithScope(..) => ElementType::JavaScriptCodeWithScope,
            RawBsonRef::Int32(..) => ElementType::Int32,
            RawBsonRef::Int64(..) => ElementType::Int64,
            RawBsonRef::Timestamp(..) => ElementType::Timestamp,
            RawBsonRef::Binary(..) => ElementType::Binary,
            RawBsonRef::ObjectId(..) => ElementType::ObjectId,
            RawBsonRef::DateTime(..) => ElementType::DateTime,
            RawBsonRef::Symbol(..) => ElementType::Symbol,
            RawBsonRef::Decimal128(..) => ElementType::Decimal128,
            RawBsonRef::Undefined => ElementType::Undefined,
            RawBsonRef::MaxKey => ElementType::MaxKey,
            RawBsonRef::MinKey => ElementType::MinKey,
            RawBsonRef::DbPointer(..) => ElementType::DbPointer,
        }
    }

    /// Gets the `f64` that's referenced or returns `None` if the referenced
    /// value isn't a BSON double.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            RawBsonRef::Double(d) => Some(d),
            _ => None,
        }
    }

    /// Gets the `&str` that's referenced or returns `None` if the referenced
    /// value isn't a BSON string.
    pub fn as_str(self) -> Option<&'a str> {
        match self {
            RawBsonRef::String(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawArray`] that's referenced or returns `None` if the
    /// referenced value isn't a BSON array.
    pub fn as_array(self) -> Option<&'a RawArray> {
        match self {
            RawBsonRef::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawDocument`] that's referenced or returns `None` if the
    /// referenced value isn't a BSON document.
    pub fn as_document(self) -> Option<&'a RawDocument> {
        match self {
            RawBsonRef::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `bool` that's referenced or returns `None` if the referenced
    /// value isn't a BSON boolean.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            RawBsonRef::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i32` that's referenced or returns `None` if the referenced
    /// value isn't a BSON Int32.
    pub fn as_i32(self) -> Option<i32> {
        match self {
            RawBsonRef::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i64` that's referenced or returns `None` if the referenced
    /// value isn't a BSON Int64.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            RawBsonRef::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`ObjectId`] that's referenced or returns `None` if the
    /// referenced value isn't a BSON ObjectId.
    pub fn as_object_id(self) -> Option<ObjectId> {
        match self {
            RawBsonRef::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawBinaryRef`] that's referenced or returns `None` if the
    /// referenced value isn't a BSON binary.
    pub fn as_binary(self) -> Option<RawBinaryRef<'a>> {
        match self {
            RawBsonRef::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawRegexRef`] that's referenced or returns `None` if the
    /// referenced value isn't a BSON regular expression.
    pub fn as_regex(self) -> Option<RawRegexRef<'a>> {
        match self {
            RawBsonRef::RegularExpression(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`DateTime`] that's referenced or returns `None` if the
    /// referenced value isn't a BSON datetime.
    pub fn as_datetime(self) -> Option<DateTime> {
        match self {
            RawBsonRef::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the symbol that's referenced or returns `None` if the referenced
    /// value isn't a BSON symbol.
    pub fn as_symbol(self) -> Option<&'a str> {
        match self {
            RawBsonRef::Symbol(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`Timestamp`] that's referenced or returns `None` if the
    /// referenced value isn't a BSON timestamp.
    pub fn as_timestamp(self) -> Option<Timestamp> {
        match self {
            RawBsonRef::Timestamp(timestamp) => Some(timestamp),
            _ => None,
        }
    }

    /// Gets the null value that's referenced or returns `None` if the
    /// referenced value isn't a BSON null.
    pub fn as_null(self) -> Option<()> {
        match self {
            RawBsonRef::Null => Some(()),
            _ => None,
        }
    }

    /// Gets the [`Decimal128`] that's referenced or returns `None` if the
    /// referenced value isn't a BSON Decimal128.
    pub fn as_decimal128(self) -> Option<Decimal128> {
        match self {
            RawBsonRef::Decimal128(d) => Some(d),
            _ => None,
        }
    }
}

impl<'a> TryFrom<RawBsonRef<'a>> for Bson {
    type Error = Error;

    fn try_from(raw: RawBsonRef<'a>) -> Result<Bson> {
        Ok(match raw {
            RawBsonRef::Double(d) => Bson::Double(d),
            RawBsonRef::String(s) => Bson::String(s.to_string()),
            RawBsonRef::Document(doc) => Bson::Document(doc.to_document()?),
            RawBsonRef::Array(arr) => {
                let mut vec = Vec::new();
                for elem in arr.as_doc().iter() {
                    let (_, value) = elem?;
                    vec.push(Bson::try_from(value)?);
                }
                Bson::Array(vec)
            }
            RawBsonRef::Boolean(b) => Bson::Boolean(b),
            RawBsonRef::Null => Bson::Null,
            RawBsonRef::RegularExpression(rx) => Bson::RegularExpression(Regex {
                pattern: rx.pattern.to_string(),
                options: rx.options.to_string(),
            }),
            RawBsonRef::JavaScriptCode(code) => Bson::JavaScriptCode(code.to_string()),
            RawBsonRef::JavaScriptCodeWithScope(cws) => {
                Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
                    code: cws.code.to_string(),
                    scope: cws.scope.to_document()?,
                })
            }
            RawBsonRef::Int32(i) => Bson::Int32(i),
            RawBsonRef::Int64(i) => Bson::Int64(i),
            RawBsonRef::Timestamp(ts) => Bson::Timestamp(ts),
            RawBsonRef::Binary(bin) => Bson::Binary(Binary {
                subtype: bin.subtype,
                bytes: bin.bytes.to_vec(),
            }),
            RawBsonRef::ObjectId(oid) => Bson::ObjectId(oid),
            RawBsonRef::DateTime(dt) => Bson::DateTime(dt),
            RawBsonRef::Symbol(s) => Bson::Symbol(s.to_string()),
            RawBsonRef::Decimal128(d) => Bson::Decimal128(d),
            RawBsonRef::Undefined => Bson::Undefined,
            RawBsonRef::MaxKey => Bson::MaxKey,
            RawBsonRef::MinKey => Bson::MinKey,
            RawBsonRef::DbPointer(dbp) => Bson::DbPointer(DbPointer {
                namespace: dbp.namespace.to_string(),
                id: dbp.id,
            }),
        })
    }
}

impl From<f64> for RawBsonRef<'_> {
    fn from(d: f64) -> Self {
        RawBsonRef::Double(d)
    }
}

impl<'a> From<&'a str> for RawBsonRef<'a> {
    fn from(s: &'a str) -> Self {
        RawBsonRef::String(s)
    }
}

impl From<bool> for RawBsonRef<'_> {
    fn from(b: bool) -> Self {
        RawBsonRef::Boolean(b)
    }
}

impl From<i32> for RawBsonRef<'_> {
    fn from(i: i32) -> Self {
        RawBsonRef::Int32(i)
    }
}

impl From<i64> for RawBsonRef<'_> {
    fn from(i: i64) -> Self {
        RawBsonRef::Int64(i)
    }
}

impl From<ObjectId> for RawBsonRef<'_> {
    fn from(oid: ObjectId) -> Self {
        RawBsonRef::ObjectId(oid)
    }
}

impl From<DateTime> for RawBsonRef<'_> {
    fn from(dt: DateTime) -> Self {
        RawBsonRef::DateTime(dt)
    }
}

impl From<Timestamp> for RawBsonRef<'_> {
    fn from(ts: Timestamp) -> Self {
        RawBsonRef::Timestamp(ts)
    }
}

impl From<Decimal128> for RawBsonRef<'_> {
    fn from(d: Decimal128) -> Self {
        RawBsonRef::Decimal128(d)
    }
}

impl<'a> From<&'a RawDocument> for RawBsonRef<'a> {
    fn from(doc: &'a RawDocument) -> Self {
        RawBsonRef::Document(doc)
    }
}

impl<'a> From<&'a RawArray> for RawBsonRef<'a> {
    fn from(arr: &'a RawArray) -> Self {
        RawBsonRef::Array(arr)
    }
}

impl<'a> From<RawBinaryRef<'a>> for RawBsonRef<'a> {
    fn from(bin: RawBinaryRef<'a>) -> Self {
        RawBsonRef::Binary(bin)
    }
}

impl<'a> From<RawRegexRef<'a>> for RawBsonRef<'a> {
    fn from(rx: RawRegexRef<'a>) -> Self {
        RawBsonRef::RegularExpression(rx)
    }
}

/// A BSON binary value referencing raw bytes stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBinaryRef<'a> {
    /// The subtype of the binary value.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: &'a [u8],
}

/// A BSON regex referencing raw bytes stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRegexRef<'a> {
    /// The regex pattern to match.
    pub pattern: &'a str,

    /// The options for the regex.
    pub options: &'a str,
}

/// A BSON "code with scope" value referencing raw bytes stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawJavaScriptCodeWithScopeRef<'a> {
    /// The JavaScript code.
    pub code: &'a str,

    /// The scope document containing variable bindings.
    pub scope: &'a RawDocument,
}

/// A BSON DBPointer value referencing raw bytes stored elsewhere. (Deprecated)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDbPointerRef<'a> {
    /// The namespace being pointed into.
    pub namespace: &'a str,

    /// The id of the pointed-at document.
    pub id: ObjectId,
}

//! BSON value definitions.

use std::fmt::{self, Debug, Display};

use crate::{
    oid::{self, ObjectId},
    spec::ElementType,
    Binary,
    Decimal128,
    Document,
};

/// Possible BSON value types.
#[derive(Clone, PartialEq)]
pub enum Bson {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Array
    Array(Array),
    /// Embedded document
    Document(Document),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(Regex),
    /// JavaScript code
    JavaScriptCode(String),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(JavaScriptCodeWithScope),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(Binary),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(crate::DateTime),
    /// Symbol (Deprecated)
    Symbol(String),
    /// [128-bit decimal floating point](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.rst)
    Decimal128(Decimal128),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(DbPointer),
}

/// Alias for `Vec<Bson>`.
pub type Array = Vec<Bson>;

impl Default for Bson {
    fn default() -> Self {
        Bson::Null
    }
}

impl Display for Bson {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bson::Double(f) if f.fract() == 0.0 && f.is_finite() => write!(fmt, "{}.0", f),
            Bson::Double(f) => write!(fmt, "{}", f),
            Bson::String(s) => write!(fmt, "\"{}\"", s),
            Bson::Array(vec) => {
                fmt.write_str("[")?;

                let mut first = true;
                for bson in vec {
                    if !first {
                        fmt.write_str(", ")?;
                    }

                    write!(fmt, "{}", bson)?;
                    first = false;
                }

                fmt.write_str("]")
            }
            Bson::Document(doc) => write!(fmt, "{}", doc),
            Bson::Boolean(b) => write!(fmt, "{}", b),
            Bson::Null => write!(fmt, "null"),
            Bson::RegularExpression(rx) => write!(fmt, "{}", rx),
            Bson::JavaScriptCode(code)
            | Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, .. }) => {
                fmt.write_str(code)
            }
            Bson::Int32(i) => write!(fmt, "{}", i),
            Bson::Int64(i) => write!(fmt, "{}", i),
            Bson::Timestamp(ts) => write!(fmt, "{}", ts),
            Bson::Binary(bin) => write!(fmt, "{}", bin),
            Bson::ObjectId(id) => write!(fmt, "ObjectId(\"{}\")", id),
            Bson::DateTime(dt) => write!(fmt, "DateTime(\"{}\")", dt),
            Bson::Symbol(s) => write!(fmt, "Symbol(\"{}\")", s),
            Bson::Decimal128(d) => write!(fmt, "{}", d),
            Bson::Undefined => write!(fmt, "undefined"),
            Bson::MinKey => write!(fmt, "MinKey"),
            Bson::MaxKey => write!(fmt, "MaxKey"),
            Bson::DbPointer(dbp) => write!(fmt, "{}", dbp),
        }
    }
}

impl Debug for Bson {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bson::Double(p) => write!(f, "Double({:?})", p),
            Bson::String(s) => write!(f, "String({:?})", s),
            Bson::Array(vec) => {
                f.write_str("Array(")?;
                Debug::fmt(vec, f)?;
                f.write_str(")")
            }
            Bson::Document(doc) => Debug::fmt(doc, f),
            Bson::Boolean(b) => write!(f, "Boolean({:?})", b),
            Bson::Null => f.write_str("Null"),
            Bson::RegularExpression(rx) => Debug::fmt(rx, f),
            Bson::JavaScriptCode(code) => write!(f, "JavaScriptCode({:?})", code),
            Bson::JavaScriptCodeWithScope(cws) => Debug::fmt(cws, f),
            Bson::Int32(v) => write!(f, "Int32({:?})", v),
            Bson::Int64(v) => write!(f, "Int64({:?})", v),
            Bson::Timestamp(ts) => Debug::fmt(ts, f),
            Bson::Binary(bin) => Debug::fmt(bin, f),
            Bson::ObjectId(id) => Debug::fmt(id, f),
            Bson::DateTime(dt) => Debug::fmt(dt, f),
            Bson::Symbol(s) => write!(f, "Symbol({:?})", s),
            Bson::Decimal128(d) => Debug::fmt(d, f),
            Bson::Undefined => f.write_str("Undefined"),
            Bson::MinKey => f.write_str("MinKey"),
            Bson::MaxKey => f.write_str("MaxKey"),
            Bson::DbPointer(dbp) => Debug::fmt(dbp, f),
        }
    }
}

impl From<f32> for Bson {
    fn from(a: f32) -> Bson {
        Bson::Double(a.into())
    }
}

impl From<f64> for Bson {
    fn from(a: f64) -> Bson {
        Bson::Double(a)
    }
}

impl From<&str> for Bson {
    fn from(s: &str) -> Bson {
        Bson::String(s.to_owned())
    }
}

impl From<String> for Bson {
    fn from(a: String) -> Bson {
        Bson::String(a)
    }
}

impl From<&String> for Bson {
    fn from(a: &String) -> Bson {
        Bson::String(a.clone())
    }
}

impl From<bool> for Bson {
    fn from(a: bool) -> Bson {
        Bson::Boolean(a)
    }
}

impl From<i8> for Bson {
    fn from(a: i8) -> Bson {
        Bson::Int32(a.into())
    }
}

impl From<i16> for Bson {
    fn from(a: i16) -> Bson {
        Bson::Int32(a.into())
    }
}

impl From<i32> for Bson {
    fn from(a: i32) -> Bson {
        Bson::Int32(a)
    }
}

impl From<i64> for Bson {
    fn from(a: i64) -> Bson {
        Bson::Int64(a)
    }
}

impl From<u8> for Bson {
    fn from(a: u8) -> Bson {
        Bson::Int32(a.into())
    }
}

impl From<u16> for Bson {
    fn from(a: u16) -> Bson {
        Bson::Int32(a.into())
    }
}

impl From<u32> for Bson {
    fn from(a: u32) -> Bson {
        if let Ok(i) = i32::try_from(a) {
            Bson::Int32(i)
        } else {
            Bson::Int64(a.into())
        }
    }
}

impl From<Document> for Bson {
    fn from(a: Document) -> Bson {
        Bson::Document(a)
    }
}

impl From<Regex> for Bson {
    fn from(rx: Regex) -> Bson {
        Bson::RegularExpression(rx)
    }
}

impl From<JavaScriptCodeWithScope> for Bson {
    fn from(cws: JavaScriptCodeWithScope) -> Bson {
        Bson::JavaScriptCodeWithScope(cws)
    }
}

impl From<Timestamp> for Bson {
    fn from(ts: Timestamp) -> Bson {
        Bson::Timestamp(ts)
    }
}

impl From<Binary> for Bson {
    fn from(bin: Binary) -> Bson {
        Bson::Binary(bin)
    }
}

impl From<ObjectId> for Bson {
    fn from(id: ObjectId) -> Bson {
        Bson::ObjectId(id)
    }
}

impl From<crate::DateTime> for Bson {
    fn from(dt: crate::DateTime) -> Bson {
        Bson::DateTime(dt)
    }
}

impl From<Decimal128> for Bson {
    fn from(d: Decimal128) -> Bson {
        Bson::Decimal128(d)
    }
}

impl From<DbPointer> for Bson {
    fn from(dbp: DbPointer) -> Bson {
        Bson::DbPointer(dbp)
    }
}

impl<T: Into<Bson>> From<Option<T>> for Bson {
    fn from(a: Option<T>) -> Bson {
        match a {
            None => Bson::Null,
            Some(t) => t.into(),
        }
    }
}

impl<T: Into<Bson>> From<Vec<T>> for Bson {
    fn from(v: Vec<T>) -> Bson {
        Bson::Array(v.into_iter().map(|val| val.into()).collect())
    }
}

impl Bson {
    /// Get the `ElementType` of this value.
    pub fn element_type(&self) -> ElementType {
        match self {
            Bson::Double(..) => ElementType::Double,
            Bson::String(..) => ElementType::String,
            Bson::Array(..) => ElementType::Array,
            Bson::Document(..) => ElementType::EmbeddedDocument,
            Bson::Boolean(..) => ElementType::Boolean,
            Bson::Null => ElementType::Null,
            Bson::RegularExpression(..) => ElementType::RegularExpression,
            Bson::JavaScriptCode(..) => ElementType::JavaScriptCode,
            Bson::JavaScriptCodeWithScope(..) => ElementType::JavaScriptCodeWithScope,
            Bson::Int32(..) => ElementType::Int32,
            Bson::Int64(..) => ElementType::Int64,
            Bson::Timestamp(..) => ElementType::Timestamp,
            Bson::Binary(..) => ElementType::Binary,
            Bson::ObjectId(..) => ElementType::ObjectId,
            Bson::DateTime(..) => ElementType::DateTime,
            Bson::Symbol(..) => ElementType::Symbol,
            Bson::Decimal128(..) => ElementType::Decimal128,
            Bson::Undefined => ElementType::Undefined,
            Bson::MaxKey => ElementType::MaxKey,
            Bson::MinKey => ElementType::MinKey,
            Bson::DbPointer(..) => ElementType::DbPointer,
        }
    }

    /// If `self` is `Double`, return its value. Returns `None` otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// If `self` is `String`, return its value. Returns `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    /// If `self` is `Array`, return its value. Returns `None` otherwise.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If `self` is `Array`, return a mutable reference to its value. Returns
    /// `None` otherwise.
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If `self` is `Document`, return its value. Returns `None` otherwise.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// If `self` is `Document`, return a mutable reference to its value.
    /// Returns `None` otherwise.
    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Bson::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// If `self` is `Boolean`, return its value. Returns `None` otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Bson::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// If `self` is `Int32`, return its value. Returns `None` otherwise.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Bson::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// If `self` is `Int64`, return its value. Returns `None` otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Bson::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// If `self` is `ObjectId`, return its value. Returns `None` otherwise.
    pub fn as_object_id(&self) -> Option<oid::ObjectId> {
        match self {
            Bson::ObjectId(v) => Some(*v),
            _ => None,
        }
    }

    /// If `self` is `DateTime`, return its value. Returns `None` otherwise.
    pub fn as_datetime(&self) -> Option<&crate::DateTime> {
        match self {
            Bson::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// If `self` is `Symbol`, return its value. Returns `None` otherwise.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Bson::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// If `self` is `Timestamp`, return its value. Returns `None` otherwise.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Bson::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// If `self` is `Binary`, return its value. Returns `None` otherwise.
    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Bson::Binary(bin) => Some(bin),
            _ => None,
        }
    }

    /// If `self` is `RegularExpression`, return its value. Returns `None`
    /// otherwise.
    pub fn as_regex(&self) -> Option<&Regex> {
        match self {
            Bson::RegularExpression(rx) => Some(rx),
            _ => None,
        }
    }

    /// If `self` is `JavaScriptCode`, return its value. Returns `None`
    /// otherwise.
    pub fn as_javascript_code(&self) -> Option<&str> {
        match self {
            Bson::JavaScriptCode(code) => Some(code),
            _ => None,
        }
    }

    /// If `self` is `Decimal128`, return its value. Returns `None` otherwise.
    pub fn as_decimal128(&self) -> Option<&Decimal128> {
        match self {
            Bson::Decimal128(d) => Some(d),
            _ => None,
        }
    }

    /// If `self` is `Null`, return `()`. Returns `None` otherwise.
    pub fn as_null(&self) -> Option<()> {
        match self {
            Bson::Null => Some(()),
            _ => None,
        }
    }
}

/// Represents a BSON timestamp value.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    /// The number of seconds since the Unix epoch.
    pub time: u32,

    /// An incrementing value to order timestamps with the same number of
    /// seconds in the `time` field.
    pub increment: u32,
}

impl Timestamp {
    pub(crate) fn to_le_i64(self) -> i64 {
        (((self.time as u64) << 32) | self.increment as u64) as i64
    }

    pub(crate) fn from_le_i64(val: i64) -> Self {
        let val = val as u64;
        Timestamp {
            time: (val >> 32) as u32,
            increment: (val & 0xFFFF_FFFF) as u32,
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Timestamp({}, {})", self.time, self.increment)
    }
}

/// Represents a BSON regular expression value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regex {
    /// The regex pattern to match.
    pub pattern: String,

    /// The options for the regex.
    ///
    /// Options are identified by characters, which must be stored in
    /// alphabetical order. Valid options are 'i' for case insensitive
    /// matching, 'm' for multiline matching, 'x' for verbose mode, 'l' to
    /// make \w, \W, etc. locale dependent, 's' for dotall mode ('.' matches
    /// everything), and 'u' to make \w, \W, etc. match unicode.
    pub options: String,
}

impl Regex {
    pub(crate) fn sorted_options(&self) -> String {
        let mut chars: Vec<_> = self.options.chars().collect();
        chars.sort_unstable();
        chars.into_iter().collect()
    }
}

impl Display for Regex {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "/{}/{}", self.pattern, self.options)
    }
}

/// Represents a BSON code with scope value.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaScriptCodeWithScope {
    /// The JavaScript code.
    pub code: String,

    /// The scope document containing variable bindings.
    pub scope: Document,
}

impl Display for JavaScriptCodeWithScope {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&self.code)
    }
}

/// Represents a DBPointer. (Deprecated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbPointer {
    /// The namespace being pointed into.
    pub namespace: String,

    /// The id of the pointed-at document.
    pub id: ObjectId,
}

impl Display for DbPointer {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "DbPointer({}, {})", self.namespace, self.id)
    }
}

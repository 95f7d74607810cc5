//! The single error taxonomy shared by every component of the crate.

use thiserror::Error as ThisError;

use crate::spec::ElementType;

/// Alias for `std::result::Result<T, wirebson::error::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `wirebson` crate.
#[derive(Debug)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The document key associated with the error, if any.
    pub key: Option<String>,

    /// The array index associated with the error, if any.
    pub index: Option<usize>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "Error at key \"{key}\": ")?;
        } else if let Some(index) = self.index {
            write!(f, "Error at array index {index}: ")?;
        }

        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// The types of errors that can occur in the `wirebson` crate.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed user input, e.g. an out-of-range subtype number or an
    /// invalid hexadecimal string.
    #[error("invalid argument: {message}")]
    #[non_exhaustive]
    InvalidArgument { message: String },

    /// The wire bytes are inconsistent: short reads, length mismatches,
    /// unknown type tags.
    #[error("malformed BSON: {message}")]
    #[non_exhaustive]
    MalformedValue { message: String },

    /// Invalid UTF-8 bytes were encountered.
    #[error("invalid UTF-8")]
    Utf8Encoding,

    /// A [`std::io::Error`] occurred.
    #[error("an I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    /// A document's encoded form would exceed the 16 MiB size limit.
    #[error("document size {size} exceeds maximum of 16777216 bytes")]
    #[non_exhaustive]
    DocumentTooLarge { size: usize },

    /// Extended JSON text did not describe a valid BSON value. The path is
    /// the dotted sequence of keys leading to the offending node.
    #[error("{}", format_data_corrupted(.path, .message))]
    #[non_exhaustive]
    DataCorrupted { path: String, message: String },

    /// An error occurred when attempting to access a value in a document.
    #[error("an error occurred when attempting to access a document value: {kind}")]
    #[non_exhaustive]
    ValueAccess { kind: ValueAccessErrorKind },

    /// An error related to the [`ObjectId`](crate::oid::ObjectId) type.
    #[error("an ObjectId-related error occurred: {kind}")]
    #[non_exhaustive]
    ObjectId { kind: ObjectIdErrorKind },

    /// An error related to the [`Decimal128`](crate::Decimal128) type.
    #[error("a Decimal128-related error occurred: {kind}")]
    #[non_exhaustive]
    Decimal128 { kind: Decimal128ErrorKind },

    /// An error related to the [`DateTime`](crate::DateTime) type.
    #[error("a DateTime-related error occurred: {message}")]
    #[non_exhaustive]
    DateTime { message: String },
}

fn format_data_corrupted(path: &str, message: &str) -> String {
    if path.is_empty() {
        message.to_string()
    } else {
        format!("{path}: {message}")
    }
}

/// The types of errors that can occur when attempting to access a value in a
/// document.
#[derive(Clone, Debug, ThisError)]
#[non_exhaustive]
pub enum ValueAccessErrorKind {
    /// No value for the specified key was present in the document.
    #[error("the key was not present in the document")]
    NotPresent,

    /// The type of the value in the document did not match the requested
    /// type.
    #[error("expected type {expected:?}, got type {actual:?}")]
    #[non_exhaustive]
    UnexpectedType {
        /// The actual type of the value.
        actual: ElementType,

        /// The expected type of the value.
        expected: ElementType,
    },
}

/// The kinds of errors that can occur when working with the
/// [`ObjectId`](crate::oid::ObjectId) type.
#[derive(Clone, Debug, ThisError)]
#[non_exhaustive]
pub enum ObjectIdErrorKind {
    /// An invalid character was found in the provided hex string. Valid
    /// characters are: `0...9`, `a...f`, or `A...F`.
    #[error("invalid character '{c}' encountered at index {index}")]
    #[non_exhaustive]
    InvalidHexStringCharacter {
        /// The invalid character.
        c: char,

        /// The index at which the invalid character was encountered.
        index: usize,
    },

    /// An `ObjectId` with an invalid length was encountered.
    #[error("invalid hex string length {length}; expected 24 characters")]
    #[non_exhaustive]
    InvalidHexStringLength {
        /// The length of the invalid hex string.
        length: usize,
    },
}

/// The kinds of errors that can occur when working with the
/// [`Decimal128`](crate::Decimal128) type.
#[derive(Clone, Debug, ThisError)]
#[non_exhaustive]
pub enum Decimal128ErrorKind {
    /// Empty exponent.
    #[error("empty exponent")]
    EmptyExponent,

    /// Invalid exponent.
    #[error("invalid exponent: {message}")]
    #[non_exhaustive]
    InvalidExponent {
        /// A message describing the error.
        message: String,
    },

    /// Overflow.
    #[error("overflow")]
    Overflow,

    /// Underflow.
    #[error("underflow")]
    Underflow,

    /// Unparseable.
    #[error("unparseable")]
    Unparseable,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            index: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        ErrorKind::Io(value).into()
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) fn invalid_argument(message: impl ToString) -> Self {
        ErrorKind::InvalidArgument {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn malformed_value(message: impl ToString) -> Self {
        ErrorKind::MalformedValue {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn document_too_large(size: usize) -> Self {
        ErrorKind::DocumentTooLarge { size }.into()
    }

    pub(crate) fn data_corrupted(path: impl Into<String>, message: impl ToString) -> Self {
        ErrorKind::DataCorrupted {
            path: path.into(),
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn value_access_not_present() -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::NotPresent,
        }
        .into()
    }

    pub(crate) fn value_access_unexpected_type(actual: ElementType, expected: ElementType) -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnexpectedType { actual, expected },
        }
        .into()
    }

    pub(crate) fn oid(kind: ObjectIdErrorKind) -> Self {
        ErrorKind::ObjectId { kind }.into()
    }

    pub(crate) fn decimal128(kind: Decimal128ErrorKind) -> Self {
        ErrorKind::Decimal128 { kind }.into()
    }

    pub(crate) fn datetime(message: impl ToString) -> Self {
        ErrorKind::DateTime {
            message: message.to_string(),
        }
        .into()
    }

    #[cfg(test)]
    pub(crate) fn is_value_access_not_present(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::NotPresent,
                ..
            }
        )
    }

    #[cfg(test)]
    pub(crate) fn is_value_access_unexpected_type(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::UnexpectedType { .. },
                ..
            }
        )
    }

    #[cfg(test)]
    pub(crate) fn is_invalid_argument(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidArgument { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_malformed_value(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedValue { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_document_too_large(&self) -> bool {
        matches!(self.kind, ErrorKind::DocumentTooLarge { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_data_corrupted(&self) -> bool {
        matches!(self.kind, ErrorKind::DataCorrupted { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_decimal128_overflow(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Decimal128 {
                kind: Decimal128ErrorKind::Overflow,
            }
        )
    }

    #[cfg(test)]
    pub(crate) fn is_decimal128_underflow(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Decimal128 {
                kind: Decimal128ErrorKind::Underflow,
            }
        )
    }

    #[cfg(test)]
    pub(crate) fn is_decimal128_unparseable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Decimal128 {
                kind: Decimal128ErrorKind::Unparseable,
            }
        )
    }
}

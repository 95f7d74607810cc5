//! Documents kept in their serialized byte form.
//!
//! A [`RawDocument`] wraps a byte slice that *is* a valid BSON document
//! envelope; element access parses on demand. [`RawDocumentBuf`] is the
//! owned, growable counterpart. Iterating yields key-value pairs that borrow
//! from the underlying bytes without any additional allocation.
//!
//! ```
//! use wirebson::raw::RawDocument;
//!
//! let doc = RawDocument::from_bytes(b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00")?;
//! assert_eq!(doc.get_str("hi")?, Some("y'all"));
//! # Ok::<(), wirebson::error::Error>(())
//! ```
//!
//! Since the bytes are not validated up front, iteration can fail at any
//! element; the iterator yields `Result`s and refuses to continue after the
//! first failure.

mod array;
mod bson_ref;
mod doc;
mod document_buf;
mod iter;

pub use self::{
    array::{RawArray, RawArrayIter},
    bson_ref::{
        RawBinaryRef,
        RawBsonRef,
        RawDbPointerRef,
        RawJavaScriptCodeWithScopeRef,
        RawRegexRef,
    },
    doc::RawDocument,
    document_buf::RawDocumentBuf,
    iter::Iter,
};

use crate::error::{Error, Result};

/// Given a 4 byte u8 slice, return an i32 calculated from the bytes in
/// little endian order.
fn i32_from_slice(val: &[u8]) -> Result<i32> {
    let arr = val
        .get(0..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_value(format!("expected 4 bytes to read i32, got {}", val.len()))
        })?;
    Ok(i32::from_le_bytes(arr))
}

/// Given an 8 byte u8 slice, return an i64 calculated from the bytes in
/// little endian order.
fn i64_from_slice(val: &[u8]) -> Result<i64> {
    let arr = val
        .get(0..8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_value(format!("expected 8 bytes to read i64, got {}", val.len()))
        })?;
    Ok(i64::from_le_bytes(arr))
}

fn u32_from_slice(val: &[u8]) -> Result<u32> {
    let arr = val
        .get(0..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_value(format!("expected 4 bytes to read u32, got {}", val.len()))
        })?;
    Ok(u32::from_le_bytes(arr))
}

fn f64_from_slice(val: &[u8]) -> Result<f64> {
    let arr = val
        .get(0..8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_value(format!("expected 8 bytes to read f64, got {}", val.len()))
        })?;
    Ok(f64::from_le_bytes(arr))
}

/// Reads a C-string from the front of `buf`, without consuming the
/// terminating NUL.
fn read_nullterminated(buf: &[u8]) -> Result<&str> {
    let mut splits = buf.splitn(2, |x| *x == 0);
    let value = splits
        .next()
        .ok_or_else(|| Error::malformed_value("no value"))?;
    if splits.next().is_some() {
        try_to_str(value)
    } else {
        Err(Error::malformed_value("expected null terminator"))
    }
}

/// Reads a length-prefixed string from the front of `buf`.
fn read_lenencoded(buf: &[u8]) -> Result<&str> {
    let length = i32_from_slice(buf)?;
    if length < 1 {
        return Err(Error::malformed_value(format!(
            "invalid string length: {}",
            length
        )));
    }

    let end = checked_add(4, length as usize)?;
    if buf.len() < end {
        return Err(Error::malformed_value(format!(
            "expected buffer to contain at least {} bytes, but it only has {}",
            end,
            buf.len()
        )));
    }
    if buf[end - 1] != 0 {
        return Err(Error::malformed_value("string not null terminated"));
    }

    try_to_str(&buf[4..end - 1])
}

fn try_to_str(data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data).map_err(|_| crate::error::ErrorKind::Utf8Encoding.into())
}

fn checked_add(lhs: usize, rhs: usize) -> Result<usize> {
    lhs.checked_add(rhs)
        .ok_or_else(|| Error::malformed_value("attempted to add with overflow"))
}

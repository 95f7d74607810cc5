//! BSON serialization: the per-type payload writers and the element
//! dispatcher used by [`Document::to_writer`](crate::Document::to_writer).

use std::io::Write;

use crate::{
    bson::{Bson, DbPointer, JavaScriptCodeWithScope},
    de::MAX_BSON_SIZE,
    error::{Error, Result},
    spec::BinarySubtype,
    Binary,
};

/// Writes a length-prefixed UTF-8 string: `int32 len | bytes | 0x00`, where
/// the length includes the trailing NUL.
pub(crate) fn write_string<W: Write + ?Sized>(writer: &mut W, s: &str) -> Result<()> {
    writer.write_all(&(s.len() as i32 + 1).to_le_bytes())?;
    writer.write_all(s.as_bytes())?;
    writer.write_all(b"\0")?;
    Ok(())
}

/// Writes a C-string. Interior NUL bytes cannot be represented on the wire
/// and are rejected.
pub(crate) fn write_cstring<W: Write + ?Sized>(writer: &mut W, s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(Error::invalid_argument(format!(
            "cstring \"{}\" contains interior null byte",
            s.replace('\0', "\\0")
        )));
    }

    writer.write_all(s.as_bytes())?;
    writer.write_all(b"\0")?;
    Ok(())
}

#[inline]
pub(crate) fn write_i32<W: Write + ?Sized>(writer: &mut W, val: i32) -> Result<()> {
    writer.write_all(&val.to_le_bytes()).map_err(From::from)
}

#[inline]
pub(crate) fn write_i64<W: Write + ?Sized>(writer: &mut W, val: i64) -> Result<()> {
    writer.write_all(&val.to_le_bytes()).map_err(From::from)
}

#[inline]
pub(crate) fn write_f64<W: Write + ?Sized>(writer: &mut W, val: f64) -> Result<()> {
    writer.write_all(&val.to_le_bytes()).map_err(From::from)
}

pub(crate) fn write_binary<W: Write + ?Sized>(
    writer: &mut W,
    subtype: BinarySubtype,
    bytes: &[u8],
) -> Result<()> {
    // the deprecated binary subtype carries a redundant inner length prefix
    let len = if let BinarySubtype::BinaryOld = subtype {
        bytes.len() + 4
    } else {
        bytes.len()
    };

    if len > MAX_BSON_SIZE as usize {
        return Err(Error::invalid_argument(format!(
            "binary length {} exceeded maximum size",
            bytes.len()
        )));
    }

    write_i32(writer, len as i32)?;
    writer.write_all(&[subtype.into()])?;

    if let BinarySubtype::BinaryOld = subtype {
        write_i32(writer, len as i32 - 4)?;
    }

    writer.write_all(bytes).map_err(From::from)
}

fn write_array<W: Write + ?Sized>(writer: &mut W, arr: &[Bson]) -> Result<()> {
    let mut buf = Vec::new();
    for (key, val) in arr.iter().enumerate() {
        write_bson_element(&mut buf, &key.to_string(), val)?;
    }

    write_i32(writer, (buf.len() + 4 + 1) as i32)?;
    writer.write_all(&buf)?;
    writer.write_all(b"\0")?;
    Ok(())
}

/// Writes one document element: `type byte | key cstring | payload`.
pub(crate) fn write_bson_element<W: Write + ?Sized>(
    writer: &mut W,
    key: &str,
    val: &Bson,
) -> Result<()> {
    writer.write_all(&[val.element_type() as u8])?;
    write_cstring(writer, key)?;

    match *val {
        Bson::Double(v) => write_f64(writer, v),
        Bson::String(ref v) => write_string(writer, v),
        Bson::Array(ref v) => write_array(writer, v),
        Bson::Document(ref v) => v.to_writer(writer),
        Bson::Boolean(v) => writer
            .write_all(&[if v { 0x01 } else { 0x00 }])
            .map_err(From::from),
        Bson::Null => Ok(()),
        Bson::RegularExpression(ref rx) => {
            write_cstring(writer, &rx.pattern)?;
            write_cstring(writer, rx.sorted_options().as_str())
        }
        Bson::JavaScriptCode(ref code) => write_string(writer, code),
        Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
            ref code,
            ref scope,
        }) => {
            let mut buf = Vec::new();
            write_string(&mut buf, code)?;
            scope.to_writer(&mut buf)?;

            // the wrapper length counts itself
            write_i32(writer, buf.len() as i32 + 4)?;
            writer.write_all(&buf).map_err(From::from)
        }
        Bson::Int32(v) => write_i32(writer, v),
        Bson::Int64(v) => write_i64(writer, v),
        Bson::Timestamp(ts) => write_i64(writer, ts.to_le_i64()),
        Bson::Binary(Binary { subtype, ref bytes }) => write_binary(writer, subtype, bytes),
        Bson::ObjectId(ref id) => writer.write_all(&id.bytes()).map_err(From::from),
        Bson::DateTime(ref dt) => write_i64(writer, dt.timestamp_millis()),
        Bson::Symbol(ref v) => write_string(writer, v),
        Bson::Decimal128(ref v) => writer.write_all(&v.bytes).map_err(From::from),
        Bson::Undefined => Ok(()),
        Bson::MinKey => Ok(()),
        Bson::MaxKey => Ok(()),
        Bson::DbPointer(DbPointer {
            ref namespace,
            ref id,
        }) => {
            write_string(writer, namespace)?;
            writer.write_all(&id.bytes()).map_err(From::from)
        }
    }
}

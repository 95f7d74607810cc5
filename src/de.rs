//! BSON deserialization: the per-type payload readers and the tag-dispatched
//! value reader used by [`Document::from_reader`](crate::Document::from_reader).

use std::{
    convert::TryFrom,
    io::{Cursor, Read},
};

use crate::{
    bson::{Array, Bson, DbPointer, JavaScriptCodeWithScope, Regex, Timestamp},
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    Binary,
    Decimal128,
    Document,
};

pub(crate) const MAX_BSON_SIZE: i32 = 16 * 1024 * 1024;
pub(crate) const MIN_BSON_DOCUMENT_SIZE: i32 = 4 + 1; // 4 bytes for length, one byte for null terminator
pub(crate) const MIN_BSON_STRING_SIZE: i32 = 4 + 1;
pub(crate) const MIN_CODE_WITH_SCOPE_SIZE: i32 = 4 + MIN_BSON_STRING_SIZE + MIN_BSON_DOCUMENT_SIZE;

#[inline]
pub(crate) fn read_u8<R: Read + ?Sized>(reader: &mut R) -> Result<u8> {
    let mut buf = [0; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

#[inline]
pub(crate) fn read_i32<R: Read + ?Sized>(reader: &mut R) -> Result<i32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

#[inline]
pub(crate) fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[inline]
pub(crate) fn read_i64<R: Read + ?Sized>(reader: &mut R) -> Result<i64> {
    let mut buf = [0; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

#[inline]
fn read_f64<R: Read + ?Sized>(reader: &mut R) -> Result<f64> {
    let mut buf = [0; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Reads a length-prefixed UTF-8 string, validating that the declared length
/// covers the trailing NUL and nothing else.
pub(crate) fn read_string<R: Read + ?Sized>(reader: &mut R) -> Result<String> {
    let len = read_i32(reader)?;

    // a UTF-8 string must have at least 1 byte (the trailing 0x00)
    if len < 1 {
        return Err(Error::malformed_value(format!(
            "invalid string length: {}",
            len
        )));
    }

    let mut buf = vec![0u8; len as usize - 1];
    reader.read_exact(&mut buf)?;
    let s = String::from_utf8(buf).map_err(|_| Error::from(crate::error::ErrorKind::Utf8Encoding))?;

    if read_u8(reader)? != 0 {
        return Err(Error::malformed_value(
            "string contents longer than declared length",
        ));
    }

    Ok(s)
}

/// Reads a C-string: bytes up to (and consuming) the NUL terminator.
pub(crate) fn read_cstring<R: Read + ?Sized>(reader: &mut R) -> Result<String> {
    let mut v = Vec::new();

    loop {
        let c = read_u8(reader)?;
        if c == 0 {
            break;
        }
        v.push(c);
    }

    String::from_utf8(v).map_err(|_| Error::from(crate::error::ErrorKind::Utf8Encoding))
}

pub(crate) fn read_bool<R: Read + ?Sized>(reader: &mut R) -> Result<bool> {
    let val = read_u8(reader)?;
    if val > 1 {
        return Err(Error::malformed_value(format!(
            "boolean must be stored as 0 or 1, got {}",
            val
        )));
    }

    Ok(val != 0)
}

fn read_binary<R: Read + ?Sized>(reader: &mut R) -> Result<Binary> {
    let mut len = read_i32(reader)?;
    if !(0..=MAX_BSON_SIZE).contains(&len) {
        return Err(Error::malformed_value(format!(
            "binary length {} out of range",
            len
        )));
    }

    let subtype = BinarySubtype::try_from(read_u8(reader)?)
        .map_err(|e| Error::malformed_value(e.to_string()))?;

    // the deprecated binary subtype carries a redundant inner length prefix
    if let BinarySubtype::BinaryOld = subtype {
        if len < 4 {
            return Err(Error::malformed_value(
                "deprecated binary subtype has no inner declared length",
            ));
        }
        let inner_len = read_i32(reader)?;
        if inner_len as i64 + 4 != len as i64 {
            return Err(Error::malformed_value(format!(
                "deprecated binary subtype declares inner length {} but outer length {}",
                inner_len, len
            )));
        }
        len -= 4;
    }

    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;

    Binary::with_subtype(subtype, bytes).map_err(|e| Error::malformed_value(e.to_string()))
}

fn read_object_id<R: Read + ?Sized>(reader: &mut R) -> Result<ObjectId> {
    let mut buf = [0u8; 12];
    reader.read_exact(&mut buf)?;
    Ok(ObjectId::from_bytes(buf))
}

fn read_decimal128<R: Read + ?Sized>(reader: &mut R) -> Result<Decimal128> {
    let mut buf = [0u8; 16];
    reader.read_exact(&mut buf)?;
    Ok(Decimal128::from_bytes(buf))
}

/// Buffers `length` bytes, runs `func` over them, and verifies that `func`
/// consumed the buffer exactly.
fn ensure_read_exactly<R, F>(reader: &mut R, length: usize, error_message: &str, func: F) -> Result<()>
where
    R: Read + ?Sized,
    F: FnOnce(&mut Cursor<Vec<u8>>) -> Result<()>,
{
    let mut buf = vec![0u8; length];
    reader.read_exact(&mut buf)?;
    let mut cursor = Cursor::new(buf);

    func(&mut cursor)?;

    if cursor.position() != length as u64 {
        return Err(Error::malformed_value(error_message));
    }
    Ok(())
}

/// Reads a full document envelope: `int32 length | elements | 0x00`.
pub(crate) fn read_document<R: Read + ?Sized>(reader: &mut R) -> Result<Document> {
    let length = read_i32(reader)?;

    if length < MIN_BSON_DOCUMENT_SIZE {
        return Err(Error::malformed_value(format!(
            "document length {} too small",
            length
        )));
    }
    if length > MAX_BSON_SIZE {
        return Err(Error::malformed_value(format!(
            "document length {} exceeds maximum",
            length
        )));
    }

    let mut doc = Document::new();
    ensure_read_exactly(
        reader,
        (length as usize) - 4,
        "document length longer than contents",
        |cursor| {
            loop {
                let tag = read_u8(cursor)?;
                if tag == 0 {
                    break;
                }

                let key = read_cstring(cursor)?;
                let val = read_bson_value(cursor, tag).map_err(|e| e.with_key(key.clone()))?;

                // the wire format permits duplicate keys; keyed access
                // resolves to the first occurrence
                if !doc.contains_key(&key) {
                    doc.insert(key, val);
                }
            }
            Ok(())
        },
    )?;

    Ok(doc)
}

fn read_array<R: Read + ?Sized>(reader: &mut R) -> Result<Array> {
    let length = read_i32(reader)?;

    if length < MIN_BSON_DOCUMENT_SIZE {
        return Err(Error::malformed_value(format!(
            "array length {} too small",
            length
        )));
    }

    let mut arr = Array::new();
    ensure_read_exactly(
        reader,
        (length as usize) - 4,
        "array length longer than contents",
        |cursor| {
            loop {
                let tag = read_u8(cursor)?;
                if tag == 0 {
                    break;
                }

                // array documents must carry the keys "0", "1", ... in order
                let key = read_cstring(cursor)?;
                match key.parse::<usize>() {
                    Ok(idx) if idx == arr.len() => {}
                    _ => {
                        return Err(Error::malformed_value(format!(
                            "expected array key \"{}\", got \"{}\"",
                            arr.len(),
                            key
                        )))
                    }
                }

                let val = read_bson_value(cursor, tag).map_err(|e| e.with_index(arr.len()))?;
                arr.push(val);
            }
            Ok(())
        },
    )?;

    Ok(arr)
}

/// Reads the payload of a single BSON value, dispatching on the element tag.
/// The tag byte and the element key are the document envelope's concern and
/// must already have been consumed.
pub(crate) fn read_bson_value<R: Read + ?Sized>(reader: &mut R, tag: u8) -> Result<Bson> {
    let tag = ElementType::from(tag)
        .ok_or_else(|| Error::malformed_value(format!("invalid element type tag {:#04x}", tag)))?;

    Ok(match tag {
        ElementType::Double => Bson::Double(read_f64(reader)?),
        ElementType::String => Bson::String(read_string(reader)?),
        ElementType::EmbeddedDocument => Bson::Document(read_document(reader)?),
        ElementType::Array => Bson::Array(read_array(reader)?),
        ElementType::Binary => Bson::Binary(read_binary(reader)?),
        ElementType::Undefined => Bson::Undefined,
        ElementType::ObjectId => Bson::ObjectId(read_object_id(reader)?),
        ElementType::Boolean => Bson::Boolean(read_bool(reader)?),
        ElementType::DateTime => Bson::DateTime(crate::DateTime::from_millis(read_i64(reader)?)),
        ElementType::Null => Bson::Null,
        ElementType::RegularExpression => {
            let pattern = read_cstring(reader)?;
            let options = read_cstring(reader)?;
            Bson::RegularExpression(Regex { pattern, options })
        }
        ElementType::DbPointer => {
            let namespace = read_string(reader)?;
            let id = read_object_id(reader)?;
            Bson::DbPointer(DbPointer { namespace, id })
        }
        ElementType::JavaScriptCode => Bson::JavaScriptCode(read_string(reader)?),
        ElementType::Symbol => Bson::Symbol(read_string(reader)?),
        ElementType::JavaScriptCodeWithScope => {
            // the wrapper length counts itself
            let length = read_i32(reader)?;
            if length < MIN_CODE_WITH_SCOPE_SIZE {
                return Err(Error::malformed_value(format!(
                    "code with scope length {} too small",
                    length
                )));
            }

            let mut code = String::new();
            let mut scope = Document::new();
            ensure_read_exactly(
                reader,
                (length as usize) - 4,
                "code with scope length longer than contents",
                |cursor| {
                    code = read_string(cursor)?;
                    scope = read_document(cursor)?;
                    Ok(())
                },
            )?;

            Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, scope })
        }
        ElementType::Int32 => Bson::Int32(read_i32(reader)?),
        ElementType::Timestamp => {
            let increment = read_u32(reader)?;
            let time = read_u32(reader)?;
            Bson::Timestamp(Timestamp { time, increment })
        }
        ElementType::Int64 => Bson::Int64(read_i64(reader)?),
        ElementType::Decimal128 => Bson::Decimal128(read_decimal128(reader)?),
        ElementType::MaxKey => Bson::MaxKey,
        ElementType::MinKey => Bson::MinKey,
    })
}

//! The single-pass forward iterator over a raw document's bytes.

use std::convert::TryFrom;

use super::{
    bson_ref::RawDbPointerRef,
    checked_add,
    f64_from_slice,
    i32_from_slice,
    i64_from_slice,
    read_lenencoded,
    read_nullterminated,
    u32_from_slice,
    RawArray,
    RawBinaryRef,
    RawBsonRef,
    RawDocument,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
};
use crate::{
    bson::Timestamp,
    de::{MIN_BSON_DOCUMENT_SIZE, MIN_CODE_WITH_SCOPE_SIZE},
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    DateTime,
    Decimal128,
};

/// An iterator over a raw document's entries.
///
/// Each step reads one type byte, one key C-string, and exactly the payload
/// bytes belonging to the value. Iteration ends at the trailing 0x00. The
/// first malformed element poisons the iterator: every subsequent call to
/// `next` returns `None`.
pub struct Iter<'a> {
    doc: &'a RawDocument,
    offset: usize,

    /// Whether the underlying doc is assumed to be valid or if an error has
    /// been encountered. After an error, all subsequent iterations will
    /// return None.
    valid: bool,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(doc: &'a RawDocument) -> Self {
        Self {
            doc,
            offset: 4,
            valid: true,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.doc.as_bytes()
    }

    fn verify_enough_bytes(&self, start: usize, num_bytes: usize) -> Result<()> {
        let end = checked_add(start, num_bytes)?;
        if self.bytes().get(start..end).is_none() {
            return Err(Error::malformed_value(format!(
                "length {} at offset {} exceeds remaining length of buffer",
                num_bytes, start
            )));
        }
        Ok(())
    }

    fn next_oid(&self, starting_at: usize) -> Result<ObjectId> {
        self.verify_enough_bytes(starting_at, 12)?;
        let mut buf = [0u8; 12];
        buf.copy_from_slice(&self.bytes()[starting_at..(starting_at + 12)]);
        Ok(ObjectId::from_bytes(buf))
    }

    fn next_document(&self, starting_at: usize) -> Result<&'a RawDocument> {
        self.verify_enough_bytes(starting_at, MIN_BSON_DOCUMENT_SIZE as usize)?;
        let size = i32_from_slice(&self.bytes()[starting_at..])? as usize;

        if size < MIN_BSON_DOCUMENT_SIZE as usize {
            return Err(Error::malformed_value(format!(
                "nested document too small: {} bytes",
                size
            )));
        }

        self.verify_enough_bytes(starting_at, size)?;
        let end = starting_at + size;

        if self.bytes()[end - 1] != 0 {
            return Err(Error::malformed_value(format!(
                "nested document at offset {} not null terminated",
                starting_at
            )));
        }
        RawDocument::from_bytes(&self.bytes()[starting_at..end])
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<(&'a str, RawBsonRef<'a>)>;

    fn next(&mut self) -> Option<Result<(&'a str, RawBsonRef<'a>)>> {
        if !self.valid {
            return None;
        } else if self.offset == self.bytes().len() - 1 {
            if self.bytes()[self.offset] == 0 {
                // end of document marker
                return None;
            } else {
                self.valid = false;
                return Some(Err(Error::malformed_value("document not null terminated")));
            }
        } else if self.offset >= self.bytes().len() {
            self.valid = false;
            return Some(Err(Error::malformed_value("iteration overflowed document")));
        }

        let key = match read_nullterminated(&self.bytes()[self.offset + 1..]) {
            Ok(k) => k,
            Err(e) => {
                self.valid = false;
                return Some(Err(e));
            }
        };

        let kvp_result = self.next_element(key).map_err(|e| e.with_key(key));

        if kvp_result.is_err() {
            self.valid = false;
        }

        Some(kvp_result.map(|element| (key, element)))
    }
}

impl<'a> Iter<'a> {
    fn next_element(&mut self, key: &str) -> Result<RawBsonRef<'a>> {
        // type specifier + key + \0
        let valueoffset = self.offset + 1 + key.len() + 1;

        let tag = self.bytes()[self.offset];
        let element_type = ElementType::from(tag).ok_or_else(|| {
            Error::malformed_value(format!(
                "invalid element type tag {:#04x} at offset {}",
                tag, self.offset
            ))
        })?;

        let (element, element_size) = match element_type {
            ElementType::Int32 => {
                let i = i32_from_slice(&self.bytes()[valueoffset..])?;
                (RawBsonRef::Int32(i), 4)
            }
            ElementType::Int64 => {
                let i = i64_from_slice(&self.bytes()[valueoffset..])?;
                (RawBsonRef::Int64(i), 8)
            }
            ElementType::Double => {
                let f = f64_from_slice(&self.bytes()[valueoffset..])?;
                (RawBsonRef::Double(f), 8)
            }
            ElementType::String => {
                let s = read_lenencoded(&self.bytes()[valueoffset..])?;
                (RawBsonRef::String(s), 4 + s.len() + 1)
            }
            ElementType::EmbeddedDocument => {
                let doc = self.next_document(valueoffset)?;
                (RawBsonRef::Document(doc), doc.as_bytes().len())
            }
            ElementType::Array => {
                let doc = self.next_document(valueoffset)?;
                (
                    RawBsonRef::Array(RawArray::from_doc(doc)),
                    doc.as_bytes().len(),
                )
            }
            ElementType::Binary => {
                let len = i32_from_slice(&self.bytes()[valueoffset..])? as usize;
                let data_start = valueoffset + 4 + 1;

                if len >= i32::MAX as usize {
                    return Err(Error::malformed_value(format!(
                        "binary length exceeds maximum: {}",
                        len
                    )));
                }

                self.verify_enough_bytes(valueoffset + 4, len + 1)?;
                let subtype = BinarySubtype::try_from(self.bytes()[valueoffset + 4])
                    .map_err(|e| Error::malformed_value(e.to_string()))?;
                let data = match subtype {
                    BinarySubtype::BinaryOld => {
                        if len < 4 {
                            return Err(Error::malformed_value(
                                "old binary subtype has no inner declared length",
                            ));
                        }
                        let oldlength = i32_from_slice(&self.bytes()[data_start..])? as usize;
                        if checked_add(oldlength, 4)? != len {
                            return Err(Error::malformed_value(
                                "old binary subtype has wrong inner declared length",
                            ));
                        }
                        &self.bytes()[(data_start + 4)..(data_start + len)]
                    }
                    BinarySubtype::Uuid if len != 16 => {
                        return Err(Error::malformed_value(format!(
                            "UUID binary value must contain exactly 16 bytes, instead got {}",
                            len
                        )));
                    }
                    _ => &self.bytes()[data_start..(data_start + len)],
                };
                (
                    RawBsonRef::Binary(RawBinaryRef {
                        subtype,
                        bytes: data,
                    }),
                    4 + 1 + len,
                )
            }
            ElementType::ObjectId => {
                let oid = self.next_oid(valueoffset)?;
                (RawBsonRef::ObjectId(oid), 12)
            }
            ElementType::Boolean => {
                self.verify_enough_bytes(valueoffset, 1)?;
                let b = match self.bytes()[valueoffset] {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(Error::malformed_value(format!(
                            "boolean must be stored as 0 or 1, got {} at offset {}",
                            other, valueoffset
                        )))
                    }
                };
                (RawBsonRef::Boolean(b), 1)
            }
            ElementType::DateTime => {
                let ms = i64_from_slice(&self.bytes()[valueoffset..])?;
                (RawBsonRef::DateTime(DateTime::from_millis(ms)), 8)
            }
            ElementType::RegularExpression => {
                let pattern = read_nullterminated(&self.bytes()[valueoffset..])?;
                let options =
                    read_nullterminated(&self.bytes()[(valueoffset + pattern.len() + 1)..])?;
                (
                    RawBsonRef::RegularExpression(RawRegexRef { pattern, options }),
                    pattern.len() + 1 + options.len() + 1,
                )
            }
            ElementType::Null => (RawBsonRef::Null, 0),
            ElementType::Undefined => (RawBsonRef::Undefined, 0),
            ElementType::Timestamp => {
                self.verify_enough_bytes(valueoffset, 8)?;
                let increment = u32_from_slice(&self.bytes()[valueoffset..])?;
                let time = u32_from_slice(&self.bytes()[valueoffset + 4..])?;
                (RawBsonRef::Timestamp(Timestamp { time, increment }), 8)
            }
            ElementType::JavaScriptCode => {
                let code = read_lenencoded(&self.bytes()[valueoffset..])?;
                (RawBsonRef::JavaScriptCode(code), 4 + code.len() + 1)
            }
            ElementType::JavaScriptCodeWithScope => {
                let length = i32_from_slice(&self.bytes()[valueoffset..])? as usize;

                if length < MIN_CODE_WITH_SCOPE_SIZE as usize {
                    return Err(Error::malformed_value("code with scope length too small"));
                }

                self.verify_enough_bytes(valueoffset, length)?;
                let slice = &self.bytes()[valueoffset..(valueoffset + length)];
                let code = read_lenencoded(&slice[4..])?;
                let scope_start = 4 + 4 + code.len() + 1;
                let scope = RawDocument::from_bytes(&slice[scope_start..])?;
                (
                    RawBsonRef::JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef {
                        code,
                        scope,
                    }),
                    length,
                )
            }
            ElementType::DbPointer => {
                let namespace = read_lenencoded(&self.bytes()[valueoffset..])?;
                let id = self.next_oid(valueoffset + 4 + namespace.len() + 1)?;
                (
                    RawBsonRef::DbPointer(RawDbPointerRef { namespace, id }),
                    4 + namespace.len() + 1 + 12,
                )
            }
            ElementType::Symbol => {
                let s = read_lenencoded(&self.bytes()[valueoffset..])?;
                (RawBsonRef::Symbol(s), 4 + s.len() + 1)
            }
            ElementType::Decimal128 => {
                self.verify_enough_bytes(valueoffset, 16)?;
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&self.bytes()[valueoffset..(valueoffset + 16)]);
                (RawBsonRef::Decimal128(Decimal128::from_bytes(bytes)), 16)
            }
            ElementType::MinKey => (RawBsonRef::MinKey, 0),
            ElementType::MaxKey => (RawBsonRef::MaxKey, 0),
        };

        self.verify_enough_bytes(valueoffset, element_size)?;
        self.offset = valueoffset + element_size;

        Ok(element)
    }
}

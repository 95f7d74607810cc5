use std::{borrow::Borrow, convert::TryFrom, ops::Deref};

use super::{Iter, RawBsonRef, RawDocument};
use crate::{
    de::{MAX_BSON_SIZE, MIN_BSON_DOCUMENT_SIZE},
    error::{Error, Result},
    ser,
    Document,
};

/// An owned BSON document (akin to [`std::path::PathBuf`]), backed by a
/// buffer of raw BSON bytes. This can be created from a `Vec<u8>` or a
/// [`crate::Document`].
///
/// Elements are appended with [`RawDocumentBuf::append`], which keeps the
/// length prefix and the trailing terminator valid after every call and
/// refuses to grow the document past the 16 MiB limit.
///
/// This type implements `Deref` to [`RawDocument`], meaning that all methods
/// on [`RawDocument`] are available on [`RawDocumentBuf`] values as well,
/// including [`RawDocument::get`] and the type-specific getters.
///
/// ```
/// use wirebson::raw::RawDocumentBuf;
///
/// let mut doc = RawDocumentBuf::empty();
/// doc.append("hi", "y'all")?;
/// assert_eq!(doc.get_str("hi")?, Some("y'all"));
/// # Ok::<(), wirebson::error::Error>(())
/// ```
#[derive(Clone, PartialEq)]
pub struct RawDocumentBuf {
    data: Vec<u8>,
}

impl RawDocumentBuf {
    /// Creates a new, empty document.
    pub fn empty() -> RawDocumentBuf {
        let mut data: Vec<u8> = MIN_BSON_DOCUMENT_SIZE.to_le_bytes().to_vec();
        data.push(0);
        Self { data }
    }

    /// Constructs a new [`RawDocumentBuf`] from the provided bytes,
    /// validating the envelope the same way [`RawDocument::from_bytes`] does.
    pub fn from_bytes(data: Vec<u8>) -> Result<RawDocumentBuf> {
        let _ = RawDocument::from_bytes(data.as_slice())?;
        Ok(Self { data })
    }

    pub(crate) fn from_bytes_unchecked(data: Vec<u8>) -> RawDocumentBuf {
        Self { data }
    }

    /// Creates a [`RawDocumentBuf`] from a [`Document`] by serializing it.
    ///
    /// ```
    /// use wirebson::{doc, raw::RawDocumentBuf};
    ///
    /// let document = doc! { "name": "Herman Melville", "title": "Moby-Dick" };
    /// let raw = RawDocumentBuf::from_document(&document)?;
    /// assert_eq!(raw.get_str("title")?, Some("Moby-Dick"));
    /// # Ok::<(), wirebson::error::Error>(())
    /// ```
    pub fn from_document(doc: &Document) -> Result<RawDocumentBuf> {
        let mut data = Vec::new();
        doc.to_writer(&mut data)?;
        Ok(Self { data })
    }

    /// Gets an iterator over the elements in the [`RawDocumentBuf`], which
    /// yields `Result<(&str, RawBsonRef<'_>)>`.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Returns the contained data as a `Vec<u8>`.
    ///
    /// ```
    /// use wirebson::raw::RawDocumentBuf;
    ///
    /// let doc = RawDocumentBuf::empty();
    /// assert_eq!(doc.into_bytes(), b"\x05\x00\x00\x00\x00".to_vec());
    /// ```
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Appends a new element to the end of the document, before the
    /// terminator.
    ///
    /// Fails without modifying the document if the key contains an interior
    /// NUL byte or if the resulting document would exceed the 16 MiB size
    /// limit.
    pub fn append<'a>(&mut self, key: impl AsRef<str>, value: impl Into<RawBsonRef<'a>>) -> Result<()> {
        let key = key.as_ref();
        let value = value.into();
        let original_len = self.data.len();

        let result = match self.append_inner(key, value) {
            Ok(()) if self.data.len() > MAX_BSON_SIZE as usize => {
                Err(Error::document_too_large(self.data.len()))
            }
            other => other,
        };

        if result.is_err() {
            // roll the document back to its previous valid state
            self.data.truncate(original_len);
            self.data[original_len - 1] = 0;
            return result;
        }

        let total_len = self.data.len() as i32;
        self.data[0..4].copy_from_slice(&total_len.to_le_bytes());
        Ok(())
    }

    fn append_inner(&mut self, key: &str, value: RawBsonRef<'_>) -> Result<()> {
        let original_len = self.data.len();

        ser::write_cstring(&mut self.data, key)?;

        match value {
            RawBsonRef::Double(d) => ser::write_f64(&mut self.data, d)?,
            RawBsonRef::String(s) => ser::write_string(&mut self.data, s)?,
            RawBsonRef::Document(d) => self.data.extend_from_slice(d.as_bytes()),
            RawBsonRef::Array(a) => self.data.extend_from_slice(a.as_bytes()),
            RawBsonRef::Boolean(b) => self.data.push(b as u8),
            RawBsonRef::Null | RawBsonRef::Undefined | RawBsonRef::MinKey | RawBsonRef::MaxKey => {}
            RawBsonRef::RegularExpression(rx) => {
                ser::write_cstring(&mut self.data, rx.pattern)?;
                ser::write_cstring(&mut self.data, rx.options)?;
            }
            RawBsonRef::JavaScriptCode(code) => ser::write_string(&mut self.data, code)?,
            RawBsonRef::JavaScriptCodeWithScope(cws) => {
                let len = 4 + (4 + cws.code.len() + 1) + cws.scope.as_bytes().len();
                ser::write_i32(&mut self.data, len as i32)?;
                ser::write_string(&mut self.data, cws.code)?;
                self.data.extend_from_slice(cws.scope.as_bytes());
            }
            RawBsonRef::Int32(i) => ser::write_i32(&mut self.data, i)?,
            RawBsonRef::Int64(i) => ser::write_i64(&mut self.data, i)?,
            RawBsonRef::Timestamp(ts) => ser::write_i64(&mut self.data, ts.to_le_i64())?,
            RawBsonRef::Binary(bin) => ser::write_binary(&mut self.data, bin.subtype, bin.bytes)?,
            RawBsonRef::ObjectId(oid) => self.data.extend_from_slice(&oid.bytes()),
            RawBsonRef::DateTime(dt) => ser::write_i64(&mut self.data, dt.timestamp_millis())?,
            RawBsonRef::Symbol(s) => ser::write_string(&mut self.data, s)?,
            RawBsonRef::Decimal128(d) => self.data.extend_from_slice(&d.bytes()),
            RawBsonRef::DbPointer(dbp) => {
                ser::write_string(&mut self.data, dbp.namespace)?;
                self.data.extend_from_slice(&dbp.id.bytes());
            }
        }

        // the previous terminator becomes the new element's type byte
        self.data[original_len - 1] = value.element_type() as u8;
        self.data.push(0);
        Ok(())
    }

    /// Materializes this document into an owned [`Document`], parsing every
    /// element.
    pub fn to_document(&self) -> Result<Document> {
        self.as_ref().to_document()
    }
}

impl Default for RawDocumentBuf {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for RawDocumentBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocumentBuf")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl TryFrom<RawDocumentBuf> for Document {
    type Error = Error;

    fn try_from(raw: RawDocumentBuf) -> Result<Document> {
        raw.to_document()
    }
}

impl TryFrom<&Document> for RawDocumentBuf {
    type Error = Error;

    fn try_from(doc: &Document) -> Result<RawDocumentBuf> {
        RawDocumentBuf::from_document(doc)
    }
}

impl<'a> IntoIterator for &'a RawDocumentBuf {
    type IntoIter = Iter<'a>;
    type Item = Result<(&'a str, RawBsonRef<'a>)>;

    fn into_iter(self) -> Iter<'a> {
        Iter::new(self)
    }
}

impl AsRef<RawDocument> for RawDocumentBuf {
    fn as_ref(&self) -> &RawDocument {
        RawDocument::new_unchecked(&self.data)
    }
}

impl Deref for RawDocumentBuf {
    type Target = RawDocument;

    fn deref(&self) -> &Self::Target {
        RawDocument::new_unchecked(&self.data)
    }
}

impl Borrow<RawDocument> for RawDocumentBuf {
    fn borrow(&self) -> &RawDocument {
        self.deref()
    }
}

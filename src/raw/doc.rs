use super::{i32_from_slice, Iter, RawArray, RawBinaryRef, RawBsonRef, RawDocumentBuf, RawRegexRef};
use crate::{
    bson::Timestamp,
    error::{Error, Result},
    oid::ObjectId,
    spec::ElementType,
    Bson,
    DateTime,
    Decimal128,
    Document,
};

/// A slice of a BSON document (akin to [`std::str`]). This can be created
/// from a [`RawDocumentBuf`] or any type that contains valid BSON data, such
/// as `Vec<u8>` or `&[u8]`.
///
/// This is an _unsized_ type, meaning that it must always be used behind a
/// pointer like `&`.
///
/// Accessing elements within a [`RawDocument`] is similar to element access
/// in [`crate::Document`], but because the contents are parsed during
/// iteration instead of at creation time, format errors can happen at any
/// time during use. Note also that the keyed getters are linear scans from
/// the front of the document, so their runtime is linear in the number of
/// elements rather than constant.
///
/// ```
/// use wirebson::raw::RawDocument;
///
/// let doc = RawDocument::from_bytes(b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00")?;
/// let mut iter = doc.iter();
/// let (key, value) = iter.next().unwrap()?;
/// assert_eq!(key, "hi");
/// assert_eq!(value.as_str(), Some("y'all"));
/// assert!(iter.next().is_none());
/// # Ok::<(), wirebson::error::Error>(())
/// ```
#[derive(PartialEq)]
#[repr(transparent)]
pub struct RawDocument {
    data: [u8],
}

impl RawDocument {
    /// Constructs a new [`RawDocument`], validating _only_ the following
    /// invariants:
    ///   * `data` is at least five bytes long (the minimum for a valid BSON
    ///     document)
    ///   * the initial four bytes of `data` accurately represent the length
    ///     of the bytes as required by the BSON spec
    ///   * the last byte of `data` is a 0
    ///
    /// Note that the internal structure of the bytes representing the BSON
    /// elements is _not_ validated at all by this method. If the bytes do not
    /// conform to the BSON spec, then method calls on the RawDocument will
    /// return errors where appropriate.
    ///
    /// ```
    /// use wirebson::raw::RawDocument;
    ///
    /// let doc = RawDocument::from_bytes(b"\x05\0\0\0\0")?;
    /// # Ok::<(), wirebson::error::Error>(())
    /// ```
    pub fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawDocument> {
        let data = data.as_ref();

        if data.len() < 5 {
            return Err(Error::malformed_value(format!(
                "document too short: {} bytes",
                data.len()
            )));
        }

        let length = i32_from_slice(data)?;
        if data.len() as i64 != length as i64 {
            return Err(Error::malformed_value(format!(
                "document length prefix {} does not match buffer length {}",
                length,
                data.len()
            )));
        }

        if *data.last().unwrap() != 0 {
            return Err(Error::malformed_value("document not null terminated"));
        }

        Ok(RawDocument::new_unchecked(data))
    }

    /// Creates a new `RawDocument` referencing the provided data slice
    /// without inspecting it.
    pub(crate) fn new_unchecked(data: &[u8]) -> &RawDocument {
        // SAFETY: RawDocument is repr(transparent) over [u8]
        unsafe { &*(data as *const [u8] as *const RawDocument) }
    }

    /// Gets a reference to the value corresponding to the given key by
    /// iterating until the key is found. If the document contains the key
    /// more than once, the value of its first occurrence is returned.
    pub fn get(&self, key: impl AsRef<str>) -> Result<Option<RawBsonRef<'_>>> {
        for element in self.iter() {
            let (k, v) = element?;
            if k == key.as_ref() {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    fn get_with<'a, T>(
        &'a self,
        key: impl AsRef<str>,
        expected_type: ElementType,
        f: impl FnOnce(RawBsonRef<'a>) -> Option<T>,
    ) -> Result<Option<T>> {
        let key = key.as_ref();
        match self.get(key)? {
            None => Ok(None),
            Some(value) => {
                let actual = value.element_type();
                f(value)
                    .map(Some)
                    .ok_or_else(|| {
                        Error::value_access_unexpected_type(actual, expected_type).with_key(key)
                    })
            }
        }
    }

    /// Gets the double for the given key, or `None` if the key is absent.
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<Option<f64>> {
        self.get_with(key, ElementType::Double, RawBsonRef::as_f64)
    }

    /// Gets the string for the given key, or `None` if the key is absent.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<Option<&str>> {
        self.get_with(key, ElementType::String, RawBsonRef::as_str)
    }

    /// Gets the embedded document for the given key, or `None` if the key is
    /// absent.
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<Option<&RawDocument>> {
        self.get_with(key, ElementType::EmbeddedDocument, RawBsonRef::as_document)
    }

    /// Gets the array for the given key, or `None` if the key is absent.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<Option<&RawArray>> {
        self.get_with(key, ElementType::Array, RawBsonRef::as_array)
    }

    /// Gets the binary value for the given key, or `None` if the key is
    /// absent.
    pub fn get_binary(&self, key: impl AsRef<str>) -> Result<Option<RawBinaryRef<'_>>> {
        self.get_with(key, ElementType::Binary, RawBsonRef::as_binary)
    }

    /// Gets the ObjectId for the given key, or `None` if the key is absent.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<Option<ObjectId>> {
        self.get_with(key, ElementType::ObjectId, RawBsonRef::as_object_id)
    }

    /// Gets the boolean for the given key, or `None` if the key is absent.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<Option<bool>> {
        self.get_with(key, ElementType::Boolean, RawBsonRef::as_bool)
    }

    /// Gets the datetime for the given key, or `None` if the key is absent.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<Option<DateTime>> {
        self.get_with(key, ElementType::DateTime, RawBsonRef::as_datetime)
    }

    /// Gets the regex for the given key, or `None` if the key is absent.
    pub fn get_regex(&self, key: impl AsRef<str>) -> Result<Option<RawRegexRef<'_>>> {
        self.get_with(key, ElementType::RegularExpression, RawBsonRef::as_regex)
    }

    /// Gets the timestamp for the given key, or `None` if the key is absent.
    pub fn get_timestamp(&self, key: impl AsRef<str>) -> Result<Option<Timestamp>> {
        self.get_with(key, ElementType::Timestamp, RawBsonRef::as_timestamp)
    }

    /// Gets the i32 for the given key, or `None` if the key is absent.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<Option<i32>> {
        self.get_with(key, ElementType::Int32, RawBsonRef::as_i32)
    }

    /// Gets the i64 for the given key, or `None` if the key is absent.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<Option<i64>> {
        self.get_with(key, ElementType::Int64, RawBsonRef::as_i64)
    }

    /// Gets the Decimal128 for the given key, or `None` if the key is absent.
    pub fn get_decimal128(&self, key: impl AsRef<str>) -> Result<Option<Decimal128>> {
        self.get_with(key, ElementType::Decimal128, RawBsonRef::as_decimal128)
    }

    /// Whether the document contains any elements.
    pub fn is_empty(&self) -> bool {
        self.data.len() == 5
    }

    /// Gets a reference to the raw bytes of the document, including the
    /// length prefix and the trailing terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Gets an iterator over the elements in the document, which yields
    /// `Result<(&str, RawBsonRef<'_>)>`.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Materializes this document into an owned [`Document`], parsing every
    /// element.
    pub fn to_document(&self) -> Result<Document> {
        let mut doc = Document::new();
        for element in self.iter() {
            let (key, value) = element?;
            // the keyed accessor resolves duplicates to the first occurrence
            if !doc.contains_key(key) {
                doc.insert(key, Bson::try_from(value)?);
            }
        }
        Ok(doc)
    }

    /// Copies this document into an owned [`RawDocumentBuf`].
    pub fn to_raw_document_buf(&self) -> RawDocumentBuf {
        RawDocumentBuf::from_bytes_unchecked(self.data.to_vec())
    }
}

impl std::fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocument")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl ToOwned for RawDocument {
    type Owned = RawDocumentBuf;

    fn to_owned(&self) -> Self::Owned {
        self.to_raw_document_buf()
    }
}

impl<'a> IntoIterator for &'a RawDocument {
    type IntoIter = Iter<'a>;
    type Item = Result<(&'a str, RawBsonRef<'a>)>;

    fn into_iter(self) -> Iter<'a> {
        Iter::new(self)
    }
}

impl AsRef<RawDocument> for RawDocument {
    fn as_ref(&self) -> &RawDocument {
        self
    }
}

impl TryFrom<&RawDocument> for Document {
    type Error = Error;

    fn try_from(raw: &RawDocument) -> Result<Document> {
        raw.to_document()
    }
}

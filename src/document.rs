//! A BSON document represented as an associative map with insertion ordering.

use std::{
    fmt::{self, Debug, Display, Formatter},
    io::{Read, Write},
    iter::{Extend, FromIterator, IntoIterator},
    mem,
    ops::{Bound, RangeBounds},
};

use ahash::RandomState;
use indexmap::IndexMap;

use crate::{
    bson::{Array, Bson, Timestamp},
    de::{read_document, MAX_BSON_SIZE},
    error::{Error, Result},
    oid::ObjectId,
    ser::{write_bson_element, write_i32},
    spec::{BinarySubtype, ElementType},
    Binary,
    Decimal128,
};

/// A BSON document represented as an associative map with insertion ordering.
///
/// The keyed accessors resolve in insertion order; replacing the value of an
/// existing key preserves the entry's position.
#[derive(Clone, PartialEq, Default)]
pub struct Document {
    inner: IndexMap<String, Bson, RandomState>,
}

impl Display for Document {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str("{")?;

        let mut first = true;
        for (k, v) in self {
            if first {
                first = false;
                fmt.write_str(" ")?;
            } else {
                fmt.write_str(", ")?;
            }

            write!(fmt, "\"{}\": {}", k, v)?;
        }

        write!(fmt, "{}}}", if !first { " " } else { "" })
    }
}

impl Debug for Document {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str("Document(")?;
        fmt.debug_map().entries(self.inner.iter()).finish()?;
        fmt.write_str(")")
    }
}

/// An owning iterator over Document entries.
pub struct IntoIter {
    inner: indexmap::map::IntoIter<String, Bson>,
}

/// An iterator over Document entries.
pub struct Iter<'a> {
    inner: indexmap::map::Iter<'a, String, Bson>,
}

/// An iterator over a Document's keys.
pub struct Keys<'a> {
    inner: indexmap::map::Keys<'a, String, Bson>,
}

/// An iterator over a Document's values.
pub struct Values<'a> {
    inner: indexmap::map::Values<'a, String, Bson>,
}

/// An iterator over a [`Document`]'s keys and mutable values.
pub struct IterMut<'a> {
    inner: indexmap::map::IterMut<'a, String, Bson>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a String;

    fn next(&mut self) -> Option<&'a String> {
        self.inner.next()
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a Bson;

    fn next(&mut self) -> Option<&'a Bson> {
        self.inner.next()
    }
}

impl Iterator for IntoIter {
    type Item = (String, Bson);

    fn next(&mut self) -> Option<(String, Bson)> {
        self.inner.next()
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a String, &'a Bson);

    fn next(&mut self) -> Option<(&'a String, &'a Bson)> {
        self.inner.next()
    }
}

impl<'a> Iterator for IterMut<'a> {
    type Item = (&'a String, &'a mut Bson);

    fn next(&mut self) -> Option<(&'a String, &'a mut Bson)> {
        self.inner.next()
    }
}

impl IntoIterator for Document {
    type Item = (String, Bson);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.inner.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Bson);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.inner.iter(),
        }
    }
}

impl FromIterator<(String, Bson)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, Bson)>>(iter: T) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl Extend<(String, Bson)> for Document {
    fn extend<T: IntoIterator<Item = (String, Bson)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Document {
    /// Creates a new empty Document.
    pub fn new() -> Document {
        Document {
            inner: IndexMap::default(),
        }
    }

    /// Gets an iterator over the entries of the document in insertion order.
    pub fn iter(&self) -> Iter {
        self.into_iter()
    }

    /// Gets an iterator over pairs of keys and mutable values.
    pub fn iter_mut(&mut self) -> IterMut {
        IterMut {
            inner: self.inner.iter_mut(),
        }
    }

    /// Clears the document, removing all values.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Bson> {
        self.inner.get(key.as_ref())
    }

    /// Gets a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: impl AsRef<str>) -> Option<&mut Bson> {
        self.inner.get_mut(key.as_ref())
    }

    fn get_with<'a, T>(
        &'a self,
        key: impl AsRef<str>,
        expected_type: ElementType,
        f: impl FnOnce(&'a Bson) -> Option<T>,
    ) -> Result<T> {
        let key = key.as_ref();
        let bson = self
            .get(key)
            .ok_or_else(|| Error::value_access_not_present().with_key(key))?;
        f(bson).ok_or_else(|| {
            Error::value_access_unexpected_type(bson.element_type(), expected_type).with_key(key)
        })
    }

    /// Get a floating point value for this key if it exists and has the
    /// correct type.
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<f64> {
        self.get_with(key, ElementType::Double, Bson::as_f64)
    }

    /// Get a string slice for this key if it exists and has the correct type.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<&str> {
        self.get_with(key, ElementType::String, Bson::as_str)
    }

    /// Get a reference to an array for this key if it exists and has the
    /// correct type.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<&Array> {
        self.get_with(key, ElementType::Array, Bson::as_array)
    }

    /// Get a mutable reference to an array for this key if it exists and has
    /// the correct type.
    pub fn get_array_mut(&mut self, key: impl AsRef<str>) -> Result<&mut Array> {
        let key = key.as_ref();
        match self.get_mut(key) {
            Some(Bson::Array(arr)) => Ok(arr),
            Some(other) => Err(
                Error::value_access_unexpected_type(other.element_type(), ElementType::Array)
                    .with_key(key),
            ),
            None => Err(Error::value_access_not_present().with_key(key)),
        }
    }

    /// Get a reference to a document for this key if it exists and has the
    /// correct type.
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<&Document> {
        self.get_with(key, ElementType::EmbeddedDocument, Bson::as_document)
    }

    /// Get a mutable reference to a document for this key if it exists and
    /// has the correct type.
    pub fn get_document_mut(&mut self, key: impl AsRef<str>) -> Result<&mut Document> {
        let key = key.as_ref();
        match self.get_mut(key) {
            Some(Bson::Document(doc)) => Ok(doc),
            Some(other) => Err(Error::value_access_unexpected_type(
                other.element_type(),
                ElementType::EmbeddedDocument,
            )
            .with_key(key)),
            None => Err(Error::value_access_not_present().with_key(key)),
        }
    }

    /// Get a bool value for this key if it exists and has the correct type.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<bool> {
        self.get_with(key, ElementType::Boolean, Bson::as_bool)
    }

    /// Get an i32 value for this key if it exists and has the correct type.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<i32> {
        self.get_with(key, ElementType::Int32, Bson::as_i32)
    }

    /// Get an i64 value for this key if it exists and has the correct type.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<i64> {
        self.get_with(key, ElementType::Int64, Bson::as_i64)
    }

    /// Get a timestamp value for this key if it exists and has the correct
    /// type.
    pub fn get_timestamp(&self, key: impl AsRef<str>) -> Result<Timestamp> {
        self.get_with(key, ElementType::Timestamp, Bson::as_timestamp)
    }

    /// Get a reference to a generic binary value for this key if it exists
    /// and has the correct type.
    pub fn get_binary_generic(&self, key: impl AsRef<str>) -> Result<&Vec<u8>> {
        self.get_with(key, ElementType::Binary, |bson| match bson {
            Bson::Binary(Binary {
                subtype: BinarySubtype::Generic,
                bytes,
            }) => Some(bytes),
            _ => None,
        })
    }

    /// Get an object id value for this key if it exists and has the correct
    /// type.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<ObjectId> {
        self.get_with(key, ElementType::ObjectId, Bson::as_object_id)
    }

    /// Get a reference to a UTC datetime value for this key if it exists and
    /// has the correct type.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<&crate::DateTime> {
        self.get_with(key, ElementType::DateTime, Bson::as_datetime)
    }

    /// Get a reference to a Decimal128 value for this key if it exists and
    /// has the correct type.
    pub fn get_decimal128(&self, key: impl AsRef<str>) -> Result<&Decimal128> {
        self.get_with(key, ElementType::Decimal128, Bson::as_decimal128)
    }

    /// Returns true if the document contains a value for the specified key.
    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.inner.contains_key(key.as_ref())
    }

    /// Gets a collection of all keys in the document.
    pub fn keys(&self) -> Keys {
        Keys {
            inner: self.inner.keys(),
        }
    }

    /// Gets a collection of all values in the document.
    pub fn values(&self) -> Values {
        Values {
            inner: self.inner.values(),
        }
    }

    /// Returns the number of elements in the document.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the document contains no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Sets the value of the entry with the given key, returning the previous
    /// value if one was present. Accepts any type that can be converted into
    /// [`Bson`].
    ///
    /// Replacing the value of an existing key keeps the entry at its original
    /// position.
    pub fn insert<KT: Into<String>, BT: Into<Bson>>(&mut self, key: KT, val: BT) -> Option<Bson> {
        self.inner.insert(key.into(), val.into())
    }

    /// Takes the value of the entry out of the document, and returns it.
    /// The relative order of the remaining entries is preserved; computes in
    /// **O(n)** time (average).
    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<Bson> {
        self.inner.shift_remove(key.as_ref())
    }

    /// Returns the key-value pair at the given position in insertion order,
    /// or `None` if the index is out of bounds.
    pub fn get_index(&self, index: usize) -> Option<(&String, &Bson)> {
        self.inner.get_index(index)
    }

    /// Returns a new document containing the entries at index positions
    /// within `range`, in order. Out-of-range bounds clamp.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Document {
        let start = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&n) => n.saturating_add(1),
            Bound::Excluded(&n) => n,
            Bound::Unbounded => self.len(),
        };

        let start = start.min(self.len());
        let end = end.min(self.len()).max(start);

        self.iter()
            .skip(start)
            .take(end - start)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns a new document with all entries but the first `n`.
    pub fn drop_first(&self, n: usize) -> Document {
        self.slice(n.min(self.len())..)
    }

    /// Returns a new document with all entries but the last `n`.
    pub fn drop_last(&self, n: usize) -> Document {
        self.slice(..self.len().saturating_sub(n))
    }

    /// Returns a new document containing at most the first `n` entries.
    pub fn prefix(&self, n: usize) -> Document {
        self.slice(..n.min(self.len()))
    }

    /// Returns a new document containing at most the last `n` entries.
    pub fn suffix(&self, n: usize) -> Document {
        self.slice(self.len().saturating_sub(n)..)
    }

    /// Returns a new document skipping the longest prefix of entries for
    /// which `pred` returns true.
    pub fn drop_while(&self, mut pred: impl FnMut(&str, &Bson) -> bool) -> Document {
        self.iter()
            .skip_while(|(k, v)| pred(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Returns a new document containing the longest prefix of entries for
    /// which `pred` returns true.
    pub fn prefix_while(&self, mut pred: impl FnMut(&str, &Bson) -> bool) -> Document {
        self.iter()
            .take_while(|(k, v)| pred(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Splits the document around entries matching `is_separator`.
    ///
    /// At most `max_splits` separators are consumed if a limit is given;
    /// further separator entries are kept as ordinary entries. When
    /// `omit_empty` is true, empty fragments between adjacent separators (and
    /// at either end) are dropped from the result.
    pub fn split(
        &self,
        max_splits: Option<usize>,
        omit_empty: bool,
        mut is_separator: impl FnMut(&str, &Bson) -> bool,
    ) -> Vec<Document> {
        let mut out = Vec::new();
        let mut current = Document::new();
        let mut splits = 0;

        for (k, v) in self {
            let can_split = max_splits.map_or(true, |max| splits < max);
            if can_split && is_separator(k, v) {
                splits += 1;
                if !(omit_empty && current.is_empty()) {
                    out.push(mem::take(&mut current));
                } else {
                    current.clear();
                }
            } else {
                current.insert(k.clone(), v.clone());
            }
        }

        if !(omit_empty && current.is_empty()) {
            out.push(current);
        }

        out
    }

    /// Gets the entry for the given key, for in-place manipulation.
    pub fn entry(&mut self, k: String) -> Entry {
        match self.inner.entry(k) {
            indexmap::map::Entry::Occupied(o) => Entry::Occupied(OccupiedEntry { inner: o }),
            indexmap::map::Entry::Vacant(v) => Entry::Vacant(VacantEntry { inner: v }),
        }
    }

    /// Attempts to serialize the [`Document`] into a byte stream.
    ///
    /// Fails with [`ErrorKind::DocumentTooLarge`](crate::ErrorKind::DocumentTooLarge)
    /// if the encoded form would exceed 16 MiB.
    ///
    /// While the method signature indicates an owned writer must be passed
    /// in, a mutable reference may also be passed in due to blanket
    /// implementations of [`Write`] provided in the standard library.
    ///
    /// ```
    /// # fn main() -> wirebson::error::Result<()> {
    /// use wirebson::doc;
    ///
    /// let mut v: Vec<u8> = Vec::new();
    /// let doc = doc! { "x" : 1 };
    /// doc.to_writer(&mut v)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut buf = Vec::new();
        for (key, val) in self {
            write_bson_element(&mut buf, key, val)?;
        }

        let total_len = buf.len() + 4 + 1;
        if total_len > MAX_BSON_SIZE as usize {
            return Err(Error::document_too_large(total_len));
        }

        write_i32(&mut writer, total_len as i32)?;
        writer.write_all(&buf)?;
        writer.write_all(&[0])?;
        Ok(())
    }

    /// Serializes the [`Document`] into a new byte vector.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        Ok(buf)
    }

    /// Attempts to deserialize a [`Document`] from a byte stream.
    ///
    /// If the stream contains duplicate keys, only the first occurrence of
    /// each key is retained.
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> std::result::Result<(), Box<dyn Error>> {
    /// use std::io::Cursor;
    /// use wirebson::{doc, Document};
    ///
    /// let mut v: Vec<u8> = Vec::new();
    /// let doc = doc! { "x" : 1 };
    /// doc.to_writer(&mut v)?;
    ///
    /// let roundtrip = Document::from_reader(Cursor::new(v))?;
    /// assert_eq!(doc, roundtrip);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Document> {
        read_document(&mut reader)
    }
}

/// A view into a single entry in a document, which may either be vacant or
/// occupied.
pub enum Entry<'a> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a>),

    /// A vacant entry.
    Vacant(VacantEntry<'a>),
}

impl<'a> Entry<'a> {
    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &str {
        match self {
            Self::Vacant(v) => v.key(),
            Self::Occupied(o) => o.key(),
        }
    }

    fn into_indexmap_entry(self) -> indexmap::map::Entry<'a, String, Bson> {
        match self {
            Self::Occupied(o) => indexmap::map::Entry::Occupied(o.inner),
            Self::Vacant(v) => indexmap::map::Entry::Vacant(v.inner),
        }
    }

    /// Inserts the given default value in the entry if it is vacant and
    /// returns a mutable reference to it. Otherwise a mutable reference to an
    /// already existent value is returned.
    pub fn or_insert(self, default: Bson) -> &'a mut Bson {
        self.into_indexmap_entry().or_insert(default)
    }

    /// Inserts the result of the `default` function in the entry if it is
    /// vacant and returns a mutable reference to it. Otherwise a mutable
    /// reference to an already existent value is returned.
    pub fn or_insert_with<F: FnOnce() -> Bson>(self, default: F) -> &'a mut Bson {
        self.into_indexmap_entry().or_insert_with(default)
    }
}

/// A view into a vacant entry in a [`Document`]. It is part of the [`Entry`]
/// enum.
pub struct VacantEntry<'a> {
    inner: indexmap::map::VacantEntry<'a, String, Bson>,
}

impl<'a> VacantEntry<'a> {
    fn key(&self) -> &str {
        self.inner.key()
    }
}

/// A view into an occupied entry in a [`Document`]. It is part of the
/// [`Entry`] enum.
pub struct OccupiedEntry<'a> {
    inner: indexmap::map::OccupiedEntry<'a, String, Bson>,
}

impl<'a> OccupiedEntry<'a> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &str {
        self.inner.key()
    }
}

use super::{Iter, RawBsonRef, RawDocument};
use crate::error::Result;

/// A slice of a BSON document containing a BSON array value (akin to
/// [`std::str`]). This is an _unsized_ type and must always be used behind a
/// pointer like `&`.
///
/// On the wire an array is a document whose keys are the decimal
/// representations of `0..N-1` in order; [`RawArray`] is purely a view
/// change over [`RawDocument`] and shares its bytes.
#[derive(PartialEq)]
#[repr(transparent)]
pub struct RawArray {
    doc: RawDocument,
}

impl RawArray {
    pub(crate) fn from_doc(doc: &RawDocument) -> &RawArray {
        // SAFETY: RawArray is repr(transparent) over RawDocument
        unsafe { &*(doc as *const RawDocument as *const RawArray) }
    }

    /// Views this array as the document it is stored as.
    pub fn as_doc(&self) -> &RawDocument {
        &self.doc
    }

    /// Gets the value at the given index, scanning from the front.
    pub fn get(&self, index: usize) -> Result<Option<RawBsonRef<'_>>> {
        for (i, element) in self.into_iter().enumerate() {
            let value = element?;
            if i == index {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Whether the array contains any elements.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    /// Gets a reference to the raw bytes of the array, including the length
    /// prefix and the trailing terminator.
    pub fn as_bytes(&self) -> &[u8] {
        self.doc.as_bytes()
    }
}

impl std::fmt::Debug for RawArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArray")
            .field("data", &hex::encode(self.as_bytes()))
            .finish()
    }
}

/// An iterator over the values of a [`RawArray`]. The wire keys are skipped.
pub struct RawArrayIter<'a> {
    inner: Iter<'a>,
}

impl<'a> Iterator for RawArrayIter<'a> {
    type Item = Result<RawBsonRef<'a>>;

    fn next(&mut self) -> Option<Result<RawBsonRef<'a>>> {
        match self.inner.next() {
            Some(Ok((_, v))) => Some(Ok(v)),
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }
}

impl<'a> IntoIterator for &'a RawArray {
    type IntoIter = RawArrayIter<'a>;
    type Item = Result<RawBsonRef<'a>>;

    fn into_iter(self) -> RawArrayIter<'a> {
        RawArrayIter {
            inner: self.doc.iter(),
        }
    }
}

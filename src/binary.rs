//! Module containing functionality related to BSON binary values.

use std::{
    convert::TryFrom,
    fmt::{self, Display},
};

use crate::{
    error::{Error, Result},
    spec::BinarySubtype,
};

/// Represents a BSON binary value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Binary({:#04x}, {})",
            u8::from(self.subtype),
            crate::base64::encode(&self.bytes)
        )
    }
}

impl Binary {
    /// Creates a [`Binary`] from a subtype byte and a payload, validating the
    /// invariants of the wire format: subtype bytes in the reserved range
    /// `0x08..=0x7F` are rejected, and the UUID subtype requires a payload of
    /// exactly 16 bytes.
    pub fn new(subtype: u8, bytes: Vec<u8>) -> Result<Self> {
        let subtype = BinarySubtype::try_from(subtype)?;
        Self::with_subtype(subtype, bytes)
    }

    pub(crate) fn with_subtype(subtype: BinarySubtype, bytes: Vec<u8>) -> Result<Self> {
        if subtype == BinarySubtype::Uuid && bytes.len() != 16 {
            return Err(Error::invalid_argument(format!(
                "UUID binary value must contain exactly 16 bytes, instead got {}",
                bytes.len()
            )));
        }
        Ok(Self { subtype, bytes })
    }

    /// Creates a [`Binary`] from a base64 string and optional
    /// [`BinarySubtype`]. If the `subtype` argument is `None`, the [`Binary`]
    /// constructed will default to [`BinarySubtype::Generic`].
    pub fn from_base64(
        input: impl AsRef<str>,
        subtype: impl Into<Option<BinarySubtype>>,
    ) -> Result<Self> {
        let bytes = crate::base64::decode(input.as_ref()).map_err(|e| {
            Error::invalid_argument(format!("invalid base64 \"{}\": {}", input.as_ref(), e))
        })?;
        let subtype = subtype.into().unwrap_or(BinarySubtype::Generic);
        Self::with_subtype(subtype, bytes)
    }
}

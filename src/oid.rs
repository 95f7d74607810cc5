//! Module containing functionality related to BSON ObjectIds.
//! For more information, see the documentation for the [`ObjectId`] type.

use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
    time::SystemTime,
};

use once_cell::sync::Lazy;
use rand::{thread_rng, Rng};

use crate::error::{Error, ObjectIdErrorKind, Result};

const TIMESTAMP_SIZE: usize = 4;
const PROCESS_ID_SIZE: usize = 5;
const COUNTER_SIZE: usize = 3;

const TIMESTAMP_OFFSET: usize = 0;
const PROCESS_ID_OFFSET: usize = TIMESTAMP_OFFSET + TIMESTAMP_SIZE;
const COUNTER_OFFSET: usize = PROCESS_ID_OFFSET + PROCESS_ID_SIZE;

const MAX_U24: u32 = 0xFF_FFFF;

pub(crate) static OID_COUNTER: Lazy<AtomicU32> =
    Lazy::new(|| AtomicU32::new(thread_rng().gen_range(0..=MAX_U24)));

static PROCESS_RANDOM_BYTES: Lazy<[u8; PROCESS_ID_SIZE]> = Lazy::new(|| thread_rng().gen());

/// A wrapper around a raw 12-byte ObjectId.
///
/// An ObjectId consists of a 4-byte timestamp (seconds since the Unix epoch),
/// a 5-byte random value generated once per process, and a 3-byte
/// incrementing counter initialized to a random value.
///
/// While the BSON format itself is little-endian, the timestamp and counter
/// are big-endian, with the most significant bytes appearing first in the
/// byte sequence.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct ObjectId {
    id: [u8; 12],
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectId {
    /// Generates a new [`ObjectId`], represented in bytes.
    /// See the [docs](http://www.mongodb.com/docs/manual/reference/object-id/)
    /// for more information.
    pub fn new() -> Self {
        let timestamp = Self::gen_timestamp();
        let process_id = Self::gen_process_id();
        let counter = Self::gen_count();

        let mut buf: [u8; 12] = [0; 12];
        buf[TIMESTAMP_OFFSET..(TIMESTAMP_OFFSET + TIMESTAMP_SIZE)].copy_from_slice(&timestamp);
        buf[PROCESS_ID_OFFSET..(PROCESS_ID_OFFSET + PROCESS_ID_SIZE)].copy_from_slice(&process_id);
        buf[COUNTER_OFFSET..(COUNTER_OFFSET + COUNTER_SIZE)].copy_from_slice(&counter);

        Self::from_bytes(buf)
    }

    /// Constructs a new ObjectId wrapper around the raw byte representation.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self { id: bytes }
    }

    /// Creates an ObjectId using a 12-byte (24-char) hexadecimal string.
    /// The input is matched case-insensitively.
    pub fn parse_str(s: impl AsRef<str>) -> Result<Self> {
        let s = s.as_ref();

        if s.len() != 24 {
            return Err(Error::oid(ObjectIdErrorKind::InvalidHexStringLength {
                length: s.len(),
            }));
        }

        if let Some((index, c)) = s.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit()) {
            return Err(Error::oid(ObjectIdErrorKind::InvalidHexStringCharacter {
                c,
                index,
            }));
        }

        // length and characters are validated above
        let bytes: Vec<u8> = hex::decode(s).map_err(Error::invalid_argument)?;
        let mut byte_array: [u8; 12] = [0; 12];
        byte_array[..].copy_from_slice(&bytes[..]);
        Ok(Self::from_bytes(byte_array))
    }

    /// Retrieves the timestamp from the most significant 4 bytes of an
    /// [`ObjectId`].
    pub fn timestamp(&self) -> crate::DateTime {
        let mut buf = [0; 4];
        buf.copy_from_slice(&self.id[TIMESTAMP_OFFSET..(TIMESTAMP_OFFSET + TIMESTAMP_SIZE)]);
        let seconds_since_epoch = u32::from_be_bytes(buf);

        crate::DateTime::from_millis(seconds_since_epoch as i64 * 1000)
    }

    /// Returns the raw byte representation of an ObjectId.
    pub const fn bytes(&self) -> [u8; 12] {
        self.id
    }

    /// Convert this [`ObjectId`] to its lowercase hex string representation.
    pub fn to_hex(self) -> String {
        hex::encode(self.id)
    }

    // Generates a new timestamp representing the current seconds since epoch.
    fn gen_timestamp() -> [u8; 4] {
        let seconds = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0); // before the epoch

        (seconds as u32).to_be_bytes()
    }

    // Returns the 5-byte random value generated once per process.
    fn gen_process_id() -> [u8; 5] {
        *PROCESS_RANDOM_BYTES
    }

    // Gets an incrementing 3-byte count, wrapping at 2^24.
    fn gen_count() -> [u8; 3] {
        let count = OID_COUNTER.fetch_add(1, Ordering::SeqCst) & MAX_U24;

        let buf = count.to_be_bytes();
        [buf[1], buf[2], buf[3]]
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self { id: bytes }
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}

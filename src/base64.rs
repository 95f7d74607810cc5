//! Standard-alphabet base64, wrapped so call sites stay on the engine API.

use base64::{engine::general_purpose::STANDARD, DecodeError, Engine};

pub(crate) fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(input)
}

pub(crate) fn encode<T: AsRef<[u8]>>(input: T) -> String {
    STANDARD.encode(input)
}

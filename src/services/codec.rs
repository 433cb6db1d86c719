//! Sort-Index Wire Codec
//!
//! The sort-permutation call answers with a raw array of signed 32-bit
//! integers. The request advertises the client's native byte order and the
//! response is decoded accordingly, so the composed integer sequence is
//! machine-correct regardless of client/server endianness.

use crate::domain::RowId;
use crate::error::{Error, Result};

/// Byte order advertised on sort-index requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// The client machine's native byte order
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    /// Wire representation used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ByteOrder::Little => "little",
            ByteOrder::Big => "big",
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a raw `i32` array in the advertised byte order
///
/// A 4-byte payload is one element, never an empty result; ragged payloads
/// are decode failures.
pub fn decode_indices(bytes: &[u8], order: ByteOrder) -> Result<Vec<RowId>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Decode {
            message: format!("index payload of {} bytes is not i32-aligned", bytes.len()),
        });
    }
    let mut indices = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(chunk);
        let value = match order {
            ByteOrder::Little => i32::from_le_bytes(raw),
            ByteOrder::Big => i32::from_be_bytes(raw),
        };
        indices.push(RowId::from(value));
    }
    Ok(indices)
}

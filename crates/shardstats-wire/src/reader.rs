//! Positional wire decoder.

use std::collections::BTreeMap;

use crate::error::{Result, WireError};

/// Positional decoder over a borrowed byte slice.
///
/// Every `read_*` call consumes exactly the bytes of one value and leaves
/// the cursor on the next. Underruns surface as
/// [`WireError::UnexpectedEof`] without moving the cursor past the end.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(WireError::UnexpectedEof {
                needed: n - self.remaining(),
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Decode an LEB128 varint `u64`.
    ///
    /// Rejects encodings longer than 10 bytes and encodings whose 10th
    /// byte carries bits past the 64th.
    pub fn read_var_u64(&mut self) -> Result<u64> {
        let mut x: u64 = 0;
        let mut shift = 0u32;
        for i in 0..10 {
            let b = self.take(1)?[0];
            if b < 0x80 {
                if i == 9 && b > 1 {
                    return Err(WireError::VarintOverflow);
                }
                return Ok(x | (u64::from(b) << shift));
            }
            x |= u64::from(b & 0x7f) << shift;
            shift += 7;
        }
        Err(WireError::VarintOverflow)
    }

    /// Decode an `f32` from 4 little-endian bytes.
    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.take(4)?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(f32::from_le_bytes(arr))
    }

    /// Decode a strict single-byte boolean.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    /// Decode a varint-length-prefixed UTF-8 string.
    pub fn read_str(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// Decode a map written by [`WireWriter::write_map`]: a varint entry
    /// count, then per entry a key string and a value decoded through
    /// `read_value`.
    ///
    /// [`WireWriter::write_map`]: crate::WireWriter::write_map
    pub fn read_map<V>(
        &mut self,
        mut read_value: impl FnMut(&mut Self) -> Result<V>,
    ) -> Result<BTreeMap<String, V>> {
        let count = self.read_len()?;
        let mut map = BTreeMap::new();
        for _ in 0..count {
            let key = self.read_str()?;
            let value = read_value(self)?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn read_len(&mut self) -> Result<usize> {
        let raw = self.read_var_u64()?;
        usize::try_from(raw).map_err(|_| WireError::LengthOverflow(raw))
    }
}

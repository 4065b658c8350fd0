//! Append-only wire encoder.

use std::collections::BTreeMap;

/// Append-only encoder over a growable byte buffer.
///
/// All writes are infallible. The buffer can be inspected with
/// [`as_bytes`](Self::as_bytes) and taken with
/// [`into_bytes`](Self::into_bytes).
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Create an empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a writer with `capacity` bytes preallocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append a `u64` as an LEB128 varint (1–10 bytes, low 7 bits first).
    pub fn write_var_u64(&mut self, mut v: u64) {
        while v >= 0x80 {
            self.buf.push(v as u8 | 0x80);
            v >>= 7;
        }
        self.buf.push(v as u8);
    }

    /// Append an `f32` as 4 little-endian bytes.
    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Append a boolean as a single 0/1 byte.
    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    /// Append a string as a varint byte length followed by UTF-8 bytes.
    pub fn write_str(&mut self, s: &str) {
        self.write_var_u64(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Append a map as a varint entry count, then per entry the key string
    /// followed by the value written through `write_value`.
    ///
    /// Entries are written in the map's iteration order, which for
    /// `BTreeMap` is ascending key order.
    pub fn write_map<V>(
        &mut self,
        map: &BTreeMap<String, V>,
        mut write_value: impl FnMut(&mut Self, &V),
    ) {
        self.write_var_u64(map.len() as u64);
        for (key, value) in map {
            self.write_str(key);
            write_value(self, value);
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

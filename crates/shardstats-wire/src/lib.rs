//! Binary stream primitives for shardstats payloads.
//!
//! This crate provides the positional reader/writer pair that statistics
//! payloads are carried over:
//! - [`WireWriter`] — append-only encoder over a growable byte buffer
//! - [`WireReader`] — positional decoder over a borrowed byte slice
//! - [`Encode`] / [`Decode`] — the traits payload types implement
//!
//! The encoding is deliberately small: LEB128 varints for unsigned
//! integers, little-endian bytes for `f32`, a strict single-byte boolean,
//! varint-length-prefixed UTF-8 strings, and varint-count-prefixed maps
//! whose values are written through a caller-supplied callback.
//!
//! Readers are positional: decoding consumes exactly the bytes a value
//! occupies and leaves the cursor on the next one, so payloads compose
//! inside larger streams. Trailing bytes are the caller's business.

#![forbid(unsafe_code)]

mod error;
mod reader;
mod writer;

pub use error::{Result, WireError};
pub use reader::WireReader;
pub use writer::WireWriter;

/// A value that can be appended to a [`WireWriter`].
///
/// Encoding is infallible: the writer grows its buffer as needed.
pub trait Encode {
    /// Append this value's wire representation to `w`.
    fn encode(&self, w: &mut WireWriter);
}

/// A value that can be decoded from a [`WireReader`].
pub trait Decode: Sized {
    /// Decode one value, advancing the reader past it.
    fn decode(r: &mut WireReader<'_>) -> Result<Self>;
}

/// Encode `value` into a fresh byte vector.
#[must_use]
pub fn to_bytes<T: Encode>(value: &T) -> Vec<u8> {
    let mut w = WireWriter::new();
    value.encode(&mut w);
    w.into_bytes()
}

/// Decode a `T` from the front of `buf`.
///
/// Bytes past the decoded value are ignored; use [`WireReader`] directly
/// when the remainder matters.
pub fn from_bytes<T: Decode>(buf: &[u8]) -> Result<T> {
    let mut r = WireReader::new(buf);
    T::decode(&mut r)
}

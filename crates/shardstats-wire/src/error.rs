//! Error types for wire decoding.

use thiserror::Error;

/// Result type alias for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors that can occur while decoding a wire payload.
///
/// Encoding never fails; every variant here is produced by a reader
/// handed a truncated or malformed buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The buffer ended before the value did.
    #[error("unexpected end of input: needed {needed} more byte(s), {remaining} left")]
    UnexpectedEof {
        /// Bytes the decoder still needed.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A varint ran past the 10-byte limit for a `u64` or overflowed it.
    #[error("varint does not fit in 64 bits")]
    VarintOverflow,

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A length-prefixed string held invalid UTF-8.
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A declared length does not fit in this platform's `usize`.
    #[error("declared length {0} exceeds addressable size")]
    LengthOverflow(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        let eof = WireError::UnexpectedEof {
            needed: 4,
            remaining: 1,
        };
        assert_eq!(
            eof.to_string(),
            "unexpected end of input: needed 4 more byte(s), 1 left"
        );
        assert_eq!(
            WireError::InvalidBool(0x02).to_string(),
            "invalid boolean byte 0x02"
        );
    }
}

//! Error types for the wire-message boundary.
//!
//! The bus itself is infallible by design: duplicate subscriptions, unknown
//! unsubscribes, and subscriber-less publishes are all no-ops. Errors only
//! arise when decoding wire frames.

use thiserror::Error;

use crate::wire::Command;

/// Failure while decoding a wire frame or one of its fields.
///
/// `Clone` because lazily-parsed messages cache the decode outcome and
/// re-surface it on every field access.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended inside an item.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd {
        /// Offset at which more bytes were required.
        offset: usize,
    },

    /// Bytes remained after the top-level item.
    #[error("trailing bytes after offset {offset}")]
    TrailingBytes {
        /// Offset of the first trailing byte.
        offset: usize,
    },

    /// A nested item crossed its enclosing list's boundary.
    #[error("nested item overruns its list at offset {offset}")]
    Overrun {
        /// Offset of the offending item.
        offset: usize,
    },

    /// A length prefix does not fit the platform's address width.
    #[error("length prefix at offset {offset} overflows")]
    LengthOverflow {
        /// Offset of the length prefix.
        offset: usize,
    },

    /// A byte-string field was required but a list was found.
    #[error("expected a byte string, found a list")]
    ExpectedBytes,

    /// A list was required but a byte string was found.
    #[error("expected a list, found a byte string")]
    ExpectedList,

    /// An unsigned integer field is wider than its type allows.
    #[error("unsigned integer field wider than {max_bytes} bytes")]
    UintOverflow {
        /// Maximum width the field accepts.
        max_bytes: usize,
    },

    /// The command-identifier byte does not match the expected command.
    #[error("command mismatch: expected {expected} ({:#04x}), found {found:#04x}", .expected.as_byte())]
    CommandMismatch {
        /// Command the decoder was asked to verify.
        expected: Command,
        /// Identifier byte actually present.
        found: u8,
    },

    /// The message list has the wrong number of fields.
    #[error("message has {found} field(s), expected {expected}")]
    FieldCount {
        /// Field count the message format defines.
        expected: usize,
        /// Field count found in the frame.
        found: usize,
    },
}

impl DecodeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DecodeError::UnexpectedEnd { .. } => "decode_unexpected_end",
            DecodeError::TrailingBytes { .. } => "decode_trailing_bytes",
            DecodeError::Overrun { .. } => "decode_overrun",
            DecodeError::LengthOverflow { .. } => "decode_length_overflow",
            DecodeError::ExpectedBytes => "decode_expected_bytes",
            DecodeError::ExpectedList => "decode_expected_list",
            DecodeError::UintOverflow { .. } => "decode_uint_overflow",
            DecodeError::CommandMismatch { .. } => "decode_command_mismatch",
            DecodeError::FieldCount { .. } => "decode_field_count",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = DecodeError::CommandMismatch {
            expected: Command::GetBlockHashes,
            found: 0x02,
        };
        assert_eq!(err.as_label(), "decode_command_mismatch");
        assert!(err.to_string().contains("GET_BLOCK_HASHES"));
    }
}

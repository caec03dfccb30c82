//! # Wire messages: the shared contract and the block-hashes request.
//!
//! Every message kind follows one shape: an encoded frame that is a
//! length-prefixed list whose first element is the command-identifier byte,
//! followed by the message's typed fields in fixed order. [`WireMessage`]
//! captures the shared surface; [`GetBlockHashes`] is the reference
//! implementation the surrounding protocol layer's other kinds mirror.
//!
//! ## Lazy parsing
//! A message built from raw network bytes defers decoding until a typed
//! field is first accessed; the outcome (fields or error) is cached, so a
//! malformed frame reports the same [`DecodeError`] on every access. A
//! message built from typed fields encodes eagerly and its getters never
//! fail.

use std::fmt;
use std::sync::OnceLock;

use bytes::Bytes;

use crate::error::DecodeError;
use crate::wire::codec;
use crate::wire::command::Command;

/// Common surface of every encoded protocol message.
pub trait WireMessage: fmt::Display + Send + Sync {
    /// The command this message carries.
    fn command(&self) -> Command;

    /// The full encoded frame, command byte included.
    fn encoded(&self) -> &Bytes;
}

#[derive(Debug, Clone)]
struct Fields {
    hash: Bytes,
    max_blocks: u32,
}

/// Request for a run of block hashes starting from a parent hash.
///
/// Frame layout: `[command, hash, max_blocks]`. The peer may return fewer
/// hashes than `max_blocks`.
pub struct GetBlockHashes {
    encoded: Bytes,
    fields: OnceLock<Result<Fields, DecodeError>>,
}

impl GetBlockHashes {
    /// Builds the message from typed fields and encodes it immediately.
    pub fn new(hash: impl Into<Bytes>, max_blocks: u32) -> Self {
        let hash = hash.into();
        let encoded = Bytes::from(codec::encode_list(&[
            codec::encode_bytes(&[Command::GetBlockHashes.as_byte()]),
            codec::encode_bytes(&hash),
            codec::encode_uint(u64::from(max_blocks)),
        ]));

        let fields = OnceLock::new();
        let _ = fields.set(Ok(Fields { hash, max_blocks }));
        Self { encoded, fields }
    }

    /// Wraps raw frame bytes; decoding is deferred to the first field access.
    pub fn from_encoded(encoded: impl Into<Bytes>) -> Self {
        Self {
            encoded: encoded.into(),
            fields: OnceLock::new(),
        }
    }

    /// The parent hash to descend from.
    pub fn hash(&self) -> Result<&[u8], DecodeError> {
        Ok(&self.fields()?.hash)
    }

    /// The maximum number of hashes the peer should return.
    pub fn max_blocks(&self) -> Result<u32, DecodeError> {
        Ok(self.fields()?.max_blocks)
    }

    fn fields(&self) -> Result<&Fields, DecodeError> {
        self.fields
            .get_or_init(|| Self::parse(&self.encoded))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn parse(encoded: &[u8]) -> Result<Fields, DecodeError> {
        let top = codec::decode(encoded)?;
        let items = top.as_list()?;
        if items.len() != 3 {
            return Err(DecodeError::FieldCount {
                expected: 3,
                found: items.len(),
            });
        }

        let command = items[0].as_bytes()?;
        match command.first() {
            Some(&byte) if byte == Command::GetBlockHashes.as_byte() => {}
            other => {
                return Err(DecodeError::CommandMismatch {
                    expected: Command::GetBlockHashes,
                    found: other.copied().unwrap_or_default(),
                });
            }
        }

        let hash = Bytes::copy_from_slice(items[1].as_bytes()?);

        let raw_max = items[2].as_bytes()?;
        if raw_max.len() > 4 {
            return Err(DecodeError::UintOverflow { max_bytes: 4 });
        }
        let max_blocks = raw_max.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));

        Ok(Fields { hash, max_blocks })
    }
}

impl WireMessage for GetBlockHashes {
    fn command(&self) -> Command {
        Command::GetBlockHashes
    }

    fn encoded(&self) -> &Bytes {
        &self.encoded
    }
}

impl fmt::Display for GetBlockHashes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fields() {
            Ok(fields) => write!(
                f,
                "[{} hash={} max_blocks={}]",
                self.command(),
                hex::encode(&fields.hash),
                fields.max_blocks
            ),
            Err(err) => write!(f, "[{} <malformed: {err}>]", self.command()),
        }
    }
}

impl fmt::Debug for GetBlockHashes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hash() -> Bytes {
        let mut hash = [0u8; 32];
        hash[31] = 0x01;
        Bytes::copy_from_slice(&hash)
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let message = GetBlockHashes::new(sample_hash(), 5);
        let reparsed = GetBlockHashes::from_encoded(message.encoded().clone());

        assert_eq!(reparsed.hash().unwrap(), &sample_hash()[..]);
        assert_eq!(reparsed.max_blocks().unwrap(), 5);
        assert_eq!(reparsed.command(), Command::GetBlockHashes);
    }

    #[test]
    fn test_command_mismatch_fails() {
        let frame = codec::encode_list(&[
            codec::encode_bytes(&[Command::Ping.as_byte()]),
            codec::encode_bytes(&sample_hash()),
            codec::encode_uint(5),
        ]);

        let message = GetBlockHashes::from_encoded(frame);
        assert_eq!(
            message.hash().unwrap_err(),
            DecodeError::CommandMismatch {
                expected: Command::GetBlockHashes,
                found: Command::Ping.as_byte(),
            }
        );
    }

    #[test]
    fn test_decode_outcome_is_cached() {
        let message = GetBlockHashes::from_encoded(Bytes::from_static(&[0xff, 0x00]));

        let first = message.hash().unwrap_err();
        let second = message.max_blocks().unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_field_count_fails() {
        let frame = codec::encode_list(&[codec::encode_bytes(&[
            Command::GetBlockHashes.as_byte()
        ])]);

        let message = GetBlockHashes::from_encoded(frame);
        assert_eq!(
            message.hash().unwrap_err(),
            DecodeError::FieldCount {
                expected: 3,
                found: 1,
            }
        );
    }

    #[test]
    fn test_display_renders_fields() {
        let message = GetBlockHashes::new(Bytes::from_static(&[0xab, 0xcd]), 42);
        assert_eq!(
            message.to_string(),
            "[GET_BLOCK_HASHES hash=abcd max_blocks=42]"
        );
    }

    #[test]
    fn test_display_survives_malformed_frames() {
        let message = GetBlockHashes::from_encoded(Bytes::from_static(&[0xc1]));
        assert!(message.to_string().contains("<malformed"));
    }

    #[test]
    fn test_max_blocks_wider_than_u32_fails() {
        let frame = codec::encode_list(&[
            codec::encode_bytes(&[Command::GetBlockHashes.as_byte()]),
            codec::encode_bytes(&sample_hash()),
            codec::encode_bytes(&[0x01, 0x02, 0x03, 0x04, 0x05]),
        ]);

        let message = GetBlockHashes::from_encoded(frame);
        assert_eq!(
            message.max_blocks().unwrap_err(),
            DecodeError::UintOverflow { max_bytes: 4 }
        );
    }
}

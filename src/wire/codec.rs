//! # Length-prefixed recursive list codec.
//!
//! Every wire message body is one ordered, recursive binary list: items are
//! byte strings or nested lists, each introduced by a length prefix. This is
//! the single shared encode/decode contract every message kind builds on.
//!
//! ## Encoding rules
//! ```text
//! byte string, 1 byte < 0x80      the byte itself
//! byte string, 0..=55 bytes       0x80 + len, payload
//! byte string, longer             0xb7 + len-of-len, big-endian len, payload
//! list, payload 0..=55 bytes      0xc0 + len, concatenated items
//! list, longer                    0xf7 + len-of-len, big-endian len, items
//! ```
//!
//! Unsigned integers travel as minimal big-endian byte strings; zero is the
//! empty string.
//!
//! ## Rules
//! - [`decode`] consumes the whole input: trailing bytes are an error.
//! - Truncated input, boundary-crossing nested items, and oversized length
//!   prefixes fail fast with a [`DecodeError`].

use bytes::Bytes;

use crate::error::DecodeError;

const MAX_SHORT: usize = 55;
const STR_SHORT: u8 = 0x80;
const STR_LONG: u8 = 0xb7;
const LIST_SHORT: u8 = 0xc0;
const LIST_LONG: u8 = 0xf7;

/// One decoded item: a byte string or a nested list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A byte string.
    Bytes(Bytes),
    /// A nested list of items.
    List(Vec<Item>),
}

impl Item {
    /// The byte string this item holds.
    pub fn as_bytes(&self) -> Result<&[u8], DecodeError> {
        match self {
            Item::Bytes(bytes) => Ok(bytes),
            Item::List(_) => Err(DecodeError::ExpectedBytes),
        }
    }

    /// The nested list this item holds.
    pub fn as_list(&self) -> Result<&[Item], DecodeError> {
        match self {
            Item::List(items) => Ok(items),
            Item::Bytes(_) => Err(DecodeError::ExpectedList),
        }
    }

    /// Interprets the item as a big-endian unsigned integer (empty = 0).
    pub fn as_uint(&self) -> Result<u64, DecodeError> {
        let raw = self.as_bytes()?;
        if raw.len() > 8 {
            return Err(DecodeError::UintOverflow { max_bytes: 8 });
        }
        Ok(raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }
}

/// Encodes a byte string.
pub fn encode_bytes(payload: &[u8]) -> Vec<u8> {
    match payload {
        [byte] if *byte < STR_SHORT => vec![*byte],
        _ if payload.len() <= MAX_SHORT => {
            let mut out = Vec::with_capacity(1 + payload.len());
            out.push(STR_SHORT + payload.len() as u8);
            out.extend_from_slice(payload);
            out
        }
        _ => {
            let len = be_bytes(payload.len() as u64);
            let mut out = Vec::with_capacity(1 + len.len() + payload.len());
            out.push(STR_LONG + len.len() as u8);
            out.extend_from_slice(&len);
            out.extend_from_slice(payload);
            out
        }
    }
}

/// Encodes an unsigned integer as a minimal big-endian byte string.
pub fn encode_uint(value: u64) -> Vec<u8> {
    if value == 0 {
        encode_bytes(&[])
    } else {
        encode_bytes(&be_bytes(value))
    }
}

/// Encodes a list from already-encoded items, in order.
pub fn encode_list<I: AsRef<[u8]>>(items: &[I]) -> Vec<u8> {
    let payload_len: usize = items.iter().map(|item| item.as_ref().len()).sum();

    let mut out;
    if payload_len <= MAX_SHORT {
        out = Vec::with_capacity(1 + payload_len);
        out.push(LIST_SHORT + payload_len as u8);
    } else {
        let len = be_bytes(payload_len as u64);
        out = Vec::with_capacity(1 + len.len() + payload_len);
        out.push(LIST_LONG + len.len() as u8);
        out.extend_from_slice(&len);
    }
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
    out
}

/// Decodes exactly one item spanning the whole input.
pub fn decode(input: &[u8]) -> Result<Item, DecodeError> {
    let (item, next) = decode_at(input, 0)?;
    if next != input.len() {
        return Err(DecodeError::TrailingBytes { offset: next });
    }
    Ok(item)
}

/// Decodes the item starting at `offset`; returns it and the offset just past it.
fn decode_at(input: &[u8], offset: usize) -> Result<(Item, usize), DecodeError> {
    let first = *input
        .get(offset)
        .ok_or(DecodeError::UnexpectedEnd { offset })?;

    match first {
        0x00..=0x7f => Ok((Item::Bytes(Bytes::copy_from_slice(&[first])), offset + 1)),
        0x80..=0xb7 => {
            let len = usize::from(first - STR_SHORT);
            let payload = take(input, offset + 1, len)?;
            Ok((Item::Bytes(Bytes::copy_from_slice(payload)), offset + 1 + len))
        }
        0xb8..=0xbf => {
            let len_width = usize::from(first - STR_LONG);
            let (len, start) = read_len(input, offset + 1, len_width)?;
            let payload = take(input, start, len)?;
            Ok((Item::Bytes(Bytes::copy_from_slice(payload)), start + len))
        }
        0xc0..=0xf7 => {
            let len = usize::from(first - LIST_SHORT);
            decode_children(input, offset + 1, len)
        }
        0xf8..=0xff => {
            let len_width = usize::from(first - LIST_LONG);
            let (len, start) = read_len(input, offset + 1, len_width)?;
            decode_children(input, start, len)
        }
    }
}

fn decode_children(
    input: &[u8],
    start: usize,
    payload_len: usize,
) -> Result<(Item, usize), DecodeError> {
    let end = start
        .checked_add(payload_len)
        .ok_or(DecodeError::LengthOverflow { offset: start })?;
    if end > input.len() {
        return Err(DecodeError::UnexpectedEnd { offset: input.len() });
    }

    let mut items = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let at = cursor;
        let (item, next) = decode_at(input, cursor)?;
        if next > end {
            return Err(DecodeError::Overrun { offset: at });
        }
        items.push(item);
        cursor = next;
    }
    Ok((Item::List(items), end))
}

fn read_len(input: &[u8], offset: usize, width: usize) -> Result<(usize, usize), DecodeError> {
    if width > std::mem::size_of::<usize>() {
        return Err(DecodeError::LengthOverflow { offset });
    }
    let raw = take(input, offset, width)?;
    let len = raw.iter().fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
    Ok((len, offset + width))
}

fn take(input: &[u8], offset: usize, len: usize) -> Result<&[u8], DecodeError> {
    let end = offset
        .checked_add(len)
        .ok_or(DecodeError::LengthOverflow { offset })?;
    input
        .get(offset..end)
        .ok_or(DecodeError::UnexpectedEnd { offset: input.len() })
}

fn be_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    bytes[skip..].to_vec()
}

//! SCALE serialization for on-chain proposal data.
//!
//! Wire conventions:
//! - Fixed-width integers little-endian
//! - `Option<T>`: one presence byte (0x00 absent, 0x01 present) then `T`
//! - Enums: one variant-index byte then the variant payload
//! - Sequences and text: compact length prefix then the elements
//!
//! Typed values go through `parity-scale-codec`'s derived impls. Errors are
//! re-wrapped with the byte offset at which decoding stopped so a protocol
//! mismatch can be located in the payload.

use codec::{Decode, Encode};
use thiserror::Error;

/// Decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before the value was complete.
    #[error("unexpected end of input at byte {offset}")]
    Truncated { offset: usize },

    /// Variant index outside the declared arms.
    ///
    /// `arms` is `None` when the derived codec rejected the tag; it does not
    /// report how many arms the enum has.
    #[error("invalid variant tag {found} for `{type_name}` at byte {offset}{}", arms_note(.arms))]
    InvalidVariant {
        type_name: String,
        offset: usize,
        found: u8,
        arms: Option<usize>,
    },

    /// Compact length prefix larger than the bytes that remain.
    #[error("length prefix {length} at byte {offset} exceeds the {remaining} remaining bytes")]
    InvalidLength {
        offset: usize,
        length: u64,
        remaining: usize,
    },

    /// Compact integer could not be read.
    #[error("invalid compact integer at byte {offset}")]
    InvalidCompact { offset: usize },

    /// Text payload is not UTF-8.
    #[error("invalid UTF-8 text at byte {offset}")]
    InvalidText { offset: usize },

    /// Bytes left over after a complete value.
    #[error("{remaining} trailing bytes after value ending at byte {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    /// Named references nest deeper than the decoder allows.
    #[error("schema nesting too deep at byte {offset}")]
    RecursionLimit { offset: usize },

    /// Any other codec failure for a typed value.
    #[error("could not decode `{type_name}` at byte {offset}: {reason}")]
    Malformed {
        type_name: String,
        offset: usize,
        reason: String,
    },
}

impl DecodeError {
    /// Byte offset into the input at which decoding failed.
    pub fn offset(&self) -> usize {
        match self {
            Self::Truncated { offset }
            | Self::InvalidVariant { offset, .. }
            | Self::InvalidLength { offset, .. }
            | Self::InvalidCompact { offset }
            | Self::InvalidText { offset }
            | Self::TrailingBytes { offset, .. }
            | Self::RecursionLimit { offset }
            | Self::Malformed { offset, .. } => *offset,
        }
    }
}

/// Serialize to SCALE bytes.
///
/// Infallible: every in-memory value of a codec type has an encoding.
pub fn encode<T: Encode>(value: &T) -> Vec<u8> {
    value.encode()
}

/// Deserialize one value from the front of `bytes`.
///
/// Returns the value and the unconsumed remainder, so composite payloads can
/// be decoded field by field.
pub fn decode<T: Decode>(bytes: &[u8]) -> Result<(T, &[u8]), DecodeError> {
    let mut input = bytes;
    match T::decode(&mut input) {
        Ok(value) => Ok((value, input)),
        Err(e) => Err(classify::<T>(bytes, bytes.len() - input.len(), e)),
    }
}

/// Deserialize a value that must span all of `bytes`.
pub fn decode_all<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    let (value, rest) = decode::<T>(bytes)?;
    if !rest.is_empty() {
        return Err(DecodeError::TrailingBytes {
            offset: bytes.len() - rest.len(),
            remaining: rest.len(),
        });
    }
    Ok(value)
}

fn arms_note(arms: &Option<usize>) -> String {
    match arms {
        Some(arms) => format!(" ({} arms declared)", arms),
        None => String::new(),
    }
}

/// Map a derived-codec failure onto `DecodeError`.
///
/// `consumed` is how far the codec read before failing. A rejected variant
/// tag is the last byte it read.
fn classify<T>(bytes: &[u8], consumed: usize, error: codec::Error) -> DecodeError {
    let reason = error.to_string();
    if reason.contains("Not enough data") {
        return DecodeError::Truncated { offset: consumed };
    }

    if reason.contains("variant doesn't exist") {
        if let Some(tag_offset) = consumed.checked_sub(1) {
            if let Some(&found) = bytes.get(tag_offset) {
                return DecodeError::InvalidVariant {
                    type_name: quoted_name(&reason).unwrap_or_else(short_type_name::<T>),
                    offset: tag_offset,
                    found,
                    arms: None,
                };
            }
        }
    }

    DecodeError::Malformed {
        type_name: short_type_name::<T>(),
        offset: consumed,
        reason,
    }
}

/// The enum the codec names in "Could not decode `Name`, ...".
fn quoted_name(reason: &str) -> Option<String> {
    let start = reason.find('`')? + 1;
    let len = reason[start..].find('`')?;
    Some(reason[start..start + len].to_string())
}

/// `std::any::type_name` with module paths dropped:
/// `alloc::vec::Vec<(u64, my_crate::VoteKind)>` becomes `Vec<(u64, VoteKind)>`.
fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(last_segment(&segment));
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(last_segment(&segment));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

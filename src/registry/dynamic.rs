//! Shape-driven SCALE decoding and encoding.
//!
//! Named references are resolved against the registry when they are reached,
//! not when the referring schema is registered.

use super::{SchemaError, SchemaRegistry, Shape, Value};
use crate::serialization::DecodeError;
use codec::{Compact, Decode, Encode};

/// Maximum nesting of named references during one decode/encode.
pub const MAX_DEPTH: usize = 64;

pub(crate) struct Decoder<'r, 'b> {
    registry: &'r SchemaRegistry,
    bytes: &'b [u8],
    pos: usize,
    depth: usize,
}

impl<'r, 'b> Decoder<'r, 'b> {
    pub(crate) fn new(registry: &'r SchemaRegistry, bytes: &'b [u8]) -> Self {
        Self {
            registry,
            bytes,
            pos: 0,
            depth: 0,
        }
    }

    /// Unconsumed input.
    pub(crate) fn remainder(&self) -> &'b [u8] {
        &self.bytes[self.pos..]
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn decode(&mut self, shape: &Shape, context: &str) -> Result<Value, SchemaError> {
        let value = match shape {
            Shape::Null => Value::Null,
            Shape::U8 => Value::U8(self.read_fixed()?),
            Shape::U16 => Value::U16(self.read_fixed()?),
            Shape::U32 => Value::U32(self.read_fixed()?),
            Shape::U64 => Value::U64(self.read_fixed()?),
            Shape::U128 => Value::U128(self.read_fixed()?),
            Shape::AccountId => Value::AccountId(self.read_fixed()?),
            Shape::Text => {
                let start = self.pos;
                let bytes = self.read_prefixed_bytes()?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| DecodeError::InvalidText { offset: start })?;
                Value::Text(text)
            }
            Shape::Option(inner) => {
                let offset = self.pos;
                match self.read_fixed::<u8>()? {
                    0 => Value::Option(None),
                    1 => Value::Option(Some(Box::new(self.decode(inner, context)?))),
                    found => {
                        return Err(DecodeError::InvalidVariant {
                            type_name: format!("{}: Option", context),
                            offset,
                            found,
                            arms: Some(2),
                        }
                        .into())
                    }
                }
            }
            Shape::Vec(inner) if **inner == Shape::U8 => Value::Bytes(self.read_prefixed_bytes()?),
            Shape::Vec(inner) => {
                let registry = self.registry;
                let len = self.read_length(registry.min_encoded_len(inner))?;
                // Capacity bounded by input size, not by the claimed length
                let mut items = Vec::with_capacity(len.min(self.remaining()));
                for _ in 0..len {
                    items.push(self.decode(inner, context)?);
                }
                Value::Seq(items)
            }
            Shape::Tuple(items) => Value::Tuple(
                items
                    .iter()
                    .map(|item| self.decode(item, context))
                    .collect::<Result<_, _>>()?,
            ),
            Shape::Struct(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for (name, field) in fields {
                    values.push((name.clone(), self.decode(field, context)?));
                }
                Value::Struct(values)
            }
            Shape::Enum(arms) => {
                let offset = self.pos;
                let index = self.read_fixed::<u8>()?;
                let (name, payload) = arms.get(usize::from(index)).ok_or_else(|| {
                    DecodeError::InvalidVariant {
                        type_name: context.to_string(),
                        offset,
                        found: index,
                        arms: Some(arms.len()),
                    }
                })?;
                Value::Variant {
                    index,
                    name: name.clone(),
                    payload: Box::new(self.decode(payload, context)?),
                }
            }
            Shape::Named(name) => {
                let registry = self.registry;
                let resolved = registry.lookup(name)?;
                if self.depth >= MAX_DEPTH {
                    return Err(DecodeError::RecursionLimit { offset: self.pos }.into());
                }
                self.depth += 1;
                let value = self.decode(resolved, name);
                self.depth -= 1;
                value?
            }
        };
        Ok(value)
    }

    fn read_fixed<T: Decode>(&mut self) -> Result<T, DecodeError> {
        let mut input = self.remainder();
        let before = input.len();
        let value = T::decode(&mut input).map_err(|_| DecodeError::Truncated { offset: self.pos })?;
        self.pos += before - input.len();
        Ok(value)
    }

    /// Compact length prefix, checked against the bytes that remain.
    ///
    /// Items are counted as at least one byte each, so a sequence of
    /// zero-size items can claim no more items than there are bytes left.
    fn read_length(&mut self, min_item_len: usize) -> Result<usize, DecodeError> {
        let offset = self.pos;
        let mut input = self.remainder();
        let before = input.len();
        let Compact(length) = <Compact<u32>>::decode(&mut input).map_err(|_| {
            if before == 0 {
                DecodeError::Truncated { offset }
            } else {
                DecodeError::InvalidCompact { offset }
            }
        })?;
        self.pos += before - input.len();

        let needed = u64::from(length).saturating_mul(min_item_len.max(1) as u64);
        if needed > self.remaining() as u64 {
            return Err(DecodeError::InvalidLength {
                offset,
                length: u64::from(length),
                remaining: self.remaining(),
            });
        }
        Ok(length as usize)
    }

    fn read_prefixed_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_length(1)?;
        let bytes = self.bytes[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(bytes)
    }
}

pub(crate) struct Encoder<'r> {
    registry: &'r SchemaRegistry,
    out: Vec<u8>,
    depth: usize,
}

impl<'r> Encoder<'r> {
    pub(crate) fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            out: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.out
    }

    pub(crate) fn encode(&mut self, shape: &Shape, value: &Value) -> Result<(), SchemaError> {
        match (shape, value) {
            (Shape::Null, Value::Null) => {}
            (Shape::U8, Value::U8(v)) => v.encode_to(&mut self.out),
            (Shape::U16, Value::U16(v)) => v.encode_to(&mut self.out),
            (Shape::U32, Value::U32(v)) => v.encode_to(&mut self.out),
            (Shape::U64, Value::U64(v)) => v.encode_to(&mut self.out),
            (Shape::U128, Value::U128(v)) => v.encode_to(&mut self.out),
            (Shape::AccountId, Value::AccountId(v)) => self.out.extend_from_slice(v),
            (Shape::Text, Value::Text(s)) => self.write_prefixed_bytes(s.as_bytes())?,
            (Shape::Option(_), Value::Option(None)) => self.out.push(0),
            (Shape::Option(inner), Value::Option(Some(v))) => {
                self.out.push(1);
                self.encode(inner, v)?;
            }
            (Shape::Vec(inner), Value::Bytes(bytes)) if **inner == Shape::U8 => {
                self.write_prefixed_bytes(bytes)?
            }
            (Shape::Vec(inner), Value::Seq(items)) => {
                self.write_length(items.len())?;
                for item in items {
                    self.encode(inner, item)?;
                }
            }
            (Shape::Tuple(shapes), Value::Tuple(items)) if shapes.len() == items.len() => {
                for (shape, item) in shapes.iter().zip(items) {
                    self.encode(shape, item)?;
                }
            }
            (Shape::Struct(fields), Value::Struct(values)) => {
                for (name, field) in fields {
                    let value = values
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, v)| v)
                        .ok_or_else(|| SchemaError::ValueMismatch {
                            expected: format!("field `{}`", name),
                            found: "missing field".to_string(),
                        })?;
                    self.encode(field, value)?;
                }
            }
            (Shape::Enum(arms), Value::Variant { name, payload, .. }) => {
                let (index, (_, arm)) = arms
                    .iter()
                    .enumerate()
                    .find(|(_, (arm_name, _))| arm_name == name)
                    .ok_or_else(|| SchemaError::ValueMismatch {
                        expected: shape.to_string(),
                        found: format!("variant `{}`", name),
                    })?;
                // Arm count is bounded by the one-byte tag
                let index = u8::try_from(index).map_err(|_| SchemaError::ValueMismatch {
                    expected: "at most 256 arms".to_string(),
                    found: format!("arm index {}", index),
                })?;
                self.out.push(index);
                self.encode(arm, payload)?;
            }
            (Shape::Named(name), value) => {
                let registry = self.registry;
                let resolved = registry.lookup(name)?;
                if self.depth >= MAX_DEPTH {
                    return Err(DecodeError::RecursionLimit {
                        offset: self.out.len(),
                    }
                    .into());
                }
                self.depth += 1;
                let result = self.encode(resolved, value);
                self.depth -= 1;
                result?
            }
            (shape, value) => {
                return Err(SchemaError::ValueMismatch {
                    expected: shape.to_string(),
                    found: value.kind().to_string(),
                })
            }
        }
        Ok(())
    }

    fn write_length(&mut self, len: usize) -> Result<(), SchemaError> {
        let len = u32::try_from(len).map_err(|_| SchemaError::ValueMismatch {
            expected: "length within u32".to_string(),
            found: format!("length {}", len),
        })?;
        Compact(len).encode_to(&mut self.out);
        Ok(())
    }

    fn write_prefixed_bytes(&mut self, bytes: &[u8]) -> Result<(), SchemaError> {
        self.write_length(bytes.len())?;
        self.out.extend_from_slice(bytes);
        Ok(())
    }
}

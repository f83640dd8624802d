//! Schema Registry - Named Type Shapes for Chain Payloads
//!
//! Maps a type name (as it appears in runtime metadata and call payloads) to
//! the [`Shape`] used to decode it. Lookups happen by string name so a payload
//! type can be resolved from chain metadata at runtime.
//!
//! ## Two Paths
//!
//! - **Typed**: Rust entities implement [`Schema`], which ties a compile-time
//!   type to its registered name. [`SchemaRegistry::decode_typed`] checks the
//!   registered shape still matches the type, then uses the derived codec.
//! - **Dynamic**: [`SchemaRegistry::decode`] walks the registered shape and
//!   produces a [`Value`] tree. Needed for types declared only at runtime
//!   (e.g. in the config file).
//!
//! ## Key Design Decisions
//!
//! 1. **Forward References**: A shape may name a schema that is registered
//!    later. Names are resolved at decode time, never at registration time.
//!
//! 2. **Conflict Detection**: Re-registering a name with the same shape is a
//!    no-op. Re-registering it with a different shape is a
//!    [`SchemaError::Conflict`]; the existing entry is kept.
//!
//! 3. **Read-Only After Start-Up**: Registration takes `&mut self`; share the
//!    finished registry by reference (or `Arc`) and pass it to whoever decodes.

pub mod dynamic;
pub mod shape;
pub mod value;

pub use shape::{Shape, ShapeParseError};
pub use value::Value;

use crate::serialization::{self, DecodeError};
use codec::{Decode, Encode};
use dynamic::{Decoder, Encoder};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Name already registered with a different shape.
    #[error("schema `{name}` already registered as `{existing}`, refusing `{attempted}`")]
    Conflict {
        name: String,
        existing: String,
        attempted: String,
    },

    /// Name not registered.
    #[error("schema `{name}` not found")]
    NotFound { name: String },

    /// Type expression could not be parsed.
    #[error(transparent)]
    Parse(#[from] ShapeParseError),

    /// Payload does not decode against the schema.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Value does not fit the schema it is encoded against.
    #[error("value does not match schema: expected {expected}, found {found}")]
    ValueMismatch { expected: String, found: String },

    /// Registered shape differs from the Rust type claiming the name.
    #[error("schema `{name}` is registered with a shape that differs from its Rust type")]
    TypeMismatch { name: String },
}

/// A Rust type with a registered wire shape.
///
/// `NAME` is the registry key; `shape()` must describe exactly what the
/// derived `Encode`/`Decode` impls produce.
pub trait Schema: Encode + Decode {
    const NAME: &'static str;

    fn shape() -> Shape;
}

/// Registry of named schemas.
///
/// # Semantics
///
/// - **Idempotent**: registering an identical shape twice is a no-op
/// - **Conflict-Checked**: a different shape under a known name is rejected
/// - **Deterministic**: names iterate in sorted order
///
/// # Example
///
/// ```
/// use proposals_codec::registry::{SchemaRegistry, Shape};
///
/// let mut registry = SchemaRegistry::new();
/// registry.register_expr("Balance", "u64").unwrap();
/// registry.register_expr("Stake", "Option<Balance>").unwrap();
///
/// let (value, rest) = registry.decode("Stake", &[1, 0xe8, 3, 0, 0, 0, 0, 0, 0]).unwrap();
/// assert!(rest.is_empty());
/// assert_eq!(value.to_json(), serde_json::json!(1000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Registered shapes (BTreeMap for deterministic ordering)
    schemas: BTreeMap<String, Shape>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    /// Register a shape under `name`.
    ///
    /// # Errors
    ///
    /// `SchemaError::Conflict` if `name` is already registered with a
    /// different shape. The existing entry is left untouched.
    pub fn register(&mut self, name: impl Into<String>, shape: Shape) -> Result<(), SchemaError> {
        let name = name.into();

        if let Some(existing) = self.schemas.get(&name) {
            if *existing == shape {
                tracing::debug!(schema = %name, "schema already registered");
                return Ok(());
            }

            tracing::error!(
                schema = %name,
                existing = %existing,
                attempted = %shape,
                "conflicting schema registration"
            );
            return Err(SchemaError::Conflict {
                name,
                existing: existing.to_string(),
                attempted: shape.to_string(),
            });
        }

        tracing::debug!(schema = %name, shape = %shape, "registered schema");
        self.schemas.insert(name, shape);
        Ok(())
    }

    /// Register a type expression such as `Option<Vec<u8>>` under `name`.
    pub fn register_expr(&mut self, name: impl Into<String>, expr: &str) -> Result<(), SchemaError> {
        let shape = Shape::parse(expr)?;
        self.register(name, shape)
    }

    /// Register a Rust type under its [`Schema::NAME`].
    pub fn register_type<T: Schema>(&mut self) -> Result<(), SchemaError> {
        self.register(T::NAME, T::shape())
    }

    /// Look up a registered shape.
    pub fn lookup(&self, name: &str) -> Result<&Shape, SchemaError> {
        self.schemas.get(name).ok_or_else(|| SchemaError::NotFound {
            name: name.to_string(),
        })
    }

    /// Check if a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Names referenced by registered shapes that are not themselves registered.
    ///
    /// Forward references are legal, but any name listed here will fail to
    /// decode until it is registered.
    pub fn unresolved(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .schemas
            .values()
            .flat_map(Shape::references)
            .filter(|name| !self.schemas.contains_key(*name))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    /// Smallest possible encoding of `shape` in bytes.
    ///
    /// Unlike [`Shape::min_encoded_len`], named references are resolved.
    /// Unregistered names and reference cycles count as zero.
    pub fn min_encoded_len(&self, shape: &Shape) -> usize {
        self.min_len(shape, &mut HashMap::new())
    }

    fn min_len<'a>(&'a self, shape: &'a Shape, seen: &mut HashMap<&'a str, usize>) -> usize {
        match shape {
            Shape::Named(name) => {
                if let Some(len) = seen.get(name.as_str()) {
                    return *len;
                }
                // zero while in progress, so cycles terminate
                seen.insert(name, 0);
                let len = self
                    .schemas
                    .get(name)
                    .map_or(0, |resolved| self.min_len(resolved, seen));
                seen.insert(name, len);
                len
            }
            Shape::Tuple(items) => items.iter().map(|item| self.min_len(item, seen)).sum(),
            Shape::Struct(fields) => fields.iter().map(|(_, field)| self.min_len(field, seen)).sum(),
            other => other.min_encoded_len(),
        }
    }

    /// Decode one value of schema `name` from the front of `bytes`.
    ///
    /// # Returns
    ///
    /// The decoded value and the unconsumed remainder
    pub fn decode<'b>(&self, name: &str, bytes: &'b [u8]) -> Result<(Value, &'b [u8]), SchemaError> {
        let shape = self.lookup(name)?;
        let mut decoder = Decoder::new(self, bytes);
        let value = decoder.decode(shape, name)?;
        Ok((value, decoder.remainder()))
    }

    /// Decode a value of schema `name` that must span all of `bytes`.
    pub fn decode_all(&self, name: &str, bytes: &[u8]) -> Result<Value, SchemaError> {
        let (value, rest) = self.decode(name, bytes)?;
        if !rest.is_empty() {
            return Err(DecodeError::TrailingBytes {
                offset: bytes.len() - rest.len(),
                remaining: rest.len(),
            }
            .into());
        }
        Ok(value)
    }

    /// Encode a dynamic value against schema `name`.
    pub fn encode(&self, name: &str, value: &Value) -> Result<Vec<u8>, SchemaError> {
        let shape = self.lookup(name)?;
        let mut encoder = Encoder::new(self);
        encoder.encode(shape, value)?;
        Ok(encoder.finish())
    }

    /// Decode a typed value, checking its registration first.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `T::NAME` is not registered
    /// - `TypeMismatch` if the registered shape is not `T::shape()`
    /// - `Decode` if the bytes do not hold a `T`. The error comes from
    ///   replaying the bytes against the registered shape, which names the
    ///   arm count of a bad tag and rejects oversized length prefixes where
    ///   they occur.
    pub fn decode_typed<'b, T: Schema>(&self, bytes: &'b [u8]) -> Result<(T, &'b [u8]), SchemaError> {
        if *self.lookup(T::NAME)? != T::shape() {
            return Err(SchemaError::TypeMismatch {
                name: T::NAME.to_string(),
            });
        }
        serialization::decode::<T>(bytes).map_err(|typed| match self.decode(T::NAME, bytes) {
            Err(SchemaError::Decode(precise)) => SchemaError::Decode(precise),
            _ => SchemaError::Decode(typed),
        })
    }
}

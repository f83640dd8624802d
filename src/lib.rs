//! Proposals Codec - Governance Proposal Types for On-Chain Data
//!
//! Typed model, SCALE codec and schema registry for the "proposals" pallet
//! of a blockchain governance runtime.
//!
//! Key principles:
//! - Values only (relationships by identifier, no shared ownership)
//! - Deterministic little-endian, tag-prefixed encoding
//! - Decoding reports the unconsumed remainder and the failing byte offset
//! - Registry conflicts are errors, never silent overwrites

pub mod proposals;
pub mod registry;
pub mod serialization;

pub use proposals::register_proposal_types;
pub use registry::{Schema, SchemaError, SchemaRegistry, Shape, Value};
pub use serialization::{decode, decode_all, encode, DecodeError};

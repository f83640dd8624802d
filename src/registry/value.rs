//! Dynamically decoded values.

use serde_json::{json, Map, Value as Json};

/// Value decoded against a registered [`Shape`](super::Shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Text(String),
    /// `Vec<u8>` payloads.
    Bytes(Vec<u8>),
    AccountId([u8; 32]),
    Option(Option<Box<Value>>),
    Seq(Vec<Value>),
    Tuple(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Variant {
        index: u8,
        name: String,
        payload: Box<Value>,
    },
}

impl Value {
    /// Unit arm of an enum.
    pub fn unit_variant(index: u8, name: impl Into<String>) -> Self {
        Self::Variant {
            index,
            name: name.into(),
            payload: Box::new(Value::Null),
        }
    }

    /// Field of a struct value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Arm name of a variant value.
    pub fn variant_name(&self) -> Option<&str> {
        match self {
            Self::Variant { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Short description of the value kind, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::AccountId(_) => "account id",
            Self::Option(_) => "option",
            Self::Seq(_) => "sequence",
            Self::Tuple(_) => "tuple",
            Self::Struct(_) => "struct",
            Self::Variant { .. } => "variant",
        }
    }

    /// JSON rendering in the runtime registry style.
    ///
    /// Variants become `{"Arm": payload}` (unit arms render as `"Arm"`),
    /// byte strings and account ids become `0x`-prefixed hex, and `u128`
    /// becomes a decimal string.
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null => Json::Null,
            Self::U8(v) => json!(v),
            Self::U16(v) => json!(v),
            Self::U32(v) => json!(v),
            Self::U64(v) => json!(v),
            Self::U128(v) => Json::String(v.to_string()),
            Self::Text(s) => Json::String(s.clone()),
            Self::Bytes(bytes) => Json::String(format!("0x{}", hex::encode(bytes))),
            Self::AccountId(bytes) => Json::String(format!("0x{}", hex::encode(bytes))),
            Self::Option(None) => Json::Null,
            Self::Option(Some(inner)) => inner.to_json(),
            Self::Seq(items) | Self::Tuple(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Self::Struct(fields) => {
                let mut map = Map::new();
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json());
                }
                Json::Object(map)
            }
            Self::Variant { name, payload, .. } => match payload.as_ref() {
                Value::Null => Json::String(name.clone()),
                other => {
                    let mut map = Map::new();
                    map.insert(name.clone(), other.to_json());
                    Json::Object(map)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_field_lookup() {
        let value = Value::Struct(vec![
            ("approvals".to_string(), Value::U32(5)),
            ("slashes".to_string(), Value::U32(0)),
        ]);
        assert_eq!(value.field("approvals"), Some(&Value::U32(5)));
        assert_eq!(value.field("missing"), None);
        assert_eq!(Value::U32(1).field("approvals"), None);
    }

    #[test]
    fn test_json_rendering() {
        let value = Value::Struct(vec![
            ("title".to_string(), Value::Text("hi".to_string())),
            ("stake".to_string(), Value::Option(None)),
            ("error".to_string(), Value::Bytes(vec![0xde, 0xad])),
            (
                "status".to_string(),
                Value::Variant {
                    index: 5,
                    name: "Approved".to_string(),
                    payload: Box::new(Value::unit_variant(0, "PendingExecution")),
                },
            ),
            ("big".to_string(), Value::U128(u128::MAX)),
        ]);

        assert_eq!(
            value.to_json(),
            json!({
                "title": "hi",
                "stake": null,
                "error": "0xdead",
                "status": { "Approved": "PendingExecution" },
                "big": u128::MAX.to_string(),
            })
        );
    }

    #[test]
    fn test_variant_name() {
        assert_eq!(Value::unit_variant(2, "Slash").variant_name(), Some("Slash"));
        assert_eq!(Value::Null.variant_name(), None);
    }
}

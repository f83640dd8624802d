use proposals_codec::registry::SchemaRegistry;

/// Decode a hex payload as `type_name` and render it as pretty JSON.
///
/// Bytes left after the value are an error unless `allow_trailing` is set,
/// in which case they are logged and ignored.
pub fn execute(
    registry: &SchemaRegistry,
    type_name: &str,
    payload: &str,
    allow_trailing: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = parse_hex(payload)?;

    let value = if allow_trailing {
        let (value, rest) = registry.decode(type_name, &bytes)?;
        if !rest.is_empty() {
            tracing::warn!(
                type_name,
                trailing = rest.len(),
                "ignoring bytes after decoded value"
            );
        }
        value
    } else {
        registry.decode_all(type_name, &bytes)?
    };

    tracing::debug!(type_name, len = bytes.len(), "decoded payload");
    Ok(serde_json::to_string_pretty(&value.to_json())?)
}

fn parse_hex(payload: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let trimmed = payload.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    hex::decode(digits).map_err(|e| format!("Invalid hex payload: {}", e).into())
}

use proposals_codec::registry::{SchemaError, SchemaRegistry, Shape};
use std::fmt::Write;

/// One registered name per line, sorted.
pub fn list(registry: &SchemaRegistry) -> String {
    registry.names().fold(String::new(), |mut out, name| {
        out.push_str(name);
        out.push('\n');
        out
    })
}

/// Human-readable description of one registered shape.
pub fn describe(registry: &SchemaRegistry, name: &str) -> Result<String, SchemaError> {
    let shape = registry.lookup(name)?;
    let mut out = String::new();

    // write! to a String cannot fail
    let _ = writeln!(out, "{}", name);
    match shape {
        Shape::Struct(fields) => {
            let _ = writeln!(out, "  struct");
            for (field, shape) in fields {
                let _ = writeln!(out, "    {}: {}", field, shape);
            }
        }
        Shape::Enum(arms) => {
            let _ = writeln!(out, "  enum");
            for (index, (arm, shape)) in arms.iter().enumerate() {
                match shape {
                    Shape::Null => {
                        let _ = writeln!(out, "    {} {}", index, arm);
                    }
                    payload => {
                        let _ = writeln!(out, "    {} {}({})", index, arm, payload);
                    }
                }
            }
        }
        other => {
            let _ = writeln!(out, "  = {}", other);
        }
    }
    let _ = write!(out, "  min encoded size: {} bytes", registry.min_encoded_len(shape));

    let references = shape.references();
    if !references.is_empty() {
        let _ = write!(out, "\n  references: {}", references.join(", "));
    }
    Ok(out)
}

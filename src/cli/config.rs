//! proposals-codec configuration file handling
//!
//! Configuration files are TOML. Besides logging settings, a config file can
//! declare extra runtime types in the type registry style, so payloads of
//! types this crate does not know about can still be decoded:
//!
//! ```toml
//! [types]
//! ThreadId = "u64"
//! Memo = "Option<Text>"
//!
//! [types.PostRecord]
//! thread_id = "ThreadId"
//! author_id = "MemberId"
//!
//! [types.Reaction]
//! _enum = ["Like", "Dislike"]
//!
//! [types.Payload]
//! _enum = { Empty = "Null", Text = "Text" }
//! ```
//!
//! Struct fields and enum arms keep the order they are written in.

use proposals_codec::registry::{SchemaError, SchemaRegistry, Shape, ShapeParseError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// proposals-codec configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra type definitions, registered after the built-in proposal types
    #[serde(default)]
    pub types: BTreeMap<String, TypeDefinition>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// One config-declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDefinition {
    /// Type expression, e.g. `"Option<Balance>"`
    Expr(String),

    /// `_enum = [...]` or `_enum = { Arm = "Type" }`
    Enum {
        #[serde(rename = "_enum")]
        arms: EnumArms,
    },

    /// Field name -> type expression
    Struct(toml::Table),
}

/// Arms of a config-declared enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumArms {
    Units(Vec<String>),
    Typed(toml::Table),
}

impl TypeDefinition {
    /// Convert to a registry shape.
    pub fn to_shape(&self) -> Result<Shape, ShapeParseError> {
        match self {
            Self::Expr(expr) => Shape::parse(expr),
            Self::Enum {
                arms: EnumArms::Units(names),
            } => Ok(Shape::unit_enum(names.iter().cloned())),
            Self::Enum {
                arms: EnumArms::Typed(arms),
            } => Ok(Shape::Enum(parse_entries(arms)?)),
            Self::Struct(fields) => Ok(Shape::Struct(parse_entries(fields)?)),
        }
    }
}

fn parse_entries(table: &toml::Table) -> Result<Vec<(String, Shape)>, ShapeParseError> {
    table
        .iter()
        .map(|(name, value)| match value {
            toml::Value::String(expr) => Ok((name.clone(), Shape::parse(expr)?)),
            other => Err(ShapeParseError {
                expr: other.to_string(),
                reason: format!("type of `{}` must be a string", name),
            }),
        })
        .collect()
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: CodecConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Register the config-declared types.
    ///
    /// Stops at the first parse error or conflict.
    pub fn register_types(&self, registry: &mut SchemaRegistry) -> Result<(), SchemaError> {
        for (name, definition) in &self.types {
            registry.register(name.clone(), definition.to_shape()?)?;
        }
        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        format!(
            r#"# proposals-codec configuration

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides this)
level = "{level}"

# Log file (optional, logs to stderr if not set)
# file = "/var/log/proposals-codec.log"

# Extra runtime types, registered after the built-in proposal types.
# A name that is already registered with a different shape is an error.
[types]
# ThreadId = "u64"
#
# [types.PostRecord]
# thread_id = "ThreadId"
# author_id = "MemberId"
#
# [types.Reaction]
# _enum = ["Like", "Dislike"]
"#,
            level = DEFAULT_LOG_LEVEL
        )
    }

    /// Write the default configuration to `path`.
    pub fn create_default(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, Self::generate_default_toml())
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }
}

/// Default config path: `<config dir>/proposals-codec/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("proposals-codec")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proposals_codec::register_proposal_types;
    use tempfile::TempDir;

    #[test]
    fn test_default_toml_parses() {
        let config: CodecConfig = toml::from_str(&CodecConfig::generate_default_toml()).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: CodecConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_type_definitions() {
        let config: CodecConfig = toml::from_str(
            r#"
            [types]
            ThreadId = "u64"

            [types.PostRecord]
            thread_id = "ThreadId"
            author_id = "MemberId"
            body = "Text"

            [types.Reaction]
            _enum = ["Like", "Dislike"]

            [types.Payload]
            _enum = { Empty = "Null", Text = "Text" }
            "#,
        )
        .unwrap();

        assert_eq!(config.types["ThreadId"].to_shape().unwrap(), Shape::U64);
        assert_eq!(
            config.types["PostRecord"].to_shape().unwrap(),
            Shape::structure([
                ("thread_id", Shape::named("ThreadId")),
                ("author_id", Shape::named("MemberId")),
                ("body", Shape::Text),
            ]),
            "Field order must follow the file"
        );
        assert_eq!(
            config.types["Reaction"].to_shape().unwrap(),
            Shape::unit_enum(["Like", "Dislike"])
        );
        assert_eq!(
            config.types["Payload"].to_shape().unwrap(),
            Shape::enumeration([("Empty", Shape::Null), ("Text", Shape::Text)])
        );
    }

    #[test]
    fn test_non_string_field_rejected() {
        let config: CodecConfig = toml::from_str(
            r#"
            [types.Bad]
            count = 3
            "#,
        )
        .unwrap();

        assert!(config.types["Bad"].to_shape().is_err());
    }

    #[test]
    fn test_register_types_after_builtins() {
        let config: CodecConfig = toml::from_str(
            r#"
            [types.Tagged]
            proposal = "ProposalId"
            vote = "VoteKind"
            "#,
        )
        .unwrap();

        let mut registry = SchemaRegistry::new();
        register_proposal_types(&mut registry).unwrap();
        config.register_types(&mut registry).unwrap();

        let (value, _) = registry.decode("Tagged", &[1, 0, 0, 0, 2]).unwrap();
        assert_eq!(value.field("vote").and_then(|v| v.variant_name()), Some("Slash"));
    }

    #[test]
    fn test_conflicting_config_type_rejected() {
        let config: CodecConfig = toml::from_str(
            r#"
            [types]
            VoteKind = "u8"
            "#,
        )
        .unwrap();

        let mut registry = SchemaRegistry::new();
        register_proposal_types(&mut registry).unwrap();
        assert!(matches!(
            config.register_types(&mut registry),
            Err(SchemaError::Conflict { .. })
        ));
    }

    #[test]
    fn test_create_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        CodecConfig::create_default(&path).unwrap();
        let config = CodecConfig::load(&path).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = CodecConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[logging\nlevel = ").unwrap();

        let err = CodecConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("proposals-codec/config.toml"));
    }
}

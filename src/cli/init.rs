use super::config::CodecConfig;
use std::path::Path;

/// Write the default config file to `config_path`.
///
/// An existing file is only replaced with `force`.
pub fn execute(config_path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    CodecConfig::create_default(config_path)?;
    tracing::info!(path = %config_path.display(), "wrote default config");
    println!("Created config: {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("proposals-codec").join("config.toml");

        execute(&path, false).unwrap();
        let config = CodecConfig::load(&path).unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[types]\nThreadId = \"u64\"\n").unwrap();

        let err = execute(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(CodecConfig::load(&path).unwrap().types.contains_key("ThreadId"));

        execute(&path, true).unwrap();
        assert!(CodecConfig::load(&path).unwrap().types.is_empty());
    }
}

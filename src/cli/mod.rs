use clap::{Parser, Subcommand};
use proposals_codec::{register_proposal_types, SchemaRegistry};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod check;
pub mod config;
pub mod decode;
pub mod init;
pub mod schemas;
pub mod version;

use config::{CodecConfig, LoggingConfig};

#[derive(Parser)]
#[command(name = "proposals-codec")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decode proposals pallet storage payloads", long_about = None)]
pub struct Cli {
    /// Path to config file (default: <config dir>/proposals-codec/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a hex payload as a registered type and print it as JSON
    Decode {
        /// Registered type name (e.g. ProposalOf, ProposalStatus)
        #[arg(long = "type")]
        type_name: String,

        /// SCALE-encoded payload, hex with or without a 0x prefix
        payload: String,

        /// Accept bytes after the value instead of failing
        #[arg(long)]
        allow_trailing: bool,
    },

    /// Write a default config file to --config or the default path
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List registered type names
    Schemas,

    /// Show the shape of a registered type
    Describe {
        /// Registered type name
        name: String,
    },

    /// Check that every registered type resolves
    Check,

    /// Display version information
    Version,
}

pub fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Version => {
            version::execute();
            return Ok(());
        }
        Commands::Init { force } => {
            let path = config_path(cli.config.as_deref());
            return init::execute(&path, force);
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;
    let registry = build_registry(&config)?;

    match cli.command {
        Commands::Decode {
            type_name,
            payload,
            allow_trailing,
        } => {
            let output = decode::execute(&registry, &type_name, &payload, allow_trailing)?;
            println!("{}", output);
            Ok(())
        }
        Commands::Schemas => {
            print!("{}", schemas::list(&registry));
            Ok(())
        }
        Commands::Describe { name } => {
            println!("{}", schemas::describe(&registry, &name)?);
            Ok(())
        }
        Commands::Check => check::execute(&registry),
        Commands::Init { .. } | Commands::Version => Ok(()),
    }
}

/// Load the config named on the command line, or the default one if present.
///
/// An explicit path that does not exist is an error; a missing default is not.
pub fn load_config(path: Option<&str>) -> Result<CodecConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => CodecConfig::load(&PathBuf::from(path)),
        None => CodecConfig::load_or_default(&config::default_config_path()),
    }
}

fn config_path(path: Option<&str>) -> PathBuf {
    path.map(PathBuf::from).unwrap_or_else(config::default_config_path)
}

/// Built-in proposal types followed by config-declared ones.
///
/// Any conflict aborts start-up.
pub fn build_registry(config: &CodecConfig) -> Result<SchemaRegistry, Box<dyn std::error::Error>> {
    let mut registry = SchemaRegistry::new();
    register_proposal_types(&mut registry)?;
    config.register_types(&mut registry)?;

    tracing::debug!(
        schemas = registry.len(),
        extra = config.types.len(),
        "type registry ready"
    );
    Ok(registry)
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| format!("Invalid log level '{}': {}", logging.level, e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    // try_init: a subscriber may already be installed (tests)
    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("Failed to open log file '{}': {}", path.display(), e))?;
            let _ = builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}

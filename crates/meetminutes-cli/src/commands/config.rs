//! Configuration commands.

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

/// Dumps the effective configuration as TOML.
pub fn dump(config: &AppConfig) -> CliResult<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| CliError::Config(format!("failed to render config: {}", e)))?;
    print!("{}", rendered);
    Ok(())
}

/// Validates the configuration for an archive run.
pub fn validate(config: &AppConfig) -> CliResult<()> {
    config.validate().map_err(CliError::Config)?;
    println!("Configuration is valid.");
    Ok(())
}

/// Prints the default configuration file path.
pub fn path() -> CliResult<()> {
    println!("{}", AppConfig::default_path().display());
    Ok(())
}

//! CLI command implementations.

mod build;
mod check;

use std::path::PathBuf;

use chm_config::{CliSettings, Config};
use clap::Args;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;

/// Arguments shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover chm.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Staged Sphinx HTML directory (overrides config).
    #[arg(short, long, env = "CHM_SOURCE_ROOT")]
    source_root: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl CommonArgs {
    /// Load the configuration with these arguments and `settings` applied.
    fn load_config(&self, settings: CliSettings) -> Result<Config, CliError> {
        let settings = CliSettings {
            source_root: self.source_root.clone(),
            ..settings
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        match &config.config_path {
            Some(path) => tracing::debug!(path = %path.display(), "Loaded configuration"),
            None => tracing::debug!("No chm.toml found, using defaults"),
        }
        Ok(config)
    }
}

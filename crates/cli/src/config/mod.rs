//! Command-line configuration

use clap::Parser;

use crate::{
    commands::Command,
    config::{api::ApiConfig, observability::LoggingConfig, session::SessionArgs},
};

pub(crate) mod api;
pub(crate) mod observability;
pub(crate) mod session;

/// Storefront cart command-line client
#[derive(Debug, Parser)]
#[command(name = "cart", about = "Storefront cart client", long_about = None)]
pub struct CliConfig {
    /// Storefront API connection settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Cart session settings.
    #[command(flatten)]
    pub session: SessionArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from `.env`, the environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

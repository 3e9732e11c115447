//! Storefront cart command-line client

use std::{process::ExitCode, sync::Arc};

use storefront_cart::{
    context::{CartContext, CartInitError},
    identity::FileStore,
    notices::ChannelNotifier,
    session::CartSessionError,
};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::{
    config::{CliConfig, session::ConfigError},
    shutdown::ShutdownSignalError,
};

mod commands;
mod config;
mod logging;
mod render;
mod shutdown;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialise cart session: {0}")]
    Init(#[from] CartInitError),

    #[error("cart operation failed: {0}")]
    Session(#[from] CartSessionError),

    #[error("background task failed: {0}")]
    Task(#[from] JoinError),

    #[error(transparent)]
    Shutdown(#[from] ShutdownSignalError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    if let Err(error) = logging::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for logging errors"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");

            ExitCode::FAILURE
        }
    }
}

async fn run(config: &CliConfig) -> Result<(), CliError> {
    let store = FileStore::new(config.session.store_path()?);

    info!(store = %store.path().display(), "using cart store");

    let (notifier, mut notices) = ChannelNotifier::channel();

    let context = CartContext::connect(
        config.api.gateway_config(),
        config.session.session_config(),
        Arc::new(store),
        Arc::new(notifier),
    )?;

    commands::run(config, &context, &mut notices).await
}

//! Cart Session Config

use std::{path::PathBuf, time::Duration};

use clap::Args;
use storefront_cart::{cart::UserId, session::SessionConfig};
use thiserror::Error;

/// Directory under the platform data directory holding client state.
const DATA_DIR_NAME: &str = "storefront-cart";

const STORE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no platform data directory; set CART_STORE_PATH")]
    NoDataDir,
}

/// Cart session settings.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Authenticated user owning the cart
    #[arg(long, env = "CART_USER_ID")]
    pub user_id: Option<u64>,

    /// Shipping country hint sent with new lines
    #[arg(long, env = "CART_COUNTRY")]
    pub country: Option<String>,

    /// Quantity change debounce window in milliseconds
    #[arg(long, env = "CART_DEBOUNCE_MS", default_value_t = 600_u64)]
    pub debounce_ms: u64,

    /// Interval between stock sweeps in seconds
    #[arg(long, env = "CART_SWEEP_INTERVAL_SECONDS", default_value_t = 30_u64)]
    pub sweep_interval_seconds: u64,

    /// File holding the persisted cart identity
    #[arg(long, env = "CART_STORE_PATH")]
    pub store_path: Option<PathBuf>,
}

impl SessionArgs {
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            user: self.user_id.map(UserId::new),
            country: self.country.clone(),
        }
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    /// Location of the identity store file.
    ///
    /// # Errors
    ///
    /// Returns an error when no path is configured and the platform has no data directory.
    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }

        dirs::data_dir()
            .map(|dir| dir.join(DATA_DIR_NAME).join(STORE_FILE_NAME))
            .ok_or(ConfigError::NoDataDir)
    }
}

//! Storefront API Config

use std::time::Duration;

use clap::Args;
use storefront_cart::gateway::HttpGatewayConfig;

/// Storefront API connection settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Storefront API root URL
    #[arg(long, env = "STOREFRONT_API_URL")]
    pub api_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "STOREFRONT_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "STOREFRONT_API_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub api_timeout_seconds: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn gateway_config(&self) -> HttpGatewayConfig {
        HttpGatewayConfig {
            base_url: self.api_url.clone(),
            token: self.api_token.clone(),
            timeout: Duration::from_secs(self.api_timeout_seconds),
        }
    }
}

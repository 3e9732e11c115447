//! Gateway errors.

use thiserror::Error;

/// Any failure talking to the storefront API. The remote state is unknown afterwards.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An HTTP transport or decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx status or an unusable body.
    #[error("unexpected response from storefront API: {0}")]
    UnexpectedResponse(String),
}

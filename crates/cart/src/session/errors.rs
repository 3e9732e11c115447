//! Cart session errors.

use thiserror::Error;

use crate::{cart::LineItemId, gateway::GatewayError};

/// Failure of a cart session operation.
#[derive(Debug, Error)]
pub enum CartSessionError {
    /// A server call failed; the change was not applied.
    #[error("cart gateway unavailable")]
    Gateway(#[from] GatewayError),

    /// The line is not in the cart.
    #[error("line item {0} is not in the cart")]
    UnknownLineItem(LineItemId),
}

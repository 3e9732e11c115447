//! Remote cart gateway.

mod errors;
pub mod http;
mod records;

use async_trait::async_trait;
use mockall::automock;

use crate::{
    cart::{CartLineItem, CartTotals, LineItemId, MutationRequest, StockSnapshot, UpsertOutcome, UserId},
    identity::CartIdentity,
};

pub use errors::GatewayError;
pub use http::{HttpGatewayConfig, HttpStorefrontClient};

/// Cart endpoints of the storefront API.
#[automock]
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// List every line of the cart, following pagination until exhausted.
    async fn list_items(
        &self,
        cart: &CartIdentity,
        user: Option<UserId>,
    ) -> Result<Vec<CartLineItem>, GatewayError>;

    /// Create the line or update its quantity; the server matches on product and variant.
    async fn upsert_item(&self, request: &MutationRequest) -> Result<UpsertOutcome, GatewayError>;

    /// Delete a single line.
    async fn delete_item(
        &self,
        cart: &CartIdentity,
        item: LineItemId,
        user: Option<UserId>,
    ) -> Result<(), GatewayError>;

    /// Fetch the server-computed totals for the cart.
    async fn fetch_totals(&self, cart: &CartIdentity) -> Result<CartTotals, GatewayError>;
}

/// Live product stock lookup.
#[automock]
#[async_trait]
pub trait StockGateway: Send + Sync {
    /// Fetch current stock. A product that no longer exists has zero stock.
    async fn fetch_stock(&self, slug: &str) -> Result<StockSnapshot, GatewayError>;
}

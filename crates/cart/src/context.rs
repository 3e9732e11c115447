//! Wiring of a cart session against the HTTP storefront.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::{
    badge::BadgeCounter,
    gateway::{GatewayError, HttpGatewayConfig, HttpStorefrontClient},
    identity::{CartIdentityProvider, LocalStore},
    notices::Notifier,
    reconciler::StockSweeper,
    session::{Backends, CartSession, SessionConfig},
};

/// Failure to set up a cart context.
#[derive(Debug, Error)]
pub enum CartInitError {
    /// The HTTP client could not be built.
    #[error("failed to build storefront client")]
    Client(#[from] GatewayError),
}

/// A session, its sweeper and the identity provider backing them.
#[derive(Debug)]
pub struct CartContext {
    /// Source of the persisted cart identity.
    pub identity: CartIdentityProvider,
    /// Session for the stored identity.
    pub session: CartSession,
    /// Sweeper bound to `session`.
    pub sweeper: StockSweeper,
}

impl CartContext {
    /// Resolve the cart identity from `store` and connect a session to the API.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn connect(
        api: HttpGatewayConfig,
        config: SessionConfig,
        store: Arc<dyn LocalStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CartInitError> {
        let client = Arc::new(HttpStorefrontClient::new(api)?);

        Ok(Self::with_backends(
            config,
            store,
            Backends {
                carts: client.clone(),
                stock: client,
                notifier,
            },
        ))
    }

    /// Build a context over caller-supplied backends.
    #[must_use]
    pub fn with_backends(config: SessionConfig, store: Arc<dyn LocalStore>, backends: Backends) -> Self {
        let identity = CartIdentityProvider::new(store);
        let cart_id = identity.get_or_create();

        info!(%cart_id, user = ?config.user, "cart session ready");

        let session = CartSession::new(cart_id, config, backends, BadgeCounter::new());
        let sweeper = StockSweeper::new(session.clone());

        Self {
            identity,
            session,
            sweeper,
        }
    }
}

//! Cart identity provider.

use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::identity::{CartIdentity, LocalStore, StoreError};

/// Storage key holding the anonymous cart identity.
pub const CART_IDENTITY_KEY: &str = "cart_id";

/// Hands out the cart identity persisted in a [`LocalStore`], creating it on first use.
#[derive(Debug)]
pub struct CartIdentityProvider {
    store: Arc<dyn LocalStore>,
    cached: OnceLock<CartIdentity>,
}

impl CartIdentityProvider {
    /// Provider reading and writing `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            cached: OnceLock::new(),
        }
    }

    /// Return the stored identity, generating and persisting one when absent.
    ///
    /// Storage failures never surface: an unreadable entry counts as absent and a
    /// failed write still yields the generated identity for this process.
    pub fn get_or_create(&self) -> CartIdentity {
        self.cached.get_or_init(|| self.load_or_generate()).clone()
    }

    fn load_or_generate(&self) -> CartIdentity {
        match self.store.get(CART_IDENTITY_KEY) {
            Ok(Some(stored)) => {
                if let Ok(identity) = stored.parse::<CartIdentity>() {
                    debug!("loaded stored cart identity");

                    return identity;
                }
            }
            Ok(None) => {}
            Err(StoreError::Malformed(error)) => {
                warn!(%error, "stored cart identity is unreadable, replacing it");
            }
            Err(error) => warn!(%error, "failed to read stored cart identity"),
        }

        let identity = CartIdentity::generate();

        if let Err(error) = self.store.set(CART_IDENTITY_KEY, identity.as_str()) {
            warn!(%error, "failed to persist cart identity");
        } else {
            debug!("generated new cart identity");
        }

        identity
    }
}

//! Anonymous cart identity.

mod provider;
mod store;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rand::Rng;
use thiserror::Error;

pub use provider::{CART_IDENTITY_KEY, CartIdentityProvider};
pub use store::{FileStore, LocalStore, MemoryStore, StoreError};

/// Number of characters in a generated identity.
pub const CART_IDENTITY_LEN: usize = 30;

/// Session key identifying a cart before (or without) login.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartIdentity(String);

impl CartIdentity {
    /// Generate a fresh identity of lowercase ASCII letters.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate an identity from the given random source.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value = (0..CART_IDENTITY_LEN)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect();

        Self(value)
    }

    /// Identity as stored and sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CartIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// A stored or supplied identity was blank.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cart identity cannot be blank")]
pub struct BlankCartIdentity;

impl FromStr for CartIdentity {
    type Err = BlankCartIdentity;

    /// Stored identities are kept as-is; only blank values are rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(BlankCartIdentity);
        }

        Ok(Self(value.to_owned()))
    }
}

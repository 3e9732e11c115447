//! Test support

pub(crate) mod fixtures;

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    badge::{BadgeCounter, BadgeReader},
    identity::CartIdentity,
    notices::{ChannelNotifier, Notice},
    session::{Backends, CartSession, SessionConfig},
};

use self::fake::FakeStorefront;

/// Session wired to an in-memory storefront.
pub(crate) struct TestContext {
    pub storefront: Arc<FakeStorefront>,
    pub session: CartSession,
    pub badge: BadgeReader,
    pub notices: UnboundedReceiver<Notice>,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        Self::with_storefront(FakeStorefront::new())
    }

    pub(crate) fn with_latency(latency: Duration) -> Self {
        Self::with_storefront(FakeStorefront::with_latency(latency))
    }

    fn with_storefront(storefront: FakeStorefront) -> Self {
        let storefront = Arc::new(storefront);
        let (notifier, notices) = ChannelNotifier::channel();
        let badge = BadgeCounter::new();
        let reader = badge.reader();

        let session = CartSession::new(
            CartIdentity::generate(),
            SessionConfig::default(),
            Backends {
                carts: storefront.clone(),
                stock: storefront.clone(),
                notifier: Arc::new(notifier),
            },
            badge,
        );

        Self {
            storefront,
            session,
            badge: reader,
            notices,
        }
    }

    /// Every notice emitted so far.
    pub(crate) fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();

        while let Ok(notice) = self.notices.try_recv() {
            notices.push(notice);
        }

        notices
    }
}

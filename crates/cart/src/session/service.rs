//! Cart session.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
    time::Duration,
};

use jiff::Timestamp;
use tokio::sync::{Mutex, watch};
use tracing::{Span, debug, warn};

use crate::{
    badge::{BadgeCounter, BadgeReader},
    cart::{AddToCart, CartLineItem, CartView, LineItemId, MutationRequest, UserId},
    gateway::{CartGateway, StockGateway},
    identity::CartIdentity,
    notices::{CartAction, Notice, Notifier},
    reconciler::{MutationPlan, plan_mutation, plan_set_quantity},
    session::{CartSessionError, debounce::Debouncer, state::CartState},
};

/// Window in which quantity changes to one line are coalesced.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period after the last quantity change before it is sent.
    pub debounce: Duration,

    /// Authenticated user owning the cart, if any.
    pub user: Option<UserId>,

    /// Shipping destination hint sent with new lines.
    pub country: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            user: None,
            country: None,
        }
    }
}

/// Collaborators a session talks to.
#[derive(Clone)]
pub struct Backends {
    /// Cart endpoints.
    pub carts: Arc<dyn CartGateway>,
    /// Stock lookups.
    pub stock: Arc<dyn StockGateway>,
    /// Receives shopper notices.
    pub notifier: Arc<dyn Notifier>,
}

impl Debug for Backends {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

/// Client-side view of one cart, kept consistent with the server.
///
/// Local state is advisory: every mutation ends in a [`refresh`](Self::refresh)
/// that replaces it wholesale with what the server reports.
#[derive(Clone)]
pub struct CartSession {
    inner: Arc<Inner>,
}

struct Inner {
    identity: CartIdentity,
    config: SessionConfig,
    backends: Backends,
    state: Mutex<CartState>,
    debouncer: Mutex<Debouncer>,
    badge: BadgeCounter,
    view: watch::Sender<CartView>,
}

impl Debug for CartSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartSession")
            .field("identity", &self.inner.identity)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl CartSession {
    /// Create a session. The session becomes the only writer of `badge`.
    #[must_use]
    pub fn new(
        identity: CartIdentity,
        config: SessionConfig,
        backends: Backends,
        badge: BadgeCounter,
    ) -> Self {
        let (view, _rx) = watch::channel(CartView::default());

        badge.set(0);

        Self {
            inner: Arc::new(Inner {
                identity,
                config,
                backends,
                state: Mutex::new(CartState::default()),
                debouncer: Mutex::new(Debouncer::default()),
                badge,
                view,
            }),
        }
    }

    /// Identity of the cart this session manages.
    #[must_use]
    pub fn identity(&self) -> &CartIdentity {
        &self.inner.identity
    }

    /// Settings the session was created with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Read-only observer of the cart badge.
    #[must_use]
    pub fn badge(&self) -> BadgeReader {
        self.inner.badge.reader()
    }

    /// Latest published view.
    #[must_use]
    pub fn view(&self) -> CartView {
        self.inner.view.borrow().clone()
    }

    /// Receiver woken on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.inner.view.subscribe()
    }

    pub(crate) fn stock(&self) -> &dyn StockGateway {
        self.inner.backends.stock.as_ref()
    }

    pub(crate) fn carts(&self) -> &dyn CartGateway {
        self.inner.backends.carts.as_ref()
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.inner.backends.notifier.notify(notice);
    }

    /// Lines as currently held, optimistic quantities included.
    pub(crate) async fn items(&self) -> Vec<CartLineItem> {
        self.inner.state.lock().await.items()
    }

    fn publish(&self, state: &CartState) {
        self.inner.badge.set(state.total_qty());
        self.inner.view.send_replace(state.view());
    }

    /// Request for `item` at an absolute quantity.
    pub(crate) fn line_request(&self, item: &CartLineItem, qty: u32) -> MutationRequest {
        MutationRequest {
            cart_id: self.inner.identity.clone(),
            product: item.product.id,
            user: self.inner.config.user,
            qty,
            price: item.price,
            shipping_amount: item.product.shipping_amount,
            country: item
                .country
                .clone()
                .or_else(|| self.inner.config.country.clone()),
            variant: item.variant.clone(),
        }
    }

    /// Replace local state with the server's line items and totals.
    ///
    /// A refresh that resolves after a later-issued one has been applied is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns an error when either listing the items or fetching totals fails;
    /// local state is left untouched.
    #[tracing::instrument(
        name = "cart.session.refresh",
        skip(self),
        fields(refresh = tracing::field::Empty, applied = tracing::field::Empty),
        err
    )]
    pub async fn refresh(&self) -> Result<(), CartSessionError> {
        let refresh = self.inner.state.lock().await.issue_refresh();

        Span::current().record("refresh", refresh);

        let (items, totals) = tokio::try_join!(
            self.carts()
                .list_items(&self.inner.identity, self.inner.config.user),
            self.carts().fetch_totals(&self.inner.identity),
        )?;

        let mut state = self.inner.state.lock().await;
        let applied = state.apply_refresh(refresh, items, totals, Timestamp::now());

        Span::current().record("applied", applied);

        if applied {
            self.publish(&state);
        } else {
            debug!(refresh, "discarded stale cart refresh");
        }

        Ok(())
    }

    /// Refresh after a mutation reached the server. Failure only costs freshness.
    pub(crate) async fn refresh_after_mutation(&self) {
        if let Err(error) = self.refresh().await {
            warn!(%error, "cart refresh after mutation failed");

            self.notify(Notice::ActionFailed {
                action: CartAction::Refresh,
            });
        }
    }

    /// Set a line's quantity.
    ///
    /// The new quantity shows immediately; the server call happens once no
    /// further change to the same line arrives within the debounce window.
    /// Failures of the delayed commit revert the line and emit a notice. A
    /// quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error when the line is not in the cart, or when a removal fails.
    #[tracing::instrument(name = "cart.session.mutate_quantity", skip(self), err)]
    pub async fn mutate_quantity(&self, line: LineItemId, qty: u32) -> Result<(), CartSessionError> {
        if qty == 0 {
            return self.remove_item(line).await;
        }

        let token = {
            let mut state = self.inner.state.lock().await;
            let token = state
                .mark_pending(line, qty)
                .ok_or(CartSessionError::UnknownLineItem(line))?;

            self.publish(&state);

            token
        };

        // Held while spawning so the task cannot look for its slot before it exists.
        let mut debouncer = self.inner.debouncer.lock().await;
        let session = self.clone();
        let delay = self.inner.config.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            session.commit_quantity(line, qty, token).await;
        });

        debouncer.schedule(line, token, handle);

        Ok(())
    }

    async fn commit_quantity(&self, line: LineItemId, qty: u32, token: u64) {
        if !self.inner.debouncer.lock().await.begin_commit(line, token) {
            return;
        }

        if let Err(error) = self.apply_quantity(line, qty, token).await {
            warn!(%error, %line, "quantity update failed, reverting");

            {
                let mut state = self.inner.state.lock().await;

                if state.revert_pending(line, token) {
                    self.publish(&state);
                }
            }

            self.notify(Notice::ActionFailed {
                action: CartAction::UpdateQuantity,
            });
        }

        self.inner.debouncer.lock().await.finish(line, token);
    }

    async fn apply_quantity(
        &self,
        line: LineItemId,
        qty: u32,
        token: u64,
    ) -> Result<(), CartSessionError> {
        let item = self
            .inner
            .state
            .lock()
            .await
            .line(line)
            .cloned()
            .ok_or(CartSessionError::UnknownLineItem(line))?;

        let snapshot = self.stock().fetch_stock(&item.product.slug).await?;
        let plan = plan_set_quantity(qty, snapshot.stock_qty);

        if plan.clipped {
            self.notify(Notice::StockLimited {
                title: snapshot.title,
                available: snapshot.stock_qty,
            });
        }

        if plan.final_qty == 0 {
            self.carts()
                .delete_item(&self.inner.identity, line, self.inner.config.user)
                .await?;

            let mut state = self.inner.state.lock().await;

            if state.take_line(line).is_some() {
                self.publish(&state);
            }
        } else {
            let outcome = self
                .carts()
                .upsert_item(&self.line_request(&item, plan.final_qty))
                .await?;

            if outcome.adjusted {
                self.notify(Notice::ServerAdjusted {
                    message: outcome.message,
                });
            }

            let mut state = self.inner.state.lock().await;

            state.confirm_pending(line, token, plan.final_qty);
            self.publish(&state);
        }

        self.refresh_after_mutation().await;

        Ok(())
    }

    /// Remove a line.
    ///
    /// The line disappears immediately and comes back, with a notice, if the
    /// server rejects the delete.
    ///
    /// # Errors
    ///
    /// Returns an error when the line is not in the cart or the delete fails.
    #[tracing::instrument(name = "cart.session.remove_item", skip(self), err)]
    pub async fn remove_item(&self, line: LineItemId) -> Result<(), CartSessionError> {
        self.inner.debouncer.lock().await.cancel(line);

        let removal = {
            let mut state = self.inner.state.lock().await;
            let removal = state
                .take_line(line)
                .ok_or(CartSessionError::UnknownLineItem(line))?;

            self.publish(&state);

            removal
        };

        if let Err(error) = self
            .carts()
            .delete_item(&self.inner.identity, line, self.inner.config.user)
            .await
        {
            warn!(%error, title = %removal.item().product.title, "remove failed, restoring line");

            {
                let mut state = self.inner.state.lock().await;

                if state.restore_line(removal) {
                    self.publish(&state);
                }
            }

            self.notify(Notice::ActionFailed {
                action: CartAction::Remove,
            });

            return Err(error.into());
        }

        self.refresh_after_mutation().await;

        Ok(())
    }

    /// Add units of a product variant, merging with any existing line.
    ///
    /// Returns the plan that was applied; a clipped plan also emits a stock notice.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart or the product stock cannot be fetched, or
    /// the upsert fails. The badge is restored and a notice emitted.
    #[tracing::instrument(
        name = "cart.session.add_item",
        skip(self, request),
        fields(product = %request.product.id, qty = request.qty),
        err
    )]
    pub async fn add_item(&self, request: AddToCart) -> Result<MutationPlan, CartSessionError> {
        let result = self.try_add_item(&request).await;

        if result.is_err() {
            let state = self.inner.state.lock().await;

            self.publish(&state);

            drop(state);

            self.notify(Notice::ActionFailed {
                action: CartAction::Add,
            });
        }

        result
    }

    async fn try_add_item(&self, request: &AddToCart) -> Result<MutationPlan, CartSessionError> {
        // The server keys lines by product and variant; ask it what the cart
        // holds so the absolute quantity sent is right.
        self.refresh().await?;

        let snapshot = self.stock().fetch_stock(&request.product.slug).await?;

        let (existing, plan, token) = {
            let mut state = self.inner.state.lock().await;
            let existing = state
                .find_variant(request.product.id, &request.variant)
                .map(|item| (item.id, item.qty));

            let held = existing.map_or(0, |(_, qty)| qty);
            let plan = plan_mutation(request.qty, held, snapshot.stock_qty);

            if plan.clipped {
                self.notify(Notice::StockLimited {
                    title: snapshot.title,
                    available: snapshot.stock_qty,
                });
            }

            // An add only ever grows a line; lowering it is left to the sweep.
            if plan.allowed_qty == 0 {
                return Ok(plan);
            }

            let token = match existing {
                Some((id, _)) => {
                    let token = state.mark_pending(id, plan.final_qty);

                    self.publish(&state);

                    token
                }
                None => {
                    self.inner
                        .badge
                        .set(state.total_qty().saturating_add(plan.final_qty));

                    None
                }
            };

            (existing.map(|(id, _)| id), plan, token)
        };

        let sent = self
            .carts()
            .upsert_item(&MutationRequest {
                cart_id: self.inner.identity.clone(),
                product: request.product.id,
                user: self.inner.config.user,
                qty: plan.final_qty,
                price: request.product.price,
                shipping_amount: request.product.shipping_amount,
                country: self.inner.config.country.clone(),
                variant: request.variant.clone(),
            })
            .await;

        match sent {
            Ok(outcome) => {
                if outcome.adjusted {
                    self.notify(Notice::ServerAdjusted {
                        message: outcome.message,
                    });
                }
            }
            Err(error) => {
                if let (Some(id), Some(token)) = (existing, token) {
                    self.inner.state.lock().await.revert_pending(id, token);
                }

                return Err(error.into());
            }
        }

        self.refresh_after_mutation().await;

        Ok(plan)
    }

    /// Wait until every scheduled quantity commit has run.
    pub async fn settle(&self) {
        loop {
            let tasks = self.inner.debouncer.lock().await.take_tasks();

            if tasks.is_empty() {
                return;
            }

            for task in tasks {
                if let Err(error) = task.await
                    && !error.is_cancelled()
                {
                    warn!(%error, "quantity commit task failed");
                }
            }
        }
    }
}

//! In-memory cart state held by a session.

use jiff::Timestamp;

use crate::cart::{CartLineItem, CartLineView, CartTotals, CartView, LineItemId, ProductId, Variant};

/// Optimistic change waiting on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    /// Quantity last confirmed by the server.
    settled_qty: u32,
    token: u64,
}

#[derive(Debug, Clone)]
struct LineState {
    item: CartLineItem,
    pending: Option<Pending>,
}

/// A line taken out optimistically, kept so it can be put back.
#[derive(Debug, Clone)]
pub(crate) struct Removal {
    position: usize,
    line: LineState,

    /// Refresh that was current when the line was taken out.
    refresh: u64,
}

impl Removal {
    pub(crate) fn item(&self) -> &CartLineItem {
        &self.line.item
    }
}

#[derive(Debug, Default)]
pub(crate) struct CartState {
    lines: Vec<LineState>,
    totals: CartTotals,
    refreshed_at: Option<Timestamp>,
    issued_refreshes: u64,
    applied_refresh: u64,
    last_token: u64,
}

impl CartState {
    /// Number a refresh as it is issued.
    pub(crate) fn issue_refresh(&mut self) -> u64 {
        self.issued_refreshes += 1;
        self.issued_refreshes
    }

    /// Replace everything with server state.
    ///
    /// Returns `false`, leaving state untouched, when a later-issued refresh has
    /// already been applied.
    pub(crate) fn apply_refresh(
        &mut self,
        refresh: u64,
        items: Vec<CartLineItem>,
        totals: CartTotals,
        at: Timestamp,
    ) -> bool {
        if refresh <= self.applied_refresh {
            return false;
        }

        self.applied_refresh = refresh;
        self.lines = items
            .into_iter()
            .map(|item| LineState {
                item,
                pending: None,
            })
            .collect();
        self.totals = totals;
        self.refreshed_at = Some(at);

        true
    }

    pub(crate) fn line(&self, id: LineItemId) -> Option<&CartLineItem> {
        self.lines
            .iter()
            .find(|line| line.item.id == id)
            .map(|line| &line.item)
    }

    pub(crate) fn find_variant(&self, product: ProductId, variant: &Variant) -> Option<&CartLineItem> {
        self.lines
            .iter()
            .map(|line| &line.item)
            .find(|item| item.matches(product, variant))
    }

    pub(crate) fn items(&self) -> Vec<CartLineItem> {
        self.lines.iter().map(|line| line.item.clone()).collect()
    }

    /// Set a line's quantity optimistically and tag it pending.
    ///
    /// Consecutive changes keep the quantity the server last confirmed.
    pub(crate) fn mark_pending(&mut self, id: LineItemId, qty: u32) -> Option<u64> {
        self.last_token += 1;

        let token = self.last_token;
        let line = self.lines.iter_mut().find(|line| line.item.id == id)?;

        let settled_qty = line
            .pending
            .map_or(line.item.qty, |pending| pending.settled_qty);

        line.item.qty = qty;
        line.pending = Some(Pending { settled_qty, token });

        Some(token)
    }

    /// Undo the optimistic change tagged `token`.
    ///
    /// Does nothing when a refresh or a newer change has replaced it.
    pub(crate) fn revert_pending(&mut self, id: LineItemId, token: u64) -> bool {
        let Some(line) = self.lines.iter_mut().find(|line| line.item.id == id) else {
            return false;
        };

        match line.pending {
            Some(pending) if pending.token == token => {
                line.item.qty = pending.settled_qty;
                line.pending = None;

                true
            }
            _ => false,
        }
    }

    /// Treat the optimistic quantity tagged `token` as confirmed.
    pub(crate) fn confirm_pending(&mut self, id: LineItemId, token: u64, qty: u32) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item.id == id)
            && line.pending.is_some_and(|pending| pending.token == token)
        {
            line.item.qty = qty;
            line.pending = None;
        }
    }

    pub(crate) fn take_line(&mut self, id: LineItemId) -> Option<Removal> {
        let position = self.lines.iter().position(|line| line.item.id == id)?;
        let line = self.lines.remove(position);

        Some(Removal {
            position,
            line,
            refresh: self.applied_refresh,
        })
    }

    /// Put a removed line back, at its last confirmed quantity, unless a refresh
    /// has landed since its removal.
    pub(crate) fn restore_line(&mut self, removal: Removal) -> bool {
        if removal.refresh != self.applied_refresh {
            return false;
        }

        let mut line = removal.line;

        if let Some(pending) = line.pending.take() {
            line.item.qty = pending.settled_qty;
        }

        let position = removal.position.min(self.lines.len());

        self.lines.insert(position, line);

        true
    }

    pub(crate) fn total_qty(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.item.qty))
    }

    pub(crate) fn view(&self) -> CartView {
        CartView {
            lines: self
                .lines
                .iter()
                .map(|line| CartLineView {
                    item: line.item.clone(),
                    pending: line.pending.is_some(),
                })
                .collect(),
            totals: self.totals.clone(),
            refreshed_at: self.refreshed_at,
        }
    }
}

//! Cart View

use jiff::Timestamp;

use crate::cart::{CartLineItem, CartTotals};

/// One line as shown to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    /// Line as held by the session.
    pub item: CartLineItem,

    /// Holds an optimistic quantity not yet confirmed by the server.
    pub pending: bool,
}

/// Immutable snapshot of the session's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartView {
    /// Lines in server order.
    pub lines: Vec<CartLineView>,

    /// Totals from the last applied server fetch.
    pub totals: CartTotals,
    /// When the last server fetch was applied.
    pub refreshed_at: Option<Timestamp>,
}

impl CartView {
    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.item.qty))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line is waiting on the server.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lines.iter().any(|line| line.pending)
    }
}

//! Quantity planning against live stock.

/// Outcome of checking a requested increase against live stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationPlan {
    /// Increase actually permitted on top of the existing quantity.
    pub allowed_qty: u32,

    /// Quantity the line should hold after the mutation.
    pub final_qty: u32,

    /// The request was reduced to fit the stock.
    pub clipped: bool,
}

/// Plan adding `requested` units to a line already holding `existing`.
///
/// When `existing + requested` exceeds `live_stock` the plan is clipped to
/// `live_stock`, which may leave no room for any increase at all. An add never
/// lowers the line: a line already at or above stock keeps its quantity.
#[must_use]
pub fn plan_mutation(requested: u32, existing: u32, live_stock: u32) -> MutationPlan {
    let target = existing.saturating_add(requested);

    if target <= live_stock {
        return MutationPlan {
            allowed_qty: requested,
            final_qty: target,
            clipped: false,
        };
    }

    MutationPlan {
        allowed_qty: live_stock.saturating_sub(existing),
        final_qty: live_stock.max(existing),
        clipped: true,
    }
}

/// Plan replacing a line's quantity with `new_qty`.
#[must_use]
pub fn plan_set_quantity(new_qty: u32, live_stock: u32) -> MutationPlan {
    plan_mutation(new_qty, 0, live_stock)
}

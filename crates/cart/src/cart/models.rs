//! Cart Models

use rust_decimal::Decimal;

use crate::{identity::CartIdentity, ids::TypedId};

/// Product Id
pub type ProductId = TypedId<Product>;

/// Cart Line Item Id
pub type LineItemId = TypedId<CartLineItem>;

/// Marker for authenticated user ids.
#[derive(Debug)]
pub struct User;

/// User Id
pub type UserId = TypedId<User>;

/// Product reference carried by a line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Server identifier.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// URL slug used for stock lookups.
    pub slug: String,
    /// Current unit price.
    pub price: Decimal,
    /// Stock as last reported.
    pub stock_qty: u32,
    /// Image URL.
    pub image: Option<String>,
    /// Per-line shipping charge.
    pub shipping_amount: Decimal,
}

/// Variant selectors. `None` means no variant was chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Variant {
    /// Selected color, `None` when the product has no color choice.
    pub color: Option<String>,
    /// Selected size, `None` when the product has no size choice.
    pub size: Option<String>,
}

impl Variant {
    /// Variant with neither color nor size selected.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            color: None,
            size: None,
        }
    }
}

/// CartLineItem Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    /// Server identifier.
    pub id: LineItemId,
    /// Product snapshot.
    pub product: Product,
    /// Units in the cart.
    pub qty: u32,

    /// Unit price captured when the line was added.
    pub price: Decimal,
    /// Selected color and size.
    pub variant: Variant,
    /// Shipping destination hint.
    pub country: Option<String>,
}

impl CartLineItem {
    /// Whether this line holds the given product variant.
    #[must_use]
    pub fn matches(&self, product: ProductId, variant: &Variant) -> bool {
        self.product.id == product && &self.variant == variant
    }
}

/// Server-computed cart totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of list prices.
    pub mrp_total: Decimal,
    /// Sum after discounts.
    pub discounted_total: Decimal,
    /// Shipping charge.
    pub shipping: Decimal,
    /// Amount payable.
    pub grand_total: Decimal,
}

/// Live stock for one product, fetched right before a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSnapshot {
    /// Units available.
    pub stock_qty: u32,
    /// Product title for notices.
    pub title: String,
}

/// Create-or-update payload for one line. `qty` is the absolute target quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    /// Anonymous cart the line belongs to.
    pub cart_id: CartIdentity,
    /// Product to add or update.
    pub product: ProductId,
    /// Owning user, when signed in.
    pub user: Option<UserId>,
    /// Absolute quantity the line should hold.
    pub qty: u32,
    /// Unit price.
    pub price: Decimal,
    /// Per-line shipping charge.
    pub shipping_amount: Decimal,
    /// Shipping destination hint.
    pub country: Option<String>,
    /// Selected color and size.
    pub variant: Variant,
}

/// Result of an upsert as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Server message, empty when none was sent.
    pub message: String,

    /// The server clamped the quantity on its own.
    pub adjusted: bool,
}

impl UpsertOutcome {
    /// Build an outcome from a server message.
    #[must_use]
    pub fn from_message(message: String) -> Self {
        let adjusted = message.to_ascii_lowercase().contains("adjusted");

        Self { message, adjusted }
    }
}

/// Add-to-cart request from a product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCart {
    /// Product being added.
    pub product: Product,

    /// Quantity to add on top of what the cart already holds.
    pub qty: u32,
    /// Selected color and size.
    pub variant: Variant,
}

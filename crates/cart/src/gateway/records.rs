//! Wire records exchanged with the storefront API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{
    CartLineItem, CartTotals, LineItemId, MutationRequest, Product, ProductId, StockSnapshot,
    Variant,
};

/// Wire value meaning "no color selected".
pub(crate) const NO_COLOR: &str = "No Color";

/// Wire value meaning "no size selected".
pub(crate) const NO_SIZE: &str = "No Size";

#[derive(Debug, Deserialize)]
pub(crate) struct ProductRecord {
    id: ProductId,
    title: String,
    slug: String,
    #[serde(default)]
    price: Decimal,
    #[serde(default)]
    stock_qty: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    shipping_amount: Decimal,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            slug: record.slug,
            price: record.price,
            stock_qty: record.stock_qty,
            image: record.image,
            shipping_amount: record.shipping_amount,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LineItemRecord {
    id: LineItemId,
    product: ProductRecord,
    qty: u32,
    #[serde(default)]
    price: Decimal,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl From<LineItemRecord> for CartLineItem {
    fn from(record: LineItemRecord) -> Self {
        Self {
            id: record.id,
            product: record.product.into(),
            qty: record.qty,
            price: record.price,
            variant: Variant {
                color: decode_variant(record.color, NO_COLOR),
                size: decode_variant(record.size, NO_SIZE),
            },
            country: record.country.filter(|country| !country.trim().is_empty()),
        }
    }
}

/// One page of the cart listing; the API answers with either an envelope or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LineItemPage {
    Envelope {
        results: Vec<LineItemRecord>,
        #[serde(default)]
        next: Option<String>,
    },
    Bare(Vec<LineItemRecord>),
}

impl LineItemPage {
    pub(crate) fn into_parts(self) -> (Vec<CartLineItem>, Option<String>) {
        match self {
            Self::Envelope { results, next } => (
                results.into_iter().map(Into::into).collect(),
                next.filter(|next| !next.is_empty()),
            ),
            Self::Bare(results) => (results.into_iter().map(Into::into).collect(), None),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TotalsRecord {
    #[serde(default)]
    mrp_total: Decimal,
    #[serde(default)]
    discounted_total: Decimal,
    #[serde(default)]
    shipping: Decimal,
    #[serde(default)]
    grand_total: Decimal,
}

impl From<TotalsRecord> for CartTotals {
    fn from(record: TotalsRecord) -> Self {
        Self {
            mrp_total: record.mrp_total,
            discounted_total: record.discounted_total,
            shipping: record.shipping,
            grand_total: record.grand_total,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StockRecord {
    #[serde(default)]
    stock_qty: u32,
    title: String,
}

impl From<StockRecord> for StockSnapshot {
    fn from(record: StockRecord) -> Self {
        Self {
            stock_qty: record.stock_qty,
            title: record.title,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageRecord {
    #[serde(default)]
    pub(crate) message: String,
}

/// Form body of `POST cart/`.
#[derive(Debug, Serialize)]
pub(crate) struct UpsertForm<'a> {
    product: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<u64>,
    qty: u32,
    price: Decimal,
    shipping_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<&'a str>,
    size: &'a str,
    color: &'a str,
    cart_id: &'a str,
}

impl<'a> From<&'a MutationRequest> for UpsertForm<'a> {
    fn from(request: &'a MutationRequest) -> Self {
        Self {
            product: request.product.get(),
            user: request.user.map(Into::into),
            qty: request.qty,
            price: request.price,
            shipping_amount: request.shipping_amount,
            country: request.country.as_deref(),
            size: request.variant.size.as_deref().unwrap_or(NO_SIZE),
            color: request.variant.color.as_deref().unwrap_or(NO_COLOR),
            cart_id: request.cart_id.as_str(),
        }
    }
}

fn decode_variant(raw: Option<String>, sentinel: &str) -> Option<String> {
    raw.filter(|value| {
        let value = value.trim();

        !value.is_empty() && value != sentinel
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const LINE_JSON: &str = r#"{
        "id": 7,
        "product": {
            "id": 3,
            "title": "Linen Shirt",
            "slug": "linen-shirt",
            "price": "25.00",
            "stock_qty": 5,
            "image": "https://cdn.example/shirt.jpg"
        },
        "qty": 2,
        "price": "24.50",
        "color": "No Color",
        "size": "XL",
        "country": "Ghana"
    }"#;

    #[test]
    fn sentinel_variants_decode_to_none() -> TestResult {
        let record: LineItemRecord = serde_json::from_str(LINE_JSON)?;
        let item = CartLineItem::from(record);

        assert_eq!(item.variant.color, None);
        assert_eq!(item.variant.size.as_deref(), Some("XL"));
        assert_eq!(item.price, Decimal::new(2450, 2));
        assert_eq!(item.product.stock_qty, 5);

        Ok(())
    }

    #[test]
    fn pages_accept_envelopes_and_bare_arrays() -> TestResult {
        let envelope = format!(
            r#"{{"count": 2, "next": "http://api/cart-list/x/?page=2", "previous": null, "results": [{LINE_JSON}]}}"#
        );

        let (items, next) = serde_json::from_str::<LineItemPage>(&envelope)?.into_parts();

        assert_eq!(items.len(), 1);
        assert_eq!(next.as_deref(), Some("http://api/cart-list/x/?page=2"));

        let bare = format!("[{LINE_JSON}, {LINE_JSON}]");

        let (items, next) = serde_json::from_str::<LineItemPage>(&bare)?.into_parts();

        assert_eq!(items.len(), 2);
        assert_eq!(next, None);

        Ok(())
    }
}

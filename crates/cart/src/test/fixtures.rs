//! Test fixtures

use rust_decimal::Decimal;

use crate::cart::{CartLineItem, CartTotals, LineItemId, Product, ProductId, Variant};

pub(crate) fn product(id: u64, slug: &str, stock_qty: u32) -> Product {
    Product {
        id: ProductId::new(id),
        title: slug.to_uppercase(),
        slug: slug.to_string(),
        price: Decimal::new(10_00, 2),
        stock_qty,
        image: None,
        shipping_amount: Decimal::new(2_50, 2),
    }
}

pub(crate) fn line_item(id: u64, product: &Product, qty: u32) -> CartLineItem {
    CartLineItem {
        id: LineItemId::new(id),
        product: product.clone(),
        qty,
        price: product.price,
        variant: Variant::none(),
        country: None,
    }
}

pub(crate) fn totals(grand_total: i64) -> CartTotals {
    CartTotals {
        mrp_total: Decimal::new(grand_total, 2),
        discounted_total: Decimal::new(grand_total, 2),
        shipping: Decimal::ZERO,
        grand_total: Decimal::new(grand_total, 2),
    }
}

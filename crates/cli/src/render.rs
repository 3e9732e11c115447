//! Terminal output

use storefront_cart::{
    cart::{CartLineView, CartView, Variant},
    identity::CartIdentity,
    notices::Notice,
};

fn variant_label(variant: &Variant) -> String {
    match (variant.color.as_deref(), variant.size.as_deref()) {
        (Some(color), Some(size)) => format!("{color} / {size}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => String::new(),
    }
}

pub(crate) fn line(line: &CartLineView) -> String {
    let item = &line.item;
    let variant = variant_label(&item.variant);
    let marker = if line.pending { " (pending)" } else { "" };

    format!(
        "{:>8}  {:<32} {:<16} x{:<4} @ {}{marker}",
        item.id, item.product.title, variant, item.qty, item.price
    )
}

#[expect(clippy::print_stdout, reason = "cart contents are the command's output")]
pub(crate) fn cart(identity: &CartIdentity, view: &CartView, badge: u32) {
    if view.is_empty() {
        println!("Cart {identity} is empty");
    } else {
        println!("Cart {identity}");

        for entry in &view.lines {
            println!("{}", line(entry));
        }

        let totals = &view.totals;

        println!(
            "MRP {}  Discounted {}  Shipping {}  Total {}",
            totals.mrp_total, totals.discounted_total, totals.shipping, totals.grand_total
        );
    }

    println!("Items in cart: {badge}");
}

#[expect(clippy::print_stdout, reason = "notices are shown to the shopper")]
pub(crate) fn notice(notice: &Notice) {
    println!("! {notice}");
}

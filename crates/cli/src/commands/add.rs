//! `cart add`

use clap::Args;
use rust_decimal::Decimal;
use storefront_cart::{
    cart::{AddToCart, Product, ProductId, Variant},
    context::CartContext,
};
use tracing::info;

use crate::{CliError, render};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Product slug used for the stock lookup
    #[arg(long)]
    pub product_slug: String,

    /// Product id
    #[arg(long)]
    pub product_id: u64,

    /// Units to add
    #[arg(long, default_value_t = 1_u32)]
    pub qty: u32,

    /// Unit price recorded on the line
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub price: Decimal,

    /// Shipping amount recorded on the line
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub shipping_amount: Decimal,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub size: Option<String>,
}

impl AddArgs {
    fn request(&self) -> AddToCart {
        AddToCart {
            product: Product {
                id: ProductId::new(self.product_id),
                title: self.product_slug.clone(),
                slug: self.product_slug.clone(),
                price: self.price,
                stock_qty: 0,
                image: None,
                shipping_amount: self.shipping_amount,
            },
            qty: self.qty,
            variant: Variant {
                color: self.color.clone(),
                size: self.size.clone(),
            },
        }
    }
}

pub(crate) async fn run(context: &CartContext, args: &AddArgs) -> Result<(), CliError> {
    let plan = context.session.add_item(args.request()).await?;

    info!(
        added = plan.allowed_qty,
        line_qty = plan.final_qty,
        clipped = plan.clipped,
        "add to cart finished"
    );

    let session = &context.session;

    render::cart(session.identity(), &session.view(), session.badge().count());

    Ok(())
}

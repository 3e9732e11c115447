//! `cart set`

use clap::Args;
use storefront_cart::{cart::LineItemId, context::CartContext};

use crate::{CliError, render};

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Line item id
    #[arg(long)]
    pub line: u64,

    /// New quantity; 0 removes the line
    #[arg(long)]
    pub qty: u32,
}

pub(crate) async fn run(context: &CartContext, args: &SetArgs) -> Result<(), CliError> {
    let session = &context.session;

    session.refresh().await?;
    session
        .mutate_quantity(LineItemId::new(args.line), args.qty)
        .await?;
    session.settle().await;

    render::cart(session.identity(), &session.view(), session.badge().count());

    Ok(())
}

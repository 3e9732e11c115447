//! `cart remove`

use clap::Args;
use storefront_cart::{cart::LineItemId, context::CartContext};

use crate::{CliError, render};

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Line item id
    #[arg(long)]
    pub line: u64,
}

pub(crate) async fn run(context: &CartContext, args: &RemoveArgs) -> Result<(), CliError> {
    let session = &context.session;

    session.refresh().await?;
    session.remove_item(LineItemId::new(args.line)).await?;

    render::cart(session.identity(), &session.view(), session.badge().count());

    Ok(())
}

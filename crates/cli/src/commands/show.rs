//! `cart show`

use clap::Args;
use storefront_cart::{context::CartContext, reconciler::SweepOutcome};
use tracing::debug;

use crate::{CliError, render};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Reconcile quantities against live stock first
    #[arg(long)]
    pub sweep: bool,
}

pub(crate) async fn run(context: &CartContext, args: &ShowArgs) -> Result<(), CliError> {
    context.session.refresh().await?;

    if args.sweep
        && let SweepOutcome::Completed(report) = context.sweeper.on_focus_regained().await?
    {
        debug!(checked = report.checked, adjusted = report.adjusted.len(), "stock checked");
    }

    let session = &context.session;

    render::cart(session.identity(), &session.view(), session.badge().count());

    Ok(())
}

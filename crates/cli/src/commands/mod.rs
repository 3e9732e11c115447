//! Subcommands

use clap::Subcommand;
use storefront_cart::{context::CartContext, notices::Notice};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{CliError, config::CliConfig, render};

mod add;
mod remove;
mod set;
mod show;
mod watch;

pub use add::AddArgs;
pub use remove::RemoveArgs;
pub use set::SetArgs;
pub use show::ShowArgs;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Refresh and print the cart
    Show(ShowArgs),

    /// Add units of a product
    Add(AddArgs),

    /// Set the quantity of a line
    Set(SetArgs),

    /// Remove a line
    Remove(RemoveArgs),

    /// Keep the cart reconciled against stock until interrupted
    Watch,
}

pub(crate) async fn run(
    config: &CliConfig,
    context: &CartContext,
    notices: &mut UnboundedReceiver<Notice>,
) -> Result<(), CliError> {
    match &config.command {
        Command::Show(args) => show::run(context, args).await?,
        Command::Add(args) => add::run(context, args).await?,
        Command::Set(args) => set::run(context, args).await?,
        Command::Remove(args) => remove::run(context, args).await?,
        Command::Watch => watch::run(context, config.session.sweep_interval(), notices).await?,
    }

    while let Ok(notice) = notices.try_recv() {
        render::notice(&notice);
    }

    Ok(())
}

//! `cart watch`

use std::time::Duration;

use storefront_cart::{context::CartContext, notices::Notice};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::{CliError, render, shutdown};

pub(crate) async fn run(
    context: &CartContext,
    interval: Duration,
    notices: &mut UnboundedReceiver<Notice>,
) -> Result<(), CliError> {
    let session = &context.session;
    let mut badge = session.badge();

    session.refresh().await?;

    info!(interval_seconds = interval.as_secs(), "watching cart");

    render::cart(session.identity(), &session.view(), badge.count());

    let sweeps = context.sweeper.spawn_sweeper(interval);
    let shutdown = shutdown::wait();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            Some(notice) = notices.recv() => render::notice(&notice),
            Some(count) = badge.changed() => {
                render::cart(session.identity(), &session.view(), count);
            }
        }
    }

    sweeps.stop();

    Ok(())
}

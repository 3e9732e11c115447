//! Periodic reconciliation of cart lines against live stock.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use smallvec::SmallVec;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{Span, debug, info, warn};

use crate::{
    cart::CartLineItem,
    gateway::GatewayError,
    notices::Notice,
    session::CartSession,
};

/// What a completed sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Lines checked against stock.
    pub checked: usize,

    /// Titles of lines whose quantity was lowered or removed.
    pub adjusted: SmallVec<[String; 4]>,

    /// Lines that could not be checked or clamped.
    pub failed: usize,
}

/// Result of one sweep request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Another sweep was already running.
    Skipped,
    /// The sweep ran to the end.
    Completed(SweepReport),
}

/// Clamps cart lines that exceed live stock. At most one sweep runs at a time.
#[derive(Debug, Clone)]
pub struct StockSweeper {
    session: CartSession,
    in_progress: Arc<AtomicBool>,
}

struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl StockSweeper {
    /// Sweeper for `session`.
    #[must_use]
    pub fn new(session: CartSession) -> Self {
        Self {
            session,
            in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check every line against live stock and clamp the ones above it.
    ///
    /// Lines whose product is out of stock are removed. The cart is refreshed
    /// once afterwards and a single notice lists the adjusted items.
    #[tracing::instrument(
        name = "cart.reconciler.sweep",
        skip(self),
        fields(checked = tracing::field::Empty, adjusted = tracing::field::Empty)
    )]
    pub async fn sweep(&self) -> SweepOutcome {
        if self.in_progress.swap(true, Ordering::AcqRel) {
            debug!("stock sweep already running");

            return SweepOutcome::Skipped;
        }

        let _guard = SweepGuard(&self.in_progress);
        let mut report = SweepReport::default();

        for item in self.session.items().await {
            report.checked += 1;

            match self.clamp(&item).await {
                Ok(true) => report.adjusted.push(item.product.title.clone()),
                Ok(false) => {}
                Err(error) => {
                    warn!(%error, line = %item.id, "stock check failed, skipping line");

                    report.failed += 1;
                }
            }
        }

        Span::current().record("checked", report.checked);
        Span::current().record("adjusted", report.adjusted.len());

        self.session.refresh_after_mutation().await;

        if !report.adjusted.is_empty() {
            info!(items = ?report.adjusted, "quantities lowered to available stock");

            self.session.notify(Notice::StockAdjusted {
                titles: report.adjusted.clone(),
            });
        }

        SweepOutcome::Completed(report)
    }

    /// Returns whether the line was changed.
    async fn clamp(&self, item: &CartLineItem) -> Result<bool, GatewayError> {
        let snapshot = self.session.stock().fetch_stock(&item.product.slug).await?;

        if item.qty <= snapshot.stock_qty {
            return Ok(false);
        }

        if snapshot.stock_qty == 0 {
            self.session
                .carts()
                .delete_item(self.session.identity(), item.id, self.session.config().user)
                .await?;
        } else {
            self.session
                .carts()
                .upsert_item(&self.session.line_request(item, snapshot.stock_qty))
                .await?;
        }

        Ok(true)
    }

    /// Sweep in the background, typically when the shopper comes back to the app.
    pub fn on_focus_regained(&self) -> JoinHandle<SweepOutcome> {
        let sweeper = self.clone();

        tokio::spawn(async move { sweeper.sweep().await })
    }

    /// Sweep now and then every `period` until the returned task is stopped.
    #[must_use]
    pub fn spawn_sweeper(&self, period: Duration) -> SweepTask {
        let sweeper = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticks = interval(period);

            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;

                if let SweepOutcome::Completed(report) = sweeper.sweep().await {
                    debug!(checked = report.checked, failed = report.failed, "stock sweep done");
                }
            }
        });

        SweepTask { handle }
    }
}

/// Handle to a periodic sweep. Dropping it stops the sweep.
#[derive(Debug)]
pub struct SweepTask {
    handle: JoinHandle<()>,
}

impl SweepTask {
    /// Abort the periodic sweep.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use crate::test::{TestContext, fixtures::product};

    use super::*;

    #[tokio::test]
    async fn sweep_clamps_and_removes_lines_over_stock() -> TestResult {
        let mut ctx = TestContext::new();
        let a = product(1, "a", 5);
        let b = product(2, "b", 10);
        let c = product(3, "c", 2);

        ctx.storefront.seed(&a, 5).await;
        ctx.storefront.seed(&b, 1).await;
        ctx.storefront.seed(&c, 2).await;
        ctx.session.refresh().await?;

        ctx.storefront.set_stock(a.id, 2).await;
        ctx.storefront.set_stock(c.id, 0).await;

        let outcome = StockSweeper::new(ctx.session.clone()).sweep().await;

        assert_eq!(
            outcome,
            SweepOutcome::Completed(SweepReport {
                checked: 3,
                adjusted: SmallVec::from_vec(vec!["A".to_string(), "C".to_string()]),
                failed: 0,
            })
        );

        let quantities: Vec<_> = ctx
            .storefront
            .lines()
            .await
            .iter()
            .map(|line| (line.product.id, line.qty))
            .collect();

        assert_eq!(quantities, vec![(a.id, 2), (b.id, 1)]);
        assert_eq!(ctx.badge.count(), 3);
        assert_eq!(
            ctx.drain_notices(),
            vec![Notice::StockAdjusted {
                titles: SmallVec::from_vec(vec!["A".to_string(), "C".to_string()]),
            }]
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sweeps_do_not_overlap() -> TestResult {
        let ctx = TestContext::with_latency(Duration::from_millis(100));
        let a = product(1, "a", 5);

        ctx.storefront.seed(&a, 1).await;
        ctx.session.refresh().await?;

        let sweeper = StockSweeper::new(ctx.session.clone());
        let (first, second) = tokio::join!(sweeper.sweep(), sweeper.sweep());

        assert!(
            matches!(
                (&first, &second),
                (SweepOutcome::Completed(_), SweepOutcome::Skipped)
                    | (SweepOutcome::Skipped, SweepOutcome::Completed(_))
            ),
            "exactly one sweep should run, got {first:?} and {second:?}"
        );
        assert_eq!(ctx.storefront.calls().await.stock, 1);

        assert!(
            matches!(sweeper.sweep().await, SweepOutcome::Completed(_)),
            "flag is released after a sweep"
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_lines_are_skipped() -> TestResult {
        let mut ctx = TestContext::new();
        let a = product(1, "a", 5);
        let b = product(2, "b", 5);

        ctx.storefront.seed(&a, 4).await;
        ctx.storefront.seed(&b, 4).await;
        ctx.session.refresh().await?;

        ctx.storefront.set_stock(b.id, 1).await;
        ctx.storefront
            .update(|state| {
                state.failing_stock.insert("a".to_string());
            })
            .await;

        let outcome = StockSweeper::new(ctx.session.clone()).sweep().await;

        assert_eq!(
            outcome,
            SweepOutcome::Completed(SweepReport {
                checked: 2,
                adjusted: SmallVec::from_vec(vec!["B".to_string()]),
                failed: 1,
            })
        );
        assert_eq!(ctx.badge.count(), 5);
        assert_eq!(ctx.drain_notices().len(), 1, "one batched notice");

        Ok(())
    }

    #[tokio::test]
    async fn sweep_within_stock_changes_nothing() -> TestResult {
        let mut ctx = TestContext::new();
        let a = product(1, "a", 5);

        ctx.storefront.seed(&a, 2).await;
        ctx.session.refresh().await?;

        let outcome = StockSweeper::new(ctx.session.clone()).sweep().await;

        assert_eq!(
            outcome,
            SweepOutcome::Completed(SweepReport {
                checked: 1,
                ..SweepReport::default()
            })
        );
        assert_eq!(ctx.storefront.calls().await.upsert, 0);
        assert!(ctx.drain_notices().is_empty(), "nothing to report");

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_sweep_runs_until_stopped() -> TestResult {
        let ctx = TestContext::new();
        let a = product(1, "a", 5);

        ctx.storefront.seed(&a, 5).await;
        ctx.session.refresh().await?;
        ctx.storefront.set_stock(a.id, 3).await;

        let task = StockSweeper::new(ctx.session.clone()).spawn_sweeper(Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(ctx.badge.count(), 3, "first tick sweeps immediately");

        task.stop();

        ctx.storefront.set_stock(a.id, 1).await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(
            ctx.storefront.lines().await.first().map(|line| line.qty),
            Some(3),
            "stopped sweeper leaves the cart alone"
        );

        Ok(())
    }

    #[tokio::test]
    async fn focus_regained_sweeps_in_the_background() -> TestResult {
        let ctx = TestContext::new();
        let a = product(1, "a", 5);

        ctx.storefront.seed(&a, 5).await;
        ctx.session.refresh().await?;
        ctx.storefront.set_stock(a.id, 4).await;

        let outcome = StockSweeper::new(ctx.session.clone())
            .on_focus_regained()
            .await?;

        assert!(matches!(outcome, SweepOutcome::Completed(_)), "sweep should run");
        assert_eq!(ctx.badge.count(), 4);

        Ok(())
    }
}

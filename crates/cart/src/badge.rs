//! Cart badge counter.
//!
//! One [`BadgeCounter`] writes, any number of [`BadgeReader`]s observe. The
//! writer is not `Clone`, so whoever owns it is the only component able to move
//! the count.

use tokio::sync::watch;

/// Writer side of the shared badge count.
#[derive(Debug)]
pub struct BadgeCounter {
    tx: watch::Sender<u32>,
}

impl BadgeCounter {
    /// Counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);

        Self { tx }
    }

    /// Hand out a read-only observer.
    #[must_use]
    pub fn reader(&self) -> BadgeReader {
        BadgeReader {
            rx: self.tx.subscribe(),
        }
    }

    /// Current count.
    #[must_use]
    pub fn count(&self) -> u32 {
        *self.tx.borrow()
    }

    /// Publish a new count, waking observers only when it changed.
    pub fn set(&self, count: u32) {
        self.tx.send_if_modified(|current| {
            if *current == count {
                return false;
            }

            *current = count;

            true
        });
    }
}

impl Default for BadgeCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only observer of the badge count.
#[derive(Debug, Clone)]
pub struct BadgeReader {
    rx: watch::Receiver<u32>,
}

impl BadgeReader {
    /// Current count.
    #[must_use]
    pub fn count(&self) -> u32 {
        *self.rx.borrow()
    }

    /// Wait for the next change and return the new count.
    ///
    /// Returns `None` once the writer has been dropped.
    pub async fn changed(&mut self) -> Option<u32> {
        self.rx.changed().await.ok()?;

        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn readers_observe_every_distinct_count() {
        let counter = BadgeCounter::new();
        let mut reader = counter.reader();

        counter.set(3);

        assert_eq!(reader.changed().await, Some(3));

        counter.set(3);
        counter.set(5);

        assert_eq!(reader.changed().await, Some(5));
        assert_eq!(counter.reader().count(), 5);
    }

    #[tokio::test]
    async fn readers_stop_when_the_writer_is_gone() {
        let counter = BadgeCounter::new();
        let mut reader = counter.reader();

        drop(counter);

        assert_eq!(reader.changed().await, None);
    }
}

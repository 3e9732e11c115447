//! Per-line debounce bookkeeping.

use std::mem;

use rustc_hash::FxHashMap;
use tokio::task::{AbortHandle, JoinHandle};

use crate::cart::LineItemId;

#[derive(Debug)]
struct Latest {
    token: u64,

    /// The task is past its delay and talking to the server.
    committing: bool,
    abort: AbortHandle,
}

/// Tracks the latest delayed commit for each line.
///
/// A newer schedule for the same line aborts the older task while it is still
/// waiting; a task already committing is left to finish.
#[derive(Debug, Default)]
pub(crate) struct Debouncer {
    latest: FxHashMap<LineItemId, Latest>,
    tasks: Vec<JoinHandle<()>>,
}

impl Debouncer {
    pub(crate) fn schedule(&mut self, line: LineItemId, token: u64, handle: JoinHandle<()>) {
        let latest = Latest {
            token,
            committing: false,
            abort: handle.abort_handle(),
        };

        if let Some(previous) = self.latest.insert(line, latest)
            && !previous.committing
        {
            previous.abort.abort();
        }

        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(handle);
    }

    /// Claim the right to commit. Fails when a newer schedule exists.
    pub(crate) fn begin_commit(&mut self, line: LineItemId, token: u64) -> bool {
        match self.latest.get_mut(&line) {
            Some(latest) if latest.token == token => {
                latest.committing = true;

                true
            }
            _ => false,
        }
    }

    /// Drop bookkeeping for a commit that has finished.
    pub(crate) fn finish(&mut self, line: LineItemId, token: u64) {
        if self
            .latest
            .get(&line)
            .is_some_and(|latest| latest.token == token)
        {
            self.latest.remove(&line);
        }
    }

    /// Abort a commit that has not started yet.
    pub(crate) fn cancel(&mut self, line: LineItemId) {
        if let Some(latest) = self.latest.remove(&line)
            && !latest.committing
        {
            latest.abort.abort();
        }
    }

    /// Take every spawned task so the caller can await it.
    pub(crate) fn take_tasks(&mut self) -> Vec<JoinHandle<()>> {
        mem::take(&mut self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use std::future;

    use super::*;

    #[tokio::test]
    async fn newer_schedule_aborts_a_waiting_task() {
        let mut debouncer = Debouncer::default();
        let line = LineItemId::new(1);

        debouncer.schedule(line, 1, tokio::spawn(future::pending::<()>()));
        debouncer.schedule(line, 2, tokio::spawn(async {}));

        let mut outcomes = Vec::new();

        for task in debouncer.take_tasks() {
            outcomes.push(task.await.map_err(|error| error.is_cancelled()));
        }

        assert_eq!(outcomes, vec![Err(true), Ok(())]);
        assert!(!debouncer.begin_commit(line, 1), "old token lost the slot");
        assert!(debouncer.begin_commit(line, 2), "latest token may commit");
    }

    #[tokio::test]
    async fn committing_task_survives_a_newer_schedule() {
        let mut debouncer = Debouncer::default();
        let line = LineItemId::new(1);

        debouncer.schedule(line, 1, tokio::spawn(async {}));

        assert!(debouncer.begin_commit(line, 1), "token 1 is current");

        debouncer.schedule(line, 2, tokio::spawn(async {}));

        let tasks = debouncer.take_tasks();

        assert_eq!(tasks.len(), 2, "both tasks remain awaitable");

        for task in tasks {
            assert!(task.await.is_ok(), "neither task was aborted");
        }

        assert!(debouncer.take_tasks().is_empty(), "tasks are handed out once");
    }

    #[tokio::test]
    async fn cancel_frees_the_slot() {
        let mut debouncer = Debouncer::default();
        let line = LineItemId::new(1);

        debouncer.schedule(line, 1, tokio::spawn(future::pending::<()>()));
        debouncer.cancel(line);

        assert!(!debouncer.begin_commit(line, 1), "cancelled token cannot commit");

        for task in debouncer.take_tasks() {
            assert!(
                task.await.is_err_and(|error| error.is_cancelled()),
                "waiting task should be aborted"
            );
        }
    }
}

//! Bookkeeping for connection workers that are still running.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Counts live connection workers so shutdown can wait for them.
#[derive(Debug, Default)]
pub(crate) struct WorkerGauge {
    active: Mutex<usize>,
    idle: Condvar,
}

impl WorkerGauge {
    /// Registers a worker. The count drops again when the guard is dropped.
    pub(crate) fn enter(self: &Arc<Self>) -> WorkerGuard {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        WorkerGuard {
            gauge: Arc::clone(self),
        }
    }

    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until no worker is running or `grace` elapses. Returns the
    /// number of workers still running.
    pub(crate) fn wait_idle(&self, grace: Duration) -> usize {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let (active, _) = self
            .idle
            .wait_timeout_while(active, grace, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *active
    }

    fn leave(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.idle.notify_all();
        }
    }
}

/// Marks one running worker.
#[derive(Debug)]
pub(crate) struct WorkerGuard {
    gauge: Arc<WorkerGauge>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.gauge.leave();
    }
}

// src/view/debounce.rs

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

struct Pending<K> {
    key: K,
    handle: JoinHandle<()>,
}

/// Runs only the last of a burst of scheduled tasks.
///
/// Each [`schedule`](Debouncer::schedule) aborts the task still waiting out its
/// delay and starts a new one. Once the delay has elapsed the work is detached
/// and runs to completion; it is never cancelled mid-flight.
pub struct Debouncer<K> {
    delay: Duration,
    pending: Mutex<Option<Pending<K>>>,
}

impl<K: Clone + Send + 'static> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Replaces any waiting task with `work`, to run after the delay.
    pub fn schedule<F>(&self, key: K, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(work);
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Pending { key, handle });
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    /// Drops the waiting task, if any.
    pub fn cancel(&self) {
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    /// Key of the task still waiting out its delay.
    pub fn pending_key(&self) -> Option<K> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|pending| !pending.handle.is_finished())
            .map(|pending| pending.key.clone())
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        if let Some(pending) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.handle.abort();
        }
    }
}

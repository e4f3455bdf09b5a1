//! Periodic tick scheduling with an explicit cancel handle.
//!
//! A [`Ticker`] owns one background task that fires a callback once per
//! period until it is cancelled or dropped. The callback receives the
//! ticker's token so it can re-check cancellation after acquiring whatever
//! lock guards the state it mutates; a tick that loses the race against
//! `cancel()` must not act.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

/// Handle to a running periodic callback. Cancelled on drop.
#[derive(Debug)]
pub struct Ticker {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a task that calls `on_tick` every `period`. The first call
    /// happens one full period after spawning. Returning
    /// `ControlFlow::Break` from the callback ends the task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if on_tick(token.clone()).await.is_break() {
                            break;
                        }
                    }
                }
            }
            tracing::trace!("ticker stopped");
        });
        Self { cancel, task }
    }

    /// Stop future ticks. A callback already in flight finishes, but sees
    /// the token as cancelled.
    ///
    /// Does not abort the task: cancelling from inside the callback (on
    /// completion) must not cut off the rest of that callback.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

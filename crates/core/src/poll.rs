//! Approval-status polling.
//!
//! The ledger pushes nothing; a view that wants to notice a transition
//! (request approved, new request filed) has to re-classify its counterparties
//! on a clock. [`StatusPoller`] owns that clock: one sweep immediately on
//! activation, then one per interval, for as long as the owning view keeps the
//! poller alive.
//!
//! Two hardening rules:
//!
//! - Sweeps never overlap. The sweep runs inside the polling task itself, and
//!   ticks that would fire while a sweep is still in flight are skipped, so a
//!   slow network cannot fan out unbounded concurrent sweeps.
//! - A poller that is stopped (or dropped) aborts its task. There is no
//!   cancellation for an individual in-flight ledger call; its eventual
//!   result is simply discarded, and the watch channel stops the task from
//!   updating torn-down state once every subscriber is gone.
//!
//! A failed sweep is logged and the last good snapshot kept; the next tick
//! retries from scratch.

use crate::error::LedgerResult;
use crate::lifecycle::ConsultationStatus;
use medledger_types::Address;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Interval between status sweeps while a view is active.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// One complete classification pass over a view's counterparties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSweep {
    pub statuses: BTreeMap<Address, ConsultationStatus>,
}

impl StatusSweep {
    pub fn status(&self, party: Address) -> Option<ConsultationStatus> {
        self.statuses.get(&party).copied()
    }
}

/// A cancellable polling task owned by the active view's lifetime.
///
/// Created via [`StatusPoller::spawn`]; dropping the poller (or calling
/// [`StatusPoller::stop`]) aborts the task.
#[derive(Debug)]
pub struct StatusPoller {
    task: JoinHandle<()>,
}

impl StatusPoller {
    /// Spawns the polling task.
    ///
    /// `sweep` is invoked once immediately and then once per `interval`;
    /// each successful sweep is published through the returned watch channel
    /// (`None` until the first sweep lands). Each sweep is independent and
    /// idempotent.
    ///
    /// The task exits on its own when every receiver of the channel has been
    /// dropped.
    pub fn spawn<F, Fut>(
        interval: Duration,
        mut sweep: F,
    ) -> (Self, watch::Receiver<Option<StatusSweep>>)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = LedgerResult<StatusSweep>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Ticks that fire mid-sweep are skipped, not queued: the sweep
            // loop must never fall behind its own clock.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                // The first tick completes immediately: the activation sweep.
                ticker.tick().await;

                match sweep().await {
                    Ok(snapshot) => {
                        if tx.send(Some(snapshot)).is_err() {
                            // Every subscriber is gone; the view was torn
                            // down without stopping us.
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%error, "status sweep failed; keeping last snapshot");
                    }
                }
            }
        });

        (Self { task }, rx)
    }

    /// Stops polling. An in-flight sweep is aborted and its result discarded.
    pub fn stop(self) {
        drop(self);
    }

    /// Whether the polling task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

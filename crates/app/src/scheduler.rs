//! Scheduler: periodic background jobs on the tokio runtime.
//!
//! Every job is a tokio task driven by an [`Interval`](tokio::time::Interval)
//! and a shared [`CancellationToken`]. Jobs are synchronous closures; each
//! cycle runs on the blocking pool so a slow job never stalls the async
//! workers or [`Scheduler::stop`]. A job can end itself by returning
//! [`ControlFlow::Break`].

use std::ops::ControlFlow;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Owner of all periodic tasks of the hub.
#[derive(Debug)]
pub struct Scheduler {
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    stop_grace: Duration,
}

impl Scheduler {
    /// Create a scheduler. `stop_grace` bounds how long [`stop`](Self::stop)
    /// waits for in-flight jobs before aborting them.
    #[must_use]
    pub fn new(stop_grace: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            stop_grace,
        }
    }

    /// Run `job` after `first_run`, then every `period`.
    ///
    /// Returns `false` (and spawns nothing) once the scheduler is stopped.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime, or if `period` is zero.
    pub fn every<F>(&self, name: &'static str, first_run: Duration, period: Duration, job: F) -> bool
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        if self.cancel.is_cancelled() {
            tracing::warn!(task = name, "scheduler is stopped, not scheduling task");
            return false;
        }

        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + first_run, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut job = job;
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                // The closure travels to the blocking pool and back each cycle.
                let cycle = tokio::task::spawn_blocking(move || {
                    let flow = job();
                    (job, flow)
                });
                match cycle.await {
                    Ok((returned, flow)) => {
                        if flow.is_break() {
                            break;
                        }
                        job = returned;
                    }
                    Err(err) => {
                        tracing::warn!(task = name, %err, "scheduled job panicked");
                        break;
                    }
                }
            }
            tracing::debug!(task = name, "scheduled task finished");
        });

        let mut tasks = self.lock_tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
        true
    }

    #[cfg(test)]
    fn active_tasks(&self) -> usize {
        self.lock_tasks()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Halt all periodic activity.
    ///
    /// No new cycle starts once this returns. Jobs already running get up to
    /// the grace period to finish; after that their tasks are aborted and
    /// `stop` returns. A job that never finishes keeps its blocking thread
    /// but can no longer schedule another cycle.
    pub async fn stop(&self) {
        self.cancel.cancel();

        let tasks = std::mem::take(&mut *self.lock_tasks());
        let aborts: Vec<_> = tasks.iter().map(JoinHandle::abort_handle).collect();
        let drain = async {
            for task in tasks {
                let _ = task.await;
            }
        };

        if tokio::time::timeout(self.stop_grace, drain).await.is_err() {
            tracing::warn!(
                grace_ms = self.stop_grace.as_millis(),
                "scheduled tasks did not stop in time, aborting"
            );
            for abort in aborts {
                abort.abort();
            }
        }
        tracing::info!("scheduler stopped");
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

use std::time::{Duration, Instant};

use futures::{
  executor::{ThreadPool, ThreadPoolBuilder},
  future::{AbortHandle, Abortable},
  task::SpawnExt,
  Future, FutureExt,
};
use futures_time::task::sleep;

use super::{
  check_period, run_isolated, too_far, Action, PeriodicAction, Scheduler, TaskHandle,
};
use crate::{error::RxError, subscription::Disposable};

/// Real-time scheduler backed by a `futures` thread pool.
///
/// Each scheduled task is an abortable future that sleeps until it is due and
/// then runs its action on one of the pool threads. Cloning is cheap and
/// clones share the pool.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
  epoch: Instant,
}

impl ThreadPoolScheduler {
  /// A scheduler with one worker per CPU.
  pub fn new() -> Result<Self, RxError> { Self::build(ThreadPoolBuilder::new()) }

  pub fn with_pool_size(size: usize) -> Result<Self, RxError> {
    let mut builder = ThreadPoolBuilder::new();
    builder.pool_size(size);
    Self::build(builder)
  }

  fn build(mut builder: ThreadPoolBuilder) -> Result<Self, RxError> {
    let pool = builder
      .name_prefix("rxcore-computation-")
      .create()
      .map_err(|e| RxError::Scheduler(format!("cannot start thread pool: {e}")))?;
    Ok(ThreadPoolScheduler { pool, epoch: Instant::now() })
  }

  fn spawn(
    &self, handle: &TaskHandle, task: impl Future<Output = ()> + Send + 'static,
  ) -> Result<(), RxError> {
    let (abort, registration) = AbortHandle::new_pair();
    handle.set_abort_handle(abort);
    self
      .pool
      .spawn(Abortable::new(task, registration).map(|_| ()))
      .map_err(|e| {
        log::warn!("spawn task to thread pool failed: {e}");
        RxError::Scheduler(e.to_string())
      })
  }
}

impl Scheduler for ThreadPoolScheduler {
  fn now(&self) -> Duration { self.epoch.elapsed() }

  fn schedule(&self, delay: Duration, action: Action) -> Result<TaskHandle, RxError> {
    let due = Instant::now().checked_add(delay).ok_or_else(|| too_far(delay))?;
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    self.spawn(&handle, async move {
      sleep_until(due).await;
      if !c_handle.is_disposed() && run_isolated(&c_handle, action) {
        c_handle.mark_finished();
      }
    })?;
    Ok(handle)
  }

  fn schedule_at_fixed_rate(
    &self, initial_delay: Duration, period: Duration, mut action: PeriodicAction,
  ) -> Result<TaskHandle, RxError> {
    check_period(period)?;
    let first =
      Instant::now().checked_add(initial_delay).ok_or_else(|| too_far(initial_delay))?;
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    self.spawn(&handle, async move {
      // Each due time is the previous one plus a period, so slow runs do not
      // make the cadence drift.
      let mut due = first;
      loop {
        sleep_until(due).await;
        if c_handle.is_disposed() || !run_isolated(&c_handle, &mut action) {
          break;
        }
        match due.checked_add(period) {
          Some(next) => due = next,
          None => {
            log::warn!("periodic task stopped: next due time overflows the clock");
            c_handle.dispose();
            break;
          }
        }
      }
    })?;
    Ok(handle)
  }
}

async fn sleep_until(due: Instant) {
  let now = Instant::now();
  if due > now {
    sleep((due - now).into()).await;
  }
}

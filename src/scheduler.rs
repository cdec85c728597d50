//! Schedulers decide when the work of time-based sources runs.
//!
//! Every time-based operator goes through the [`Scheduler`] trait and never
//! touches wall-clock primitives directly. Two implementations are provided:
//!
//! - [`ThreadPoolScheduler`]: real time, callbacks run on a `futures` thread
//!   pool.
//! - [`TestScheduler`]: virtual time that only moves when a test calls
//!   [`TestScheduler::advance_time_by`].
//!
//! # Computation scheduler
//!
//! Exactly one scheduler is bound as the process-wide *computation scheduler*.
//! Factories without an explicit scheduler (`Observable::interval`,
//! `Observable::take_for`) read the binding once, when the observable is
//! built. The binding can be swapped with [`set_computation`] and must be put
//! back explicitly with [`reset_computation`], or scoped with
//! [`ComputationOverride`]. Nothing resets it implicitly.

use std::{
  panic::{self, AssertUnwindSafe},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, RwLock,
  },
  time::{Duration, Instant},
};

use futures::future::AbortHandle;
use once_cell::sync::Lazy;

use crate::{
  error::RxError,
  hooks,
  subscription::Disposable,
  util::{lock, panic_message, read, write},
};

mod test_scheduler;
mod thread_pool_scheduler;

pub use test_scheduler::TestScheduler;
pub use thread_pool_scheduler::ThreadPoolScheduler;

/// A one-shot unit of work.
pub type Action = Box<dyn FnOnce() + Send>;

/// A unit of work that runs once per period.
pub type PeriodicAction = Box<dyn FnMut() + Send>;

/// Shared, type-erased scheduler.
pub type SchedulerRef = Arc<dyn Scheduler>;

/// A Scheduler is an object to order tasks and schedule their execution.
pub trait Scheduler: Send + Sync {
  /// Time elapsed on this scheduler's clock.
  fn now(&self) -> Duration;

  /// Runs `action` once, after `delay`.
  fn schedule(&self, delay: Duration, action: Action) -> Result<TaskHandle, RxError>;

  /// Runs `action` first after `initial_delay` and then once every `period`.
  ///
  /// The cadence is measured from the first due time, not from the end of the
  /// previous run. `period` must be greater than zero.
  fn schedule_at_fixed_rate(
    &self, initial_delay: Duration, period: Duration, action: PeriodicAction,
  ) -> Result<TaskHandle, RxError>;
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  #[inline]
  fn now(&self) -> Duration { (**self).now() }

  #[inline]
  fn schedule(&self, delay: Duration, action: Action) -> Result<TaskHandle, RxError> {
    (**self).schedule(delay, action)
  }

  #[inline]
  fn schedule_at_fixed_rate(
    &self, initial_delay: Duration, period: Duration, action: PeriodicAction,
  ) -> Result<TaskHandle, RxError> {
    (**self).schedule_at_fixed_rate(initial_delay, period, action)
  }
}

pub(crate) fn check_period(period: Duration) -> Result<(), RxError> {
  if period.is_zero() {
    Err(RxError::InvalidArgument("period must be greater than zero".to_string()))
  } else {
    Ok(())
  }
}

pub(crate) fn too_far(delay: Duration) -> RxError {
  RxError::InvalidArgument(format!("delay of {delay:?} overflows the scheduler clock"))
}

/// Runs one action of `handle`'s task. A panic cancels the task and goes to
/// the unhandled-error hook instead of unwinding into the scheduler. Returns
/// false when the action panicked.
pub(crate) fn run_isolated(handle: &TaskHandle, action: impl FnOnce()) -> bool {
  match panic::catch_unwind(AssertUnwindSafe(action)) {
    Ok(()) => true,
    Err(payload) => {
      let message = panic_message(payload);
      log::warn!("scheduled task panicked: {message}");
      handle.dispose();
      hooks::on_unhandled_error(RxError::ObserverPanicked(message));
      false
    }
  }
}

#[derive(Default)]
struct TaskState {
  cancelled: AtomicBool,
  finished: AtomicBool,
  abort: Mutex<Option<AbortHandle>>,
}

/// Handle of a scheduled task, used to cancel it.
///
/// Cancelling prevents every run that has not started yet. A run that is
/// already in flight on a real-time scheduler is allowed to finish.
#[derive(Clone, Default)]
pub struct TaskHandle(Arc<TaskState>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// True once a one-shot task has run.
  pub fn is_finished(&self) -> bool { self.0.finished.load(Ordering::Acquire) }

  pub(crate) fn mark_finished(&self) { self.0.finished.store(true, Ordering::Release); }

  pub(crate) fn set_abort_handle(&self, handle: AbortHandle) {
    let mut slot = lock(&self.0.abort);
    if self.0.cancelled.load(Ordering::Acquire) {
      handle.abort();
    } else {
      *slot = Some(handle);
    }
  }
}

impl Disposable for TaskHandle {
  fn dispose(&self) {
    if !self.0.cancelled.swap(true, Ordering::AcqRel) {
      if let Some(handle) = lock(&self.0.abort).take() {
        handle.abort();
      }
    }
  }

  fn is_disposed(&self) -> bool { self.0.cancelled.load(Ordering::Acquire) || self.is_finished() }
}

// ==================== Computation binding ====================

/// Bound in place of the default pool when that cannot be started. Every
/// task it is given fails, so time-based sources report the problem through
/// their error channel.
struct Unavailable {
  reason: String,
  epoch: Instant,
}

impl Scheduler for Unavailable {
  fn now(&self) -> Duration { self.epoch.elapsed() }

  fn schedule(&self, _: Duration, _: Action) -> Result<TaskHandle, RxError> {
    Err(RxError::Scheduler(self.reason.clone()))
  }

  fn schedule_at_fixed_rate(
    &self, _: Duration, _: Duration, _: PeriodicAction,
  ) -> Result<TaskHandle, RxError> {
    Err(RxError::Scheduler(self.reason.clone()))
  }
}

static DEFAULT_COMPUTATION: Lazy<SchedulerRef> =
  Lazy::new(|| match ThreadPoolScheduler::new() {
    Ok(scheduler) => Arc::new(scheduler),
    Err(err) => {
      log::error!("default computation scheduler unavailable: {err}");
      Arc::new(Unavailable { reason: err.to_string(), epoch: Instant::now() })
    }
  });

static COMPUTATION: Lazy<RwLock<Option<SchedulerRef>>> = Lazy::new(|| RwLock::new(None));

/// The scheduler currently bound as the computation scheduler.
pub fn computation() -> SchedulerRef {
  if let Some(scheduler) = read(&COMPUTATION).as_ref() {
    return scheduler.clone();
  }
  DEFAULT_COMPUTATION.clone()
}

/// Binds `scheduler` as the computation scheduler and returns the previous
/// override, if any.
pub fn set_computation(scheduler: impl Scheduler + 'static) -> Option<SchedulerRef> {
  log::debug!("computation scheduler overridden");
  write(&COMPUTATION).replace(Arc::new(scheduler))
}

/// Restores the default thread-pool computation scheduler.
pub fn reset_computation() {
  log::debug!("computation scheduler reset to default");
  write(&COMPUTATION).take();
}

/// Binds a computation scheduler for the lifetime of the guard and restores
/// the previous binding when dropped.
#[must_use]
pub struct ComputationOverride {
  previous: Option<SchedulerRef>,
}

impl ComputationOverride {
  pub fn new(scheduler: impl Scheduler + 'static) -> Self {
    ComputationOverride { previous: set_computation(scheduler) }
  }
}

impl Drop for ComputationOverride {
  fn drop(&mut self) {
    match self.previous.take() {
      Some(previous) => *write(&COMPUTATION) = Some(previous),
      None => reset_computation(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn handle_dispose_is_idempotent() {
    let handle = TaskHandle::new();
    let (abort, _registration) = AbortHandle::new_pair();
    handle.set_abort_handle(abort.clone());

    assert!(!handle.is_disposed());
    handle.dispose();
    handle.dispose();
    assert!(handle.is_disposed());
    assert!(abort.is_aborted());
  }

  #[test]
  fn abort_handle_after_cancel_aborts_at_once() {
    let handle = TaskHandle::new();
    handle.dispose();
    let (abort, _registration) = AbortHandle::new_pair();
    handle.set_abort_handle(abort.clone());
    assert!(abort.is_aborted());
  }

  #[test]
  fn finished_counts_as_disposed() {
    let handle = TaskHandle::new();
    handle.mark_finished();
    assert!(handle.is_finished());
    assert!(handle.is_disposed());
  }

  #[test]
  fn panicking_action_cancels_its_task() {
    let handle = TaskHandle::new();
    assert!(run_isolated(&handle, || {}));
    assert!(!handle.is_disposed());

    assert!(!run_isolated(&handle, || panic!("action broke")));
    assert!(handle.is_disposed());
  }

  #[test]
  fn unavailable_pool_fails_subscribers() {
    use crate::prelude::*;

    let scheduler = Unavailable { reason: "no threads".to_string(), epoch: Instant::now() };
    let error = Arc::new(Mutex::new(None));
    let c_error = error.clone();
    let subscription = Observable::interval_on(Duration::from_secs(1), scheduler)
      .subscribe_err(|_| {}, move |e| *c_error.lock().unwrap() = Some(e.to_string()));

    assert!(subscription.is_disposed());
    assert_eq!(
      error.lock().unwrap().as_deref(),
      Some("scheduler rejected task: no threads")
    );
  }

  #[test]
  fn zero_period_is_rejected() {
    assert!(check_period(Duration::ZERO).is_err());
    assert!(check_period(Duration::from_millis(1)).is_ok());
  }
}

//! Test Scheduler for deterministic testing of time-based operators.
//!
//! Provides virtual time that only advances when explicitly instructed,
//! enabling deterministic testing of `interval`, `take_for` and friends
//! without any real sleep.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! Observable::interval_on(Duration::from_millis(100), scheduler.clone())
//!   .subscribe(|v| println!("tick {v}"));
//!
//! // Fires the ticks due at 100ms, 200ms and 300ms.
//! scheduler.advance_time_by(Duration::from_millis(300));
//! ```
//!
//! Clones of a `TestScheduler` share the same clock and task queue. Tasks run
//! synchronously on the thread that advances the clock.

use std::{
  cmp::Ordering,
  collections::BinaryHeap,
  sync::{Arc, Mutex},
  time::Duration,
};

use super::{
  check_period, run_isolated, too_far, Action, PeriodicAction, Scheduler, TaskHandle,
};
use crate::{error::RxError, subscription::Disposable, util::lock};

// ==================== Internal State ====================

enum Work {
  Once(Action),
  Periodic { action: PeriodicAction, period: Duration },
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  work: Work,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

// Cancelled tasks are swept out of the queue once it grows past this.
const MIN_PRUNE_LEN: usize = 64;

#[derive(Default)]
struct TestSchedulerState {
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
  prune_at: usize,
}

impl TestSchedulerState {
  fn push(&mut self, scheduled_time: Duration, work: Work, handle: TaskHandle) {
    if self.task_queue.len() >= self.prune_at {
      self.task_queue.retain(|t| !t.handle.is_disposed());
      self.prune_at = (self.task_queue.len() * 2).max(MIN_PRUNE_LEN);
    }
    let task_id = self.next_task_id;
    self.next_task_id += 1;
    self.task_queue.push(ScheduledTask { scheduled_time, task_id, work, handle });
  }
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
#[derive(Clone, Default)]
pub struct TestScheduler {
  state: Arc<Mutex<TestSchedulerState>>,
}

impl TestScheduler {
  /// A scheduler whose clock reads zero and whose queue is empty.
  pub fn new() -> Self { Self::default() }

  /// Get the current virtual time.
  pub fn now(&self) -> Duration { lock(&self.state).virtual_time }

  /// Number of tasks waiting to run, cancelled ones excluded.
  pub fn pending_count(&self) -> usize {
    lock(&self.state)
      .task_queue
      .iter()
      .filter(|t| !t.handle.is_disposed())
      .count()
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Advance virtual time by the specified duration and execute due tasks.
  ///
  /// Tasks are executed in order of their scheduled time, with FIFO ordering
  /// for tasks scheduled at the same time. While a task runs the clock reads
  /// its scheduled time. A periodic task fires once for every period that
  /// fits in the advanced window.
  pub fn advance_time_by(&self, duration: Duration) {
    let target = self.now().saturating_add(duration);
    self.advance_time_to(target);
  }

  /// Advance virtual time to `target`, running everything due until then.
  /// Does nothing when `target` is not ahead of the clock.
  pub fn advance_time_to(&self, target: Duration) {
    if target < self.now() {
      return;
    }
    self.execute_tasks_until(target);
    lock(&self.state).virtual_time = target;
  }

  /// Run the tasks that are due at the current virtual time.
  pub fn trigger_actions(&self) {
    let now = self.now();
    self.execute_tasks_until(now);
  }

  fn execute_tasks_until(&self, target_time: Duration) {
    loop {
      let task = {
        let mut state = lock(&self.state);
        let due = state
          .task_queue
          .peek()
          .is_some_and(|peek| peek.scheduled_time <= target_time);
        if !due {
          break;
        }
        let Some(task) = state.task_queue.pop() else {
          break;
        };
        state.virtual_time = state.virtual_time.max(task.scheduled_time);
        task
      };

      // The state lock is released here so that tasks may schedule more work.
      let ScheduledTask { scheduled_time, work, handle, .. } = task;
      if handle.is_disposed() {
        continue;
      }
      log::trace!("test scheduler runs task due at {scheduled_time:?}");
      match work {
        Work::Once(action) => {
          if run_isolated(&handle, action) {
            handle.mark_finished();
          }
        }
        Work::Periodic { mut action, period } => {
          if !run_isolated(&handle, &mut action) || handle.is_disposed() {
            continue;
          }
          match scheduled_time.checked_add(period) {
            Some(next) => lock(&self.state).push(next, Work::Periodic { action, period }, handle),
            None => handle.dispose(),
          }
        }
      }
    }
  }

  fn enqueue(&self, delay: Duration, work: Work) -> Result<TaskHandle, RxError> {
    let handle = TaskHandle::new();
    let mut state = lock(&self.state);
    let scheduled_time = state.virtual_time.checked_add(delay).ok_or_else(|| too_far(delay))?;
    state.push(scheduled_time, work, handle.clone());
    Ok(handle)
  }
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Duration { TestScheduler::now(self) }

  fn schedule(&self, delay: Duration, action: Action) -> Result<TaskHandle, RxError> {
    self.enqueue(delay, Work::Once(action))
  }

  fn schedule_at_fixed_rate(
    &self, initial_delay: Duration, period: Duration, action: PeriodicAction,
  ) -> Result<TaskHandle, RxError> {
    check_period(period)?;
    self.enqueue(initial_delay, Work::Periodic { action, period })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use super::*;

  fn ms(v: u64) -> Duration { Duration::from_millis(v) }

  fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let c_count = count.clone();
    (count, move || {
      c_count.fetch_add(1, Ordering::SeqCst);
    })
  }

  // ==================== Time Advancement ====================

  #[test]
  fn advance_by_cumulative() {
    let scheduler = TestScheduler::new();
    assert_eq!(scheduler.now(), Duration::ZERO);

    scheduler.advance_time_by(ms(100));
    assert_eq!(scheduler.now(), ms(100));

    scheduler.advance_time_by(ms(50));
    assert_eq!(scheduler.now(), ms(150));
  }

  #[test]
  fn advance_to_past_is_ignored() {
    let scheduler = TestScheduler::new();
    scheduler.advance_time_by(ms(100));
    scheduler.advance_time_to(ms(10));
    assert_eq!(scheduler.now(), ms(100));
  }

  #[test]
  fn one_shot_runs_when_due() {
    let scheduler = TestScheduler::new();
    let (count, mut tick) = counter();
    scheduler.schedule(ms(100), Box::new(move || tick())).unwrap();

    scheduler.advance_time_by(ms(99));
    assert_eq!(count.load(Ordering::SeqCst), 0);
    scheduler.advance_time_by(ms(1));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    scheduler.advance_time_by(ms(1000));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn zero_delay_waits_for_trigger() {
    let scheduler = TestScheduler::new();
    let (count, mut tick) = counter();
    scheduler.schedule(Duration::ZERO, Box::new(move || tick())).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    scheduler.trigger_actions();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.now(), Duration::ZERO);
  }

  #[test]
  fn periodic_catches_up_once_per_period() {
    let scheduler = TestScheduler::new();
    let (count, tick) = counter();
    let handle = scheduler.schedule_at_fixed_rate(ms(100), ms(100), Box::new(tick)).unwrap();

    scheduler.advance_time_by(ms(50));
    assert_eq!(count.load(Ordering::SeqCst), 0);
    scheduler.advance_time_by(ms(50));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    scheduler.advance_time_by(ms(1000));
    assert_eq!(count.load(Ordering::SeqCst), 11);

    handle.dispose();
    scheduler.advance_time_by(ms(1000));
    assert_eq!(count.load(Ordering::SeqCst), 11);
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn fifo_for_same_time() {
    let scheduler = TestScheduler::new();
    let order = Arc::new(Mutex::new(vec![]));
    for i in 0..3 {
      let order = order.clone();
      scheduler
        .schedule(ms(10), Box::new(move || order.lock().unwrap().push(i)))
        .unwrap();
    }
    scheduler.advance_time_by(ms(10));
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
  }

  #[test]
  fn runs_in_time_order() {
    let scheduler = TestScheduler::new();
    let order = Arc::new(Mutex::new(vec![]));
    for delay in [30, 10, 20] {
      let order = order.clone();
      let c_scheduler = scheduler.clone();
      scheduler
        .schedule(
          ms(delay),
          Box::new(move || order.lock().unwrap().push((delay, c_scheduler.now()))),
        )
        .unwrap();
    }
    scheduler.advance_time_by(ms(100));
    assert_eq!(*order.lock().unwrap(), vec![(10, ms(10)), (20, ms(20)), (30, ms(30))]);
    assert_eq!(scheduler.now(), ms(100));
  }

  #[test]
  fn task_may_schedule_more_work() {
    let scheduler = TestScheduler::new();
    let (count, mut tick) = counter();
    let c_scheduler = scheduler.clone();
    scheduler
      .schedule(
        ms(10),
        Box::new(move || {
          c_scheduler.schedule(ms(10), Box::new(move || tick())).unwrap();
        }),
      )
      .unwrap();

    scheduler.advance_time_by(ms(20));
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn cancelled_before_due_never_runs() {
    let scheduler = TestScheduler::new();
    let (count, mut tick) = counter();
    let handle = scheduler.schedule(ms(10), Box::new(move || tick())).unwrap();
    handle.dispose();
    scheduler.advance_time_by(ms(10));
    assert_eq!(count.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn periodic_cancelled_from_inside_stops() {
    let scheduler = TestScheduler::new();
    let count = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<TaskHandle>>> = Arc::new(Mutex::new(None));
    let (c_count, c_slot) = (count.clone(), slot.clone());
    let handle = scheduler
      .schedule_at_fixed_rate(
        ms(10),
        ms(10),
        Box::new(move || {
          if c_count.fetch_add(1, Ordering::SeqCst) == 2 {
            if let Some(handle) = c_slot.lock().unwrap().as_ref() {
              handle.dispose();
            }
          }
        }),
      )
      .unwrap();
    *slot.lock().unwrap() = Some(handle);

    scheduler.advance_time_by(ms(100));
    assert_eq!(count.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn zero_period_is_an_error() {
    let scheduler = TestScheduler::new();
    let result = scheduler.schedule_at_fixed_rate(ms(1), Duration::ZERO, Box::new(|| {}));
    assert!(matches!(result, Err(RxError::InvalidArgument(_))));
  }

  #[test]
  fn panicking_periodic_is_cancelled_and_clock_still_moves() {
    let scheduler = TestScheduler::new();
    let (count, mut tick) = counter();
    let broken = scheduler
      .schedule_at_fixed_rate(ms(10), ms(10), Box::new(|| panic!("periodic broke")))
      .unwrap();
    scheduler.schedule(ms(25), Box::new(move || tick())).unwrap();

    scheduler.advance_time_by(ms(100));

    assert!(broken.is_disposed());
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.now(), ms(100));
    assert!(scheduler.is_empty());
  }

  #[test]
  fn panicking_one_shot_is_cancelled() {
    let scheduler = TestScheduler::new();
    let handle = scheduler.schedule(ms(10), Box::new(|| panic!("one shot broke"))).unwrap();

    scheduler.advance_time_by(ms(10));
    assert!(handle.is_disposed());
    assert!(!handle.is_finished());
  }

  #[test]
  fn cancelled_tasks_do_not_pile_up() {
    let scheduler = TestScheduler::new();
    for _ in 0..1000 {
      scheduler.schedule(ms(3_600_000), Box::new(|| {})).unwrap().dispose();
    }
    let live = scheduler.schedule(ms(3_600_000), Box::new(|| {})).unwrap();

    assert!(lock(&scheduler.state).task_queue.len() <= 2 * MIN_PRUNE_LEN);
    assert_eq!(scheduler.pending_count(), 1);
    assert!(!live.is_disposed());
  }

  #[test]
  fn unreachable_delay_is_an_error() {
    let scheduler = TestScheduler::new();
    scheduler.advance_time_by(ms(1));
    let result = scheduler.schedule(Duration::MAX, Box::new(|| {}));
    assert!(matches!(result, Err(RxError::InvalidArgument(_))));
  }
}

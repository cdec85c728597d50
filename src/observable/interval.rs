use std::{sync::Arc, time::Duration};

use crate::{
  observable::Observable,
  scheduler::{computation, Scheduler},
};

impl Observable<u64> {
  /// Creates an observable which emits sequential numbers every `period` on
  /// the computation scheduler.
  ///
  /// The computation scheduler is looked up when this is called, not when it
  /// is subscribed.
  pub fn interval(period: Duration) -> Self { Self::interval_on(period, computation()) }

  /// Emits `0, 1, 2, ...`, one value per `period` on `scheduler`.
  ///
  /// The first value arrives one full period after subscribing. Each
  /// subscription owns an independent periodic task and counter, and the
  /// stream only ends when it is disposed. If the scheduler refuses the task
  /// the subscriber gets the error instead. An observer that panics on a tick
  /// has its subscription disposed and the panic goes to the unhandled-error
  /// hook.
  pub fn interval_on<S: Scheduler + 'static>(period: Duration, scheduler: S) -> Self {
    let scheduler = Arc::new(scheduler);
    Observable::new(move |emitter| {
      let tick_emitter = emitter.clone();
      let mut seq = 0u64;
      let task = scheduler.schedule_at_fixed_rate(
        period,
        period,
        Box::new(move || {
          let value = seq;
          tick_emitter.deliver(|e| e.next(value));
          seq += 1;
        }),
      );
      match task {
        Ok(handle) => emitter.add_disposable(handle),
        Err(err) => emitter.error(err),
      }
    })
  }
}

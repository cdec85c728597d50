use std::{sync::Arc, time::Duration};

use crate::{
  observable::Observable,
  scheduler::{computation, Scheduler},
};

impl<Item: Send + 'static> Observable<Item> {
  /// Mirrors the source for `duration` on the computation scheduler, then
  /// completes.
  ///
  /// The computation scheduler is looked up when this is called.
  pub fn take_for(self, duration: Duration) -> Self {
    let scheduler = computation();
    self.take_for_on(duration, scheduler)
  }

  /// Mirrors the source until `duration` has elapsed on `scheduler`, measured
  /// from subscription, then disposes the source and completes.
  ///
  /// Values are passed through untouched. The timer is armed before the
  /// source is subscribed, so a source event due at the very same instant as
  /// the deadline is dropped.
  pub fn take_for_on<S: Scheduler + 'static>(self, duration: Duration, scheduler: S) -> Self {
    let scheduler = Arc::new(scheduler);
    Observable::new(move |emitter| {
      let timer_emitter = emitter.clone();
      let deadline = Box::new(move || timer_emitter.deliver(|e| e.complete()));
      match scheduler.schedule(duration, deadline) {
        Ok(timer) => emitter.add_disposable(timer),
        Err(err) => {
          emitter.error(err);
          return;
        }
      }
      let upstream = emitter.child_subscription();
      self.subscribe_into(Box::new(emitter), upstream);
    })
  }
}

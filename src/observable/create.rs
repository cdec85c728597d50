use crate::{emitter::Emitter, observable::Observable};

impl<Item: Send + 'static> Observable<Item> {
  /// Creates an observable from a subscription function.
  ///
  /// `subscribe` runs once per subscriber with that subscriber's [`Emitter`].
  /// It is free to emit synchronously, to hand the emitter to another thread,
  /// or to register teardown with [`Emitter::set_cancellable`]. Emitting after
  /// completion or disposal is silently ignored.
  ///
  /// ```
  /// use rxcore::prelude::*;
  ///
  /// let list = Observable::create(|emitter| {
  ///   emitter.next("ciccio");
  ///   emitter.complete();
  /// })
  /// .to_list()
  /// .blocking_get();
  ///
  /// assert_eq!(list.unwrap(), vec!["ciccio"]);
  /// ```
  pub fn create(subscribe: impl Fn(Emitter<Item>) + Send + Sync + 'static) -> Self {
    Observable::new(subscribe)
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{
      atomic::{AtomicBool, Ordering},
      Arc, Mutex,
    },
    thread,
  };

  use crate::prelude::*;

  #[test]
  fn next_and_complete() {
    let emitted = Arc::new(Mutex::new(vec![]));
    let c_emitted = emitted.clone();

    Observable::create(|emitter| {
      emitter.next(1);
      emitter.next(2);
      emitter.complete();
    })
    .subscribe(move |v| c_emitted.lock().unwrap().push(v));

    assert_eq!(*emitted.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn error_reaches_handler() {
    let error = Arc::new(Mutex::new(None));
    let c_error = error.clone();

    Observable::<()>::create(|emitter| emitter.error(RxError::msg("oops")))
      .subscribe_err(|_| {}, move |e| *c_error.lock().unwrap() = Some(e.to_string()));

    assert_eq!(error.lock().unwrap().as_deref(), Some("oops"));
  }

  #[test]
  fn teardown_runs_on_dispose() {
    let cancelled = Arc::new(AtomicBool::new(false));
    let c_cancelled = cancelled.clone();

    let subscription = Observable::<i32>::create(move |emitter| {
      let cancelled = c_cancelled.clone();
      emitter.set_cancellable(move || cancelled.store(true, Ordering::SeqCst));
      emitter.next(1);
    })
    .subscribe(|_| {});

    assert!(!cancelled.load(Ordering::SeqCst));
    subscription.dispose();
    assert!(cancelled.load(Ordering::SeqCst));
  }

  #[test]
  fn emit_from_another_thread() {
    let emitted = Arc::new(Mutex::new(vec![]));
    let c_emitted = emitted.clone();
    let handle = Arc::new(Mutex::new(None));
    let c_handle = handle.clone();

    Observable::create(move |emitter| {
      let join = thread::spawn(move || {
        for i in 0..5 {
          emitter.next(i);
        }
        emitter.complete();
      });
      *c_handle.lock().unwrap() = Some(join);
    })
    .subscribe(move |v| c_emitted.lock().unwrap().push(v));

    let join = handle.lock().unwrap().take().unwrap();
    join.join().unwrap();
    assert_eq!(*emitted.lock().unwrap(), vec![0, 1, 2, 3, 4]);
  }

  #[test]
  fn no_next_after_dispose() {
    let emitted = Arc::new(Mutex::new(vec![]));
    let c_emitted = emitted.clone();
    let slot: Arc<Mutex<Option<Emitter<i32>>>> = Arc::new(Mutex::new(None));
    let c_slot = slot.clone();

    let subscription = Observable::create(move |emitter| {
      *c_slot.lock().unwrap() = Some(emitter);
    })
    .subscribe(move |v| c_emitted.lock().unwrap().push(v));

    let emitter = slot.lock().unwrap().take().unwrap();
    emitter.next(1);
    subscription.dispose();
    emitter.next(2);

    assert_eq!(*emitted.lock().unwrap(), vec![1]);
  }
}

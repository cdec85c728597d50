use std::collections::VecDeque;

use crate::{emitter::Emitter, error::RxError, observable::Observable, observer::Observer};

struct TakeLastObserver<Item> {
  downstream: Emitter<Item>,
  count: usize,
  queue: VecDeque<Item>,
}

impl<Item: Send> Observer<Item> for TakeLastObserver<Item> {
  fn next(&mut self, value: Item) {
    if self.count == 0 {
      return;
    }
    if self.queue.len() == self.count {
      self.queue.pop_front();
    }
    self.queue.push_back(value);
  }

  fn error(&mut self, err: RxError) { self.downstream.error(err); }

  fn complete(&mut self) {
    for value in self.queue.drain(..) {
      self.downstream.next(value);
    }
    self.downstream.complete();
  }
}

impl<Item: Send + 'static> Observable<Item> {
  /// Emits only the last `count` values emitted by the source Observable.
  ///
  /// If the source emits fewer than `count` values then all of its values are
  /// emitted. Nothing is emitted until the source completes, so an infinite
  /// source has to be bounded first, e.g. with [`Observable::take_for`].
  ///
  /// ```
  /// use rxcore::prelude::*;
  ///
  /// let tail = Observable::just(0..10).take_last(3).to_list().blocking_get();
  /// assert_eq!(tail.unwrap(), vec![7, 8, 9]);
  /// ```
  pub fn take_last(self, count: usize) -> Self {
    Observable::new(move |emitter| {
      let upstream = emitter.child_subscription();
      let queue = VecDeque::with_capacity(count.min(64));
      let observer = TakeLastObserver { downstream: emitter, count, queue };
      self.subscribe_into(Box::new(observer), upstream);
    })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use crate::prelude::*;

  #[test]
  fn base_function() {
    let completed = Arc::new(Mutex::new(0));
    let ticks = Arc::new(Mutex::new(vec![]));
    let (c_completed, c_ticks) = (completed.clone(), ticks.clone());

    Observable::just(0..100).take_last(5).subscribe_complete(
      move |v| c_ticks.lock().unwrap().push(v),
      move || *c_completed.lock().unwrap() += 1,
    );

    assert_eq!(*completed.lock().unwrap(), 1);
    assert_eq!(*ticks.lock().unwrap(), vec![95, 96, 97, 98, 99]);
  }

  #[test]
  fn fewer_than_count() {
    let values = Observable::just([1, 2]).take_last(5).to_list().blocking_get();
    assert_eq!(values.unwrap(), vec![1, 2]);
  }

  #[test]
  fn zero_count_only_completes() {
    let values = Observable::just([1, 2]).take_last(0).to_list().blocking_get();
    assert_eq!(values.unwrap(), Vec::<i32>::new());
  }

  #[test]
  fn nothing_before_complete() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    let slot: Arc<Mutex<Option<Emitter<i32>>>> = Arc::new(Mutex::new(None));
    let c_slot = slot.clone();
    Observable::create(move |emitter| *c_slot.lock().unwrap() = Some(emitter))
      .take_last(2)
      .subscribe(move |v| c_values.lock().unwrap().push(v));

    let emitter = slot.lock().unwrap().take().unwrap();
    emitter.next(1);
    emitter.next(2);
    emitter.next(3);
    assert!(values.lock().unwrap().is_empty());

    emitter.complete();
    assert_eq!(*values.lock().unwrap(), vec![2, 3]);
  }

  #[test]
  fn error_discards_buffer() {
    let values = Arc::new(Mutex::new(vec![]));
    let failed = Arc::new(Mutex::new(false));
    let (c_values, c_failed) = (values.clone(), failed.clone());
    Observable::create(|emitter| {
      emitter.next(1);
      emitter.error(RxError::msg("late failure"));
    })
    .take_last(2)
    .subscribe_err(
      move |v| c_values.lock().unwrap().push(v),
      move |_| *c_failed.lock().unwrap() = true,
    );

    assert!(values.lock().unwrap().is_empty());
    assert!(*failed.lock().unwrap());
  }
}

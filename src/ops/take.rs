use crate::{emitter::Emitter, error::RxError, observable::Observable, observer::Observer};

struct TakeObserver<Item> {
  downstream: Emitter<Item>,
  remaining: usize,
}

impl<Item: Send> Observer<Item> for TakeObserver<Item> {
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      return;
    }
    self.remaining -= 1;
    self.downstream.next(value);
    if self.remaining == 0 {
      self.downstream.complete();
    }
  }

  fn error(&mut self, err: RxError) { self.downstream.error(err); }

  fn complete(&mut self) { self.downstream.complete(); }
}

impl<Item: Send + 'static> Observable<Item> {
  /// Emits only the first `count` values emitted by the source Observable.
  ///
  /// If the source emits fewer than `count` values then all of its values are
  /// emitted. After that, it completes, regardless if the source completes,
  /// and the source subscription is disposed.
  ///
  /// ```
  /// use rxcore::prelude::*;
  ///
  /// let first_three = Observable::just(0..10).take(3).to_list().blocking_get();
  /// assert_eq!(first_three.unwrap(), vec![0, 1, 2]);
  /// ```
  pub fn take(self, count: usize) -> Self {
    Observable::new(move |emitter| {
      if count == 0 {
        emitter.complete();
        return;
      }
      let upstream = emitter.child_subscription();
      let observer = TakeObserver { downstream: emitter, remaining: count };
      self.subscribe_into(Box::new(observer), upstream);
    })
  }
}

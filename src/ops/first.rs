use crate::{emitter::Emitter, error::RxError, observable::Observable, observer::Observer};

struct FirstObserver<Item> {
  downstream: Emitter<Item>,
  done: bool,
}

impl<Item: Send> Observer<Item> for FirstObserver<Item> {
  fn next(&mut self, value: Item) {
    if !self.done {
      self.done = true;
      self.downstream.next(value);
      self.downstream.complete();
    }
  }

  fn error(&mut self, err: RxError) { self.downstream.error(err); }

  fn complete(&mut self) {
    if !self.done {
      self.downstream.error(RxError::NoElements);
    }
  }
}

impl<Item: Send + 'static> Observable<Item> {
  /// Emits only the first value of the source and completes.
  ///
  /// Fails with [`RxError::NoElements`] when the source completes without
  /// emitting anything.
  pub fn first(self) -> Self {
    Observable::new(move |emitter| {
      let upstream = emitter.child_subscription();
      let observer = FirstObserver { downstream: emitter, done: false };
      self.subscribe_into(Box::new(observer), upstream);
    })
  }
}

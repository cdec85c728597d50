use crate::{emitter::Emitter, error::RxError, observable::Observable, observer::Observer};

struct CollectObserver<Item> {
  downstream: Emitter<Vec<Item>>,
  collection: Vec<Item>,
}

impl<Item: Send> Observer<Item> for CollectObserver<Item> {
  fn next(&mut self, value: Item) { self.collection.push(value); }

  fn error(&mut self, err: RxError) { self.downstream.error(err); }

  fn complete(&mut self) {
    self.downstream.next(std::mem::take(&mut self.collection));
    self.downstream.complete();
  }
}

impl<Item: Send + 'static> Observable<Item> {
  /// Collects every value into a single `Vec`, emitted when the source
  /// completes. An error discards what was collected.
  pub fn to_list(self) -> Observable<Vec<Item>> {
    Observable::new(move |emitter| {
      let upstream = emitter.child_subscription();
      let observer = CollectObserver { downstream: emitter, collection: Vec::new() };
      self.subscribe_into(Box::new(observer), upstream);
    })
  }
}

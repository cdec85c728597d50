//! BufferCount operator implementation.

use crate::{emitter::Emitter, error::RxError, observable::Observable, observer::Observer};

/// Observer for `buffer`.
///
/// Collects items into a `Vec` until `count` is reached, then emits the buffer.
/// When the source completes, any remaining items are emitted (if non-empty).
struct BufferCountObserver<Item> {
  downstream: Emitter<Vec<Item>>,
  buffer: Vec<Item>,
  count: usize,
}

impl<Item: Send> Observer<Item> for BufferCountObserver<Item> {
  fn next(&mut self, v: Item) {
    self.buffer.push(v);
    if self.buffer.len() >= self.count {
      let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.count));
      self.downstream.next(full);
    }
  }

  fn error(&mut self, err: RxError) { self.downstream.error(err); }

  fn complete(&mut self) {
    if !self.buffer.is_empty() {
      self.downstream.next(std::mem::take(&mut self.buffer));
    }
    self.downstream.complete();
  }
}

impl<Item: Send + 'static> Observable<Item> {
  /// Groups values into vectors of `count` items.
  ///
  /// A short final vector is emitted when the source completes with items left
  /// over; an empty one never is. On error the pending items are dropped.
  /// A `count` of zero fails every subscription with
  /// [`RxError::InvalidArgument`].
  ///
  /// ```
  /// use rxcore::prelude::*;
  ///
  /// let chunks = Observable::just(1..=5).buffer(2).to_list().blocking_get();
  /// assert_eq!(chunks.unwrap(), vec![vec![1, 2], vec![3, 4], vec![5]]);
  /// ```
  pub fn buffer(self, count: usize) -> Observable<Vec<Item>> {
    Observable::new(move |emitter| {
      if count == 0 {
        emitter.error(RxError::InvalidArgument("buffer count must be greater than zero".into()));
        return;
      }
      let upstream = emitter.child_subscription();
      let buffer = Vec::with_capacity(count);
      let observer = BufferCountObserver { downstream: emitter, buffer, count };
      self.subscribe_into(Box::new(observer), upstream);
    })
  }
}

//! Blocking extractors for the outermost boundary of a program or a test.
//!
//! Each call subscribes, then parks the calling thread until the source
//! terminates. A source that never terminates blocks forever; a virtual-time
//! source must be driven from another thread.

use futures::{
  channel::oneshot::{self, Sender},
  executor::block_on,
};

use crate::{error::RxError, observable::Observable, observer::Observer};

type Outcome<Item> = Result<Item, RxError>;

/// Remembers the last value and reports it, or the error, on termination.
struct LastValueObserver<Item> {
  sender: Option<Sender<Outcome<Item>>>,
  last_value: Option<Item>,
}

impl<Item: Send> Observer<Item> for LastValueObserver<Item> {
  fn next(&mut self, value: Item) { self.last_value = Some(value); }

  fn error(&mut self, err: RxError) {
    if let Some(sender) = self.sender.take() {
      let _ = sender.send(Err(err));
    }
  }

  fn complete(&mut self) {
    if let Some(sender) = self.sender.take() {
      let _ = sender.send(self.last_value.take().ok_or(RxError::NoElements));
    }
  }
}

impl<Item: Send + 'static> Observable<Item> {
  /// Blocks until the source completes and returns its last value.
  ///
  /// Fails with the source's error, with [`RxError::NoElements`] if it
  /// completed without values, or with [`RxError::Abandoned`] if the source
  /// dropped its emitter without terminating.
  pub fn blocking_get(&self) -> Result<Item, RxError> {
    let (sender, receiver) = oneshot::channel();
    let observer = LastValueObserver { sender: Some(sender), last_value: None };
    let subscription = self.subscribe_observer(observer);
    let _guard = subscription.unsubscribe_when_dropped();
    block_on(receiver).unwrap_or(Err(RxError::Abandoned))
  }

  /// Blocks until the first value arrives, then disposes the source.
  pub fn blocking_first(&self) -> Result<Item, RxError> { self.clone().first().blocking_get() }

  /// Blocks until the source completes and returns every value it emitted.
  pub fn blocking_to_vec(&self) -> Result<Vec<Item>, RxError> {
    self.clone().to_list().blocking_get()
  }
}

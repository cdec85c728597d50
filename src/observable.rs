use std::sync::Arc;

use crate::{
  emitter::Emitter,
  error::RxError,
  observer::{ignore_complete, unhandled, BoxedObserver, Observer, ObserverAll},
  subscription::Subscription,
};

mod blocking;
mod connectable;
mod create;
mod interval;
mod of;
mod trivial;

pub use connectable::ConnectableObservable;

type SubscribeFn<Item> = dyn Fn(Emitter<Item>) + Send + Sync;

/// A representation of any set of values over any amount of time. This is the
/// most basic building block of rxcore.
///
/// An `Observable` is a cold blueprint: it only holds the function that is run
/// for each subscriber. Every `subscribe` call gets a fresh [`Emitter`] and an
/// independent execution, and cloning an `Observable` is cheap.
pub struct Observable<Item> {
  subscribe_fn: Arc<SubscribeFn<Item>>,
}

impl<Item> Clone for Observable<Item> {
  fn clone(&self) -> Self { Observable { subscribe_fn: self.subscribe_fn.clone() } }
}

impl<Item: Send + 'static> Observable<Item> {
  /// param `subscribe`: the function that is called each time the Observable
  /// is subscribed to. It is given an [`Emitter`], to which new values can be
  /// `next`ed, or an `error` method can be called to raise an error, or
  /// `complete` can be called to notify of a successful completion.
  pub fn new(subscribe: impl Fn(Emitter<Item>) + Send + Sync + 'static) -> Self {
    Observable { subscribe_fn: Arc::new(subscribe) }
  }

  /// Runs the source for `observer` inside `subscription`.
  ///
  /// Operators pass a child of their own subscription so that tearing down the
  /// downstream also tears down the upstream, even while a synchronous source
  /// is still emitting.
  pub(crate) fn subscribe_into(&self, observer: BoxedObserver<Item>, subscription: Subscription) {
    (self.subscribe_fn)(Emitter::new(observer, subscription));
  }

  pub fn subscribe_observer<O: Observer<Item> + 'static>(&self, observer: O) -> Subscription {
    let subscription = Subscription::new();
    self.subscribe_into(Box::new(observer), subscription.clone());
    subscription
  }

  /// Subscribes with a value callback. An error reaching this subscriber is
  /// passed to the unhandled-error hook.
  pub fn subscribe<N>(&self, next: N) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
  {
    self.subscribe_observer(ObserverAll::new(next, unhandled, ignore_complete))
  }

  pub fn subscribe_err<N, E>(&self, next: N, error: E) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
  {
    self.subscribe_observer(ObserverAll::new(next, error, ignore_complete))
  }

  pub fn subscribe_complete<N, C>(&self, next: N, complete: C) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_observer(ObserverAll::new(next, unhandled, complete))
  }

  pub fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_observer(ObserverAll::new(next, error, complete))
  }
}

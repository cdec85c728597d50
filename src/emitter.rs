use std::{
  panic::{self, AssertUnwindSafe},
  sync::{Arc, Mutex},
};

use crate::{
  error::RxError,
  hooks,
  observer::{BoxedObserver, Observer},
  subscription::{Disposable, Subscription},
  util::{lock, panic_message},
};

/// Producer-side handle of one subscription.
///
/// The subscription function of an [`Observable`](crate::observable::Observable)
/// receives a fresh `Emitter` for every subscribe call and pushes events
/// through it. Clones refer to the same subscription, so a scheduled task can
/// keep its own copy.
///
/// After `error` or `complete`, or once the subscription is disposed, every
/// call is a no-op. Delivery to the observer is serialized.
pub struct Emitter<Item> {
  observer: Arc<Mutex<Option<BoxedObserver<Item>>>>,
  subscription: Subscription,
}

impl<Item> Clone for Emitter<Item> {
  fn clone(&self) -> Self {
    Emitter { observer: self.observer.clone(), subscription: self.subscription.clone() }
  }
}

impl<Item> Emitter<Item> {
  pub(crate) fn new(observer: BoxedObserver<Item>, subscription: Subscription) -> Self {
    Emitter { observer: Arc::new(Mutex::new(Some(observer))), subscription }
  }

  pub fn next(&self, value: Item) {
    if self.subscription.is_disposed() {
      return;
    }
    let mut observer = lock(&self.observer);
    if let Some(observer) = observer.as_mut() {
      // Disposal may have happened while we waited for the lock.
      if !self.subscription.is_disposed() {
        observer.next(value);
      }
    }
  }

  /// Delivers `err` and disposes the subscription.
  pub fn error(&self, err: RxError) {
    if let Some(mut observer) = self.take_observer() {
      observer.error(err);
      self.subscription.dispose();
    }
  }

  /// Delivers completion and disposes the subscription.
  pub fn complete(&self) {
    if let Some(mut observer) = self.take_observer() {
      observer.complete();
      self.subscription.dispose();
    }
  }

  #[inline]
  pub fn is_disposed(&self) -> bool { self.subscription.is_disposed() }

  /// Runs `f` when the subscription is disposed.
  pub fn set_cancellable(&self, f: impl FnOnce() + Send + 'static) { self.subscription.add_fn(f); }

  /// Disposes `disposable` together with the subscription.
  pub fn add_disposable<D: Disposable + 'static>(&self, disposable: D) {
    self.subscription.add(disposable);
  }

  /// A subscription for an upstream source, disposed with this one.
  pub fn child_subscription(&self) -> Subscription { self.subscription.child() }

  pub fn subscription(&self) -> &Subscription { &self.subscription }

  /// Runs `f` against this emitter, containing a panic raised by the
  /// observer. The panic is reported to the unhandled-error hook and the
  /// subscription is disposed, which also cancels its scheduled work.
  pub(crate) fn deliver(&self, f: impl FnOnce(&Self)) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
      let message = panic_message(payload);
      log::warn!("observer panicked: {message}");
      self.subscription.dispose();
      hooks::on_unhandled_error(RxError::ObserverPanicked(message));
    }
  }

  fn take_observer(&self) -> Option<BoxedObserver<Item>> {
    if self.subscription.is_disposed() {
      return None;
    }
    lock(&self.observer).take()
  }
}

/// Emitters forward everything they receive, which lets operators and
/// multicast registries treat a downstream emitter as a plain observer.
impl<Item> Observer<Item> for Emitter<Item> {
  #[inline]
  fn next(&mut self, value: Item) { Emitter::next(self, value) }
  #[inline]
  fn error(&mut self, err: RxError) { Emitter::error(self, err) }
  #[inline]
  fn complete(&mut self) { Emitter::complete(self) }
}

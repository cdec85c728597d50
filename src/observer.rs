//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use crate::{error::RxError, hooks};

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable. The engine guarantees that calls for one subscription are
/// never concurrent and that nothing follows `error` or `complete`.
pub trait Observer<Item>: Send {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  fn error(&mut self, err: RxError);

  /// Handle completion of the observable
  fn complete(&mut self);
}

impl<Item, O: Observer<Item> + ?Sized> Observer<Item> for Box<O> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }
  #[inline]
  fn error(&mut self, err: RxError) { (**self).error(err) }
  #[inline]
  fn complete(&mut self) { (**self).complete() }
}

/// Type-erased observer stored by emitters and registries.
pub type BoxedObserver<Item> = Box<dyn Observer<Item>>;

/// Observer assembled from three closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  #[inline(always)]
  pub fn new(next: N, error: E, complete: C) -> Self { ObserverAll { next, error, complete } }
}

impl<Item, N, E, C> Observer<Item> for ObserverAll<N, E, C>
where
  N: FnMut(Item) + Send,
  E: FnMut(RxError) + Send,
  C: FnMut() + Send,
{
  #[inline(always)]
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(&mut self, err: RxError) { (self.error)(err); }

  #[inline]
  fn complete(&mut self) { (self.complete)(); }
}

/// Error callback used when a subscriber did not provide one.
pub(crate) fn unhandled(err: RxError) { hooks::on_unhandled_error(err) }

/// Complete callback used when a subscriber did not provide one.
pub(crate) fn ignore_complete() {}

use std::{
  any::Any,
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  },
};

use smallvec::SmallVec;

use crate::util::lock;

mod registry;
pub use registry::Registry;

/// A cancellation token for a running subscription or a piece of scheduled
/// work.
///
/// `dispose` is idempotent: the first call releases the resources, every later
/// call does nothing. `is_disposed` may be queried at any time from any
/// thread.
pub trait Disposable: Send + Sync {
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }
  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

impl<T: Disposable + ?Sized> Disposable for Arc<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }
  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

enum TearDown {
  Disposable(Box<dyn Disposable>),
  Action(Box<dyn FnOnce() + Send>),
}

impl TearDown {
  fn run(self) {
    match self {
      TearDown::Disposable(d) => d.dispose(),
      TearDown::Action(f) => f(),
    }
  }

  fn is_finished(&self) -> bool {
    match self {
      TearDown::Disposable(d) => d.is_disposed(),
      TearDown::Action(_) => false,
    }
  }
}

#[derive(Default)]
struct Inner {
  closed: AtomicBool,
  teardown: Mutex<SmallVec<[TearDown; 1]>>,
}

/// Handle returned by `subscribe`.
///
/// A subscription owns everything that was started on behalf of one
/// subscribe call: scheduled tasks, upstream subscriptions of operators and
/// user supplied cancel callbacks. Disposing it releases all of them exactly
/// once. Clones share the same state.
#[derive(Clone, Default)]
pub struct Subscription(Arc<Inner>);

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// A subscription that runs `f` when it is disposed.
  pub fn from_fn(f: impl FnOnce() + Send + 'static) -> Self {
    let subscription = Self::new();
    subscription.add_fn(f);
    subscription
  }

  /// Ties `disposable` to this subscription. If the subscription is already
  /// disposed, `disposable` is disposed right away.
  pub fn add<D: Disposable + 'static>(&self, disposable: D) {
    if self.is_same(&disposable) {
      return;
    }
    self.push(TearDown::Disposable(Box::new(disposable)));
  }

  /// Runs `f` once when this subscription is disposed, or immediately if it
  /// already is.
  pub fn add_fn(&self, f: impl FnOnce() + Send + 'static) {
    self.push(TearDown::Action(Box::new(f)));
  }

  /// Creates a subscription that is disposed together with this one.
  pub fn child(&self) -> Subscription {
    let child = Subscription::new();
    self.add(child.clone());
    child
  }

  /// Activates "RAII" behavior for this subscription: it is disposed as soon
  /// as the returned guard goes out of scope.
  ///
  /// **Attention:** if the return value is not bound to a variable, the
  /// subscription is disposed immediately.
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard::new(self) }

  pub fn teardown_size(&self) -> usize { lock(&self.0.teardown).len() }

  fn push(&self, teardown: TearDown) {
    if self.is_disposed() {
      teardown.run();
      return;
    }
    let mut list = lock(&self.0.teardown);
    // `dispose` flips the flag before it drains the list, so a re-check under
    // the lock is enough to never strand a teardown.
    if self.is_disposed() {
      drop(list);
      teardown.run();
    } else {
      list.retain(|t| !t.is_finished());
      list.push(teardown);
    }
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    other
      .downcast_ref::<Self>()
      .is_some_and(|other| Arc::ptr_eq(&self.0, &other.0))
  }
}

impl Disposable for Subscription {
  fn dispose(&self) {
    if !self.0.closed.swap(true, Ordering::AcqRel) {
      let teardown = std::mem::take(&mut *lock(&self.0.teardown));
      for t in teardown {
        t.run();
      }
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("is_disposed", &self.is_disposed())
      .field("teardown_count", &self.teardown_size())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscription". When this structure is
/// dropped (falls out of scope), the subscription is disposed.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Option<Subscription>);

impl SubscriptionGuard {
  pub fn new(subscription: Subscription) -> Self { SubscriptionGuard(Some(subscription)) }

  /// Gives the subscription back without disposing it.
  pub fn into_inner(mut self) -> Subscription {
    self.0.take().unwrap_or_default()
  }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.dispose();
    }
  }
}

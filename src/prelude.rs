//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core types
pub use crate::{
  emitter::Emitter,
  error::RxError,
  observable::{ConnectableObservable, Observable},
  observer::{BoxedObserver, Observer, ObserverAll},
};
// Schedulers
pub use crate::scheduler::{
  computation, reset_computation, set_computation, ComputationOverride, Scheduler, SchedulerRef,
  TaskHandle, TestScheduler, ThreadPoolScheduler,
};
// Subscription
pub use crate::subscription::{Disposable, Subscription, SubscriptionGuard};

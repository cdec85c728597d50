//! # rxcore: a small push-based reactive stream engine
//!
//! Cold observables, hot multicasting through [`ConnectableObservable`], and
//! time-based sources that run on a pluggable [`Scheduler`], including a
//! virtual-time [`TestScheduler`] for deterministic tests.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let ticks = Observable::interval_on(Duration::from_millis(300), scheduler.clone())
//!   .take_for_on(Duration::from_secs(2), scheduler.clone())
//!   .buffer(2);
//!
//! let subscription = ticks.subscribe(|pair| println!("{pair:?}"));
//! scheduler.advance_time_by(Duration::from_secs(2));
//! assert!(subscription.is_disposed());
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Cold blueprint, run once per subscription |
//! | [`Emitter`] | Producer-side handle of one subscription |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`ConnectableObservable`] | One shared run, started by `connect` |
//!
//! Errors that reach a subscriber without an error callback go to the
//! process-wide hook in [`hooks`], which logs them by default.

pub mod emitter;
pub mod error;
pub mod hooks;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subscription;

mod util;

// Re-export the prelude module
pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}

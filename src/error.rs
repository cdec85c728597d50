//! Error type carried by the `error` channel of every observable.

use std::{error::Error, sync::Arc};

/// Failure delivered through [`Observer::error`](crate::observer::Observer).
///
/// The type is cheap to clone so a multicast source can hand the same error
/// to every registered observer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RxError {
  /// A producer signalled a failure with a plain message.
  #[error("{0}")]
  Message(String),

  /// A producer signalled a failure caused by another error.
  #[error("producer failed: {0}")]
  Producer(#[source] Arc<dyn Error + Send + Sync>),

  /// The scheduler could not accept the work of a subscription.
  #[error("scheduler rejected task: {0}")]
  Scheduler(String),

  /// The source completed without emitting the value that was asked for.
  #[error("observable completed without emitting any value")]
  NoElements,

  /// The source was dropped before it emitted a terminal event.
  #[error("observable was dropped before it terminated")]
  Abandoned,

  /// An operator was configured with an argument it cannot work with.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// An observer callback or a scheduled action panicked.
  #[error("observer panicked: {0}")]
  ObserverPanicked(String),
}

impl RxError {
  pub fn msg(message: impl Into<String>) -> Self { RxError::Message(message.into()) }

  pub fn producer(err: impl Error + Send + Sync + 'static) -> Self {
    RxError::Producer(Arc::new(err))
  }
}

use crate::{error::RxError, observable::Observable};

impl<Item: Send + 'static> Observable<Item> {
  /// Creates an observable that produces no values.
  ///
  /// Completes immediately. Never emits an error.
  pub fn empty() -> Self { Observable::new(|emitter| emitter.complete()) }

  /// Creates an observable that emits no items, just terminates with an error.
  ///
  /// # Arguments
  ///
  /// * `err` - An error to emit and terminate with
  pub fn throw(err: RxError) -> Self { Observable::new(move |emitter| emitter.error(err.clone())) }
}

use crate::observable::{ConnectableObservable, Observable};

impl<Item: Clone + Send + 'static> Observable<Item> {
  /// Turns this cold observable into a [`ConnectableObservable`] that shares
  /// one run of it, started by `connect`.
  pub fn publish(self) -> ConnectableObservable<Item> { ConnectableObservable::new(self) }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use crate::prelude::*;

  #[test]
  fn buffered_view_of_finished_source_is_empty() {
    let connectable = Observable::just(["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]).publish();
    let early = Arc::new(Mutex::new(vec![]));
    let c_early = early.clone();
    connectable.subscribe(move |v| c_early.lock().unwrap().push(v));
    connectable.connect();

    let late = Arc::new(Mutex::new(vec![]));
    let c_late = late.clone();
    connectable
      .fork()
      .buffer(2)
      .subscribe(move |v| c_late.lock().unwrap().push(v));

    assert_eq!(early.lock().unwrap().len(), 5);
    assert!(late.lock().unwrap().is_empty());
  }

  #[test]
  fn operators_apply_per_subscriber() {
    let connectable = Observable::just(0..6).publish();
    let pairs = Arc::new(Mutex::new(vec![]));
    let all = Arc::new(Mutex::new(vec![]));
    let (c_pairs, c_all) = (pairs.clone(), all.clone());
    connectable
      .fork()
      .buffer(2)
      .subscribe(move |v| c_pairs.lock().unwrap().push(v));
    connectable.subscribe(move |v| c_all.lock().unwrap().push(v));
    connectable.connect();

    assert_eq!(*pairs.lock().unwrap(), vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
    assert_eq!(*all.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
  }
}

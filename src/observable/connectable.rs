//! Hot multicasting on top of a cold source.
//!
//! A `ConnectableObservable` keeps an ordered registry of downstream
//! emitters. Subscribing only registers; [`ConnectableObservable::connect`]
//! subscribes to the source once and every event it produces is broadcast to
//! the emitters registered at that moment, in registration order.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! use rxcore::prelude::*;
//!
//! let connectable = Observable::just([1, 2, 3]).publish();
//! let seen = Arc::new(Mutex::new(vec![]));
//! let (c1, c2) = (seen.clone(), seen.clone());
//!
//! connectable.subscribe(move |v| c1.lock().unwrap().push(("a", v)));
//! connectable.subscribe(move |v| c2.lock().unwrap().push(("b", v)));
//! assert!(seen.lock().unwrap().is_empty());
//!
//! connectable.connect();
//! assert_eq!(seen.lock().unwrap().len(), 6);
//! ```

use std::sync::{Arc, Mutex, Weak};

use smallvec::SmallVec;

use crate::{
  emitter::Emitter,
  error::RxError,
  observable::Observable,
  observer::Observer,
  subscription::{Registry, Subscription},
  util::lock,
};

#[derive(Clone)]
enum Terminal {
  Completed,
  Error(RxError),
}

struct PublishState<Item> {
  observers: Registry<Emitter<Item>>,
  connection: Option<Subscription>,
  terminal: Option<Terminal>,
}

impl<Item> Default for PublishState<Item> {
  fn default() -> Self {
    PublishState { observers: Registry::new(), connection: None, terminal: None }
  }
}

/// An observable that shares one run of its source between all subscribers,
/// started by an explicit [`connect`](ConnectableObservable::connect).
///
/// Observers registered after `connect` only see later events. Once the
/// source has terminated, new observers immediately receive that terminal
/// event and nothing else. Disposing the last observer does not disconnect
/// the source; dispose the subscription returned by `connect` for that.
pub struct ConnectableObservable<Item> {
  source: Observable<Item>,
  state: Arc<Mutex<PublishState<Item>>>,
}

impl<Item> Clone for ConnectableObservable<Item> {
  fn clone(&self) -> Self {
    ConnectableObservable { source: self.source.clone(), state: self.state.clone() }
  }
}

impl<Item: Clone + Send + 'static> ConnectableObservable<Item> {
  pub(crate) fn new(source: Observable<Item>) -> Self {
    ConnectableObservable { source, state: Arc::new(Mutex::new(PublishState::default())) }
  }

  /// A plain observable whose subscriptions register with this connectable.
  pub fn fork(&self) -> Observable<Item> {
    let state = self.state.clone();
    Observable::new(move |emitter| register(&state, emitter))
  }

  pub fn subscribe_observer<O: Observer<Item> + 'static>(&self, observer: O) -> Subscription {
    self.fork().subscribe_observer(observer)
  }

  pub fn subscribe<N>(&self, next: N) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
  {
    self.fork().subscribe(next)
  }

  pub fn subscribe_err<N, E>(&self, next: N, error: E) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
  {
    self.fork().subscribe_err(next, error)
  }

  pub fn subscribe_complete<N, C>(&self, next: N, complete: C) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.fork().subscribe_complete(next, complete)
  }

  pub fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.fork().subscribe_all(next, error, complete)
  }

  /// Subscribes to the source, once.
  ///
  /// Later calls return the subscription of the first one without touching
  /// the source again. Disposing it stops the shared run.
  pub fn connect(&self) -> Subscription {
    let connection = {
      let mut state = lock(&self.state);
      if let Some(connection) = &state.connection {
        return connection.clone();
      }
      let connection = Subscription::new();
      state.connection = Some(connection.clone());
      connection
    };
    log::debug!("connectable observable connected");
    let observer = PublishObserver { state: self.state.clone() };
    self.source.subscribe_into(Box::new(observer), connection.clone());
    connection
  }

  pub fn is_connected(&self) -> bool { lock(&self.state).connection.is_some() }

  /// Number of observers that will receive the next event.
  pub fn observer_count(&self) -> usize { lock(&self.state).observers.len() }
}

fn register<Item: 'static>(state: &Arc<Mutex<PublishState<Item>>>, emitter: Emitter<Item>) {
  let mut guard = lock(state);
  if let Some(terminal) = guard.terminal.clone() {
    drop(guard);
    match terminal {
      Terminal::Completed => emitter.complete(),
      Terminal::Error(err) => emitter.error(err),
    }
    return;
  }
  let id = guard.observers.add(emitter.clone());
  drop(guard);

  let weak: Weak<Mutex<PublishState<Item>>> = Arc::downgrade(state);
  emitter.set_cancellable(move || {
    if let Some(state) = weak.upgrade() {
      let _removed = lock(&state).observers.remove(id);
    }
  });
}

/// Upstream observer of a connected source; fans every event out to the
/// registry.
struct PublishObserver<Item> {
  state: Arc<Mutex<PublishState<Item>>>,
}

impl<Item> PublishObserver<Item> {
  fn terminate(&self, terminal: Terminal) -> SmallVec<[(usize, Emitter<Item>); 4]> {
    let mut state = lock(&self.state);
    state.terminal = Some(terminal);
    state.observers.drain().collect()
  }
}

impl<Item: Clone + Send + 'static> Observer<Item> for PublishObserver<Item> {
  fn next(&mut self, value: Item) {
    let observers = lock(&self.state).observers.snapshot();
    let mut iter = observers.iter().peekable();
    while let Some((_, emitter)) = iter.next() {
      if iter.peek().is_some() {
        emitter.deliver(|e| e.next(value.clone()));
      } else {
        emitter.deliver(|e| e.next(value));
        break;
      }
    }
  }

  fn error(&mut self, err: RxError) {
    for (_, emitter) in self.terminate(Terminal::Error(err.clone())) {
      emitter.deliver(|e| e.error(err.clone()));
    }
  }

  fn complete(&mut self) {
    for (_, emitter) in self.terminate(Terminal::Completed) {
      emitter.deliver(|e| e.complete());
    }
  }
}

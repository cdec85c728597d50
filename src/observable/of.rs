use crate::observable::Observable;

impl<Item> Observable<Item>
where
  Item: Clone + Send + Sync + 'static,
{
  /// Creates an observable that emits `items` in order and then completes,
  /// all before `subscribe` returns.
  ///
  /// ```
  /// use rxcore::prelude::*;
  ///
  /// Observable::just(["Alpha", "Beta", "Gamma"]).subscribe(|v| println!("{v}"));
  /// ```
  pub fn just(items: impl IntoIterator<Item = Item>) -> Self {
    let items: Vec<Item> = items.into_iter().collect();
    Observable::new(move |emitter| {
      for item in &items {
        if emitter.is_disposed() {
          return;
        }
        emitter.next(item.clone());
      }
      emitter.complete();
    })
  }
}

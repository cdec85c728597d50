use smallvec::SmallVec;

/// Insertion-ordered container of items addressed by a unique id.
///
/// Connectable observables keep their observers here: `add` hands out the id
/// a registration later uses to remove itself, and iteration always follows
/// registration order.
pub struct Registry<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for Registry<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> Registry<U> {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Add an item and return its unique ID.
  #[inline]
  pub fn add(&mut self, item: U) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, item));
    id
  }

  /// Remove an item by ID.
  pub fn remove(&mut self, id: usize) -> Option<U> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Remove every item, in registration order.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = (usize, U)> + '_ { self.items.drain(..) }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &(usize, U)> { self.items.iter() }
}

impl<U: Clone> Registry<U> {
  /// Copies the current items so they can be visited without holding the
  /// lock that guards the registry.
  pub fn snapshot(&self) -> SmallVec<[(usize, U); 4]> { self.items.iter().cloned().collect() }
}

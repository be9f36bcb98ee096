// ── Generic copy-on-write entity collection ──
//
// Ordered id -> record storage. Both the map spine and each record sit
// behind an `Arc`, so cloning a collection into a snapshot is O(1) and a
// later mutation copies only the spine plus the one record it touches.
// Snapshots taken before the mutation keep seeing the old values.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Insertion-ordered collection of records keyed by id.
///
/// Order is meaningful: the tray and cabinet collections are kept in their
/// canonical display order with [`EntityCollection::sort_by`].
pub struct EntityCollection<T: Clone> {
    by_id: Arc<IndexMap<String, Arc<T>>>,
}

impl<T: Clone> EntityCollection<T> {
    pub fn new() -> Self {
        Self {
            by_id: Arc::new(IndexMap::new()),
        }
    }

    /// Insert or replace a record. Replacing keeps the existing position.
    /// Returns `true` if the id was new.
    pub fn upsert(&mut self, id: &str, record: T) -> bool {
        Arc::make_mut(&mut self.by_id)
            .insert(id.to_owned(), Arc::new(record))
            .is_none()
    }

    /// Remove a record, preserving the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<Arc<T>> {
        if !self.by_id.contains_key(id) {
            return None;
        }
        Arc::make_mut(&mut self.by_id).shift_remove(id)
    }

    /// Move a record to a new id in place. Returns `false` when `old` is absent.
    pub fn rekey(&mut self, old: &str, new: &str, record: T) -> bool {
        let Some(index) = self.by_id.get_index_of(old) else {
            return false;
        };
        let map = Arc::make_mut(&mut self.by_id);
        map.shift_remove(old);
        map.shift_insert(index.min(map.len()), new.to_owned(), Arc::new(record));
        true
    }

    /// Edit one record in place. Returns `false` when the id is absent.
    pub fn modify(&mut self, id: &str, f: impl FnOnce(&mut T)) -> bool {
        if !self.by_id.contains_key(id) {
            return false;
        }
        let map = Arc::make_mut(&mut self.by_id);
        match map.get_mut(id) {
            Some(record) => {
                f(Arc::make_mut(record));
                true
            }
            None => false,
        }
    }

    /// Re-order records. Stable, so equal keys keep their relative order.
    pub fn sort_by(&mut self, mut cmp: impl FnMut(&T, &T) -> Ordering) {
        let sorted = self
            .by_id
            .iter()
            .zip(self.by_id.iter().skip(1))
            .all(|((_, a), (_, b))| cmp(a.as_ref(), b.as_ref()) != Ordering::Greater);
        if !sorted {
            Arc::make_mut(&mut self.by_id).sort_by(|_, a, _, b| cmp(a.as_ref(), b.as_ref()));
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// First record in display order.
    pub fn first(&self) -> Option<&T> {
        self.by_id.first().map(|(_, v)| v.as_ref())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.by_id.values().map(Arc::as_ref)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        if !self.by_id.is_empty() {
            self.by_id = Arc::new(IndexMap::new());
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// True when both collections share the same spine (nothing changed).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.by_id, &other.by_id)
    }
}

impl<T: Clone> Default for EntityCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for EntityCollection<T> {
    fn clone(&self) -> Self {
        Self {
            by_id: Arc::clone(&self.by_id),
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for EntityCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_id.iter().map(|(k, v)| (k, v.as_ref())))
            .finish()
    }
}

impl<T: Clone + Serialize> Serialize for EntityCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.by_id.iter().map(|(k, v)| (k, v.as_ref())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(col: &EntityCollection<String>) -> Vec<&str> {
        col.keys().collect()
    }

    #[test]
    fn upsert_returns_true_for_new_key() {
        let mut col: EntityCollection<String> = EntityCollection::new();
        assert!(col.upsert("key1", "hello".into()));
    }

    #[test]
    fn upsert_returns_false_for_existing_key_and_keeps_position() {
        let mut col: EntityCollection<String> = EntityCollection::new();
        col.upsert("a", "1".into());
        col.upsert("b", "2".into());
        assert!(!col.upsert("a", "3".into()));
        assert_eq!(ids(&col), vec!["a", "b"]);
        assert_eq!(col.get("a").unwrap(), "3");
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut col: EntityCollection<String> = EntityCollection::new();
        for k in ["a", "b", "c"] {
            col.upsert(k, k.to_uppercase());
        }
        assert_eq!(*col.remove("b").unwrap(), "B");
        assert!(col.remove("b").is_none());
        assert_eq!(ids(&col), vec!["a", "c"]);
    }

    #[test]
    fn rekey_keeps_slot() {
        let mut col: EntityCollection<String> = EntityCollection::new();
        for k in ["a", "b", "c"] {
            col.upsert(k, k.into());
        }
        assert!(col.rekey("b", "z", "zz".into()));
        assert_eq!(ids(&col), vec!["a", "z", "c"]);
        assert!(!col.rekey("missing", "y", "y".into()));
    }

    #[test]
    fn clones_are_isolated_from_later_writes() {
        let mut col: EntityCollection<String> = EntityCollection::new();
        col.upsert("a", "before".into());
        let snapshot = col.clone();
        assert!(snapshot.ptr_eq(&col));

        col.modify("a", |v| *v = "after".into());
        assert_eq!(snapshot.get("a").unwrap(), "before");
        assert_eq!(col.get("a").unwrap(), "after");
        assert!(!snapshot.ptr_eq(&col));
    }

    #[test]
    fn sort_by_is_noop_when_already_sorted() {
        let mut col: EntityCollection<String> = EntityCollection::new();
        col.upsert("a", "1".into());
        col.upsert("b", "2".into());
        let snapshot = col.clone();
        col.sort_by(|x, y| x.cmp(y));
        assert!(snapshot.ptr_eq(&col));

        col.sort_by(|x, y| y.cmp(x));
        assert_eq!(ids(&col), vec!["b", "a"]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut col: EntityCollection<String> = EntityCollection::new();
        col.upsert("a", "x".into());
        col.upsert("b", "y".into());
        assert_eq!(col.len(), 2);

        col.clear();
        assert!(col.is_empty());
        assert!(col.first().is_none());
    }
}

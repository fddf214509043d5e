use core::fmt;

use crate::{AvlMap, InsertAs, NodeId};

/// A view into a single entry in an [`AvlMap`], which may be either vacant or occupied.
///
/// This is constructed by [`AvlMap::entry`].
pub enum Entry<'map, K, V> {
    Vacant(VacantEntry<'map, K, V>),
    Occupied(OccupiedEntry<'map, K, V>),
}

impl<'map, K, V> Entry<'map, K, V> {
    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Vacant(entry) => entry.key(),
            Entry::Occupied(entry) => entry.key(),
        }
    }

    /// Ensures a value is in the entry by inserting `default` if empty, and returns a mutable
    /// reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'map mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Ensures a value is in the entry by inserting the result of `default` if empty, and returns
    /// a mutable reference to the value in the entry.
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'map mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default()),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Like [`or_insert_with`](Entry::or_insert_with), but `default` receives the entry's key.
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(self, default: F) -> &'map mut V {
        match self {
            Entry::Vacant(entry) => {
                let value = default(entry.key());
                entry.insert(value)
            }
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any potential inserts.
    pub fn and_modify<F: FnOnce(&mut V)>(self, f: F) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }
}

impl<'map, K, V: Default> Entry<'map, K, V> {
    /// Ensures a value is in the entry by inserting `V::default()` if empty, and returns a mutable
    /// reference to the value in the entry.
    pub fn or_default(self) -> &'map mut V {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in an [`AvlMap`]. It is part of the [`Entry`] enum.
pub struct VacantEntry<'map, K, V> {
    map: &'map mut AvlMap<K, V>,
    key: K,
    insert_as: InsertAs,
}

impl<'map, K, V> VacantEntry<'map, K, V> {
    pub(crate) fn new(map: &'map mut AvlMap<K, V>, key: K, insert_as: InsertAs) -> Self {
        VacantEntry {
            map,
            key,
            insert_as,
        }
    }

    /// Returns a reference to the key that would be used when inserting through this entry.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts `value` under this entry's key and returns a mutable reference to it.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(self, value: V) -> &'map mut V {
        let map = self.map;
        let node = map.tree.insert_at(self.key, self.insert_as);
        map.store(node, value);

        map.value_at_mut(node)
    }
}

/// A view into an occupied entry in an [`AvlMap`]. It is part of the [`Entry`] enum.
pub struct OccupiedEntry<'map, K, V> {
    map: &'map mut AvlMap<K, V>,
    node: NodeId,
}

impl<'map, K, V> OccupiedEntry<'map, K, V> {
    pub(crate) fn new(map: &'map mut AvlMap<K, V>, node: NodeId) -> Self {
        OccupiedEntry { map, node }
    }

    /// Returns a reference to the key stored in the map.
    pub fn key(&self) -> &K {
        self.map.tree.key(self.node)
    }

    /// Returns a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.map.value_at(self.node)
    }

    /// Returns a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.map.value_at_mut(self.node)
    }

    /// Converts the entry into a mutable reference to its value, bound to the map's lifetime.
    pub fn into_mut(self) -> &'map mut V {
        let map = self.map;
        map.value_at_mut(self.node)
    }

    /// Replaces the value in the entry, returning the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the map, returning its value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map, returning the stored key and value.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove_entry(self) -> (K, V) {
        self.map.remove_at(self.node)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Vacant(entry) => f.debug_tuple("Entry").field(entry).finish(),
            Entry::Occupied(entry) => f.debug_tuple("Entry").field(entry).finish(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for VacantEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VacantEntry").field(self.key()).finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OccupiedEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupiedEntry")
            .field("key", self.key())
            .field("value", self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlMap;

    #[test]
    fn or_insert_and_modify() {
        let mut map: AvlMap<&str, u32> = AvlMap::new();

        *map.entry("a").or_insert(1) += 10;
        *map.entry("a").or_insert(1) += 10;
        map.entry("b").and_modify(|v| *v = 100).or_insert_with(|| 5);
        map.entry("b").and_modify(|v| *v *= 2).or_default();

        assert_eq!(map.get("a"), Ok(&21));
        assert_eq!(map.get("b"), Ok(&10));
        map.assert_invariants();
    }

    #[test]
    fn occupied_remove() {
        let mut map: AvlMap<u32, u32> = (0..16).map(|k| (k, k * k)).collect();

        match map.entry(7) {
            crate::Entry::Occupied(entry) => assert_eq!(entry.remove_entry(), (7, 49)),
            crate::Entry::Vacant(_) => panic!("7 should be present"),
        }

        assert!(!map.contains_key(&7));
        assert_eq!(map.len(), 15);
        map.assert_invariants();
    }

    #[test]
    fn vacant_key_passthrough() {
        let mut map: AvlMap<String, usize> = AvlMap::new();

        let len = map.entry("hello".to_owned()).or_insert_with_key(|k| k.len());
        assert_eq!(*len, 5);
        assert_eq!(map.entry("hello".to_owned()).key(), "hello");
    }
}

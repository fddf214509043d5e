use core::{borrow::Borrow, fmt, ops::Index};

use crate::{
    cursor::CursorRaw, Cursor, CursorMut, Entry, Error, IntoIter, Iter, IterMut, Keys,
    NodeId, OccupiedEntry, Result, Search, Tree, VacantEntry, Values, ValuesMut,
};

/// An ordered map based on an [AVL tree].
///
/// Insertion, lookup and removal complete in _O(log(n))_ time. Iteration visits entries in
/// ascending key order; every iterator is double-ended, so `.rev()` visits them in descending
/// order.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlMap<K, V> {
    pub(crate) tree: Tree<K>,
    // Values indexed by `NodeId`, parallel to the tree's node arena.
    pub(crate) values: Vec<Option<V>>,
}

impl<K, V> AvlMap<K, V> {
    /// Creates a new, empty `AvlMap`.
    pub const fn new() -> Self {
        Self {
            tree: Tree::new(),
            values: Vec::new(),
        }
    }

    /// Returns `true` if the map contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the map.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the height of the underlying tree.
    ///
    /// An empty map has height 0 and a single entry height 1. This operation completes in _O(1)_
    /// time.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Clears the map, removing all elements.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.values.clear();
    }

    /// Returns an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree, &self.values)
    }

    /// Returns an iterator over the entries of the map, sorted by key, with mutable references to
    /// the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&self.tree, &mut self.values)
    }

    /// Returns an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns a mutable iterator over the values of the map, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns a cursor pointing at the entry with the minimum key.
    ///
    /// If the map is empty, the cursor points at the end of the map.
    pub fn cursor_first(&self) -> Cursor<'_, K, V> {
        Cursor::new(self, CursorRaw::first(&self.tree))
    }

    /// Returns a cursor pointing at the entry with the maximum key.
    ///
    /// This is where reverse iteration starts. If the map is empty, the cursor points at the end
    /// of the map.
    pub fn cursor_last(&self) -> Cursor<'_, K, V> {
        Cursor::new(self, CursorRaw::last(&self.tree))
    }

    /// Returns a cursor pointing at the end of the map, one past the maximum key.
    pub fn cursor_end(&self) -> Cursor<'_, K, V> {
        Cursor::new(self, CursorRaw::end())
    }

    /// Returns a cursor pointing at the entry with the minimum key, which allows values to be
    /// modified.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, K, V> {
        let curs = CursorRaw::first(&self.tree);
        CursorMut::new(self, curs)
    }

    /// Returns a cursor pointing at the entry with the maximum key, which allows values to be
    /// modified.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, K, V> {
        let curs = CursorRaw::last(&self.tree);
        CursorMut::new(self, curs)
    }

    /// Returns a cursor pointing at the end of the map, which allows values to be modified.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, K, V> {
        CursorMut::new(self, CursorRaw::end())
    }

    /// Returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|node| self.entry_at(node))
    }

    /// Returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|node| self.entry_at(node))
    }

    /// Removes and returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let node = self.tree.first()?;
        Some(self.remove_at(node))
    }

    /// Removes and returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let node = self.tree.last()?;
        Some(self.remove_at(node))
    }

    pub(crate) fn value_at(&self, node: NodeId) -> &V {
        value_slot(&self.values, node)
    }

    pub(crate) fn value_at_mut(&mut self, node: NodeId) -> &mut V {
        self.values[node.index()]
            .as_mut()
            .expect("occupied node has no value")
    }

    pub(crate) fn entry_at(&self, node: NodeId) -> (&K, &V) {
        (self.tree.key(node), self.value_at(node))
    }

    pub(crate) fn entry_at_mut(&mut self, node: NodeId) -> (&K, &mut V) {
        let value = self.values[node.index()]
            .as_mut()
            .expect("occupied node has no value");

        (self.tree.key(node), value)
    }

    // Stores the value of a freshly inserted node.
    pub(crate) fn store(&mut self, node: NodeId, value: V) {
        match self.values.get_mut(node.index()) {
            Some(slot) => {
                debug_assert!(slot.is_none(), "{node:?} already holds a value");
                *slot = Some(value);
            }

            None => {
                debug_assert_eq!(node.index(), self.values.len());
                self.values.push(Some(value));
            }
        }
    }

    pub(crate) fn remove_at(&mut self, node: NodeId) -> (K, V) {
        let value = self.values[node.index()]
            .take()
            .expect("occupied node has no value");
        let key = self.tree.remove_at(node);

        (key, value)
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Inserts a key-value pair into the map.
    ///
    /// If the map already held a value for `key`, it is replaced and returned; the stored key is
    /// left untouched.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entry(key) {
            Entry::Occupied(mut entry) => {
                log::debug!("overwriting value of an existing key");
                Some(entry.insert(value))
            }

            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Removes the value associated with `key` from the map.
    ///
    /// Returns `None`, leaving the map untouched, if `key` is absent.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key` from the map, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(node) = self.tree.find(key) else {
            log::debug!("remove of an absent key is a no-op");
            return None;
        };

        Some(self.remove_at(node))
    }

    /// Returns `true` if the map contains a value associated with `key`.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).is_some()
    }

    /// Returns a reference to the value associated with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` is absent.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.tree.find(key).ok_or(Error::NotFound)?;
        Ok(self.value_at(node))
    }

    /// Returns a mutable reference to the value associated with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` is absent.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.tree.find(key).ok_or(Error::NotFound)?;
        Ok(self.value_at_mut(node))
    }

    /// Returns the stored key and the value associated with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `key` is absent.
    pub fn get_key_value<Q>(&self, key: &Q) -> Result<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.tree.find(key).ok_or(Error::NotFound)?;
        Ok(self.entry_at(node))
    }

    /// Returns a mutable reference to the value associated with `key`, inserting
    /// `V::default()` first if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Gets the entry for `key` for in-place manipulation.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        match self.tree.search(&key) {
            Search::Found(node) => Entry::Occupied(OccupiedEntry::new(self, node)),
            Search::Vacant(insert_as) => Entry::Vacant(VacantEntry::new(self, key, insert_as)),
        }
    }

    /// Panics if any structural invariant of the underlying tree is violated.
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();

        for (index, value) in self.values.iter().enumerate() {
            assert_eq!(
                value.is_some(),
                matches!(self.tree.nodes.get(index), Some(Some(_))),
                "value slot {index} disagrees with the node arena"
            );
        }
    }
}

pub(crate) fn value_slot<V>(values: &[Option<V>], node: NodeId) -> &V {
    values[node.index()]
        .as_ref()
        .expect("occupied node has no value")
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for AvlMap<K, V> {
    fn clone(&self) -> Self {
        let mut values = Vec::with_capacity(self.len());
        let tree = self.tree.copy_with(|src, copy| {
            debug_assert_eq!(copy.index(), values.len());
            values.push(Some(self.value_at(src).clone()));
        });

        AvlMap { tree, values }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V: PartialEq> PartialEq for AvlMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Ord, V: Eq> Eq for AvlMap<K, V> {}

impl<K, Q, V> Index<&Q> for AvlMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// Returns a reference to the value associated with `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent. Use [`AvlMap::get_or_insert_default`] to insert missing keys.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AvlMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for AvlMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'map, K: Ord, V> IntoIterator for &'map AvlMap<K, V> {
    type Item = (&'map K, &'map V);
    type IntoIter = Iter<'map, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'map, K: Ord, V> IntoIterator for &'map mut AvlMap<K, V> {
    type Item = (&'map K, &'map mut V);
    type IntoIter = IterMut<'map, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

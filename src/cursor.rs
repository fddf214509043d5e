use core::{fmt, ptr};

use crate::{AvlMap, Error, Link, NodeId, Result, Tree};

/// A cursor over an [`AvlMap`].
///
/// A cursor points either to an entry of the map or to the "end" non-element that follows the
/// entry with the maximum key. Cursors only read the map; they borrow it for as long as they
/// exist, so the map cannot change underneath them.
pub struct Cursor<'map, K, V> {
    map: &'map AvlMap<K, V>,
    curs: CursorRaw,
}

impl<'map, K, V> Cursor<'map, K, V> {
    pub(crate) fn new(map: &'map AvlMap<K, V>, curs: CursorRaw) -> Cursor<'map, K, V> {
        Cursor { map, curs }
    }

    /// Returns `true` if the cursor points at the "end" non-element.
    pub fn is_end(&self) -> bool {
        self.curs.node.is_none()
    }

    /// Returns the key and value the cursor points to.
    ///
    /// This returns `None` if the cursor is pointing to the "end" non-element.
    pub fn get(&self) -> Option<(&'map K, &'map V)> {
        self.curs.node.map(|node| self.map.entry_at(node))
    }

    /// Returns the key the cursor points to.
    pub fn key(&self) -> Option<&'map K> {
        self.get().map(|(key, _)| key)
    }

    /// Returns the value the cursor points to.
    pub fn value(&self) -> Option<&'map V> {
        self.get().map(|(_, value)| value)
    }
}

impl<'map, K: Ord, V> Cursor<'map, K, V> {
    /// Moves the cursor to the entry with the next larger key.
    ///
    /// If the cursor is pointing to the last entry, this moves it to the "end" non-element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IteratorOutOfRange`] if the cursor already points to the "end"
    /// non-element. The cursor is not moved.
    pub fn move_next(&mut self) -> Result<()> {
        self.curs.move_next(&self.map.tree)
    }

    /// Moves the cursor to the entry with the next smaller key.
    ///
    /// If the cursor is pointing to the "end" non-element, this moves it to the last entry. If it
    /// is pointing to the first entry, this moves it to the "end" non-element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IteratorOutOfRange`] if the map is empty.
    pub fn move_prev(&mut self) -> Result<()> {
        self.curs.move_prev(&self.map.tree)
    }

    /// Returns the entry after the one the cursor points to.
    ///
    /// Returns `None` if the cursor points to the last entry or to the "end" non-element.
    pub fn peek_next(&self) -> Option<(&'map K, &'map V)> {
        self.curs
            .peek_next(&self.map.tree)
            .map(|node| self.map.entry_at(node))
    }

    /// Returns the entry before the one the cursor points to.
    ///
    /// If the cursor is pointing to the "end" non-element, this returns the last entry. If it is
    /// pointing to the first entry, this returns `None`.
    pub fn peek_prev(&self) -> Option<(&'map K, &'map V)> {
        self.curs
            .peek_prev(&self.map.tree)
            .map(|node| self.map.entry_at(node))
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

/// Two cursors are equal if they point into the same map at the same entry, or are both at the
/// end of the same map.
impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.map, other.map) && self.curs == other.curs
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

/// A cursor over an [`AvlMap`] which allows values to be modified in place.
///
/// Keys and the shape of the tree cannot be changed through a cursor.
pub struct CursorMut<'map, K, V> {
    map: &'map mut AvlMap<K, V>,
    curs: CursorRaw,
}

impl<'map, K, V> CursorMut<'map, K, V> {
    pub(crate) fn new(map: &'map mut AvlMap<K, V>, curs: CursorRaw) -> CursorMut<'map, K, V> {
        CursorMut { map, curs }
    }

    /// Returns a read-only cursor pointing to the current entry.
    ///
    /// The `CursorMut` remains immutably borrowed for the lifetime of the returned `Cursor`.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.map, self.curs)
    }

    /// Returns `true` if the cursor points at the "end" non-element.
    pub fn is_end(&self) -> bool {
        self.curs.node.is_none()
    }

    /// Returns the key and value the cursor points to.
    ///
    /// This returns `None` if the cursor is pointing to the "end" non-element.
    pub fn get(&self) -> Option<(&K, &V)> {
        self.curs.node.map(|node| self.map.entry_at(node))
    }

    /// Returns the key and a mutable reference to the value the cursor points to.
    ///
    /// This returns `None` if the cursor is pointing to the "end" non-element.
    pub fn get_mut(&mut self) -> Option<(&K, &mut V)> {
        let node = self.curs.node?;
        Some(self.map.entry_at_mut(node))
    }

    /// Returns a mutable reference to the value the cursor points to.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.get_mut().map(|(_, value)| value)
    }
}

impl<'map, K: Ord, V> CursorMut<'map, K, V> {
    /// Moves the cursor to the entry with the next larger key.
    ///
    /// If the cursor is pointing to the last entry, this moves it to the "end" non-element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IteratorOutOfRange`] if the cursor already points to the "end"
    /// non-element. The cursor is not moved.
    pub fn move_next(&mut self) -> Result<()> {
        self.curs.move_next(&self.map.tree)
    }

    /// Moves the cursor to the entry with the next smaller key.
    ///
    /// If the cursor is pointing to the "end" non-element, this moves it to the last entry. If it
    /// is pointing to the first entry, this moves it to the "end" non-element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IteratorOutOfRange`] if the map is empty.
    pub fn move_prev(&mut self) -> Result<()> {
        self.curs.move_prev(&self.map.tree)
    }

    /// Returns the entry after the one the cursor points to.
    pub fn peek_next(&self) -> Option<(&K, &V)> {
        self.curs
            .peek_next(&self.map.tree)
            .map(|node| self.map.entry_at(node))
    }

    /// Returns the entry before the one the cursor points to.
    pub fn peek_prev(&self) -> Option<(&K, &V)> {
        self.curs
            .peek_prev(&self.map.tree)
            .map(|node| self.map.entry_at(node))
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.get()).finish()
    }
}

/// Cursor position shared by [`Cursor`] and [`CursorMut`]; `None` is the "end" non-element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CursorRaw {
    node: Link,
}

impl CursorRaw {
    pub(crate) fn first<K>(tree: &Tree<K>) -> CursorRaw {
        CursorRaw { node: tree.first() }
    }

    pub(crate) fn last<K>(tree: &Tree<K>) -> CursorRaw {
        CursorRaw { node: tree.last() }
    }

    pub(crate) const fn end() -> CursorRaw {
        CursorRaw { node: None }
    }

    fn move_next<K: Ord>(&mut self, tree: &Tree<K>) -> Result<()> {
        let node = self.node.ok_or(Error::IteratorOutOfRange)?;
        self.node = successor(tree, node);

        Ok(())
    }

    fn move_prev<K: Ord>(&mut self, tree: &Tree<K>) -> Result<()> {
        self.node = match self.node {
            Some(node) => predecessor(tree, node),
            None => Some(tree.last().ok_or(Error::IteratorOutOfRange)?),
        };

        Ok(())
    }

    fn peek_next<K: Ord>(&self, tree: &Tree<K>) -> Link {
        self.node.and_then(|node| successor(tree, node))
    }

    fn peek_prev<K: Ord>(&self, tree: &Tree<K>) -> Link {
        match self.node {
            Some(node) => predecessor(tree, node),
            None => tree.last(),
        }
    }
}

/// Returns the node with the next larger key after `node`.
pub(crate) fn successor<K: Ord>(tree: &Tree<K>, node: NodeId) -> Link {
    if let Some(right) = tree.right(node) {
        return Some(tree.min_in_subtree(right));
    }

    // Ascend until an ancestor with a larger key is found.
    let key = tree.key(node);
    let mut opt_cur = tree.parent(node);

    while let Some(cur) = opt_cur {
        if tree.key(cur) > key {
            return Some(cur);
        }

        opt_cur = tree.parent(cur);
    }

    None
}

/// Returns the node with the next smaller key before `node`.
pub(crate) fn predecessor<K: Ord>(tree: &Tree<K>, node: NodeId) -> Link {
    if let Some(left) = tree.left(node) {
        return Some(tree.max_in_subtree(left));
    }

    let key = tree.key(node);
    let mut opt_cur = tree.parent(node);

    while let Some(cur) = opt_cur {
        if tree.key(cur) < key {
            return Some(cur);
        }

        opt_cur = tree.parent(cur);
    }

    None
}

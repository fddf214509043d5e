use core::{iter::FusedIterator, marker::PhantomData, ptr::NonNull};

use crate::{
    cursor::{predecessor, successor},
    map::value_slot,
    AvlMap, Link, NodeId, Tree,
};

/// An iterator over the entries of an [`AvlMap`], sorted by key.
///
/// The front walks forward from the minimum key and the back walks backward from the maximum key
/// using the nodes' parent links; the two ends stop when they meet.
pub struct Iter<'map, K, V> {
    tree: &'map Tree<K>,
    values: &'map [Option<V>],

    front: Link,
    back: Link,
    len: usize,
}

impl<'map, K, V> Iter<'map, K, V> {
    pub(crate) fn new(tree: &'map Tree<K>, values: &'map [Option<V>]) -> Self {
        Iter {
            tree,
            values,
            front: tree.first(),
            back: tree.last(),
            len: tree.len(),
        }
    }
}

impl<'map, K: Ord, V> Iterator for Iter<'map, K, V> {
    type Item = (&'map K, &'map V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let node = self.front?;
        self.front = successor(self.tree, node);
        self.len -= 1;

        Some((self.tree.key(node), value_slot(self.values, node)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K: Ord, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let node = self.back?;
        self.back = predecessor(self.tree, node);
        self.len -= 1;

        Some((self.tree.key(node), value_slot(self.values, node)))
    }
}

impl<K: Ord, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Ord, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

/// A mutable iterator over the entries of an [`AvlMap`], sorted by key.
pub struct IterMut<'map, K, V> {
    tree: &'map Tree<K>,
    // Base of the value slots. Each slot is handed out at most once.
    values: NonNull<Option<V>>,

    front: Link,
    back: Link,
    len: usize,

    _marker: PhantomData<&'map mut V>,
}

impl<'map, K, V> IterMut<'map, K, V> {
    pub(crate) fn new(tree: &'map Tree<K>, values: &'map mut [Option<V>]) -> Self {
        IterMut {
            tree,
            values: NonNull::from(values).cast(),
            front: tree.first(),
            back: tree.last(),
            len: tree.len(),
            _marker: PhantomData,
        }
    }

    fn value(&mut self, node: NodeId) -> &'map mut V {
        // SAFETY: `values` came from a `&'map mut [Option<V>]` covering every node index of
        // `tree`, and the front and back ends together visit each node exactly once, so no other
        // reference to this slot exists.
        let slot = unsafe { &mut *self.values.as_ptr().add(node.index()) };
        slot.as_mut().expect("occupied node has no value")
    }
}

impl<'map, K: Ord, V> Iterator for IterMut<'map, K, V> {
    type Item = (&'map K, &'map mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let tree = self.tree;
        let node = self.front?;
        self.front = successor(tree, node);
        self.len -= 1;

        Some((tree.key(node), self.value(node)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K: Ord, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let tree = self.tree;
        let node = self.back?;
        self.back = predecessor(tree, node);
        self.len -= 1;

        Some((tree.key(node), self.value(node)))
    }
}

impl<K: Ord, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K: Ord, V> FusedIterator for IterMut<'_, K, V> {}

/// An owning iterator over the entries of an [`AvlMap`], sorted by key.
pub struct IntoIter<K, V> {
    map: AvlMap<K, V>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(map: AvlMap<K, V>) -> Self {
        IntoIter { map }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.map.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.map.len(), Some(self.map.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.map.pop_last()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

/// An iterator over the keys of an [`AvlMap`], in sorted order.
pub struct Keys<'map, K, V> {
    pub(crate) inner: Iter<'map, K, V>,
}

impl<'map, K: Ord, V> Iterator for Keys<'map, K, V> {
    type Item = &'map K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Ord, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K: Ord, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of an [`AvlMap`], in order by key.
pub struct Values<'map, K, V> {
    pub(crate) inner: Iter<'map, K, V>,
}

impl<'map, K: Ord, V> Iterator for Values<'map, K, V> {
    type Item = &'map V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Ord, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K: Ord, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of an [`AvlMap`], in order by key.
pub struct ValuesMut<'map, K, V> {
    pub(crate) inner: IterMut<'map, K, V>,
}

impl<'map, K: Ord, V> Iterator for ValuesMut<'map, K, V> {
    type Item = &'map mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Ord, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K: Ord, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

#[cfg(test)]
mod tests {
    use crate::AvlMap;

    #[test]
    fn meet_in_the_middle() {
        let map: AvlMap<u32, u32> = (0..9).map(|k| (k, k + 100)).collect();
        let mut iter = map.iter();

        assert_eq!(iter.len(), 9);
        assert_eq!(iter.next(), Some((&0, &100)));
        assert_eq!(iter.next_back(), Some((&8, &108)));
        assert_eq!(iter.next(), Some((&1, &101)));
        assert_eq!(iter.len(), 6);

        let rest: Vec<_> = iter.by_ref().rev().map(|(k, _)| *k).collect();
        assert_eq!(rest, [7, 6, 5, 4, 3, 2]);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn iter_mut_doubles_values() {
        let mut map: AvlMap<i32, i32> = (-5..5).map(|k| (k, k)).collect();

        for (k, v) in map.iter_mut() {
            *v = *k * 2;
        }
        for v in map.values_mut().rev().take(3) {
            *v += 1;
        }

        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, [-10, -8, -6, -4, -2, 0, 2, 5, 7, 9]);
    }

    #[test]
    fn into_iter_both_ends() {
        let map: AvlMap<u8, char> = [(3, 'c'), (1, 'a'), (2, 'b'), (4, 'd')].into_iter().collect();
        let mut iter = map.into_iter();

        assert_eq!(iter.next_back(), Some((4, 'd')));
        assert_eq!(iter.next(), Some((1, 'a')));
        assert_eq!(iter.collect::<Vec<_>>(), [(2, 'b'), (3, 'c')]);
    }

    #[test]
    fn borrowing_into_iter() {
        let mut map: AvlMap<u32, String> = AvlMap::new();
        map.insert(2, "two".to_owned());
        map.insert(1, "one".to_owned());

        for (_, v) in &mut map {
            v.push('!');
        }

        let joined: Vec<&str> = (&map).into_iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(joined, ["one!", "two!"]);
        assert_eq!(map.keys().rev().copied().collect::<Vec<_>>(), [2, 1]);
    }
}

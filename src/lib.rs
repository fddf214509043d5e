//! An ordered map backed by an AVL tree with parent back-links.
//!
//! Nodes live in an arena and refer to each other by index. Child links are the structural edges
//! of the tree; the parent link is a plain index used for upward traversal and relinking, so the
//! [cursors](Cursor) can walk the tree in either direction without keeping a stack.
//!
//! ```
//! use avl_map::{AvlMap, Error};
//!
//! let mut map = AvlMap::new();
//! map.insert(3, "three");
//! map.insert(1, "one");
//! map.insert(2, "two");
//!
//! assert_eq!(map.get(&1), Ok(&"one"));
//! assert_eq!(map.get(&7), Err(Error::NotFound));
//! assert_eq!(map.height(), 2);
//!
//! let keys: Vec<_> = map.keys().copied().collect();
//! assert_eq!(keys, [1, 2, 3]);
//! ```
//!
//! The map is not synchronised. Sharing it between threads requires external locking around the
//! whole map.

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. An absent child has height 0, a leaf height 1.
// - The balance factor of a node `x` is `bf(x) = h(right(x)) - h(left(x))`.
//
// The invariants of the tree are:
// 1. Keys in the left subtree of `x` are less than `key(x)`, keys in its right subtree greater.
// 2. `bf(x) ∈ {-1, 0, 1}` for every node.
// 3. `h(x) = 1 + max(h(left(x)), h(right(x)))` for every node.
// 4. The parent link of every child points back at the node holding it, and the root has none.
//
// Corollary: a tree of `n` nodes has height at most ~1.44 log2(n + 2).

use core::{borrow::Borrow, cmp::Ordering, mem, ops::Not};

mod cursor;
#[cfg(feature = "dot")]
mod debug;
mod entry;
mod error;
mod iter;
mod map;
#[cfg(any(test, feature = "model"))]
pub mod model;

pub use cursor::{Cursor, CursorMut};
pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use error::{Error, Result};
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use map::AvlMap;

/// Index of a node slot in the arena.
///
/// A `NodeId` stays attached to the same key for as long as that key is in the tree; rotations
/// and removals of other keys never move it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

type Link = Option<NodeId>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

struct Node<K> {
    key: K,
    parent: Link,
    children: [Link; 2],
    height: u32,
}

/// Outcome of a descent looking for a key.
pub(crate) enum Search {
    Found(NodeId),
    Vacant(InsertAs),
}

/// Where a new node is attached.
#[derive(Copy, Clone, Debug)]
pub(crate) enum InsertAs {
    Root,
    Child { parent: NodeId, dir: Dir },
}

/// The AVL tree proper: node arena, links and rebalancing.
///
/// The tree only stores keys. Callers that need to associate data with each key keep it in a
/// side table indexed by [`NodeId::index`].
pub(crate) struct Tree<K> {
    nodes: Vec<Option<Node<K>>>,
    free: Vec<NodeId>,
    root: Link,
    len: usize,
}

impl<K> Tree<K> {
    /// Returns a new empty tree.
    pub(crate) const fn new() -> Tree<K> {
        Tree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn is_empty(&self) -> bool {
        let empty = self.len == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn root(&self) -> Link {
        self.root
    }

    /// Height of the whole tree; 0 when empty.
    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.height_of(self.root) as usize
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node<K> {
        self.nodes[id.0]
            .as_ref()
            .expect("node id refers to a vacant slot")
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.nodes[id.0]
            .as_mut()
            .expect("node id refers to a vacant slot")
    }

    #[inline]
    pub(crate) fn key(&self, id: NodeId) -> &K {
        &self.node(id).key
    }

    #[inline]
    pub(crate) fn parent(&self, id: NodeId) -> Link {
        self.node(id).parent
    }

    #[inline]
    pub(crate) fn child(&self, id: NodeId, dir: Dir) -> Link {
        self.node(id).children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self, id: NodeId) -> Link {
        self.child(id, Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self, id: NodeId) -> Link {
        self.child(id, Dir::Right)
    }

    #[inline]
    pub(crate) fn height_at(&self, id: NodeId) -> u32 {
        self.node(id).height
    }

    #[inline]
    fn height_of(&self, link: Link) -> u32 {
        link.map_or(0, |id| self.node(id).height)
    }

    #[inline]
    fn set_parent(&mut self, id: NodeId, parent: Link) -> Link {
        mem::replace(&mut self.node_mut(id).parent, parent)
    }

    #[inline]
    fn set_child(&mut self, id: NodeId, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.node_mut(id).children[dir as usize], child)
    }

    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        let Some(node) = opt_node else {
            return;
        };

        self.set_parent(node, parent);
    }

    #[inline]
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => self.replace_child(parent, old_child, new_child),
            None => self.root = new_child,
        }
    }

    // Replaces the child link of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent link is not updated.
    fn replace_child(&mut self, parent: NodeId, old_child: NodeId, new_child: Link) {
        let dir = if self.left(parent) == Some(old_child) {
            Dir::Left
        } else {
            debug_assert_eq!(
                self.right(parent),
                Some(old_child),
                "`old_child` must be a child of `parent`"
            );
            Dir::Right
        };

        self.set_child(parent, dir, new_child);
    }

    /// Returns the minimum node in the subtree rooted at `root`.
    pub(crate) fn min_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;

        while let Some(left) = self.left(cur) {
            cur = left;
        }

        cur
    }

    /// Returns the maximum node in the subtree rooted at `root`.
    pub(crate) fn max_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;

        while let Some(right) = self.right(cur) {
            cur = right;
        }

        cur
    }

    /// Returns the node holding the minimum key.
    pub(crate) fn first(&self) -> Link {
        self.root.map(|root| self.min_in_subtree(root))
    }

    /// Returns the node holding the maximum key.
    pub(crate) fn last(&self) -> Link {
        self.root.map(|root| self.max_in_subtree(root))
    }

    /// Descends from the root looking for `key`.
    ///
    /// Returns the matching node, or the empty slot where a node for `key` belongs.
    pub(crate) fn search<Q>(&self, key: &Q) -> Search
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut cur) = self.root else {
            return Search::Vacant(InsertAs::Root);
        };

        loop {
            let dir = match key.cmp(self.key(cur).borrow()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Search::Found(cur),
                Ordering::Greater => Dir::Right,
            };

            match self.child(cur, dir) {
                // Descend.
                Some(child) => cur = child,
                None => return Search::Vacant(InsertAs::Child { parent: cur, dir }),
            }
        }
    }

    /// Returns the node holding `key`, if any.
    pub(crate) fn find<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(node) => Some(node),
            Search::Vacant(_) => None,
        }
    }

    /// Attaches a new leaf holding `key` at `insert_as` and rebalances the path to the root.
    ///
    /// `insert_as` must come from a [`search`](Tree::search) for `key` on the unchanged tree.
    pub(crate) fn insert_at(&mut self, key: K, insert_as: InsertAs) -> NodeId {
        let node = self.alloc(Node {
            key,
            parent: None,
            children: [None; 2],
            height: 1,
        });

        match insert_as {
            InsertAs::Root => {
                debug_assert!(self.root.is_none(), "tree already has a root");
                self.root = Some(node);
            }

            InsertAs::Child { parent, dir } => {
                debug_assert!(self.child(parent, dir).is_none(), "slot already taken");
                self.set_child(parent, dir, Some(node));
                self.set_parent(node, Some(parent));
                self.rebalance_from(Some(parent));
            }
        }

        self.len += 1;
        node
    }

    /// Unlinks `node` from the tree, rebalances, and returns its key.
    ///
    /// The slot of `node` is vacated and may be reused by a later insertion. All other nodes keep
    /// their ids.
    pub(crate) fn remove_at(&mut self, node: NodeId) -> K {
        // There are two cases:
        //
        // 1. `node` has no left child.
        //
        //    Its right subtree (which may be empty) takes its place.
        //
        // 2. `node` has a left child.
        //
        //    The in-order predecessor `pred`, the maximum of the left subtree, has no right child.
        //    It is detached, its left child elevated into its old place, and then it assumes
        //    `node`'s place with both of `node`'s subtrees.
        //
        // Heights are fixed bottom-up from the lowest node whose subtree changed.

        let parent = self.parent(node);
        let left = self.left(node);
        let right = self.right(node);

        let rebalance_start = match left {
            None => {
                self.replace_child_or_set_root(parent, node, right);
                self.maybe_set_parent(right, parent);

                parent
            }

            Some(left) => {
                let pred = self.max_of_left(left);
                log::trace!("splicing predecessor {pred:?} into {node:?}");

                let start = if pred == left {
                    // `pred` keeps its own left subtree and is the lowest changed node.
                    pred
                } else {
                    let pred_parent = self
                        .parent(pred)
                        .expect("predecessor below the left child has a parent");

                    self.set_child(pred, Dir::Left, Some(left));
                    self.set_parent(left, Some(pred));

                    pred_parent
                };

                self.set_child(pred, Dir::Right, right);
                self.maybe_set_parent(right, Some(pred));

                self.set_parent(pred, parent);
                self.replace_child_or_set_root(parent, node, Some(pred));

                Some(start)
            }
        };

        self.rebalance_from(rebalance_start);
        self.len -= 1;

        self.release(node)
    }

    // Finds the maximum of the subtree rooted at `left` and, unless it is `left` itself, detaches
    // it by elevating its left child into its place.
    fn max_of_left(&mut self, left: NodeId) -> NodeId {
        let max = self.max_in_subtree(left);

        if max != left {
            let max_parent = self.parent(max);
            let max_left = self.left(max);

            self.replace_child_or_set_root(max_parent, max, max_left);
            self.maybe_set_parent(max_left, max_parent);
        }

        max
    }

    /// Removes every node and releases the arena.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Duplicates the tree in pre-order into a fresh arena.
    ///
    /// `on_copy` is called with `(source, copy)` for every node, in the order the copies are
    /// allocated. The copies occupy consecutive slots starting at 0.
    pub(crate) fn copy_with<F>(&self, mut on_copy: F) -> Tree<K>
    where
        K: Clone,
        F: FnMut(NodeId, NodeId),
    {
        let mut copy = Tree {
            nodes: Vec::with_capacity(self.len),
            free: Vec::new(),
            root: None,
            len: self.len,
        };

        let root = self
            .root
            .map(|root| copy.copy_subtree(self, root, &mut on_copy));
        copy.root = root;

        copy
    }

    fn copy_subtree<F>(&mut self, src: &Tree<K>, node: NodeId, on_copy: &mut F) -> NodeId
    where
        K: Clone,
        F: FnMut(NodeId, NodeId),
    {
        let src_node = src.node(node);
        let copied = self.alloc(Node {
            key: src_node.key.clone(),
            parent: None,
            children: [None; 2],
            height: src_node.height,
        });
        on_copy(node, copied);

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = src_node.children[dir as usize] {
                let child_copy = self.copy_subtree(src, child, on_copy);
                self.set_child(copied, dir, Some(child_copy));
                self.set_parent(child_copy, Some(copied));
            }
        }

        copied
    }

    // Rebalancing ============================================================

    // Fixes heights and balance of every node from `start` up to the root.
    fn rebalance_from(&mut self, start: Link) {
        let mut opt_cur = start;

        while let Some(cur) = opt_cur {
            self.fix_height(cur);
            let top = self.balance(cur);
            opt_cur = self.parent(top);
        }
    }

    // Restores the balance of `node`, whose children are balanced and differ in height by at most
    // two. Returns the root of the rebalanced subtree.
    fn balance(&mut self, node: NodeId) -> NodeId {
        match self.balance_factor(node) {
            2 => {
                let right = self.right(node).expect("right-heavy node has a right child");

                if self.balance_factor(right) < 0 {
                    self.rotate(right, Dir::Right);
                }

                self.rotate(node, Dir::Left)
            }

            -2 => {
                let left = self.left(node).expect("left-heavy node has a left child");

                if self.balance_factor(left) > 0 {
                    self.rotate(left, Dir::Left);
                }

                self.rotate(node, Dir::Right)
            }

            bf => {
                debug_assert!((-1..=1).contains(&bf), "balance factor {bf} at {node:?}");
                node
            }
        }
    }

    // Performs a rotation moving `down` down in direction `dir` and its `!dir` child up into its
    // place. Returns the node that moved up.
    //
    // Heights of both nodes are recomputed, lower one first.
    fn rotate(&mut self, down: NodeId, dir: Dir) -> NodeId {
        log::trace!("rotating {dir:?} at {down:?}");

        let up = self
            .child(down, !dir)
            .expect("rotation needs a child on the opposite side");

        // - `down` becomes the `dir` child of `up`.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        let across = self.set_child(up, dir, Some(down));
        self.set_child(down, !dir, across);
        self.maybe_set_parent(across, Some(down));

        let parent = self.set_parent(down, Some(up));
        self.set_parent(up, parent);
        self.replace_child_or_set_root(parent, down, Some(up));

        self.fix_height(down);
        self.fix_height(up);

        up
    }

    #[inline]
    fn fix_height(&mut self, node: NodeId) {
        let left = self.height_of(self.left(node));
        let right = self.height_of(self.right(node));
        self.node_mut(node).height = 1 + left.max(right);
    }

    #[inline]
    fn balance_factor(&self, node: NodeId) -> i64 {
        i64::from(self.height_of(self.right(node))) - i64::from(self.height_of(self.left(node)))
    }

    // Arena ==================================================================

    fn alloc(&mut self, node: Node<K>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.nodes[id.0].is_none());
                self.nodes[id.0] = Some(node);
                id
            }

            None => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(Some(node));
                id
            }
        }
    }

    fn release(&mut self, id: NodeId) -> K {
        let node = self.nodes[id.0]
            .take()
            .expect("released node id refers to a vacant slot");
        self.free.push(id);

        node.key
    }
}

impl<K: Ord> Tree<K> {
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(
            self.nodes.len() - self.free.len(),
            self.len,
            "occupied slots must match the element count"
        );

        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "empty tree must have no elements");
            return;
        };

        assert_eq!(self.parent(root), None, "root must not have a parent");

        let count = self.assert_invariants_at(root, None, None);
        assert_eq!(count, self.len, "reachable nodes must match the element count");
    }

    // Checks the subtree rooted at `node`, whose keys must lie strictly between `lower` and
    // `upper`. Returns the number of nodes in the subtree.
    fn assert_invariants_at<'a>(
        &'a self,
        node: NodeId,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
    ) -> usize {
        let key = self.key(node);

        if let Some(lower) = lower {
            assert!(lower < key, "{node:?} is out of order with its ancestors");
        }
        if let Some(upper) = upper {
            assert!(key < upper, "{node:?} is out of order with its ancestors");
        }

        let mut count = 1;

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = self.child(node, dir) {
                let parent = self
                    .parent(child)
                    .expect("child parent link not set");
                assert_eq!(node, parent, "child parent link must point back");

                let (lower, upper) = match dir {
                    Dir::Left => (lower, Some(key)),
                    Dir::Right => (Some(key), upper),
                };
                count += self.assert_invariants_at(child, lower, upper);
            }
        }

        let expected = 1 + self
            .height_of(self.left(node))
            .max(self.height_of(self.right(node)));
        assert_eq!(self.height_at(node), expected, "stale height at {node:?}");

        let bf = self.balance_factor(node);
        assert!((-1..=1).contains(&bf), "{node:?} has balance factor {bf}");

        count
    }
}

#[cfg(test)]
mod tests;

use std::fmt;

use crate::interval::Interval;
use crate::node::{Node, NodeIndex};
use crate::tree::Tree;

/// Pushes a link of nodes on the left to stack.
fn left_link<T, V>(tree: &Tree<T, V>, mut x: NodeIndex) -> Vec<NodeIndex> {
    let mut nodes = vec![];
    while !tree.node_ref(x, Node::is_sentinel) {
        nodes.push(x);
        x = tree.node_ref(x, Node::left);
    }
    nodes
}

/// An iterator over the intervals of an `IntervalMap`, in ascending order.
#[derive(Debug)]
pub struct Iter<'a, T, V> {
    /// Reference to the tree
    tree: &'a Tree<T, V>,
    /// Stack for iteration
    stack: Vec<NodeIndex>,
    /// Intervals not yet yielded
    remaining: usize,
}

impl<'a, T, V> Iter<'a, T, V> {
    pub(crate) fn new(tree: &'a Tree<T, V>) -> Self {
        Iter {
            tree,
            stack: left_link(tree, tree.root),
            remaining: tree.len(),
        }
    }
}

impl<'a, T, V> Iterator for Iter<'a, T, V> {
    type Item = &'a Interval<T, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        self.stack
            .extend(left_link(self.tree, self.tree.node_ref(x, Node::right)));
        self.remaining -= 1;
        Some(self.tree.node_ref(x, Node::interval))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, V> ExactSizeIterator for Iter<'_, T, V> {}

impl<T, V> Clone for Iter<'_, T, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// A position on a stored interval, as returned by
/// [`IntervalMap::ceiling`](crate::IntervalMap::ceiling).
///
/// Walks forward through the map in ascending order with [`Cursor::advance`].
pub struct Cursor<'a, T, V> {
    tree: &'a Tree<T, V>,
    node: NodeIndex,
}

impl<'a, T, V> Cursor<'a, T, V> {
    pub(crate) fn new(tree: &'a Tree<T, V>, node: NodeIndex) -> Self {
        Cursor { tree, node }
    }

    /// The interval under the cursor
    #[inline]
    pub fn interval(&self) -> &'a Interval<T, V> {
        self.tree.interval(self.node)
    }

    /// Move to the next interval in ascending order, or `None` past the last one.
    #[inline]
    #[must_use]
    pub fn advance(self) -> Option<Self> {
        self.tree
            .successor(self.node)
            .map(|node| Cursor::new(self.tree, node))
    }
}

impl<T: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("interval", self.interval())
            .finish()
    }
}

impl<T, V> Clone for Cursor<'_, T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Cursor<'_, T, V> {}

use std::cmp::Ordering;

use crate::interval::Interval;
use crate::iter::Iter;
use crate::node::{Color, Node, NodeIndex};

/// A red-black tree of intervals ordered by their right bound.
///
/// Nodes live in a vector and refer to each other by `NodeIndex`, with slot 0
/// holding the shared sentinel. Removing a node swaps the last slot into the hole,
/// so indices are only stable between mutations.
#[derive(Debug, Clone)]
pub(crate) struct Tree<T, V> {
    /// Vector that stores nodes
    pub(crate) nodes: Vec<Node<T, V>>,
    /// Root of the tree
    pub(crate) root: NodeIndex,
    /// Number of elements in the tree
    pub(crate) len: usize,
}

impl<T, V> Tree<T, V> {
    /// Create an empty tree holding only the sentinel
    pub(crate) fn new() -> Self {
        Tree {
            nodes: vec![Node::new_sentinel()],
            root: NodeIndex::SENTINEL,
            len: 0,
        }
    }

    /// Return the number of stored intervals.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Get an in-order iterator over the stored intervals.
    pub(crate) fn iter(&self) -> Iter<'_, T, V> {
        Iter::new(self)
    }

    /// The interval stored at a live node.
    pub(crate) fn interval(&self, x: NodeIndex) -> &Interval<T, V> {
        self.node_ref(x, Node::interval)
    }

    /// The node holding the smallest right bound
    pub(crate) fn first(&self) -> Option<NodeIndex> {
        (!self.node_ref(self.root, Node::is_sentinel)).then(|| self.tree_minimum(self.root))
    }

    /// The node holding the largest right bound
    pub(crate) fn last(&self) -> Option<NodeIndex> {
        (!self.node_ref(self.root, Node::is_sentinel)).then(|| self.tree_maximum(self.root))
    }

    /// The in-order successor of a live node.
    pub(crate) fn successor(&self, mut x: NodeIndex) -> Option<NodeIndex> {
        if !self.right_ref(x, Node::is_sentinel) {
            return Some(self.tree_minimum(self.node_ref(x, Node::right)));
        }
        let mut y = self.node_ref(x, Node::parent);
        while !self.node_ref(y, Node::is_sentinel) && self.node_ref(y, Node::right) == x {
            x = y;
            y = self.node_ref(y, Node::parent);
        }
        (!self.node_ref(y, Node::is_sentinel)).then_some(y)
    }

    /// Find the node with the minimum key in a subtree.
    fn tree_minimum(&self, mut x: NodeIndex) -> NodeIndex {
        while !self.left_ref(x, Node::is_sentinel) {
            x = self.node_ref(x, Node::left);
        }
        x
    }

    /// Find the node with the maximum key in a subtree.
    fn tree_maximum(&self, mut x: NodeIndex) -> NodeIndex {
        while !self.right_ref(x, Node::is_sentinel) {
            x = self.node_ref(x, Node::right);
        }
        x
    }
}

impl<T, V> Tree<T, V>
where
    T: Ord,
{
    /// Insert an interval keyed by its right bound.
    /// If the key exists, overwrite and return the previous interval.
    ///
    /// # Panics
    ///
    /// This method panics when the arena is at the maximum number of nodes
    pub(crate) fn insert(&mut self, interval: Interval<T, V>) -> Option<Interval<T, V>> {
        let mut y = NodeIndex::SENTINEL;
        let mut x = self.root;
        let mut side = Ordering::Equal;

        while !self.node_ref(x, Node::is_sentinel) {
            y = x;
            side = interval.right().cmp(self.node_ref(x, Node::key));
            match side {
                Ordering::Less => x = self.node_ref(x, Node::left),
                Ordering::Greater => x = self.node_ref(x, Node::right),
                Ordering::Equal => return Some(self.node_mut(x, Node::replace_interval(interval))),
            }
        }

        let z = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node::new_leaf(interval, y));
        if self.node_ref(y, Node::is_sentinel) {
            self.root = z;
        } else if matches!(side, Ordering::Less) {
            self.node_mut(y, Node::set_left(z));
        } else {
            self.node_mut(y, Node::set_right(z));
        }

        self.insert_fixup(z);

        self.len = self.len.wrapping_add(1);
        None
    }

    /// Remove the interval whose right bound equals `key`, returning it if present.
    pub(crate) fn remove(&mut self, key: &T) -> Option<Interval<T, V>> {
        let node_idx = self.search_exact(key)?;
        self.remove_inner(node_idx);
        // Swap the node with the last node stored in the vector and update indices
        let mut node = self.nodes.swap_remove(node_idx.index());
        let old = NodeIndex::new(self.nodes.len());
        self.update_idx(old, node_idx);

        Some(node.take_interval())
    }

    /// The node with the smallest right bound that is `>= key`.
    pub(crate) fn ceiling(&self, key: &T) -> Option<NodeIndex> {
        let mut x = self.root;
        let mut candidate = None;
        while !self.node_ref(x, Node::is_sentinel) {
            if self.node_ref(x, Node::key) >= key {
                candidate = Some(x);
                x = self.node_ref(x, Node::left);
            } else {
                x = self.node_ref(x, Node::right);
            }
        }
        candidate
    }

    /// Search for the node whose right bound equals `key`
    fn search_exact(&self, key: &T) -> Option<NodeIndex> {
        let mut x = self.root;
        while !self.node_ref(x, Node::is_sentinel) {
            match key.cmp(self.node_ref(x, Node::key)) {
                Ordering::Less => x = self.node_ref(x, Node::left),
                Ordering::Greater => x = self.node_ref(x, Node::right),
                Ordering::Equal => return Some(x),
            }
        }
        None
    }

    /// Remove a node from the tree.
    fn remove_inner(&mut self, z: NodeIndex) {
        let mut y = z;
        let mut y_orig_color = self.node_ref(y, Node::color);
        let x;
        if self.left_ref(z, Node::is_sentinel) {
            x = self.node_ref(z, Node::right);
            self.transplant(z, x);
        } else if self.right_ref(z, Node::is_sentinel) {
            x = self.node_ref(z, Node::left);
            self.transplant(z, x);
        } else {
            y = self.tree_minimum(self.node_ref(z, Node::right));
            y_orig_color = self.node_ref(y, Node::color);
            x = self.node_ref(y, Node::right);
            if self.node_ref(y, Node::parent) == z {
                self.node_mut(x, Node::set_parent(y));
            } else {
                self.transplant(y, x);
                self.node_mut(y, Node::set_right(self.node_ref(z, Node::right)));
                self.right_mut(y, Node::set_parent(y));
            }
            self.transplant(z, y);
            self.node_mut(y, Node::set_left(self.node_ref(z, Node::left)));
            self.left_mut(y, Node::set_parent(y));
            self.node_mut(y, Node::set_color(self.node_ref(z, Node::color)));
        }

        if matches!(y_orig_color, Color::Black) {
            self.remove_fixup(x);
        }

        self.len = self.len.wrapping_sub(1);
    }

    /// Restore red-black tree properties after an insert.
    fn insert_fixup(&mut self, mut z: NodeIndex) {
        while self.parent_ref(z, Node::is_red) {
            if self.grand_parent_ref(z, Node::is_sentinel) {
                break;
            }
            if self.is_left_child(self.node_ref(z, Node::parent)) {
                let y = self.grand_parent_ref(z, Node::right);
                if self.node_ref(y, Node::is_red) {
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.node_mut(y, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    z = self.parent_ref(z, Node::parent);
                } else {
                    if self.is_right_child(z) {
                        z = self.node_ref(z, Node::parent);
                        self.left_rotate(z);
                    }
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    self.right_rotate(self.parent_ref(z, Node::parent));
                }
            } else {
                let y = self.grand_parent_ref(z, Node::left);
                if self.node_ref(y, Node::is_red) {
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.node_mut(y, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    z = self.parent_ref(z, Node::parent);
                } else {
                    if self.is_left_child(z) {
                        z = self.node_ref(z, Node::parent);
                        self.right_rotate(z);
                    }
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    self.left_rotate(self.parent_ref(z, Node::parent));
                }
            }
        }
        self.node_mut(self.root, Node::set_color(Color::Black));
    }

    /// Restore red-black tree properties after a remove.
    fn remove_fixup(&mut self, mut x: NodeIndex) {
        while x != self.root && self.node_ref(x, Node::is_black) {
            let mut w;
            if self.is_left_child(x) {
                w = self.parent_ref(x, Node::right);
                if self.node_ref(w, Node::is_red) {
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.parent_mut(x, Node::set_color(Color::Red));
                    self.left_rotate(self.node_ref(x, Node::parent));
                    w = self.parent_ref(x, Node::right);
                }
                if self.node_ref(w, Node::is_sentinel) {
                    break;
                }
                if self.left_ref(w, Node::is_black) && self.right_ref(w, Node::is_black) {
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = self.node_ref(x, Node::parent);
                } else {
                    if self.right_ref(w, Node::is_black) {
                        self.left_mut(w, Node::set_color(Color::Black));
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.right_rotate(w);
                        w = self.parent_ref(x, Node::right);
                    }
                    self.node_mut(w, Node::set_color(self.parent_ref(x, Node::color)));
                    self.parent_mut(x, Node::set_color(Color::Black));
                    self.right_mut(w, Node::set_color(Color::Black));
                    self.left_rotate(self.node_ref(x, Node::parent));
                    x = self.root;
                }
            } else {
                w = self.parent_ref(x, Node::left);
                if self.node_ref(w, Node::is_red) {
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.parent_mut(x, Node::set_color(Color::Red));
                    self.right_rotate(self.node_ref(x, Node::parent));
                    w = self.parent_ref(x, Node::left);
                }
                if self.node_ref(w, Node::is_sentinel) {
                    break;
                }
                if self.right_ref(w, Node::is_black) && self.left_ref(w, Node::is_black) {
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = self.node_ref(x, Node::parent);
                } else {
                    if self.left_ref(w, Node::is_black) {
                        self.right_mut(w, Node::set_color(Color::Black));
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.left_rotate(w);
                        w = self.parent_ref(x, Node::left);
                    }
                    self.node_mut(w, Node::set_color(self.parent_ref(x, Node::color)));
                    self.parent_mut(x, Node::set_color(Color::Black));
                    self.left_mut(w, Node::set_color(Color::Black));
                    self.right_rotate(self.node_ref(x, Node::parent));
                    x = self.root;
                }
            }
        }
        self.node_mut(x, Node::set_color(Color::Black));
    }

    /// Binary tree left rotate.
    fn left_rotate(&mut self, x: NodeIndex) {
        if self.right_ref(x, Node::is_sentinel) {
            return;
        }
        let y = self.node_ref(x, Node::right);
        self.node_mut(x, Node::set_right(self.node_ref(y, Node::left)));
        if !self.left_ref(y, Node::is_sentinel) {
            self.left_mut(y, Node::set_parent(x));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_left(x));
    }

    /// Binary tree right rotate.
    fn right_rotate(&mut self, x: NodeIndex) {
        if self.left_ref(x, Node::is_sentinel) {
            return;
        }
        let y = self.node_ref(x, Node::left);
        self.node_mut(x, Node::set_left(self.node_ref(y, Node::right)));
        if !self.right_ref(y, Node::is_sentinel) {
            self.right_mut(y, Node::set_parent(x));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_right(x));
    }

    /// Replace parent during a rotation.
    fn replace_parent(&mut self, x: NodeIndex, y: NodeIndex) {
        self.node_mut(y, Node::set_parent(self.node_ref(x, Node::parent)));
        if self.parent_ref(x, Node::is_sentinel) {
            self.root = y;
        } else if self.is_left_child(x) {
            self.parent_mut(x, Node::set_left(y));
        } else {
            self.parent_mut(x, Node::set_right(y));
        }
        self.node_mut(x, Node::set_parent(y));
    }

    /// Replace one subtree as a child of its parent with another subtree.
    fn transplant(&mut self, u: NodeIndex, v: NodeIndex) {
        if self.parent_ref(u, Node::is_sentinel) {
            self.root = v;
        } else if self.is_left_child(u) {
            self.parent_mut(u, Node::set_left(v));
        } else {
            self.parent_mut(u, Node::set_right(v));
        }
        self.node_mut(v, Node::set_parent(self.node_ref(u, Node::parent)));
    }

    /// Check if a node is a left child of its parent.
    fn is_left_child(&self, node: NodeIndex) -> bool {
        self.parent_ref(node, Node::left) == node
    }

    /// Check if a node is a right child of its parent.
    fn is_right_child(&self, node: NodeIndex) -> bool {
        self.parent_ref(node, Node::right) == node
    }

    /// Relink the node that `swap_remove` moved from slot `old` into slot `new`.
    fn update_idx(&mut self, old: NodeIndex, new: NodeIndex) {
        if self.root == old {
            self.root = new;
        }
        if self.nodes.get(new.index()).is_some() {
            if !self.parent_ref(new, Node::is_sentinel) {
                if self.parent_ref(new, Node::left) == old {
                    self.parent_mut(new, Node::set_left(new));
                } else {
                    self.parent_mut(new, Node::set_right(new));
                }
            }
            self.left_mut(new, Node::set_parent(new));
            self.right_mut(new, Node::set_parent(new));
        }
    }
}

// Convenient methods for reference or mutate current/parent/left/right node
impl<'a, T, V> Tree<T, V> {
    pub(crate) fn node_ref<F, R>(&'a self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    fn node_mut<F, R>(&'a mut self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }

    fn left_ref<F, R>(&'a self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&self.nodes[idx])
    }

    fn right_ref<F, R>(&'a self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&self.nodes[idx])
    }

    fn parent_ref<F, R>(&'a self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V>) -> R,
    {
        let idx = self.nodes[node.index()].parent().index();
        op(&self.nodes[idx])
    }

    fn grand_parent_ref<F, R>(&'a self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V>) -> R,
    {
        let parent_idx = self.nodes[node.index()].parent().index();
        let grand_parent_idx = self.nodes[parent_idx].parent().index();
        op(&self.nodes[grand_parent_idx])
    }

    fn left_mut<F, R>(&'a mut self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&mut self.nodes[idx])
    }

    fn right_mut<F, R>(&'a mut self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&mut self.nodes[idx])
    }

    fn parent_mut<F, R>(&'a mut self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V>) -> R,
    {
        let idx = self.nodes[node.index()].parent().index();
        op(&mut self.nodes[idx])
    }

    fn grand_parent_mut<F, R>(&'a mut self, node: NodeIndex, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V>) -> R,
    {
        let parent_idx = self.nodes[node.index()].parent().index();
        let grand_parent_idx = self.nodes[parent_idx].parent().index();
        op(&mut self.nodes[grand_parent_idx])
    }
}

#[cfg(test)]
mod test {
    use std::collections::{BTreeMap, HashSet};

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    /// Yields intervals whose right bounds never repeat
    struct KeyGenerator {
        rng: StdRng,
        unique: HashSet<i32>,
        limit: i32,
    }

    impl KeyGenerator {
        fn new(seed: [u8; 32]) -> Self {
            const LIMIT: i32 = 10_000;
            Self {
                rng: SeedableRng::from_seed(seed),
                unique: HashSet::new(),
                limit: LIMIT,
            }
        }

        fn next_unique(&mut self) -> Interval<i32, i32> {
            let mut right = self.rng.gen_range(1..self.limit);
            while self.unique.contains(&right) {
                right = self.rng.gen_range(1..self.limit);
            }
            self.unique.insert(right);
            Interval::new(right - 1, right, right * 2)
        }
    }

    impl<V> Tree<i32, V> {
        /// 1. Every node is either red or black.
        /// 2. The root is black.
        /// 3. Every leaf (NIL) is black.
        /// 4. If a node is red, then both its children are black.
        /// 5. For each node, all simple paths from the node to descendant leaves contain the
        /// same number of black nodes.
        fn check_rb_properties(&self) {
            assert!(matches!(
                self.node_ref(self.root, Node::color),
                Color::Black
            ));
            self.check_children_color(self.root);
            self.check_black_height(self.root);
        }

        fn check_children_color(&self, x: NodeIndex) {
            if self.node_ref(x, Node::is_sentinel) {
                return;
            }
            self.check_children_color(self.node_ref(x, Node::left));
            self.check_children_color(self.node_ref(x, Node::right));
            if self.node_ref(x, Node::is_red) {
                assert!(matches!(self.left_ref(x, Node::color), Color::Black));
                assert!(matches!(self.right_ref(x, Node::color), Color::Black));
            }
        }

        fn check_black_height(&self, x: NodeIndex) -> usize {
            if self.node_ref(x, Node::is_sentinel) {
                return 0;
            }
            let lefth = self.check_black_height(self.node_ref(x, Node::left));
            let righth = self.check_black_height(self.node_ref(x, Node::right));
            assert_eq!(lefth, righth);
            if self.node_ref(x, Node::is_black) {
                return lefth + 1;
            }
            lefth
        }

        /// Every live node is reachable from the root and its children point back at it.
        fn check_links(&self) {
            let mut seen = 0;
            let mut stack = vec![self.root];
            while let Some(x) = stack.pop() {
                if self.node_ref(x, Node::is_sentinel) {
                    continue;
                }
                seen += 1;
                for child in [self.node_ref(x, Node::left), self.node_ref(x, Node::right)] {
                    if !self.node_ref(child, Node::is_sentinel) {
                        assert_eq!(self.node_ref(child, Node::parent), x);
                        stack.push(child);
                    }
                }
            }
            assert_eq!(seen, self.len());
            assert_eq!(self.nodes.len(), self.len() + 1);
        }
    }

    fn with_tree_and_generator(test_fn: impl Fn(Tree<i32, i32>, KeyGenerator)) {
        let seeds = vec![[0; 32], [1; 32], [2; 32]];
        for seed in seeds {
            let gen = KeyGenerator::new(seed);
            let tree = Tree::new();
            test_fn(tree, gen);
        }
    }

    #[test]
    fn red_black_tree_properties_is_satisfied() {
        with_tree_and_generator(|mut tree, mut gen| {
            let intervals: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
                .take(1000)
                .collect();
            for i in intervals.clone() {
                assert!(tree.insert(i).is_none());
            }
            tree.check_rb_properties();
            tree.check_links();
            for i in intervals.iter().step_by(2) {
                assert_eq!(tree.remove(i.right()).as_ref(), Some(i));
                tree.check_rb_properties();
                tree.check_links();
            }
            assert_eq!(tree.len(), 500);
        });
    }

    #[test]
    fn tree_len_will_update() {
        with_tree_and_generator(|mut tree, mut gen| {
            let intervals: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
                .take(100)
                .collect();
            for i in intervals.clone() {
                let _ignore = tree.insert(i);
            }
            assert_eq!(tree.len(), 100);
            for i in intervals {
                let _ignore = tree.remove(i.right());
            }
            assert_eq!(tree.len(), 0);
            assert_eq!(tree.first(), None);
            assert_eq!(tree.nodes.len(), 1);
        });
    }

    #[test]
    fn remove_non_exist_key_will_do_nothing() {
        let mut tree = Tree::new();
        let _ignore = tree.insert(Interval::new(1, 3, ()));
        let _ignore = tree.insert(Interval::new(5, 8, ()));
        assert_eq!(tree.remove(&4), None);
        assert_eq!(tree.remove(&1), None);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn insert_with_same_right_bound_overwrites() {
        let mut tree = Tree::new();
        assert_eq!(tree.insert(Interval::new(1, 3, 'a')), None);
        assert_eq!(
            tree.insert(Interval::new(2, 3, 'b')),
            Some(Interval::new(1, 3, 'a'))
        );
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes.len(), 2);
        let stored: Vec<_> = tree.iter().cloned().collect();
        assert_eq!(stored, vec![Interval::new(2, 3, 'b')]);
    }

    #[test]
    fn ceiling_agrees_with_btreemap() {
        with_tree_and_generator(|mut tree, mut gen| {
            let mut model = BTreeMap::new();
            for _ in 0..500 {
                let i = gen.next_unique();
                let _ignore = model.insert(*i.right(), i.clone());
                let _ignore = tree.insert(i);
            }
            for key in -1..=gen.limit + 1 {
                let expect = model.range(key..).next().map(|(_, i)| i);
                let found = tree.ceiling(&key).map(|x| tree.interval(x));
                assert_eq!(found, expect, "ceiling of {key}");
            }
        });
    }

    #[test]
    fn successor_walks_in_key_order() {
        with_tree_and_generator(|mut tree, mut gen| {
            let mut rights: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
                .take(300)
                .map(|i| {
                    let right = *i.right();
                    let _ignore = tree.insert(i);
                    right
                })
                .collect();
            rights.sort_unstable();

            let mut walked = vec![];
            let mut cur = tree.first();
            while let Some(x) = cur {
                walked.push(*tree.interval(x).right());
                cur = tree.successor(x);
            }
            assert_eq!(walked, rights);
            assert_eq!(
                tree.last().map(|x| *tree.interval(x).right()),
                rights.last().copied()
            );

            let iterated: Vec<_> = tree.iter().map(|i| *i.right()).collect();
            assert_eq!(iterated, rights);
        });
    }
}

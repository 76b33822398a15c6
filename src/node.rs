use std::fmt;

use crate::interval::Interval;

/// Position of a node inside the tree arena.
///
/// Index 0 is reserved for the sentinel (the shared black NIL leaf).
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub const SENTINEL: Self = NodeIndex(0);

    #[inline]
    pub fn new(x: usize) -> Self {
        assert!(x < u32::MAX as usize, "interval map is full");
        NodeIndex(x as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeIndex({:?})", self.0)
    }
}

/// Node of the red-black tree
#[derive(Debug, Clone)]
pub struct Node<T, V> {
    /// Left children
    pub left: NodeIndex,
    /// Right children
    pub right: NodeIndex,
    /// Parent
    pub parent: NodeIndex,
    /// Color of the node
    pub color: Color,

    /// Interval of the node, `None` only for the sentinel
    pub interval: Option<Interval<T, V>>,
}

impl<T, V> Node<T, V> {
    /// The black NIL leaf every empty child link points to
    pub fn new_sentinel() -> Self {
        Node {
            left: NodeIndex::SENTINEL,
            right: NodeIndex::SENTINEL,
            parent: NodeIndex::SENTINEL,
            color: Color::Black,
            interval: None,
        }
    }

    /// A fresh red leaf hanging below `parent`
    pub fn new_leaf(interval: Interval<T, V>, parent: NodeIndex) -> Self {
        Node {
            left: NodeIndex::SENTINEL,
            right: NodeIndex::SENTINEL,
            parent,
            color: Color::Red,
            interval: Some(interval),
        }
    }
}

// Convenient getter/setter methods
//
// The getters panic on the sentinel; callers check `is_sentinel` first.
impl<T, V> Node<T, V> {
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn interval(&self) -> &Interval<T, V> {
        self.interval.as_ref().unwrap()
    }

    /// The ordering key, i.e. the right bound
    pub fn key(&self) -> &T {
        self.interval().right()
    }

    pub fn left(&self) -> NodeIndex {
        self.left
    }

    pub fn right(&self) -> NodeIndex {
        self.right
    }

    pub fn parent(&self) -> NodeIndex {
        self.parent
    }

    pub fn is_sentinel(&self) -> bool {
        self.interval.is_none()
    }

    pub fn is_black(&self) -> bool {
        matches!(self.color, Color::Black)
    }

    pub fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    pub fn take_interval(&mut self) -> Interval<T, V> {
        self.interval.take().unwrap()
    }

    pub fn replace_interval(
        interval: Interval<T, V>,
    ) -> impl FnOnce(&mut Node<T, V>) -> Interval<T, V> {
        move |node: &mut Node<T, V>| node.interval.replace(interval).unwrap()
    }

    pub fn set_color(color: Color) -> impl FnOnce(&mut Node<T, V>) {
        move |node: &mut Node<T, V>| {
            node.color = color;
        }
    }

    pub fn set_left(left: NodeIndex) -> impl FnOnce(&mut Node<T, V>) {
        move |node: &mut Node<T, V>| {
            node.left = left;
        }
    }

    pub fn set_right(right: NodeIndex) -> impl FnOnce(&mut Node<T, V>) {
        move |node: &mut Node<T, V>| {
            node.right = right;
        }
    }

    pub fn set_parent(parent: NodeIndex) -> impl FnOnce(&mut Node<T, V>) {
        move |node: &mut Node<T, V>| {
            node.parent = parent;
        }
    }
}

/// The color of the node
#[derive(Debug, Clone, Copy)]
pub enum Color {
    /// Red node
    Red,
    /// Black node
    Black,
}

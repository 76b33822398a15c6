use std::sync::Arc;

use log::{debug, trace};

use crate::error::{EmptyMapError, PutError};
use crate::interval::{Bounds, Interval};
use crate::iter::{Cursor, Iter};
use crate::tree::Tree;

/// A map from keys to the non-overlapping interval that contains them.
///
/// Every stored interval is `(left, right]`, and no two stored intervals overlap.
/// The map is a value. `put` and `delete` consume the map and hand back the
/// changed one; a clone taken beforehand (O(1)) keeps seeing the old contents,
/// because clones share their tree until one of them is changed.
#[derive(Debug)]
pub struct IntervalMap<T, V> {
    /// Tree of intervals keyed by right bound, shared between clones
    tree: Arc<Tree<T, V>>,
}

impl<T, V> IntervalMap<T, V> {
    /// Create an empty `IntervalMap`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Arc::new(Tree::new()),
        }
    }

    /// Return the number of intervals in the map.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Return `true` if the map contains no intervals.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an iterator over the intervals of the map, in ascending order.
    ///
    /// Ordering by right bound and by left bound agree, since stored intervals never overlap.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, V> {
        self.tree.iter()
    }

    /// The interval with the lowest bounds.
    #[inline]
    pub fn first(&self) -> Option<&Interval<T, V>> {
        self.tree.first().map(|x| self.tree.interval(x))
    }

    /// The interval with the highest bounds.
    #[inline]
    pub fn last(&self) -> Option<&Interval<T, V>> {
        self.tree.last().map(|x| self.tree.interval(x))
    }
}

impl<T, V> IntervalMap<T, V>
where
    T: Ord,
{
    /// Return the interval containing `key`, that is the one with `left < key <= right`.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::{Interval, IntervalMap};
    ///
    /// let map = IntervalMap::new()
    ///     .put(0, 100, 'a')
    ///     .and_then(|map| map.put(200, 300, 'b'))
    ///     .unwrap();
    /// assert_eq!(map.get(&55), Some(&Interval::new(0, 100, 'a')));
    /// assert_eq!(map.get(&100), Some(&Interval::new(0, 100, 'a')));
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&150), None);
    /// ```
    #[inline]
    pub fn get(&self, key: &T) -> Option<&Interval<T, V>> {
        self.ceiling(key)
            .map(|cursor| cursor.interval())
            .filter(|interval| interval.contains(key))
    }

    /// Return the value attached to the interval containing `key`.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::IntervalMap;
    ///
    /// let map = IntervalMap::new().put(0, 10, "x").unwrap();
    /// assert_eq!(map.get_value(&5), Some(&"x"));
    /// assert_eq!(map.get_value(&0), None);
    /// ```
    #[inline]
    pub fn get_value(&self, key: &T) -> Option<&V> {
        self.get(key).map(Interval::value)
    }

    /// Return `true` if some stored interval contains `key`.
    #[inline]
    pub fn contains_key(&self, key: &T) -> bool {
        self.get(key).is_some()
    }

    /// Return `true` if both bounds fall inside the same stored interval.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::IntervalMap;
    ///
    /// let map = IntervalMap::new()
    ///     .put(0, 10, ())
    ///     .and_then(|map| map.put(10, 20, ()))
    ///     .unwrap();
    /// assert!(map.contains_bounds((2, 10)));
    /// assert!(!map.contains_bounds((2, 12)));
    /// assert!(!map.contains_bounds((0, 5)));
    /// ```
    pub fn contains_bounds(&self, bounds: impl Bounds<T>) -> bool {
        match (self.get(bounds.left()), self.get(bounds.right())) {
            (Some(low), Some(high)) => std::ptr::eq(low, high),
            _ => false,
        }
    }

    /// Position a cursor on the interval with the smallest right bound `>= key`.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::IntervalMap;
    ///
    /// let map = IntervalMap::new()
    ///     .put(0, 5, ())
    ///     .and_then(|map| map.put(8, 9, ()))
    ///     .unwrap();
    /// let cursor = map.ceiling(&5).unwrap();
    /// assert_eq!(cursor.interval().right(), &5);
    /// let next = cursor.advance().unwrap();
    /// assert_eq!(next.interval().right(), &9);
    /// assert!(next.advance().is_none());
    /// assert!(map.ceiling(&10).is_none());
    /// ```
    #[inline]
    pub fn ceiling(&self, key: &T) -> Option<Cursor<'_, T, V>> {
        self.tree
            .ceiling(key)
            .map(|node| Cursor::new(&self.tree, node))
    }

    /// Return `true` if there is no gap between consecutive intervals.
    ///
    /// Maps with zero or one interval are contiguous.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::IntervalMap;
    ///
    /// let map = IntervalMap::new().put(0, 10, ()).unwrap();
    /// assert!(map.clone().put(10, 20, ()).unwrap().is_contiguous());
    /// assert!(!map.put(11, 20, ()).unwrap().is_contiguous());
    /// ```
    pub fn is_contiguous(&self) -> bool {
        self.iter()
            .zip(self.iter().skip(1))
            .all(|(prev, next)| prev.right() == next.left())
    }

    /// The interval covering every stored interval: the lowest left bound to the
    /// highest right bound. It need not be stored itself.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyMapError`] when the map holds no intervals.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::{EmptyMapError, Interval, IntervalMap};
    ///
    /// let map = IntervalMap::new()
    ///     .put(5, 10, 'a')
    ///     .and_then(|map| map.put(20, 30, 'b'))
    ///     .unwrap();
    /// assert_eq!(map.range(), Ok(Interval::new(5, 30, ())));
    /// assert_eq!(IntervalMap::<i32, char>::new().range(), Err(EmptyMapError));
    /// ```
    pub fn range(&self) -> Result<Interval<T, ()>, EmptyMapError>
    where
        T: Clone,
    {
        let (first, last) = self.first().zip(self.last()).ok_or(EmptyMapError)?;
        Ok(Interval::new_unchecked(
            first.left().clone(),
            last.right().clone(),
            (),
        ))
    }

    /// The stored interval that could overlap an interval starting at `left`.
    ///
    /// An interval ending exactly at `left` only touches it, so the next one is the candidate.
    fn overlap_candidate(&self, left: &T) -> Option<&Interval<T, V>> {
        let cursor = self.ceiling(left)?;
        if cursor.interval().right() == left {
            cursor.advance().map(|next| next.interval())
        } else {
            Some(cursor.interval())
        }
    }
}

impl<T, V> IntervalMap<T, V>
where
    T: Ord + Clone,
    V: Clone,
{
    /// Return the map with `(left, right]` added, `value` attached.
    ///
    /// The map is consumed and its tree reused in place, so chained puts cost
    /// O(log n) each. Clone first (O(1)) to keep the original; the clone and the
    /// result then stop sharing a tree.
    ///
    /// # Errors
    ///
    /// Returns [`PutError::InvalidInterval`] when `left >= right`, and
    /// [`PutError::OverlappingIntervals`] when the interval shares keys with a stored one.
    /// Touching at a bound is not an overlap.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::{Interval, IntervalMap, PutError};
    ///
    /// let map = IntervalMap::new().put(0, 5, 'a').unwrap();
    /// let map = map.put(5, 10, 'b').unwrap();
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(
    ///     map.clone().put(9, 12, 'c'),
    ///     Err(PutError::OverlappingIntervals {
    ///         requested: Interval::new(9, 12, 'c'),
    ///         existing: Interval::new(5, 10, 'b'),
    ///     })
    /// );
    /// assert_eq!(
    ///     map.put(3, 3, 'd'),
    ///     Err(PutError::InvalidInterval { left: 3, right: 3 })
    /// );
    /// ```
    #[inline]
    pub fn put(mut self, left: T, right: T, value: V) -> Result<Self, PutError<T, V>> {
        self.insert(left, right, value)?;
        Ok(self)
    }

    /// Return the map with `interval` added.
    ///
    /// # Errors
    ///
    /// Returns [`PutError::OverlappingIntervals`] when the interval shares keys with a stored one.
    #[inline]
    pub fn put_interval(mut self, interval: Interval<T, V>) -> Result<Self, PutError<T, V>> {
        self.insert_interval(interval)?;
        Ok(self)
    }

    /// Add `(left, right]` in place. On error the map is left exactly as it was.
    ///
    /// Copies the tree first only when it is shared with a clone.
    ///
    /// # Errors
    ///
    /// Same as [`IntervalMap::put`].
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::IntervalMap;
    ///
    /// let mut map = IntervalMap::new();
    /// map.insert(0, 10, 'a').unwrap();
    /// assert!(map.insert(5, 15, 'b').is_err());
    /// assert_eq!(map.len(), 1);
    /// ```
    #[inline]
    pub fn insert(&mut self, left: T, right: T, value: V) -> Result<(), PutError<T, V>> {
        let interval = Interval::try_new(left, right, value).inspect_err(|_| {
            debug!("rejected interval whose left bound is not below its right bound");
        })?;
        self.insert_interval(interval)
    }

    /// Add `interval` in place. On error the map is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`PutError::OverlappingIntervals`] when the interval shares keys with a stored one.
    pub fn insert_interval(&mut self, interval: Interval<T, V>) -> Result<(), PutError<T, V>> {
        if let Some(existing) = self
            .overlap_candidate(interval.left())
            .filter(|candidate| candidate.overlaps(&interval))
        {
            debug!("rejected interval overlapping a stored interval");
            return Err(PutError::OverlappingIntervals {
                existing: existing.clone(),
                requested: interval,
            });
        }
        let _ignore = Arc::make_mut(&mut self.tree).insert(interval);
        trace!("admitted interval, map now holds {}", self.len());
        Ok(())
    }

    /// Build a map from intervals, failing on the first one that overlaps an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`PutError::OverlappingIntervals`] for the first conflicting interval.
    pub fn try_from_iter<I>(intervals: I) -> Result<Self, PutError<T, V>>
    where
        I: IntoIterator<Item = Interval<T, V>>,
    {
        let mut map = Self::new();
        for interval in intervals {
            map.insert_interval(interval)?;
        }
        Ok(map)
    }

    /// Return the map with every key in `(left, right]` of `bounds` removed.
    ///
    /// Stored intervals cut by the bounds are shrunk or split into the parts left
    /// outside; remainders keep the value of the interval they came from and are not
    /// merged with their neighbours. Bounds with `left >= right` remove nothing.
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::{Interval, IntervalMap};
    ///
    /// let map = IntervalMap::new().put(0, 100, 'a').unwrap();
    /// let map = map.delete((30, 60));
    /// assert_eq!(
    ///     map.to_vec(),
    ///     vec![Interval::new(0, 30, 'a'), Interval::new(60, 100, 'a')]
    /// );
    /// assert!(!map.contains_key(&45));
    /// assert!(map.contains_key(&30));
    /// ```
    #[must_use]
    pub fn delete(mut self, bounds: impl Bounds<T>) -> Self {
        self.remove(bounds);
        self
    }

    /// Remove every key in `(left, right]` of `bounds` in place, like [`IntervalMap::delete`].
    ///
    /// Copies the tree first only when something changes and it is shared with a clone.
    pub fn remove(&mut self, bounds: impl Bounds<T>) {
        let (left, right) = (bounds.left(), bounds.right());
        if left >= right {
            debug!("ignored delete whose left bound is not below its right bound");
            return;
        }

        let mut removed = Vec::new();
        let mut remainders = Vec::new();
        let mut cursor = self.ceiling(left);
        while let Some(at) = cursor {
            let stored = at.interval();
            let relation = Relation::between(left, right, stored);
            if matches!(relation, Relation::Before) {
                // Later intervals start even further right
                break;
            }
            if let Some(kept) = relation.remainders(left, right, stored) {
                removed.push(stored.right().clone());
                remainders.extend(kept.into_iter().flatten());
            }
            cursor = at.advance();
        }

        if removed.is_empty() {
            return;
        }
        trace!(
            "delete removed {} intervals and kept {} remainders",
            removed.len(),
            remainders.len()
        );

        let tree = Arc::make_mut(&mut self.tree);
        for key in &removed {
            let _ignore = tree.remove(key);
        }
        for interval in remainders {
            let _ignore = tree.insert(interval);
        }
    }

    /// Collect the intervals of the map in ascending order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Interval<T, V>> {
        self.iter().cloned().collect()
    }
}

/// Where deletion bounds `(left, right]` sit relative to one stored interval `I`.
///
/// Every pair of non-empty intervals falls in exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    /// `right <= I.left`
    Before,
    /// `I.right <= left`
    After,
    /// `left <= I.left` and `I.right <= right`
    Covers,
    /// `I.left < left` and `right < I.right`
    Inside,
    /// `left <= I.left` and `right < I.right`, the head of `I` goes
    ClipsHead,
    /// `I.left < left` and `I.right <= right`, the tail of `I` goes
    ClipsTail,
}

impl Relation {
    fn between<T: Ord, V>(left: &T, right: &T, stored: &Interval<T, V>) -> Self {
        if right <= stored.left() {
            return Relation::Before;
        }
        if stored.right() <= left {
            return Relation::After;
        }
        match (left <= stored.left(), stored.right() <= right) {
            (true, true) => Relation::Covers,
            (false, false) => Relation::Inside,
            (true, false) => Relation::ClipsHead,
            (false, true) => Relation::ClipsTail,
        }
    }

    /// What replaces `stored`, or `None` when it stays as it is.
    fn remainders<T: Clone, V: Clone>(
        self,
        left: &T,
        right: &T,
        stored: &Interval<T, V>,
    ) -> Option<[Option<Interval<T, V>>; 2]> {
        let head = || {
            Interval::new_unchecked(stored.left().clone(), left.clone(), stored.value().clone())
        };
        let tail = || {
            Interval::new_unchecked(right.clone(), stored.right().clone(), stored.value().clone())
        };
        match self {
            Relation::Before | Relation::After => None,
            Relation::Covers => Some([None, None]),
            Relation::Inside => Some([Some(head()), Some(tail())]),
            Relation::ClipsHead => Some([None, Some(tail())]),
            Relation::ClipsTail => Some([Some(head()), None]),
        }
    }
}

impl<T, V> Clone for IntervalMap<T, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
        }
    }
}

impl<T, V> Default for IntervalMap<T, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq, V: PartialEq> PartialEq for IntervalMap<T, V> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
            || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl<T: Eq, V: Eq> Eq for IntervalMap<T, V> {}

impl<'a, T, V> IntoIterator for &'a IntervalMap<T, V> {
    type Item = &'a Interval<T, V>;
    type IntoIter = Iter<'a, T, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;

    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::IntervalMap;
    use crate::error::PutError;
    use crate::interval::Interval;

    impl<T, V> Serialize for IntervalMap<T, V>
    where
        T: Serialize,
        V: Serialize,
    {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.collect_seq(self.iter())
        }
    }

    impl<'de, T, V> Deserialize<'de> for IntervalMap<T, V>
    where
        T: Ord + Clone + fmt::Display + Deserialize<'de>,
        V: Clone + Deserialize<'de>,
    {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let intervals = Vec::<Interval<T, V>>::deserialize(deserializer)?;
            IntervalMap::try_from_iter(intervals).map_err(|err| match err {
                PutError::OverlappingIntervals {
                    requested,
                    existing,
                } => de::Error::custom(format_args!(
                    "interval {requested} overlaps existing interval {existing}"
                )),
                PutError::InvalidInterval { left, right } => de::Error::custom(format_args!(
                    "invalid interval: left bound {left} is not below right bound {right}"
                )),
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn relation(left: i32, right: i32, stored: (i32, i32)) -> Relation {
        Relation::between(&left, &right, &Interval::new(stored.0, stored.1, ()))
    }

    #[test]
    fn relation_covers_every_geometry() {
        assert_eq!(relation(0, 5, (5, 10)), Relation::Before);
        assert_eq!(relation(0, 4, (5, 10)), Relation::Before);
        assert_eq!(relation(10, 15, (5, 10)), Relation::After);
        assert_eq!(relation(5, 10, (5, 10)), Relation::Covers);
        assert_eq!(relation(0, 20, (5, 10)), Relation::Covers);
        assert_eq!(relation(6, 9, (5, 10)), Relation::Inside);
        assert_eq!(relation(5, 9, (5, 10)), Relation::ClipsHead);
        assert_eq!(relation(0, 7, (5, 10)), Relation::ClipsHead);
        assert_eq!(relation(6, 10, (5, 10)), Relation::ClipsTail);
        assert_eq!(relation(7, 30, (5, 10)), Relation::ClipsTail);
    }

    #[test]
    fn relation_remainders_stay_inside_stored_interval() {
        let stored = Interval::new(5, 10, 'v');
        let kept = Relation::Inside.remainders(&6, &9, &stored);
        assert_eq!(
            kept,
            Some([Some(Interval::new(5, 6, 'v')), Some(Interval::new(9, 10, 'v'))])
        );
        assert_eq!(Relation::Before.remainders(&0, &5, &stored), None);
        assert_eq!(Relation::Covers.remainders(&0, &50, &stored), Some([None, None]));
        assert_eq!(
            Relation::ClipsHead.remainders(&0, &7, &stored),
            Some([None, Some(Interval::new(7, 10, 'v'))])
        );
        assert_eq!(
            Relation::ClipsTail.remainders(&8, &70, &stored),
            Some([Some(Interval::new(5, 8, 'v')), None])
        );
    }

    #[test]
    fn chained_puts_reuse_one_tree() {
        let mut map = IntervalMap::new();
        let tree = Arc::as_ptr(&map.tree);
        for i in 0..64 {
            map = map.put(i * 10, i * 10 + 5, i).unwrap();
            assert_eq!(Arc::strong_count(&map.tree), 1);
            assert_eq!(Arc::as_ptr(&map.tree), tree);
        }
        map = map.delete((3, 13)).delete((100, 300));
        assert_eq!(Arc::as_ptr(&map.tree), tree);
        assert!(map.clone().put(1, 2, 0).is_err());
        assert_eq!(Arc::strong_count(&map.tree), 1);
        assert_eq!(map.len(), 44);
    }

    #[test]
    fn put_on_a_clone_leaves_the_original_alone() {
        let base = IntervalMap::new().put(0, 10, 'a').unwrap();
        let shared = Arc::as_ptr(&base.tree);
        let grown = base.clone().put(10, 20, 'b').unwrap();
        assert_eq!(Arc::as_ptr(&base.tree), shared);
        assert_ne!(Arc::as_ptr(&grown.tree), shared);
        assert_eq!(base.to_vec(), vec![Interval::new(0, 10, 'a')]);
        assert_eq!(grown.len(), 2);

        let mut in_place = base.clone();
        assert!(in_place.insert(5, 15, 'c').is_err());
        assert_eq!(Arc::as_ptr(&in_place.tree), shared);
        in_place.remove((0, 5));
        assert_eq!(in_place.to_vec(), vec![Interval::new(5, 10, 'a')]);
        assert_eq!(base.to_vec(), vec![Interval::new(0, 10, 'a')]);
    }
}

//! The `Interval` stored in `IntervalMap` and represents the interval (left, right]
//!
//! An interval is left-open and right-closed: a key `k` falls inside it when
//! `left < k <= right`. Two intervals that only share a boundary, such as (0, 5]
//! and (5, 10], do not overlap.
//!
//! Intervals are immutable. Splitting or trimming an interval always builds a new one.

use std::fmt;
use std::ops::Range;

use crate::error::PutError;

/// The interval stored in `IntervalMap` represents (left, right] with an attached value
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Interval<T, V = ()> {
    /// Left (exclusive) bound
    left: T,
    /// Right (inclusive) bound
    right: T,
    /// Attached value
    value: V,
}

impl<T: Ord, V> Interval<T, V> {
    /// Create a new `Interval`
    ///
    /// # Panics
    ///
    /// This method panics when left >= right
    #[inline]
    pub fn new(left: T, right: T, value: V) -> Self {
        assert!(left < right, "invalid range");
        Self { left, right, value }
    }

    /// Create a new `Interval`, returning [`PutError::InvalidInterval`] when left >= right
    ///
    /// # Example
    /// ```rust
    /// use rb_interval_bucket::{Interval, PutError};
    ///
    /// assert!(Interval::try_new(1, 2, ()).is_ok());
    /// assert_eq!(
    ///     Interval::try_new(2, 2, ()),
    ///     Err(PutError::InvalidInterval { left: 2, right: 2 })
    /// );
    /// ```
    #[inline]
    pub fn try_new(left: T, right: T, value: V) -> Result<Self, PutError<T, V>> {
        if left < right {
            Ok(Self { left, right, value })
        } else {
            Err(PutError::InvalidInterval { left, right })
        }
    }

    /// Checks if the key lies inside (left, right]
    #[inline]
    pub fn contains(&self, key: &T) -> bool {
        &self.left < key && key <= &self.right
    }

    /// Checks if self overlaps with other interval
    ///
    /// Intervals touching at a shared bound are disjoint.
    #[inline]
    pub fn overlaps<U>(&self, other: &Interval<T, U>) -> bool {
        !(self.right <= other.left || other.right <= self.left)
    }
}

impl<T, V> Interval<T, V> {
    /// Left (exclusive) bound
    #[inline]
    pub fn left(&self) -> &T {
        &self.left
    }

    /// Right (inclusive) bound
    #[inline]
    pub fn right(&self) -> &T {
        &self.right
    }

    /// The attached value
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Decompose into `(left, right, value)`
    #[inline]
    pub fn into_parts(self) -> (T, T, V) {
        (self.left, self.right, self.value)
    }

    /// Builds an interval whose bounds were already checked by the caller.
    pub(crate) fn new_unchecked(left: T, right: T, value: V) -> Self {
        Self { left, right, value }
    }
}

impl<T: fmt::Display, V> fmt::Display for Interval<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.left, self.right)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, V> serde::Deserialize<'de> for Interval<T, V>
where
    T: Ord + serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Repr<T, V> {
            left: T,
            right: T,
            value: V,
        }

        let Repr { left, right, value } =
            <Repr<T, V> as serde::Deserialize>::deserialize(deserializer)?;
        if left < right {
            Ok(Self { left, right, value })
        } else {
            Err(serde::de::Error::custom("invalid range"))
        }
    }
}

/// Anything that names a pair of bounds `(left, right]`.
///
/// Used by [`IntervalMap::delete`](crate::IntervalMap::delete) and
/// [`IntervalMap::contains_bounds`](crate::IntervalMap::contains_bounds), which accept
/// a tuple, a `Range` or a stored `Interval` alike.
pub trait Bounds<T> {
    /// Left (exclusive) bound
    fn left(&self) -> &T;
    /// Right (inclusive) bound
    fn right(&self) -> &T;
}

impl<T> Bounds<T> for (T, T) {
    #[inline]
    fn left(&self) -> &T {
        &self.0
    }

    #[inline]
    fn right(&self) -> &T {
        &self.1
    }
}

impl<T> Bounds<T> for Range<T> {
    #[inline]
    fn left(&self) -> &T {
        &self.start
    }

    #[inline]
    fn right(&self) -> &T {
        &self.end
    }
}

impl<T, V> Bounds<T> for Interval<T, V> {
    #[inline]
    fn left(&self) -> &T {
        &self.left
    }

    #[inline]
    fn right(&self) -> &T {
        &self.right
    }
}

impl<T, B: Bounds<T>> Bounds<T> for &B {
    #[inline]
    fn left(&self) -> &T {
        (**self).left()
    }

    #[inline]
    fn right(&self) -> &T {
        (**self).right()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[should_panic(expected = "invalid range")]
    fn invalid_range_should_panic() {
        let _interval = Interval::new(3, 1, ());
    }

    #[test]
    fn contains_is_left_open_right_closed() {
        let interval = Interval::new(0, 10, 'a');
        assert!(!interval.contains(&0));
        assert!(interval.contains(&1));
        assert!(interval.contains(&10));
        assert!(!interval.contains(&11));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = Interval::new(0, 5, ());
        let b = Interval::new(5, 10, ());
        let c = Interval::new(4, 6, ());
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn display_uses_half_open_notation() {
        assert_eq!(Interval::new(1, 4, "x").to_string(), "(1, 4]");
    }

    #[test]
    fn bounds_accept_tuples_ranges_and_intervals() {
        let interval = Interval::new(2, 9, ());
        assert_eq!(Bounds::left(&(2, 9)), &2);
        assert_eq!(Bounds::right(&(2..9)), &9);
        assert_eq!(Bounds::left(&interval), &2);
        assert_eq!(Bounds::right(&&interval), &9);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_rejects_inverted_bounds() {
        let ok: Interval<i32, char> =
            serde_json::from_str(r#"{"left":1,"right":3,"value":"a"}"#).unwrap();
        assert_eq!(ok, Interval::new(1, 3, 'a'));
        let err =
            serde_json::from_str::<Interval<i32, char>>(r#"{"left":3,"right":3,"value":"a"}"#);
        assert!(err.is_err());
    }
}

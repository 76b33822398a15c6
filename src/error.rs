use thiserror::Error as ThisError;

use crate::interval::Interval;

/// Reasons a requested interval was not admitted into an `IntervalMap`.
///
/// The map the request was made against is always left untouched.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PutError<T, V> {
    /// The requested bounds do not satisfy `left < right`.
    #[error("invalid interval: left bound {left:?} is not below right bound {right:?}")]
    InvalidInterval { left: T, right: T },

    /// The requested interval shares keys with a stored one.
    /// `requested` hands the rejected value back to the caller.
    #[error("interval {requested} overlaps existing interval {existing}")]
    OverlappingIntervals {
        requested: Interval<T, V>,
        existing: Interval<T, V>,
    },
}

/// Returned by aggregate queries that have no meaning for a map without intervals.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("interval map is empty")]
pub struct EmptyMapError;

//! `rb_interval_bucket` maps any ordered key to the interval that contains it.
//!
//! Intervals are left-open and right-closed, `(left, right]`, and the intervals
//! stored in one map never overlap, so every key falls into at most one of them.
//! This makes the map a bucketing index: put a few non-overlapping ranges in, then
//! ask which range (and which attached value) a key belongs to.
//!
//! Intervals are kept in a red-black tree ordered by their right bound. A lookup is a
//! single ceiling search, and so is the overlap check done on every insertion. The
//! tree uses arrays to simulate pointers for managing the parent-child references,
//! so the whole structure is `Send` and `Sync` whenever the bounds and values are.
//!
//! `IntervalMap` is a value. `put` and `delete` consume the map and return the
//! changed one, reusing its tree in place. Clones are O(1) and share the tree until
//! one side changes it, so a clone taken before a change keeps the old contents.
//!
//! # Example
//!
//! ```rust
//! use rb_interval_bucket::{Interval, IntervalMap};
//!
//! let map = IntervalMap::new()
//!     .put(0, 100, "low")
//!     .and_then(|map| map.put(200, 300, "high"))
//!     .unwrap();
//! assert_eq!(map.get_value(&55), Some(&"low"));
//! assert_eq!(map.get_value(&150), None);
//!
//! let cut = map.clone().delete((30, 60));
//! assert_eq!(cut.get(&45), None);
//! assert_eq!(cut.get(&70), Some(&Interval::new(60, 100, "low")));
//! assert_eq!(map.get_value(&45), Some(&"low"));
//! ```
//!

mod error;
mod interval;
mod intervalmap;
mod iter;
mod node;
mod tree;


pub use error::{EmptyMapError, PutError};
pub use interval::{Bounds, Interval};
pub use intervalmap::IntervalMap;
pub use iter::{Cursor, Iter};

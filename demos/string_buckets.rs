use std::cmp;

use rb_interval_bucket::{IntervalMap, PutError};

/// A string key extended with the two ends of the key space
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringAffine {
    /// Below every string
    Min,
    /// String
    String(String),
    /// Above every string
    Unbounded,
}

impl StringAffine {
    pub fn new_key(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl PartialOrd for StringAffine {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StringAffine {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (self, other) {
            (StringAffine::Min, StringAffine::Min) => cmp::Ordering::Equal,
            (StringAffine::Min, _) => cmp::Ordering::Less,
            (_, StringAffine::Min) => cmp::Ordering::Greater,
            (StringAffine::String(x), StringAffine::String(y)) => x.cmp(y),
            (StringAffine::String(_), StringAffine::Unbounded) => cmp::Ordering::Less,
            (StringAffine::Unbounded, StringAffine::String(_)) => cmp::Ordering::Greater,
            (StringAffine::Unbounded, StringAffine::Unbounded) => cmp::Ordering::Equal,
        }
    }
}

fn main() -> Result<(), PutError<StringAffine, &'static str>> {
    // Three shards covering the whole key space: (Min, "g"], ("g", "p"], ("p", Unbounded]
    let shards = IntervalMap::new()
        .put(StringAffine::Min, StringAffine::new_key("g"), "shard-0")?
        .put(StringAffine::new_key("g"), StringAffine::new_key("p"), "shard-1")?
        .put(StringAffine::new_key("p"), StringAffine::Unbounded, "shard-2")?;
    assert!(shards.is_contiguous());

    for key in ["apple", "g", "kiwi", "zebra"] {
        let shard = shards.get_value(&StringAffine::new_key(key));
        println!("{key:>6} -> {shard:?}");
    }
    assert_eq!(
        shards.get_value(&StringAffine::new_key("kiwi")),
        Some(&"shard-1")
    );

    // Draining ("k", "m"] out of shard-1 leaves a hole that no shard serves
    let drained = shards.delete((StringAffine::new_key("k"), StringAffine::new_key("m")));
    assert!(!drained.is_contiguous());
    assert_eq!(drained.get_value(&StringAffine::new_key("kiwi")), None);
    assert_eq!(drained.len(), 4);

    let overlap = drained.put(
        StringAffine::new_key("a"),
        StringAffine::new_key("b"),
        "shard-3",
    );
    assert!(matches!(overlap, Err(PutError::OverlappingIntervals { .. })));
    Ok(())
}

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::catalog::{Vehicle, rating_key};

/// Rank ordinal -> vehicles at that rank, only for ranks present in the input.
pub type RankBuckets<'a> = BTreeMap<u8, Vec<&'a Vehicle>>;

pub fn partition_by_rank<'a>(vehicles: &[&'a Vehicle]) -> RankBuckets<'a> {
    let mut buckets: RankBuckets<'a> = BTreeMap::new();
    for vehicle in vehicles {
        buckets
            .entry(vehicle.rank_ordinal())
            .or_default()
            .push(*vehicle);
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| compare_in_bucket(a, b));
    }
    buckets
}

/// Class, then rating step, then name, then id.
pub(crate) fn compare_in_bucket(a: &Vehicle, b: &Vehicle) -> Ordering {
    a.class
        .cmp(&b.class)
        .then_with(|| rating_key(&a.rating).cmp(&rating_key(&b.rating)))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

//! Statistics Reducer: named counts over the full, unfiltered collection.

use crate::resource::{Resource, StatusKind};
use std::collections::BTreeMap;

/// Per-status counts. Every status of the enumeration is present, zero or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusCounts<S: StatusKind> {
    pub total: usize,
    counts: BTreeMap<S, usize>,
}

impl<S: StatusKind> StatusCounts<S> {
    pub fn get(&self, status: S) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// `(status, count)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (S, usize)> + '_ {
        S::ALL.iter().map(move |s| (*s, self.get(*s)))
    }

    /// Sum of the per-status counts; equals `total` because statuses are exhaustive.
    pub fn sum(&self) -> usize {
        self.counts.values().sum()
    }
}

pub fn count_by_status<R: Resource>(records: &[R]) -> StatusCounts<R::Status> {
    let mut counts: BTreeMap<R::Status, usize> =
        <R::Status as StatusKind>::ALL.iter().map(|s| (*s, 0)).collect();
    for record in records {
        *counts.entry(record.status()).or_insert(0) += 1;
    }

    StatusCounts {
        total: records.len(),
        counts,
    }
}

/// Tally the values of another categorical field, as they occur.
///
/// Records with no value for `selector` are not counted.
pub fn count_by<R: Resource>(records: &[R], selector: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in records.iter().filter_map(|r| r.selector_value(selector)) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

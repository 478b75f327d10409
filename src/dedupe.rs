//! Order-preserving deduplication of extracted records

use std::collections::HashSet;
use std::hash::Hash;

use crate::records::{CompanyRecord, ListingRecord};

/// Records with a deduplication identity
pub trait Identity {
    /// Key type compared across records
    type Key<'a>: Eq + Hash
    where
        Self: 'a;

    /// Identity of this record
    fn identity(&self) -> Self::Key<'_>;
}

impl Identity for ListingRecord {
    type Key<'a> = (&'a str, &'a str);

    fn identity(&self) -> Self::Key<'_> {
        (self.title.as_str(), self.url.as_str())
    }
}

impl Identity for CompanyRecord {
    type Key<'a> = &'a str;

    fn identity(&self) -> Self::Key<'_> {
        self.name.as_str()
    }
}

/// Keep the first record of every identity, in input order
pub fn dedupe<T: Identity>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(records.len());
    let keep: Vec<bool> = records
        .iter()
        .map(|record| seen.insert(record.identity()))
        .collect();
    drop(seen);

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}

/// Keep the first item of every key, in input order
pub fn dedupe_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

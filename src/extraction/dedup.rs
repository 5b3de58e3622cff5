//! Duplicate tracking for accepted record identifiers.

use std::collections::HashSet;

use crate::domain::ProductRecord;

/// O(1) membership store of record ids already accepted into the collection.
///
/// Mutated only by the orchestrator task; the parser receives a shared
/// reference for its early-exit duplicate check.
#[derive(Debug, Default)]
pub struct DedupStore {
    seen: HashSet<String>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a previously persisted record collection.
    pub fn seed<'a>(&mut self, records: impl IntoIterator<Item = &'a ProductRecord>) {
        self.seen.extend(records.into_iter().map(|r| r.id.clone()));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record an accepted id. Returns `false` if the id was already present.
    pub fn insert(&mut self, id: String) -> bool {
        self.seen.insert(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

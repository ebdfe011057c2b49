//! The in-memory jar of cookies believed to apply to the active context.
//!
//! Owned exclusively by the reconciliation engine; all mutation flows
//! through [`Jar::reload`], [`Jar::upsert`] and [`Jar::remove`]. Consumers
//! only ever see [`Jar::snapshot`] copies.

use crate::cookies::identity::CookieId;
use crate::cookies::record::CookieRecord;
use std::collections::HashMap;

/// Whether an upsert created a new entry or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Mapping from cookie identity to the record last observed for it.
///
/// Insertion order is irrelevant; display ordering is produced by
/// [`Jar::snapshot`]. A plain `HashMap` suffices because the jar is only
/// touched from the reconciler's single logical thread of execution.
#[derive(Debug, Default)]
pub struct Jar {
    entries: HashMap<CookieId, CookieRecord>,
    // Monotonic insertion stamp per entry, used as the snapshot tie-breaker
    // so equal names keep their arrival order across re-sorts.
    arrival: HashMap<CookieId, u64>,
    next_stamp: u64,
}

impl Jar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire jar content after a context transition or an
    /// explicit refresh. Later duplicates of the same identity win.
    pub fn reload(&mut self, records: impl IntoIterator<Item = CookieRecord>) {
        self.entries.clear();
        self.arrival.clear();
        self.next_stamp = 0;
        for record in records {
            self.upsert(record);
        }
    }

    /// Insert or replace the entry at the record's identity.
    pub fn upsert(&mut self, record: CookieRecord) -> UpsertOutcome {
        let id = CookieId::of(&record);
        if self.entries.insert(id, record).is_some() {
            UpsertOutcome::Updated
        } else {
            self.arrival.insert(id, self.next_stamp);
            self.next_stamp += 1;
            UpsertOutcome::Inserted
        }
    }

    /// Delete the entry if present. Returns whether anything was removed;
    /// an absent identity is a no-op, not an error.
    pub fn remove(&mut self, id: CookieId) -> bool {
        self.arrival.remove(&id);
        self.entries.remove(&id).is_some()
    }

    pub fn get(&self, id: CookieId) -> Option<&CookieRecord> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: CookieId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordered copy for display: case-insensitive by name, ties broken by
    /// arrival order so repeated snapshots are stable.
    pub fn snapshot(&self) -> Vec<CookieRecord> {
        let mut ids: Vec<CookieId> = self.entries.keys().copied().collect();
        ids.sort_by_key(|id| self.arrival.get(id).copied().unwrap_or(u64::MAX));

        let mut records: Vec<CookieRecord> = ids
            .into_iter()
            .filter_map(|id| self.entries.get(&id).cloned())
            .collect();
        // Stable sort: equal names keep the arrival ordering established above.
        records.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        records
    }
}

//! Unbounded in-process ledger store.
//!
//! Records live until the process exits. Per-key atomicity comes from the
//! DashMap shard lock held by the entry guard.

use super::{LedgerStore, ThreatRecord};
use dashmap::DashMap;

/// DashMap-backed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, ThreatRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn get(&self, identity: &str) -> Option<ThreatRecord> {
        self.records.get(identity).map(|r| r.value().clone())
    }

    fn upsert(&self, identity: &str, apply: &mut dyn FnMut(&mut ThreatRecord)) -> ThreatRecord {
        let mut record = self
            .records
            .entry(identity.to_string())
            .or_insert_with(|| ThreatRecord::new(identity));
        apply(record.value_mut());
        record.value().clone()
    }

    fn modify(
        &self,
        identity: &str,
        apply: &mut dyn FnMut(&mut ThreatRecord),
    ) -> Option<ThreatRecord> {
        let mut record = self.records.get_mut(identity)?;
        apply(record.value_mut());
        Some(record.value().clone())
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

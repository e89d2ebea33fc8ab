//! Bounded ledger store with idle expiry.
//!
//! Clients that stay quiet longer than the idle TTL are forgotten, and the
//! least recently used clients are evicted once capacity is reached. Per-key
//! atomicity comes from moka's compute API.

use super::{LedgerStore, ThreatRecord};
use moka::ops::compute::Op;
use moka::sync::Cache;
use std::time::Duration;

/// Moka-backed store.
pub struct ExpiringStore {
    records: Cache<String, ThreatRecord>,
}

impl ExpiringStore {
    /// Create a store holding at most `max_clients` records.
    pub fn new(max_clients: u64, idle_ttl: Duration) -> Self {
        let records = Cache::builder()
            .name("threat-ledger")
            .max_capacity(max_clients)
            .time_to_idle(idle_ttl)
            .build();

        Self { records }
    }
}

impl LedgerStore for ExpiringStore {
    fn get(&self, identity: &str) -> Option<ThreatRecord> {
        self.records.get(identity)
    }

    fn upsert(&self, identity: &str, apply: &mut dyn FnMut(&mut ThreatRecord)) -> ThreatRecord {
        let mut updated = None;
        self.records
            .entry_by_ref(identity)
            .and_compute_with(|existing| {
                let mut record = existing
                    .map(|entry| entry.into_value())
                    .unwrap_or_else(|| ThreatRecord::new(identity));
                apply(&mut record);
                updated = Some(record.clone());
                Op::Put(record)
            });
        updated.unwrap_or_else(|| ThreatRecord::new(identity))
    }

    fn modify(
        &self,
        identity: &str,
        apply: &mut dyn FnMut(&mut ThreatRecord),
    ) -> Option<ThreatRecord> {
        let mut updated = None;
        self.records
            .entry_by_ref(identity)
            .and_compute_with(|existing| match existing {
                Some(entry) => {
                    let mut record = entry.into_value();
                    apply(&mut record);
                    updated = Some(record.clone());
                    Op::Put(record)
                }
                None => Op::Nop,
            });
        updated
    }

    fn len(&self) -> usize {
        self.records.run_pending_tasks();
        self.records.entry_count() as usize
    }

    fn name(&self) -> &'static str {
        "expiring"
    }
}

//! Per-client threat ledger.
//!
//! Maps a client identity to an accumulated risk record. The ledger owns a
//! [`LedgerStore`] backend that applies each update atomically for one key,
//! so concurrent updates for the same client never lose a write while
//! different clients never contend.

pub mod expiring;
pub mod memory;

pub use expiring::ExpiringStore;
pub use memory::MemoryStore;

use crate::config::{LedgerBackend, LedgerConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Accumulated risk for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatRecord {
    /// Client identity the record is keyed by
    pub identity: String,
    /// Clamped risk score (0.0-1.0)
    pub risk_score: f64,
    /// Threat event labels, oldest first
    pub threat_events: Vec<String>,
    /// When the record was created
    pub first_seen_at: DateTime<Utc>,
    /// Last threat event
    pub last_seen_at: DateTime<Utc>,
}

impl ThreatRecord {
    /// Create an empty record.
    pub fn new(identity: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            identity: identity.into(),
            risk_score: 0.0,
            threat_events: Vec::new(),
            first_seen_at: now,
            last_seen_at: now,
        }
    }

    /// Append an event and add its severity.
    pub fn apply_threat(&mut self, event: &str, severity: f64) {
        self.threat_events.push(event.to_string());
        self.risk_score = clamp_risk(self.risk_score + severity);
        self.last_seen_at = Utc::now();
    }

    /// Lower the risk score without recording an event.
    pub fn reduce(&mut self, amount: f64) {
        self.risk_score = clamp_risk(self.risk_score - amount);
    }

    pub fn event_count(&self) -> usize {
        self.threat_events.len()
    }
}

fn clamp_risk(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Storage backend for threat records.
///
/// `upsert` and `modify` must run `apply` while holding exclusive access to
/// the identity's record, and return the record as it was left.
pub trait LedgerStore: Send + Sync {
    /// Read a record. Never creates one.
    fn get(&self, identity: &str) -> Option<ThreatRecord>;

    /// Apply `apply` to the record, creating an empty one first if needed.
    fn upsert(&self, identity: &str, apply: &mut dyn FnMut(&mut ThreatRecord)) -> ThreatRecord;

    /// Apply `apply` to an existing record. Returns `None` when absent.
    fn modify(
        &self,
        identity: &str,
        apply: &mut dyn FnMut(&mut ThreatRecord),
    ) -> Option<ThreatRecord>;

    /// Number of tracked clients.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Read-only view of a client's standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatSummary {
    pub has_data: bool,
    pub risk_score: f64,
    pub event_count: usize,
    pub last_seen: Option<DateTime<Utc>>,
}

impl From<Option<ThreatRecord>> for ThreatSummary {
    fn from(record: Option<ThreatRecord>) -> Self {
        match record {
            Some(record) => Self {
                has_data: true,
                risk_score: record.risk_score,
                event_count: record.event_count(),
                last_seen: Some(record.last_seen_at),
            },
            None => Self {
                has_data: false,
                risk_score: 0.0,
                event_count: 0,
                last_seen: None,
            },
        }
    }
}

/// Threat ledger over a pluggable store.
#[derive(Clone)]
pub struct ThreatLedger {
    store: Arc<dyn LedgerStore>,
}

impl ThreatLedger {
    /// Create a ledger over the given store.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Create an unbounded in-memory ledger.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Create the ledger selected by configuration.
    pub fn from_config(config: &LedgerConfig) -> Self {
        match config.backend {
            LedgerBackend::Memory => Self::in_memory(),
            LedgerBackend::Expiring => Self::new(Arc::new(ExpiringStore::new(
                config.max_clients,
                Duration::from_secs(config.idle_ttl_seconds),
            ))),
        }
    }

    /// Record a threat event. Repeated calls compound.
    pub fn record_threat(&self, identity: &str, event: &str, severity: f64) -> ThreatRecord {
        let record = self
            .store
            .upsert(identity, &mut |record: &mut ThreatRecord| record.apply_threat(event, severity));
        debug!(
            event = event,
            severity = severity,
            risk_score = record.risk_score,
            events = record.event_count(),
            "Threat recorded"
        );
        record
    }

    /// Look up a client's record.
    pub fn lookup(&self, identity: &str) -> Option<ThreatRecord> {
        self.store.get(identity)
    }

    /// Lower a client's risk. Does nothing for unknown clients.
    pub fn reduce_risk(&self, identity: &str, amount: f64) -> Option<ThreatRecord> {
        let record = self
            .store
            .modify(identity, &mut |record: &mut ThreatRecord| record.reduce(amount));
        if let Some(ref r) = record {
            debug!(amount = amount, risk_score = r.risk_score, "Risk reduced");
        }
        record
    }

    /// Summarize a client's standing without mutating anything.
    pub fn summary(&self, identity: &str) -> ThreatSummary {
        self.lookup(identity).into()
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }
}

impl Default for ThreatLedger {
    fn default() -> Self {
        Self::in_memory()
    }
}

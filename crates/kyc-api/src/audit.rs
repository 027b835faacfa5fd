//! # Audit Trail & Counters
//!
//! Process-lifetime record of verification attempts: a fixed-capacity ring
//! of the most recent entries plus monotonic counters. Nothing is persisted;
//! a restart starts from zero.
//!
//! Only attempts that reach the provider are recorded. Every entry carries
//! the masked document detail, never the raw identifier.
//!
//! The store is a cloneable handle over a `parking_lot::Mutex`. The lock is
//! never held across an `.await`.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kyc_core::DocumentType;
use parking_lot::Mutex;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Default number of retained entries.
pub const DEFAULT_AUDIT_CAPACITY: usize = 10;

/// One recorded verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuditEntry {
    pub id: Uuid,
    #[schema(value_type = String, example = "national_id")]
    pub document_type: DocumentType,
    pub timestamp: DateTime<Utc>,
    pub requester_id: String,
    /// Masked description of the submitted document.
    pub masked_detail: String,
    /// HTTP status returned to the caller.
    pub status_code: u16,
    pub success: bool,
}

impl AuditEntry {
    /// New entry stamped with a fresh id and the current time.
    pub fn new(
        document_type: DocumentType,
        requester_id: impl Into<String>,
        masked_detail: impl Into<String>,
        status_code: u16,
        success: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_type,
            timestamp: Utc::now(),
            requester_id: requester_id.into(),
            masked_detail: masked_detail.into(),
            status_code,
            success,
        }
    }
}

/// Monotonic attempt counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Counters {
    pub total_requests: u64,
    /// Attempts per document type; every type is present, starting at zero.
    #[schema(value_type = Object)]
    pub per_type: BTreeMap<DocumentType, u64>,
    pub successful: u64,
    pub failed: u64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            total_requests: 0,
            per_type: DocumentType::ALL.iter().map(|t| (*t, 0)).collect(),
            successful: 0,
            failed: 0,
        }
    }
}

/// Read-only view for dashboards and `/api/stats`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsSnapshot {
    pub counters: Counters,
    /// Retained entries, most recent first.
    pub recent: Vec<AuditEntry>,
    pub capacity: usize,
}

#[derive(Debug)]
struct AuditInner {
    entries: VecDeque<AuditEntry>,
    capacity: usize,
    counters: Counters,
}

/// Thread-safe, cloneable audit store.
#[derive(Debug, Clone)]
pub struct AuditStore {
    inner: Arc<Mutex<AuditInner>>,
}

impl Default for AuditStore {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}

impl AuditStore {
    /// Create an empty store retaining at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AuditInner {
                entries: VecDeque::with_capacity(capacity),
                capacity,
                counters: Counters::default(),
            })),
        }
    }

    /// Append an entry, evicting the oldest when full, and bump counters.
    pub fn record(&self, entry: AuditEntry) {
        let mut inner = self.inner.lock();

        inner.counters.total_requests += 1;
        *inner.counters.per_type.entry(entry.document_type).or_insert(0) += 1;
        if entry.success {
            inner.counters.successful += 1;
        } else {
            inner.counters.failed += 1;
        }

        if inner.capacity == 0 {
            return;
        }
        if inner.entries.len() == inner.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(entry);
    }

    /// Counters plus retained entries, most recent first.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock();
        StatsSnapshot {
            counters: inner.counters.clone(),
            recent: inner.entries.iter().rev().cloned().collect(),
            capacity: inner.capacity,
        }
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize, success: bool) -> AuditEntry {
        AuditEntry::new(
            DocumentType::NationalId,
            format!("requester-{n}"),
            "National ID XXXX-XXXX-9012",
            if success { 200 } else { 503 },
            success,
        )
    }

    #[test]
    fn retains_last_ten_of_fifteen_newest_first() {
        let store = AuditStore::new(10);
        for n in 0..15 {
            store.record(entry(n, true));
        }

        let snap = store.snapshot();
        assert_eq!(snap.recent.len(), 10);
        let order: Vec<&str> = snap.recent.iter().map(|e| e.requester_id.as_str()).collect();
        let expected: Vec<String> = (5..15).rev().map(|n| format!("requester-{n}")).collect();
        assert_eq!(order, expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(snap.counters.total_requests, 15);
    }

    #[test]
    fn counters_split_by_type_and_outcome() {
        let store = AuditStore::default();
        store.record(entry(0, true));
        store.record(AuditEntry::new(
            DocumentType::BankAccount,
            "r",
            "Account XXXXXXXX6789 / Routing XXXXXXX3456",
            422,
            false,
        ));

        let counters = store.snapshot().counters;
        assert_eq!(counters.total_requests, 2);
        assert_eq!(counters.per_type[&DocumentType::NationalId], 1);
        assert_eq!(counters.per_type[&DocumentType::BankAccount], 1);
        assert_eq!(counters.per_type[&DocumentType::TaxId], 0);
        assert_eq!(counters.successful, 1);
        assert_eq!(counters.failed, 1);
    }

    #[test]
    fn zero_capacity_still_counts() {
        let store = AuditStore::new(0);
        store.record(entry(0, true));
        assert!(store.is_empty());
        assert_eq!(store.snapshot().counters.total_requests, 1);
    }

    #[test]
    fn clones_share_state() {
        let store = AuditStore::default();
        let handle = store.clone();
        handle.record(entry(0, true));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        let store = AuditStore::new(10);
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for n in 0..50 {
                        store.record(entry(t * 100 + n, n % 2 == 0));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        let snap = store.snapshot();
        assert_eq!(snap.counters.total_requests, 400);
        assert_eq!(snap.counters.successful + snap.counters.failed, 400);
        assert_eq!(snap.recent.len(), 10);
    }

    #[test]
    fn per_type_serializes_with_snake_case_keys() {
        let json = serde_json::to_value(Counters::default()).unwrap();
        assert_eq!(json["per_type"]["national_id"], 0);
        assert_eq!(json["per_type"]["bank_account"], 0);
    }
}

//! Transaction records and append-only history storage.

use crate::error::StorageError;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Kind of balance mutation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Credit: balance increased by `amount`.
    Charge,

    /// Debit: balance decreased by `amount`.
    Use,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Charge => f.write_str("CHARGE"),
            TransactionKind::Use => f.write_str("USE"),
        }
    }
}

/// Immutable log entry for one successful charge or use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// Store-assigned identity, increasing across all users.
    pub id: u64,

    /// User whose balance changed.
    pub user_id: u64,

    /// Amount applied. Never negative.
    pub amount: i64,

    /// Charge or use.
    pub kind: TransactionKind,

    /// Unix millis supplied by the caller.
    pub timestamp: i64,
}

/// Append-only storage of [`TransactionRecord`]s.
pub trait HistoryStore: Send + Sync {
    /// Creates a record with a fresh id, stores it and returns it.
    fn append(
        &self,
        user_id: u64,
        amount: i64,
        kind: TransactionKind,
        timestamp: i64,
    ) -> Result<TransactionRecord, StorageError>;

    /// All records for `user_id` in insertion order.
    fn list_by_user(&self, user_id: u64) -> Result<Vec<TransactionRecord>, StorageError>;
}

/// In-memory [`HistoryStore`].
///
/// Records are bucketed per user, so appends for different users touch
/// different shards. Ids come from a single atomic sequence starting at 1.
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    records: DashMap<u64, Vec<TransactionRecord>>,
    next_id: AtomicU64,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        InMemoryHistoryStore {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(
        &self,
        user_id: u64,
        amount: i64,
        kind: TransactionKind,
        timestamp: i64,
    ) -> Result<TransactionRecord, StorageError> {
        let record = TransactionRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            amount,
            kind,
            timestamp,
        };
        self.records
            .entry(user_id)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn list_by_user(&self, user_id: u64) -> Result<Vec<TransactionRecord>, StorageError> {
        Ok(self
            .records
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

//! Balance model and keyed balance storage.
//!
//! The store performs no validation and no locking of its own. Callers that
//! read-modify-write a balance must hold that user's lock from
//! [`UserLockRegistry`](crate::lock::UserLockRegistry).

use crate::error::StorageError;
use dashmap::DashMap;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// A user's current point total.
///
/// # Invariants
///
/// - `points >= 0` for every balance written through
///   [`LedgerService`](crate::service::LedgerService)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// User identifier.
    pub user_id: u64,

    /// Current points. Never negative once committed.
    pub points: i64,

    /// Unix millis of the last write, or 0 if never written.
    pub updated_at_millis: i64,
}

impl Balance {
    /// Zero-valued balance for a user with no stored record.
    pub fn empty(user_id: u64) -> Self {
        Balance {
            user_id,
            points: 0,
            updated_at_millis: 0,
        }
    }
}

/// Keyed storage of [`Balance`] records.
pub trait BalanceStore: Send + Sync {
    /// Returns the stored balance, or [`Balance::empty`] if none exists.
    fn read(&self, user_id: u64) -> Result<Balance, StorageError>;

    /// Upserts the balance with a fresh timestamp and returns what was stored.
    fn write(&self, user_id: u64, points: i64) -> Result<Balance, StorageError>;
}

/// In-memory [`BalanceStore`] backed by a sharded concurrent map.
///
/// Each entry is replaced as a whole, so a concurrent reader sees either the
/// old or the new balance, never a mix.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    balances: DashMap<u64, Balance>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn read(&self, user_id: u64) -> Result<Balance, StorageError> {
        Ok(self
            .balances
            .get(&user_id)
            .map(|entry| *entry.value())
            .unwrap_or_else(|| Balance::empty(user_id)))
    }

    fn write(&self, user_id: u64, points: i64) -> Result<Balance, StorageError> {
        let balance = Balance {
            user_id,
            points,
            updated_at_millis: now_millis(),
        };
        self.balances.insert(user_id, balance);
        Ok(balance)
    }
}

/// Current wall-clock time in Unix milliseconds, clamped to `i64::MAX`.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

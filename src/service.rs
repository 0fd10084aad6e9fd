//! Ledger service: the only entry point that mutates balances.
//!
//! Charge and use run their read-compute-append-write sequence while holding
//! the user's lock, so completed mutations for one user are linearized and no
//! update is lost. Reads are not fenced against writers.

use crate::balance::{now_millis, Balance, BalanceStore, InMemoryBalanceStore};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result, StorageError};
use crate::history::{HistoryStore, InMemoryHistoryStore, TransactionKind, TransactionRecord};
use crate::lock::{UserLockGuard, UserLockRegistry};
use log::{debug, error, warn};
use std::sync::Arc;

/// Orchestrates charge, use and queries over injectable stores.
///
/// `LedgerService` is `Send + Sync`; share it across threads behind an `Arc`.
pub struct LedgerService {
    balances: Arc<dyn BalanceStore>,
    history: Arc<dyn HistoryStore>,
    locks: UserLockRegistry,
    config: LedgerConfig,
}

impl LedgerService {
    /// Creates a service over the given stores with default configuration.
    pub fn new(balances: Arc<dyn BalanceStore>, history: Arc<dyn HistoryStore>) -> Self {
        LedgerService {
            balances,
            history,
            locks: UserLockRegistry::new(),
            config: LedgerConfig::default(),
        }
    }

    /// Creates a service over fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryBalanceStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
        )
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Lock registry, exposed for maintenance such as
    /// [`UserLockRegistry::prune_idle`].
    pub fn lock_registry(&self) -> &UserLockRegistry {
        &self.locks
    }

    /// Current balance, or zero if the user has never been charged.
    pub fn find_balance(&self, user_id: u64) -> Result<Balance> {
        Ok(self.balances.read(user_id)?)
    }

    /// All records for the user in application order.
    pub fn find_history(&self, user_id: u64) -> Result<Vec<TransactionRecord>> {
        Ok(self.history.list_by_user(user_id)?)
    }

    /// Credits `amount` points to the user.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] if `amount < 0`, before any lock is taken
    /// - [`LedgerError::BalanceOverflow`] if the new total does not fit in `i64`
    pub fn charge(&self, user_id: u64, amount: i64) -> Result<Balance> {
        validate_amount(amount)?;
        let _guard = self.lock_user(user_id)?;

        let current = self.read_committed(user_id)?;
        let new_points = current
            .points
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                user_id,
                balance: current.points,
                amount,
            })?;

        let balance = self.commit(user_id, amount, TransactionKind::Charge, new_points)?;
        debug!(
            "Charged {} to user {}, balance {}",
            amount, user_id, balance.points
        );
        Ok(balance)
    }

    /// Debits `amount` points from the user.
    ///
    /// Fails without touching either store if the balance would go negative.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] if `amount < 0`, before any lock is taken
    /// - [`LedgerError::InsufficientBalance`] if `amount` exceeds the balance
    pub fn use_points(&self, user_id: u64, amount: i64) -> Result<Balance> {
        validate_amount(amount)?;
        let _guard = self.lock_user(user_id)?;

        let current = self.read_committed(user_id)?;
        let new_points = current.points.checked_sub(amount).unwrap_or(-1);
        if new_points < 0 {
            warn!(
                "Rejected use of {} for user {}: balance {}",
                amount, user_id, current.points
            );
            return Err(LedgerError::InsufficientBalance {
                user_id,
                balance: current.points,
                requested: amount,
            });
        }

        let balance = self.commit(user_id, amount, TransactionKind::Use, new_points)?;
        debug!(
            "Used {} from user {}, balance {}",
            amount, user_id, balance.points
        );
        Ok(balance)
    }

    /// Reads the balance a mutation will build on, rejecting values no
    /// committed write could have produced.
    fn read_committed(&self, user_id: u64) -> Result<Balance> {
        let current = self.balances.read(user_id)?;
        if current.points < 0 {
            error!(
                "Store returned negative balance {} for user {}",
                current.points, user_id
            );
            return Err(StorageError::Inconsistent(format!(
                "negative balance {} for user {}",
                current.points, user_id
            ))
            .into());
        }
        Ok(current)
    }

    /// Acquires the user's lock, honoring the configured timeout.
    fn lock_user(&self, user_id: u64) -> Result<UserLockGuard> {
        match self.config.lock_timeout {
            None => Ok(self.locks.acquire(user_id)),
            Some(timeout) => self.locks.try_acquire_for(user_id, timeout).ok_or_else(|| {
                warn!("Lock on user {} not acquired within {:?}", user_id, timeout);
                LedgerError::LockTimeout {
                    user_id,
                    waited: timeout,
                }
            }),
        }
    }

    /// Appends the history record, then writes the balance.
    ///
    /// Must be called with the user's lock held.
    fn commit(
        &self,
        user_id: u64,
        amount: i64,
        kind: TransactionKind,
        new_points: i64,
    ) -> Result<Balance> {
        let record = self.history.append(user_id, amount, kind, now_millis())?;

        self.balances.write(user_id, new_points).map_err(|source| {
            error!(
                "History record {} for user {} has no matching balance write: {}",
                record.id, user_id, source
            );
            LedgerError::OrphanedHistory {
                record_id: record.id,
                user_id,
                source,
            }
        })
    }
}

fn validate_amount(amount: i64) -> Result<()> {
    if amount < 0 {
        return Err(LedgerError::InvalidArgument { amount });
    }
    Ok(())
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::in_memory()
    }
}

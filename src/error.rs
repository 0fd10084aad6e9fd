//! Error types for the point ledger.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failures reported by a balance or history backend.
///
/// The in-memory stores never produce these; they exist so that a persistent
/// backend can surface I/O problems without panicking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend returned data that violates a ledger invariant
    #[error("storage inconsistent: {0}")]
    Inconsistent(String),
}

/// Errors that can occur during ledger operation.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Negative amount passed to charge or use
    #[error("Invalid amount {amount}: must be zero or greater")]
    InvalidArgument { amount: i64 },

    /// Use would drive the balance below zero
    #[error("Insufficient balance for user {user_id}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        user_id: u64,
        balance: i64,
        requested: i64,
    },

    /// Charge would overflow the balance type
    #[error("Balance overflow for user {user_id}: balance {balance} + {amount}")]
    BalanceOverflow {
        user_id: u64,
        balance: i64,
        amount: i64,
    },

    /// The user's lock could not be acquired in time
    #[error("Timed out after {waited:?} waiting for lock on user {user_id}")]
    LockTimeout { user_id: u64, waited: Duration },

    /// Store failure before any mutation was committed
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    /// History was appended but the balance write failed afterwards
    #[error("Balance write failed for user {user_id} after history record {record_id} was appended: {source}")]
    OrphanedHistory {
        record_id: u64,
        user_id: u64,
        #[source]
        source: StorageError,
    },

    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid command record
    #[error("Invalid command at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Environment settings could not be loaded or parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ::config::ConfigError),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: point-ledger <commands.csv> [--history]")]
    MissingArgument,
}

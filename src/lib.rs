//! # Point Ledger
//!
//! A per-user point balance ledger with two mutating operations, charge and
//! use, plus balance and history queries.
//!
//! ## Design Principles
//!
//! - **Per-user serialization**: every charge/use runs under that user's lock,
//!   so concurrent requests for one user never lose an update
//! - **No global bottleneck**: locks are created lazily in a sharded registry;
//!   different users never wait on each other
//! - **Strict invariants**: a balance is never committed below zero, and a
//!   rejected request leaves both stores untouched
//! - **Injectable storage**: balances and history sit behind traits
//!
//! ## Example
//!
//! ```
//! use point_ledger::{LedgerError, LedgerService};
//!
//! let ledger = LedgerService::in_memory();
//! ledger.charge(1, 500).unwrap();
//! ledger.use_points(1, 200).unwrap();
//! assert_eq!(ledger.find_balance(1).unwrap().points, 300);
//!
//! let err = ledger.use_points(1, 1000).unwrap_err();
//! assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
//! ```

pub mod balance;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod lock;
pub mod service;

pub use balance::{Balance, BalanceStore, InMemoryBalanceStore};
pub use command::{CommandRecord, LedgerCommand};
pub use config::LedgerConfig;
pub use engine::LedgerEngine;
pub use error::{LedgerError, Result, StorageError};
pub use history::{HistoryStore, InMemoryHistoryStore, TransactionKind, TransactionRecord};
pub use lock::{UserLockGuard, UserLockRegistry};
pub use service::LedgerService;

//! Per-user mutual exclusion.
//!
//! Each user id maps to one lazily created lock handle. The map is sharded,
//! so looking up or creating handles for different users does not contend on
//! a single global lock, and no shard lock is held while waiting on a user's
//! lock.

use dashmap::DashMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::sync::Arc;
use std::time::Duration;

type UserLock = Arc<Mutex<()>>;

/// Scoped acquisition of a single user's lock.
///
/// The lock is released when the guard is dropped, on every exit path.
#[must_use = "the user lock is released as soon as the guard is dropped"]
pub struct UserLockGuard {
    user_id: u64,
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl UserLockGuard {
    /// The user whose lock is held.
    pub fn user_id(&self) -> u64 {
        self.user_id
    }
}

/// Registry of per-user lock handles.
///
/// Handles are created exactly once per user id, even under concurrent first
/// access, and are kept until [`prune_idle`](Self::prune_idle) is called.
#[derive(Debug, Default)]
pub struct UserLockRegistry {
    locks: DashMap<u64, UserLock>,
}

impl UserLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the user's lock is free, then holds it.
    pub fn acquire(&self, user_id: u64) -> UserLockGuard {
        let lock = self.handle(user_id);
        UserLockGuard {
            user_id,
            _guard: lock.lock_arc(),
        }
    }

    /// Like [`acquire`](Self::acquire), but gives up after `timeout`.
    pub fn try_acquire_for(&self, user_id: u64, timeout: Duration) -> Option<UserLockGuard> {
        let lock = self.handle(user_id);
        lock.try_lock_arc_for(timeout).map(|guard| UserLockGuard {
            user_id,
            _guard: guard,
        })
    }

    /// Number of lock handles currently registered.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Removes handles that nobody holds or is waiting on.
    ///
    /// A handle referenced only by the map cannot be reached by any caller
    /// except through the shard lock `retain` is holding, so dropping it cannot
    /// split one user across two handles. Returns the number removed.
    pub fn prune_idle(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before.saturating_sub(self.locks.len())
    }

    /// Get-or-create the handle for `user_id`.
    ///
    /// The returned `Arc` is cloned out so the shard guard is released before
    /// the caller blocks on the user lock.
    fn handle(&self, user_id: u64) -> UserLock {
        if let Some(existing) = self.locks.get(&user_id) {
            return Arc::clone(existing.value());
        }

        let entry = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }
}

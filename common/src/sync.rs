//! Per-user serialization scopes
//!
//! Balance and holding updates are read-check-write sequences across stores
//! with no shared transaction. Every operation that mutates a user's cash or
//! papers holds that user's lock from its first read to its last write.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;
use uuid::Uuid;

type Registry = DashMap<Uuid, Arc<Mutex<()>>>;

/// Registry of one async mutex per user.
///
/// Entries exist only while a user's lock is held or awaited.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Arc<Registry>,
}

/// Held serialization scope for one user; released on drop
#[derive(Debug)]
pub struct UserLockGuard {
    user_id: Uuid,
    registry: Arc<Registry>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl UserLockGuard {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold a clone of the mutex, so a count of one means nobody is queued.
        // Acquirers clone under the same shard lock, which makes this check race free.
        self.registry
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the user's lock
    pub async fn acquire(&self, user_id: Uuid) -> UserLockGuard {
        // Clone the Arc out so the map shard is not held across the await
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = lock.lock_owned().await;
        trace!("Acquired serialization scope for user {}", user_id);

        UserLockGuard {
            user_id,
            registry: self.locks.clone(),
            guard: Some(guard),
        }
    }

    /// Number of users whose lock is held or awaited
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

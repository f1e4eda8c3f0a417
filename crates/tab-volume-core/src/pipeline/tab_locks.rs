use crate::TabId;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-tab mutual exclusion for volume changes.
///
/// Requests for the same tab run one at a time in arrival order; requests
/// for different tabs never wait on each other.
#[derive(Default)]
pub(crate) struct TabLocks {
    locks: Mutex<HashMap<TabId, Arc<AsyncMutex<()>>>>,
}

impl TabLocks {
    /// Wait for exclusive access to a tab.
    pub(crate) async fn acquire(&self, tab_id: TabId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(tab_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry for a closed tab.
    pub(crate) fn forget(&self, tab_id: TabId) {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&tab_id);
    }

    /// Number of tabs with a lock entry.
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

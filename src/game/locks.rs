use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::game::types::PlayerId;

/// Entries are pruned once the table grows past this many idle players.
const PRUNE_THRESHOLD: usize = 1_024;

/// One async mutex per player id. Holding a player's guard is what makes a
/// load-mutate-save cycle safe against concurrent commands for the same
/// player; different players never contend.
#[derive(Default)]
pub struct PlayerLocks {
    table: Mutex<HashMap<PlayerId, Arc<AsyncMutex<()>>>>,
}

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: PlayerId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            if table.len() >= PRUNE_THRESHOLD {
                // Only the table holds idle entries.
                table.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            table.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of ids currently tracked.
    pub fn tracked(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

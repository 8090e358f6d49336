// src/services/finishing.rs

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

/// Sessions with a finish currently being graded in this process.
#[derive(Clone, Default)]
pub struct FinishLocks {
    inner: Arc<Mutex<HashSet<Uuid>>>,
}

/// Held while a finish runs. Dropping it releases the session.
pub struct FinishClaim {
    locks: FinishLocks,
    id: Uuid,
}

impl FinishLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns `None` when another finish for `id` is already in flight.
    pub fn claim(&self, id: Uuid) -> Option<FinishClaim> {
        if !self.lock().insert(id) {
            return None;
        }
        Some(FinishClaim {
            locks: self.clone(),
            id,
        })
    }

    pub fn is_claimed(&self, id: Uuid) -> bool {
        self.lock().contains(&id)
    }
}

impl Drop for FinishClaim {
    fn drop(&mut self) {
        self.locks.lock().remove(&self.id);
    }
}

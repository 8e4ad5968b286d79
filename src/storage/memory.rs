//! In-memory state storage for testing.

use std::sync::RwLock;

use crate::error::Result;
use crate::storage::{Snapshot, StateStore};

/// In-memory state store for testing.
///
/// Also counts saves, so tests can check that mutations persist.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    snapshot: RwLock<Option<Snapshot>>,
    saves: RwLock<usize>,
}

impl MemoryStateStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            saves: RwLock::new(0),
        }
    }

    /// The stored record, if any.
    pub fn stored(&self) -> Option<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *self.saves.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.stored().unwrap_or_default())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());
        *self.saves.write().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::test_state_store_round_trip;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStateStore::new();
        test_state_store_round_trip(&store);
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryStateStore::new();
        assert!(store.stored().is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_save_count() {
        let store = MemoryStateStore::new();
        store.save(&Snapshot::default()).unwrap();
        store.save(&Snapshot::default()).unwrap();
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn test_with_snapshot() {
        let snapshot = Snapshot {
            current_card_index: 0,
            ..Default::default()
        };
        let store = MemoryStateStore::with_snapshot(snapshot.clone());
        assert_eq!(store.load().unwrap(), snapshot);
    }
}

//! Storage traits for Lexicard.
//!
//! This module defines the `StateStore` trait for persisting the trainer's
//! single state record.

use std::sync::Arc;

use crate::error::Result;
use crate::storage::Snapshot;

/// Trait for state storage backends.
pub trait StateStore: Send + Sync {
    /// Read the stored record.
    ///
    /// Returns the all-defaults record when nothing has been stored yet.
    fn load(&self) -> Result<Snapshot>;

    /// Replace the stored record.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Remove the stored record.
    ///
    /// Returns `Ok(())` even if nothing was stored.
    fn clear(&self) -> Result<()>;
}

/// Blanket implementation of StateStore for Arc-wrapped stores.
///
/// Lets a test keep a handle on the store it gave to a trainer.
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    fn load(&self) -> Result<Snapshot> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        (**self).save(snapshot)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

//! State persistence for Lexicard.
//!
//! The whole trainer state is one record, stored as JSON in a file or held
//! in memory for tests.

pub mod file;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;
pub use snapshot::Snapshot;
pub use traits::StateStore;

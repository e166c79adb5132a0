//! Caching and refresh subsystem
//!
//! This module owns the read-through cache over the Pocket Price API: TTL
//! expiry, last-known-good fallback data, forced refresh, and the disk
//! snapshots that carry fallback data across restarts. Consumers (the CLI
//! and renderer) only ever go through [`CacheManager`]'s read operations.

mod manager;
mod snapshot;

pub use manager::{CacheManager, SyncSummary, DEFAULT_TTL_SECS};
pub use snapshot::SnapshotStore;

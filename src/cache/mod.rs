//! Local cache of Pokémon with offline support.
//!
//! This module provides:
//! - A record store keyed by Pokémon id, with a feed that replays the full
//!   record set to subscribers after every write
//! - SQLite and in-memory store implementations
//! - The coordinator that decides when to serve the cache, when to pull more
//!   bundled pages and when to refresh from the network

mod coordinator;
mod error;
mod memory;
mod storage;
mod traits;

pub use coordinator::{CacheCoordinator, CoordinatorSettings};
pub use error::{CacheError, CacheResult};
pub use memory::MemoryStore;
pub use storage::SqliteStore;
pub use traits::{Outcome, PageSource, RecordStore, RemoteSource};

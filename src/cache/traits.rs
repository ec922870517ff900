//! Core traits and types for the caching system.

use async_trait::async_trait;
use color_eyre::Result;
use std::sync::Arc;
use tokio::sync::watch;

use super::error::CacheResult;
use crate::pokedex::types::{CachedPokemon, FetchedPokemon, Pokemon};

/// Snapshot of every cached record, ordered by id.
pub type Snapshot = Arc<Vec<CachedPokemon>>;

/// Subscription to the record store. Holds the latest snapshot on
/// subscribe and is notified after every mutation.
pub type RecordFeed = watch::Receiver<Snapshot>;

/// Persistent table of cached Pokémon keyed by id.
///
/// Implementations publish a fresh snapshot to every feed after each
/// successful mutation.
pub trait RecordStore: Send + Sync {
  /// Insert or replace a single record.
  fn upsert(&self, record: &CachedPokemon) -> Result<()>;

  /// Insert or replace a batch of records. All-or-nothing.
  fn upsert_all(&self, records: &[CachedPokemon]) -> Result<()>;

  /// Remove every record.
  fn delete_all(&self) -> Result<()>;

  /// Number of stored records.
  fn count(&self) -> Result<usize>;

  /// Most recent `last_fetched_at`, or None when the store is empty.
  fn last_fetched_at(&self) -> Result<Option<i64>>;

  /// Look up a single record.
  fn get(&self, id: u32) -> Result<Option<CachedPokemon>>;

  /// Subscribe to the full record set.
  fn subscribe(&self) -> RecordFeed;
}

/// Pre-packaged pages of Pokémon addressed by page index.
#[async_trait]
pub trait PageSource: Send + Sync {
  /// Load page `index`. `Ok(None)` means the source is exhausted;
  /// `Err(CacheError::Decode)` means the page exists but is unusable.
  async fn page(&self, index: usize) -> CacheResult<Option<Vec<Pokemon>>>;
}

/// Paged remote API.
#[async_trait]
pub trait RemoteSource: Send + Sync {
  /// Fetch `limit` Pokémon starting at `offset`, with full details.
  async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<FetchedPokemon>>;

  /// Fetch one Pokémon by id.
  async fn fetch_one(&self, id: u32) -> Result<FetchedPokemon>;
}

/// What a coordinator operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Cache was fresh, nothing fetched
  Fresh,
  /// Another operation was already in flight, nothing done
  Busy,
  /// This many records were written
  Stored(usize),
}

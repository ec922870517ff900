//! In-memory record store, used for `--ephemeral` runs and in tests.

use color_eyre::{eyre::eyre, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::traits::{RecordFeed, RecordStore, Snapshot};
use crate::pokedex::types::CachedPokemon;

/// Record store that lives only as long as the process.
pub struct MemoryStore {
  records: Mutex<BTreeMap<u32, CachedPokemon>>,
  feed: watch::Sender<Snapshot>,
}

impl MemoryStore {
  pub fn new() -> Self {
    let (feed, _) = watch::channel(Arc::new(Vec::new()));
    Self {
      records: Mutex::new(BTreeMap::new()),
      feed,
    }
  }

  fn mutate(&self, f: impl FnOnce(&mut BTreeMap<u32, CachedPokemon>)) -> Result<()> {
    let mut records = self
      .records
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    f(&mut records);
    self
      .feed
      .send_replace(Arc::new(records.values().cloned().collect()));
    Ok(())
  }

  fn read<T>(&self, f: impl FnOnce(&BTreeMap<u32, CachedPokemon>) -> T) -> Result<T> {
    let records = self
      .records
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(f(&records))
  }
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl RecordStore for MemoryStore {
  fn upsert(&self, record: &CachedPokemon) -> Result<()> {
    self.mutate(|records| {
      records.insert(record.id, record.clone());
    })
  }

  fn upsert_all(&self, records: &[CachedPokemon]) -> Result<()> {
    self.mutate(|stored| {
      for record in records {
        stored.insert(record.id, record.clone());
      }
    })
  }

  fn delete_all(&self) -> Result<()> {
    self.mutate(BTreeMap::clear)
  }

  fn count(&self) -> Result<usize> {
    self.read(BTreeMap::len)
  }

  fn last_fetched_at(&self) -> Result<Option<i64>> {
    self.read(|records| records.values().map(|r| r.last_fetched_at).max())
  }

  fn get(&self, id: u32) -> Result<Option<CachedPokemon>> {
    self.read(|records| records.get(&id).cloned())
  }

  fn subscribe(&self) -> RecordFeed {
    self.feed.subscribe()
  }
}

//! SQLite-backed record store.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::traits::{RecordFeed, RecordStore, Snapshot};
use crate::db::Database;
use crate::pokedex::types::CachedPokemon;

const SELECT_COLUMNS: &str = "SELECT id, name, image_url, types, weight, height, hp, attack, defense,
        special_attack, special_defense, speed, last_fetched_at
   FROM cached_pokemon";

const UPSERT: &str = "INSERT OR REPLACE INTO cached_pokemon
   (id, name, image_url, types, weight, height, hp, attack, defense,
    special_attack, special_defense, speed, last_fetched_at)
   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Record store persisted in the `cached_pokemon` table.
pub struct SqliteStore {
  db: Database,
  feed: watch::Sender<Snapshot>,
}

impl SqliteStore {
  pub fn new(db: Database) -> Result<Self> {
    let initial = {
      let conn = db.lock()?;
      load_all(&conn)?
    };
    let (feed, _) = watch::channel(Arc::new(initial));
    Ok(Self { db, feed })
  }

  /// Reload the table and hand it to subscribers. Must be called with the
  /// connection still locked so snapshots are published in commit order.
  fn publish(&self, conn: &Connection) -> Result<()> {
    let records = load_all(conn)?;
    debug!(count = records.len(), "publishing cache snapshot");
    self.feed.send_replace(Arc::new(records));
    Ok(())
  }
}

impl RecordStore for SqliteStore {
  fn upsert(&self, record: &CachedPokemon) -> Result<()> {
    self.upsert_all(std::slice::from_ref(record))
  }

  fn upsert_all(&self, records: &[CachedPokemon]) -> Result<()> {
    let mut conn = self.db.lock()?;

    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;
    {
      let mut stmt = tx
        .prepare(UPSERT)
        .map_err(|e| eyre!("Failed to prepare upsert: {}", e))?;

      for record in records {
        let types = serde_json::to_string(&record.types)
          .map_err(|e| eyre!("Failed to serialize types: {}", e))?;
        stmt
          .execute(params![
            record.id,
            record.name,
            record.image_url,
            types,
            record.weight as f64,
            record.height as f64,
            record.hp,
            record.attack,
            record.defense,
            record.special_attack,
            record.special_defense,
            record.speed,
            record.last_fetched_at,
          ])
          .map_err(|e| eyre!("Failed to store Pokémon {}: {}", record.id, e))?;
      }
    }
    tx
      .commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    self.publish(&conn)
  }

  fn delete_all(&self) -> Result<()> {
    let conn = self.db.lock()?;
    conn
      .execute("DELETE FROM cached_pokemon", [])
      .map_err(|e| eyre!("Failed to clear cache: {}", e))?;
    self.publish(&conn)
  }

  fn count(&self) -> Result<usize> {
    let conn = self.db.lock()?;
    let count: i64 = conn
      .query_row("SELECT COUNT(*) FROM cached_pokemon", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to count cached Pokémon: {}", e))?;
    Ok(count as usize)
  }

  fn last_fetched_at(&self) -> Result<Option<i64>> {
    let conn = self.db.lock()?;
    conn
      .query_row("SELECT MAX(last_fetched_at) FROM cached_pokemon", [], |row| {
        row.get(0)
      })
      .map_err(|e| eyre!("Failed to read last fetch time: {}", e))
  }

  fn get(&self, id: u32) -> Result<Option<CachedPokemon>> {
    let conn = self.db.lock()?;
    conn
      .query_row(&format!("{} WHERE id = ?", SELECT_COLUMNS), params![id], map_row)
      .optional()
      .map_err(|e| eyre!("Failed to read Pokémon {}: {}", id, e))?
      .transpose()
  }

  fn subscribe(&self) -> RecordFeed {
    self.feed.subscribe()
  }
}

fn load_all(conn: &Connection) -> Result<Vec<CachedPokemon>> {
  let mut stmt = conn
    .prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
    .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

  let rows = stmt
    .query_map([], map_row)
    .map_err(|e| eyre!("Failed to query cached Pokémon: {}", e))?;

  let mut records = Vec::new();
  for row in rows {
    records.push(row.map_err(|e| eyre!("Failed to read row: {}", e))??);
  }
  Ok(records)
}

/// Map a row to a record. The outer result is SQLite's, the inner one
/// covers the JSON-encoded `types` column.
fn map_row(row: &Row<'_>) -> rusqlite::Result<Result<CachedPokemon>> {
  let id: u32 = row.get(0)?;
  let types: String = row.get(3)?;
  let weight: f64 = row.get(4)?;
  let height: f64 = row.get(5)?;

  let types = match serde_json::from_str(&types) {
    Ok(types) => types,
    Err(e) => return Ok(Err(eyre!("Corrupt types for Pokémon {}: {}", id, e))),
  };

  Ok(Ok(CachedPokemon {
    id,
    name: row.get(1)?,
    image_url: row.get(2)?,
    types,
    weight: weight as f32,
    height: height as f32,
    hp: row.get(6)?,
    attack: row.get(7)?,
    defense: row.get(8)?,
    special_attack: row.get(9)?,
    special_defense: row.get(10)?,
    speed: row.get(11)?,
    last_fetched_at: row.get(12)?,
  }))
}

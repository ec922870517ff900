//! Durable user preferences.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};
use tracing::warn;

use crate::db::Database;
use crate::pokedex::types::SortOrder;

const SORT_ORDER_KEY: &str = "sort_order";

/// Durable store for the list sort order
pub trait PreferenceStore: Send + Sync {
  /// Saved sort order, or the default when nothing usable is saved.
  fn sort_order(&self) -> Result<SortOrder>;

  fn set_sort_order(&self, order: SortOrder) -> Result<()>;
}

/// Preferences kept in the `preferences` table of the cache database
#[derive(Clone)]
pub struct SqlitePreferences {
  db: Database,
}

impl SqlitePreferences {
  pub fn new(db: Database) -> Self {
    Self { db }
  }

  fn get(&self, key: &str) -> Result<Option<String>> {
    let conn = self.db.lock()?;
    conn
      .query_row(
        "SELECT value FROM preferences WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read preference {}: {}", key, e))
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let conn = self.db.lock()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO preferences (key, value) VALUES (?, ?)",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to save preference {}: {}", key, e))?;
    Ok(())
  }
}

impl PreferenceStore for SqlitePreferences {
  fn sort_order(&self) -> Result<SortOrder> {
    let Some(saved) = self.get(SORT_ORDER_KEY)? else {
      return Ok(SortOrder::default());
    };

    Ok(saved.parse().unwrap_or_else(|e| {
      warn!(error = %e, "ignoring saved sort order");
      SortOrder::default()
    }))
  }

  fn set_sort_order(&self, order: SortOrder) -> Result<()> {
    self.set(SORT_ORDER_KEY, order.as_str())
  }
}

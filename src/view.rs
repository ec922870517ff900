//! List view state: the cached Pokémon, filtered by the search query and
//! ordered by the saved sort order.
//!
//! [`reduce`] is the pure part. [`HomeModel`] owns the inputs, follows the
//! coordinator's feed and tracks the status of the last refresh or page load.
//!
//! ```ignore
//! let mut home = HomeModel::new(coordinator, prefs)?;
//! home.initialize().await;
//!
//! // In event loop tick
//! if home.poll() {
//!     // Cache changed, trigger re-render
//! }
//!
//! // In render
//! match home.status() {
//!     LoadStatus::Loading => render_spinner(),
//!     LoadStatus::Error(e) => render_error(e),
//!     LoadStatus::Idle => {}
//! }
//! render_list(&home.visible());
//! ```

use color_eyre::Result;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheCoordinator, CacheError, Outcome};
use crate::pokedex::types::{Pokemon, SortOrder};
use crate::prefs::PreferenceStore;

/// Filter `pokemon` by `query` and sort the result by `order`.
///
/// A blank query keeps everything. Otherwise an entry is kept when its name
/// contains the query (ignoring case) or its id, written out, does. The sort
/// is stable.
pub fn reduce(pokemon: &[Pokemon], query: &str, order: SortOrder) -> Vec<Pokemon> {
  let mut visible: Vec<Pokemon> = if query.trim().is_empty() {
    pokemon.to_vec()
  } else {
    let needle = query.to_lowercase();
    pokemon
      .iter()
      .filter(|p| matches_query(p, &needle))
      .cloned()
      .collect()
  };

  visible.sort_by(comparator(order));
  visible
}

fn matches_query(pokemon: &Pokemon, needle: &str) -> bool {
  pokemon.name.to_lowercase().contains(needle) || pokemon.id.to_string().contains(needle)
}

fn comparator(order: SortOrder) -> fn(&Pokemon, &Pokemon) -> Ordering {
  match order {
    SortOrder::ByNumberAsc => |a, b| a.id.cmp(&b.id),
    SortOrder::ByNumberDesc => |a, b| b.id.cmp(&a.id),
    SortOrder::ByNameAsc => |a, b| a.name.cmp(&b.name),
    SortOrder::ByNameDesc => |a, b| b.name.cmp(&a.name),
  }
}

/// Status of the most recent refresh or page load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
  #[default]
  Idle,
  Loading,
  /// Failed; cleared by the user or by the next attempt
  Error(String),
}

impl LoadStatus {
  pub fn error(&self) -> Option<&str> {
    match self {
      LoadStatus::Error(e) => Some(e.as_str()),
      _ => None,
    }
  }
}

/// Host for the list view state.
pub struct HomeModel {
  coordinator: Arc<CacheCoordinator>,
  prefs: Arc<dyn PreferenceStore>,
  feed: BoxStream<'static, Vec<Pokemon>>,
  pokemon: Vec<Pokemon>,
  query: String,
  sort: SortOrder,
  status: LoadStatus,
  end_reached: bool,
}

impl HomeModel {
  pub fn new(coordinator: Arc<CacheCoordinator>, prefs: Arc<dyn PreferenceStore>) -> Result<Self> {
    let sort = prefs.sort_order()?;
    let feed = coordinator.observe_cached_pokemon();

    let mut model = Self {
      coordinator,
      prefs,
      feed,
      pokemon: Vec::new(),
      query: String::new(),
      sort,
      status: LoadStatus::Idle,
      end_reached: false,
    };
    model.poll();
    Ok(model)
  }

  /// Take any pending cache emissions without waiting.
  ///
  /// Returns `true` if the cached list changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Some(Some(pokemon)) = self.feed.next().now_or_never() {
      self.pokemon = pokemon;
      changed = true;
    }
    changed
  }

  /// What the list shows right now.
  pub fn visible(&self) -> Vec<Pokemon> {
    reduce(&self.pokemon, &self.query, self.sort)
  }

  pub fn cached_count(&self) -> usize {
    self.pokemon.len()
  }

  pub fn set_query(&mut self, query: impl Into<String>) {
    self.query = query.into();
  }

  pub fn sort_order(&self) -> SortOrder {
    self.sort
  }

  /// Change and persist the sort order.
  pub fn set_sort_order(&mut self, order: SortOrder) -> Result<()> {
    self.prefs.set_sort_order(order)?;
    self.sort = order;
    Ok(())
  }

  pub fn status(&self) -> &LoadStatus {
    &self.status
  }

  pub fn clear_error(&mut self) {
    if self.status.error().is_some() {
      self.status = LoadStatus::Idle;
    }
  }

  /// Whether the bundle has run out of pages
  pub fn end_reached(&self) -> bool {
    self.end_reached
  }

  /// First load: pull the first bundled page into an empty cache, then
  /// refresh from the network when it is reachable.
  pub async fn initialize(&mut self) {
    self.status = LoadStatus::Loading;

    let result = match self.coordinator.is_cache_empty() {
      Ok(true) => self.coordinator.load_next_page().await.map(|_| ()),
      Ok(false) => Ok(()),
      Err(e) => Err(e),
    };
    let result = match result {
      Err(CacheError::NoMorePages) => {
        self.end_reached = true;
        Ok(())
      }
      other => other,
    };

    let result = match result {
      Ok(()) if self.coordinator.connectivity().is_connected() => {
        self.coordinator.refresh_if_needed(false).await.map(|_| ())
      }
      other => other,
    };

    self.finish(result);
    self.poll();
  }

  /// Refresh from the network; `force` ignores the staleness window.
  pub async fn refresh(&mut self, force: bool) {
    self.status = LoadStatus::Loading;
    let result = self.coordinator.refresh_if_needed(force).await;
    if force && result.is_ok() {
      self.end_reached = false;
    }
    self.finish(result.map(|_| ()));
    self.poll();
  }

  /// Load the next bundled page unless the end has been reached.
  pub async fn load_more(&mut self) {
    if self.end_reached {
      debug!("load_more ignored: no more pages");
      return;
    }

    self.status = LoadStatus::Loading;
    let result = match self.coordinator.load_next_page().await {
      Ok(Outcome::Busy) => {
        debug!("load_more ignored: operation in flight");
        Ok(())
      }
      Ok(_) => Ok(()),
      Err(CacheError::NoMorePages) => {
        self.end_reached = true;
        Ok(())
      }
      Err(e) => Err(e),
    };
    self.finish(result);
    self.poll();
  }

  fn finish(&mut self, result: Result<(), CacheError>) {
    self.status = match result {
      Ok(()) => LoadStatus::Idle,
      Err(e) => {
        warn!(error = %e, "cache operation failed");
        LoadStatus::Error(e.to_string())
      }
    };
  }
}

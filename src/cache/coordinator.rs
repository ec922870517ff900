//! Decides when cached Pokémon are trustworthy and when to pull more.
//!
//! All fetched data is written to the record store first; presentation only
//! ever sees what comes back out of the store's feed.

use chrono::{Duration, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::{CacheError, CacheResult};
use super::traits::{Outcome, PageSource, RecordStore, RemoteSource};
use crate::config::Config;
use crate::connectivity::ConnectivityMonitor;
use crate::pokedex::types::{artwork_url, CachedPokemon, Pokemon};

/// Tunables for a [`CacheCoordinator`]
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
  pub page_size: usize,
  /// How long before cached data is considered stale
  pub stale_after: Duration,
  pub artwork_base: String,
}

impl CoordinatorSettings {
  pub fn from_config(config: &Config) -> Self {
    Self {
      page_size: config.cache.page_size,
      stale_after: config.stale_after(),
      artwork_base: config.api.artwork_base.clone(),
    }
  }
}

/// Held while a mutating operation runs; releases the flag on drop, including
/// on unwind.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
  fn acquire(flag: &'a AtomicBool) -> Option<Self> {
    flag
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| Self(flag))
  }
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

fn now_millis() -> i64 {
  Utc::now().timestamp_millis()
}

/// Mediates between the record store, the bundled pages, the remote API and
/// connectivity.
pub struct CacheCoordinator {
  store: Arc<dyn RecordStore>,
  bundle: Arc<dyn PageSource>,
  remote: Arc<dyn RemoteSource>,
  connectivity: ConnectivityMonitor,
  settings: CoordinatorSettings,
  /// Bundle pages consumed so far
  cursor: AtomicUsize,
  in_flight: AtomicBool,
  no_more_pages: AtomicBool,
}

impl CacheCoordinator {
  pub fn new(
    store: Arc<dyn RecordStore>,
    bundle: Arc<dyn PageSource>,
    remote: Arc<dyn RemoteSource>,
    connectivity: ConnectivityMonitor,
    settings: CoordinatorSettings,
  ) -> Self {
    Self {
      store,
      bundle,
      remote,
      connectivity,
      settings,
      cursor: AtomicUsize::new(0),
      in_flight: AtomicBool::new(false),
      no_more_pages: AtomicBool::new(false),
    }
  }

  /// Cached Pokémon, ordered by id. Yields the current contents first, then
  /// again after every store mutation.
  pub fn observe_cached_pokemon(&self) -> BoxStream<'static, Vec<Pokemon>> {
    let mut feed = self.store.subscribe();
    feed.mark_changed();

    stream::unfold(feed, |mut feed| async move {
      feed.changed().await.ok()?;
      let pokemon = feed
        .borrow_and_update()
        .iter()
        .map(CachedPokemon::to_pokemon)
        .collect();
      Some((pokemon, feed))
    })
    .boxed()
  }

  pub fn is_cache_empty(&self) -> CacheResult<bool> {
    Ok(self.store.count().map_err(CacheError::storage)? == 0)
  }

  /// Stale against the configured expiry window.
  pub fn is_cache_stale(&self) -> CacheResult<bool> {
    self.is_stale_after(self.settings.stale_after)
  }

  /// True when nothing is cached or the newest record is older than `expiry`.
  pub fn is_stale_after(&self, expiry: Duration) -> CacheResult<bool> {
    let last = self.store.last_fetched_at().map_err(CacheError::storage)?;
    Ok(match last {
      Some(fetched_at) => self.is_expired(fetched_at, expiry),
      None => true,
    })
  }

  fn is_expired(&self, fetched_at: i64, expiry: Duration) -> bool {
    now_millis() - fetched_at > expiry.num_milliseconds()
  }

  /// Refresh from the authoritative source when the cache is empty, stale,
  /// or `force` is set.
  ///
  /// While the store is empty the next bundled page is loaded; otherwise (or
  /// once the bundle runs out, or when that page is malformed) the remote
  /// pages covering what is cached are fetched again.
  pub async fn refresh_if_needed(&self, force: bool) -> CacheResult<Outcome> {
    if !self.connectivity.is_connected() {
      debug!("refresh skipped: offline");
      return Err(CacheError::NoConnectivity);
    }

    let Some(_guard) = InFlight::acquire(&self.in_flight) else {
      debug!("refresh skipped: another operation in flight");
      return Ok(Outcome::Busy);
    };

    let count = self.store.count().map_err(CacheError::storage)?;
    if !force && count > 0 && !self.is_cache_stale()? {
      debug!(count, "cache is fresh");
      return Ok(Outcome::Fresh);
    }

    if force {
      self.cursor.store(0, Ordering::SeqCst);
      self.no_more_pages.store(false, Ordering::SeqCst);
    }

    if count == 0 {
      match self.load_page(self.cursor.load(Ordering::SeqCst)).await {
        Ok(stored) => return Ok(Outcome::Stored(stored)),
        Err(CacheError::NoMorePages) => debug!("bundle exhausted, bootstrapping from remote"),
        Err(CacheError::Decode { page, .. }) => {
          debug!(page, "bundled page unusable, bootstrapping from remote")
        }
        Err(e) => return Err(e),
      }
    }

    self.refresh_from_remote(count).await
  }

  async fn refresh_from_remote(&self, cached: usize) -> CacheResult<Outcome> {
    let page_size = self.settings.page_size;
    let pages = cached.div_ceil(page_size).max(1);
    let mut stored = 0;

    for page in 0..pages {
      let offset = page * page_size;
      let fetched = self
        .remote
        .fetch_page(offset, page_size)
        .await
        .map_err(|e| {
          warn!(page, error = %e, "remote page fetch failed");
          CacheError::fetch(e)
        })?;

      if fetched.is_empty() {
        break;
      }

      let fetched_at = now_millis();
      let records: Vec<CachedPokemon> = fetched
        .into_iter()
        .map(|f| self.to_record(&f.pokemon, f.artwork_url, fetched_at))
        .collect();

      self.store.upsert_all(&records).map_err(CacheError::storage)?;
      stored += records.len();
      info!(page, count = records.len(), "stored remote page");
    }

    Ok(Outcome::Stored(stored))
  }

  /// Load bundled page `page_index` into the store.
  ///
  /// Fails with [`CacheError::NoMorePages`] when the bundle has no such page;
  /// that leaves the cursor where it is and marks pagination as finished.
  pub async fn load_more(&self, page_index: usize) -> CacheResult<Outcome> {
    let Some(_guard) = InFlight::acquire(&self.in_flight) else {
      debug!(page_index, "load skipped: another operation in flight");
      return Ok(Outcome::Busy);
    };

    self.load_page(page_index).await.map(Outcome::Stored)
  }

  /// Load the page at the cursor.
  pub async fn load_next_page(&self) -> CacheResult<Outcome> {
    self.load_more(self.page_cursor()).await
  }

  async fn load_page(&self, page_index: usize) -> CacheResult<usize> {
    match self.bundle.page(page_index).await {
      Ok(Some(pokemon)) => {
        let fetched_at = now_millis();
        let records: Vec<CachedPokemon> = pokemon
          .iter()
          .map(|p| self.to_record(p, None, fetched_at))
          .collect();

        self.store.upsert_all(&records).map_err(CacheError::storage)?;
        self.cursor.fetch_add(1, Ordering::SeqCst);
        info!(page_index, count = records.len(), "stored bundled page");
        Ok(records.len())
      }
      Ok(None) => {
        debug!(page_index, "no more bundled pages");
        self.no_more_pages.store(true, Ordering::SeqCst);
        Err(CacheError::NoMorePages)
      }
      Err(CacheError::Decode { page, reason }) => {
        // Skip the page so the next load does not retry it forever
        warn!(page, %reason, "skipping malformed bundled page");
        self.cursor.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Decode { page, reason })
      }
      Err(e) => Err(e),
    }
  }

  /// Get one Pokémon, refreshing it from the remote API when it is missing
  /// or stale. Falls back to the stale copy when the network is unavailable.
  pub async fn fetch_one(&self, id: u32) -> CacheResult<Pokemon> {
    let cached = self.store.get(id).map_err(CacheError::storage)?;

    if let Some(record) = &cached {
      if !self.is_expired(record.last_fetched_at, self.settings.stale_after) {
        return Ok(record.to_pokemon());
      }
    }

    if !self.connectivity.is_connected() {
      return cached
        .map(|record| record.to_pokemon())
        .ok_or(CacheError::NoConnectivity);
    }

    match self.remote.fetch_one(id).await {
      Ok(fetched) => {
        let record = self.to_record(&fetched.pokemon, fetched.artwork_url, now_millis());
        self.store.upsert(&record).map_err(CacheError::storage)?;
        Ok(fetched.pokemon)
      }
      Err(e) => match cached {
        Some(record) => {
          warn!(id, error = %e, "detail fetch failed, serving stale copy");
          Ok(record.to_pokemon())
        }
        None => Err(CacheError::fetch(e)),
      },
    }
  }

  /// Store lookup only, no network.
  pub fn cached(&self, id: u32) -> CacheResult<Option<Pokemon>> {
    Ok(
      self
        .store
        .get(id)
        .map_err(CacheError::storage)?
        .map(|record| record.to_pokemon()),
    )
  }

  /// Delete every cached record. Not gated by the in-flight flag.
  ///
  /// The page cursor is kept, so a later non-forced refresh of the empty
  /// store loads the bundled page at the cursor rather than page 0. A forced
  /// refresh starts over from page 0.
  pub fn clear_cache(&self) -> CacheResult<()> {
    self.store.delete_all().map_err(CacheError::storage)?;
    info!("cache cleared");
    Ok(())
  }

  pub fn page_cursor(&self) -> usize {
    self.cursor.load(Ordering::SeqCst)
  }

  pub fn no_more_pages(&self) -> bool {
    self.no_more_pages.load(Ordering::SeqCst)
  }

  pub fn connectivity(&self) -> &ConnectivityMonitor {
    &self.connectivity
  }

  fn to_record(
    &self,
    pokemon: &Pokemon,
    artwork: Option<String>,
    fetched_at: i64,
  ) -> CachedPokemon {
    let image_url =
      artwork.unwrap_or_else(|| artwork_url(&self.settings.artwork_base, pokemon.id));
    CachedPokemon::new(pokemon, image_url, fetched_at)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{MemoryStore, SqliteStore};
  use crate::db::Database;
  use crate::testutil::{offline, online, record, FakeBundle, FakeRemote};
  use std::time::Duration as StdDuration;

  struct Harness {
    store: Arc<MemoryStore>,
    bundle: Arc<FakeBundle>,
    remote: Arc<FakeRemote>,
    coordinator: Arc<CacheCoordinator>,
  }

  fn settings() -> CoordinatorSettings {
    CoordinatorSettings {
      page_size: 10,
      stale_after: Duration::hours(24),
      artwork_base: "https://art".to_string(),
    }
  }

  fn harness(connectivity: ConnectivityMonitor, bundle: FakeBundle, remote: FakeRemote) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let bundle = Arc::new(bundle);
    let remote = Arc::new(remote);
    let coordinator = Arc::new(CacheCoordinator::new(
      store.clone(),
      bundle.clone(),
      remote.clone(),
      connectivity,
      settings(),
    ));
    Harness {
      store,
      bundle,
      remote,
      coordinator,
    }
  }

  fn hours_ago(hours: i64) -> i64 {
    now_millis() - Duration::hours(hours).num_milliseconds()
  }

  #[tokio::test]
  async fn test_offline_refresh_on_empty_store() {
    let h = harness(offline(), FakeBundle::with_pages(1), FakeRemote::new(100));

    let result = h.coordinator.refresh_if_needed(false).await;

    assert_eq!(result, Err(CacheError::NoConnectivity));
    assert_eq!(h.store.count().unwrap(), 0);
    assert_eq!(h.bundle.reads(), 0);
    assert_eq!(h.remote.calls(), 0);
  }

  #[tokio::test]
  async fn test_offline_forced_refresh_does_not_mutate() {
    let h = harness(offline(), FakeBundle::with_pages(1), FakeRemote::new(100));
    h.store.upsert(&record(1, "bulbasaur", hours_ago(48))).unwrap();

    let result = h.coordinator.refresh_if_needed(true).await;

    assert_eq!(result, Err(CacheError::NoConnectivity));
    assert_eq!(h.store.count().unwrap(), 1);
    assert_eq!(h.remote.calls(), 0);
  }

  #[tokio::test]
  async fn test_fresh_cache_is_a_noop() {
    let h = harness(online(), FakeBundle::with_pages(2), FakeRemote::new(100));
    h.store.upsert(&record(1, "bulbasaur", hours_ago(23))).unwrap();

    let result = h.coordinator.refresh_if_needed(false).await;

    assert_eq!(result, Ok(Outcome::Fresh));
    assert_eq!(h.remote.calls(), 0);
    assert_eq!(h.bundle.reads(), 0);
  }

  #[tokio::test]
  async fn test_stale_cache_fetches_from_remote() {
    let h = harness(online(), FakeBundle::with_pages(2), FakeRemote::new(100));
    h.store.upsert(&record(1, "bulbasaur", hours_ago(25))).unwrap();
    assert!(h.coordinator.is_cache_stale().unwrap());

    let result = h.coordinator.refresh_if_needed(false).await;

    assert_eq!(result, Ok(Outcome::Stored(10)));
    assert_eq!(h.remote.calls(), 1);
    assert_eq!(h.store.count().unwrap(), 10);
    assert!(!h.coordinator.is_cache_stale().unwrap());
    let refreshed = h.store.get(1).unwrap().unwrap();
    assert_eq!(refreshed.name, "remote-1");
    assert!(refreshed.last_fetched_at > hours_ago(1));
  }

  #[tokio::test]
  async fn test_forced_refresh_fetches_even_when_fresh() {
    let h = harness(online(), FakeBundle::with_pages(2), FakeRemote::new(100));
    h.coordinator.load_more(0).await.unwrap();
    h.coordinator.load_more(1).await.unwrap();
    assert_eq!(h.coordinator.page_cursor(), 2);

    let result = h.coordinator.refresh_if_needed(true).await;

    assert_eq!(result, Ok(Outcome::Stored(20)));
    assert_eq!(h.remote.calls(), 2);
    assert_eq!(h.coordinator.page_cursor(), 0);
  }

  #[tokio::test]
  async fn test_empty_store_bootstraps_from_bundle() {
    let h = harness(online(), FakeBundle::with_pages(2), FakeRemote::new(100));

    let result = h.coordinator.refresh_if_needed(false).await;

    assert_eq!(result, Ok(Outcome::Stored(10)));
    assert_eq!(h.remote.calls(), 0);
    assert_eq!(h.coordinator.page_cursor(), 1);
    assert_eq!(h.store.get(1).unwrap().unwrap().name, "bundled-1");
  }

  #[tokio::test]
  async fn test_empty_store_without_bundle_uses_remote() {
    let h = harness(online(), FakeBundle::with_pages(0), FakeRemote::new(5));

    let result = h.coordinator.refresh_if_needed(false).await;

    assert_eq!(result, Ok(Outcome::Stored(5)));
    assert_eq!(h.remote.calls(), 1);
  }

  #[tokio::test]
  async fn test_failed_fetch_keeps_existing_pages() {
    let h = harness(online(), FakeBundle::with_pages(0), FakeRemote::new(100));
    let old: Vec<CachedPokemon> = (1..=15).map(|id| record(id, "old", hours_ago(30))).collect();
    h.store.upsert_all(&old).unwrap();
    h.remote.fail_from_page(1);

    let result = h.coordinator.refresh_if_needed(false).await;

    assert!(matches!(result, Err(CacheError::FetchFailed(_))));
    assert_eq!(h.store.count().unwrap(), 15);
    // First page landed, second page was never written
    assert_eq!(h.store.get(10).unwrap().unwrap().name, "remote-10");
    assert_eq!(h.store.get(11).unwrap().unwrap().name, "old");
  }

  #[tokio::test]
  async fn test_load_more_then_missing_page() {
    let h = harness(online(), FakeBundle::with_pages(1), FakeRemote::new(100));

    assert_eq!(h.coordinator.load_more(0).await, Ok(Outcome::Stored(10)));
    assert_eq!(h.store.count().unwrap(), 10);
    assert_eq!(h.coordinator.page_cursor(), 1);

    assert_eq!(h.coordinator.load_more(1).await, Err(CacheError::NoMorePages));
    assert_eq!(h.store.count().unwrap(), 10);
    assert_eq!(h.coordinator.page_cursor(), 1);
    assert!(h.coordinator.no_more_pages());
  }

  #[tokio::test]
  async fn test_cursor_stays_put_past_the_end() {
    let h = harness(offline(), FakeBundle::with_pages(2), FakeRemote::new(0));

    let mut results = Vec::new();
    for _ in 0..5 {
      results.push(h.coordinator.load_next_page().await);
    }

    assert_eq!(results[0], Ok(Outcome::Stored(10)));
    assert_eq!(results[1], Ok(Outcome::Stored(10)));
    for result in &results[2..] {
      assert_eq!(*result, Err(CacheError::NoMorePages));
    }
    assert_eq!(h.coordinator.page_cursor(), 2);
  }

  #[tokio::test]
  async fn test_malformed_page_is_skipped() {
    let bundle = FakeBundle::with_pages(2).with_broken_page(0);
    let h = harness(offline(), bundle, FakeRemote::new(0));

    let first = h.coordinator.load_next_page().await;
    assert!(matches!(first, Err(CacheError::Decode { page: 0, .. })));
    assert_eq!(h.coordinator.page_cursor(), 1);
    assert_eq!(h.store.count().unwrap(), 0);

    assert_eq!(h.coordinator.load_next_page().await, Ok(Outcome::Stored(10)));
    assert_eq!(h.store.get(11).unwrap().unwrap().name, "bundled-11");
  }

  #[tokio::test]
  async fn test_second_operation_while_in_flight_is_noop() {
    let remote = FakeRemote::new(100).with_delay(StdDuration::from_millis(200));
    let h = harness(online(), FakeBundle::with_pages(1), remote);
    h.store.upsert(&record(1, "bulbasaur", now_millis())).unwrap();

    let coordinator = h.coordinator.clone();
    let refresh = tokio::spawn(async move { coordinator.refresh_if_needed(true).await });
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    assert_eq!(h.coordinator.load_more(0).await, Ok(Outcome::Busy));
    assert_eq!(h.coordinator.refresh_if_needed(true).await, Ok(Outcome::Busy));
    assert_eq!(h.bundle.reads(), 0);

    assert_eq!(refresh.await.unwrap(), Ok(Outcome::Stored(10)));
    assert_eq!(h.remote.calls(), 1);
    assert_eq!(h.coordinator.load_more(0).await, Ok(Outcome::Stored(10)));
  }

  #[tokio::test]
  async fn test_clear_after_insert_leaves_store_empty() {
    let h = harness(online(), FakeBundle::with_pages(1), FakeRemote::new(100));
    h.coordinator.load_more(0).await.unwrap();

    h.coordinator.clear_cache().unwrap();

    assert!(h.coordinator.is_cache_empty().unwrap());
    assert!(h.coordinator.is_cache_stale().unwrap());
  }

  #[tokio::test]
  async fn test_malformed_bootstrap_page_falls_through_to_remote() {
    let bundle = FakeBundle::with_pages(2).with_broken_page(0);
    let h = harness(online(), bundle, FakeRemote::new(100));

    let result = h.coordinator.refresh_if_needed(false).await;

    assert_eq!(result, Ok(Outcome::Stored(10)));
    assert_eq!(h.remote.calls(), 1);
    assert_eq!(h.coordinator.page_cursor(), 1);
    assert_eq!(h.store.get(1).unwrap().unwrap().name, "remote-1");
  }

  #[tokio::test]
  async fn test_refresh_after_clear_resumes_at_cursor() {
    let h = harness(online(), FakeBundle::with_pages(3), FakeRemote::new(100));
    h.coordinator.load_more(0).await.unwrap();
    h.coordinator.clear_cache().unwrap();
    assert_eq!(h.coordinator.page_cursor(), 1);

    assert_eq!(h.coordinator.refresh_if_needed(false).await, Ok(Outcome::Stored(10)));
    assert_eq!(h.store.get(1).unwrap(), None);
    assert_eq!(h.store.get(11).unwrap().unwrap().name, "bundled-11");

    h.coordinator.clear_cache().unwrap();
    assert_eq!(h.coordinator.refresh_if_needed(true).await, Ok(Outcome::Stored(10)));
    assert_eq!(h.store.get(1).unwrap().unwrap().name, "bundled-1");
    assert_eq!(h.coordinator.page_cursor(), 1);
  }

  /// Clear once while a forced refresh is waiting on the network and once
  /// after it lands; the later clear wins and the feed agrees with the table.
  async fn clear_during_refresh(store: Arc<dyn RecordStore>) {
    store.upsert(&record(1, "bulbasaur", now_millis())).unwrap();
    let remote = Arc::new(FakeRemote::new(100).with_delay(StdDuration::from_millis(200)));
    let coordinator = Arc::new(CacheCoordinator::new(
      store.clone(),
      Arc::new(FakeBundle::with_pages(1)),
      remote.clone(),
      online(),
      settings(),
    ));
    let feed = store.subscribe();

    let refreshing = coordinator.clone();
    let refresh = tokio::spawn(async move { refreshing.refresh_if_needed(true).await });
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    coordinator.clear_cache().unwrap();
    assert_eq!(store.count().unwrap(), 0);

    assert_eq!(refresh.await.unwrap(), Ok(Outcome::Stored(10)));
    assert_eq!(remote.calls(), 1);
    assert_eq!(store.count().unwrap(), 10);

    coordinator.clear_cache().unwrap();
    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(store.last_fetched_at().unwrap(), None);
    assert_eq!(feed.borrow().len(), store.count().unwrap());
  }

  #[tokio::test]
  async fn test_clear_during_refresh_in_memory() {
    clear_during_refresh(Arc::new(MemoryStore::new())).await;
  }

  #[tokio::test]
  async fn test_clear_during_refresh_in_sqlite() {
    let db = Database::open_in_memory().unwrap();
    clear_during_refresh(Arc::new(SqliteStore::new(db).unwrap())).await;
  }

  #[tokio::test]
  async fn test_observe_replays_and_follows_store() {
    let h = harness(online(), FakeBundle::with_pages(1), FakeRemote::new(100));
    h.store.upsert(&record(3, "venusaur", now_millis())).unwrap();

    let mut observed = h.coordinator.observe_cached_pokemon();
    let first = observed.next().await.unwrap();
    assert_eq!(first.len(), 1);

    h.coordinator.load_more(0).await.unwrap();
    let second = observed.next().await.unwrap();
    assert_eq!(second.len(), 10);
    assert_eq!(second[0].id, 1);

    h.coordinator.clear_cache().unwrap();
    assert!(observed.next().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_fetch_one_prefers_fresh_cache() {
    let h = harness(online(), FakeBundle::with_pages(0), FakeRemote::new(100));
    h.store.upsert(&record(7, "squirtle", now_millis())).unwrap();

    let pokemon = h.coordinator.fetch_one(7).await.unwrap();

    assert_eq!(pokemon.name, "squirtle");
    assert_eq!(h.remote.calls(), 0);
  }

  #[tokio::test]
  async fn test_fetch_one_refreshes_missing_and_uses_artwork_fallback() {
    let h = harness(online(), FakeBundle::with_pages(0), FakeRemote::new(100));

    let pokemon = h.coordinator.fetch_one(42).await.unwrap();

    assert_eq!(pokemon.name, "remote-42");
    let stored = h.store.get(42).unwrap().unwrap();
    assert_eq!(stored.image_url, "https://art/42.png");
  }

  #[tokio::test]
  async fn test_fetch_one_offline_serves_stale_or_fails() {
    let h = harness(offline(), FakeBundle::with_pages(0), FakeRemote::new(100));
    h.store.upsert(&record(1, "bulbasaur", hours_ago(72))).unwrap();

    assert_eq!(h.coordinator.fetch_one(1).await.unwrap().name, "bulbasaur");
    assert_eq!(
      h.coordinator.fetch_one(2).await,
      Err(CacheError::NoConnectivity)
    );
    assert_eq!(h.coordinator.cached(2), Ok(None));
  }
}

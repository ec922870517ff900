//! Builders and fakes shared by unit tests.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::{CacheError, CacheResult, PageSource, RemoteSource};
use crate::connectivity::{
  ConnectivityMonitor, ManualPlatform, NetworkCapabilities, NetworkEvent, NetworkId,
};
use crate::pokedex::types::{CachedPokemon, FetchedPokemon, Pokemon, Stats};

pub fn pokemon(id: u32, name: &str) -> Pokemon {
  Pokemon {
    id,
    name: name.to_string(),
    types: vec!["normal".to_string()],
    weight: 10.0,
    height: 1.0,
    stats: Stats::default(),
  }
}

pub fn record(id: u32, name: &str, fetched_at: i64) -> CachedPokemon {
  CachedPokemon::new(
    &pokemon(id, name),
    format!("https://art/{}.png", id),
    fetched_at,
  )
}

/// Page `index` of `size` Pokémon named `<prefix>-<id>`
pub fn page(index: usize, size: usize, prefix: &str) -> Vec<Pokemon> {
  let start = index * size + 1;
  (start..start + size)
    .map(|id| pokemon(id as u32, &format!("{}-{}", prefix, id)))
    .collect()
}

pub fn online() -> ConnectivityMonitor {
  let platform = Arc::new(ManualPlatform::new());
  platform.emit(NetworkEvent::Available {
    network: NetworkId(1),
    capabilities: NetworkCapabilities::ONLINE,
  });
  ConnectivityMonitor::new(platform)
}

pub fn offline() -> ConnectivityMonitor {
  ConnectivityMonitor::new(Arc::new(ManualPlatform::new()))
}

/// Bundle with `pages` full pages of ten, named `bundled-<id>`
pub struct FakeBundle {
  pages: usize,
  broken: HashSet<usize>,
  reads: AtomicUsize,
}

impl FakeBundle {
  pub fn with_pages(pages: usize) -> Self {
    Self {
      pages,
      broken: HashSet::new(),
      reads: AtomicUsize::new(0),
    }
  }

  pub fn with_broken_page(mut self, index: usize) -> Self {
    self.broken.insert(index);
    self
  }

  pub fn reads(&self) -> usize {
    self.reads.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PageSource for FakeBundle {
  async fn page(&self, index: usize) -> CacheResult<Option<Vec<Pokemon>>> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    if index >= self.pages {
      return Ok(None);
    }
    if self.broken.contains(&index) {
      return Err(CacheError::Decode {
        page: index,
        reason: "unexpected end of input".to_string(),
      });
    }
    Ok(Some(page(index, 10, "bundled")))
  }
}

/// Remote API serving ids `1..=total`, named `remote-<id>`
pub struct FakeRemote {
  total: usize,
  calls: AtomicUsize,
  fail_from_page: Mutex<Option<usize>>,
  delay: Duration,
}

impl FakeRemote {
  pub fn new(total: usize) -> Self {
    Self {
      total,
      calls: AtomicUsize::new(0),
      fail_from_page: Mutex::new(None),
      delay: Duration::ZERO,
    }
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  /// Make every page request at or after `page` (in pages of `limit`) fail
  pub fn fail_from_page(&self, page: usize) {
    *self.fail_from_page.lock().unwrap() = Some(page);
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl RemoteSource for FakeRemote {
  async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<FetchedPokemon>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }

    let page = offset / limit.max(1);
    if let Some(fail_from) = *self.fail_from_page.lock().unwrap() {
      if page >= fail_from {
        return Err(eyre!("connection reset while fetching page {}", page));
      }
    }

    let end = (offset + limit).min(self.total);
    Ok(
      (offset + 1..=end)
        .map(|id| FetchedPokemon {
          pokemon: pokemon(id as u32, &format!("remote-{}", id)),
          artwork_url: None,
        })
        .collect(),
    )
  }

  async fn fetch_one(&self, id: u32) -> Result<FetchedPokemon> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if id as usize > self.total {
      return Err(eyre!("GET /pokemon/{} returned 404 Not Found", id));
    }
    Ok(FetchedPokemon {
      pokemon: pokemon(id, &format!("remote-{}", id)),
      artwork_url: None,
    })
  }
}

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use futures::future::try_join_all;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::cache::RemoteSource;
use crate::config::Config;
use crate::pokedex::api_types::{ApiPokemonDetail, ApiPokemonList};
use crate::pokedex::types::FetchedPokemon;

/// PokeAPI client
#[derive(Clone)]
pub struct PokeApiClient {
  http: reqwest::Client,
  base: Url,
}

impl PokeApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .user_agent(concat!("dex/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Self::with_client(http, &config.api.base_url)
  }

  pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self> {
    // A trailing slash makes relative joins append instead of replace
    let normalized = format!("{}/", base_url.trim_end_matches('/'));
    let base =
      Url::parse(&normalized).map_err(|e| eyre!("Invalid API base URL {}: {}", base_url, e))?;

    Ok(Self { http, base })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))
  }

  async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("GET {} returned {}", url, status));
    }

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))
  }

  /// List one page of Pokémon ids
  pub async fn list(&self, offset: usize, limit: usize) -> Result<Vec<u32>> {
    let mut url = self.endpoint("pokemon")?;
    url
      .query_pairs_mut()
      .append_pair("limit", &limit.to_string())
      .append_pair("offset", &offset.to_string());

    let response: ApiPokemonList = self.get_json(url).await?;
    debug!(
      offset,
      limit,
      total = response.count,
      returned = response.results.len(),
      "listed Pokémon"
    );

    response
      .results
      .iter()
      .map(|entry| {
        entry
          .id()
          .ok_or_else(|| eyre!("Cannot read id of {} from {}", entry.name, entry.url))
      })
      .collect()
  }

  /// Get a single Pokémon with types, stats and artwork
  pub async fn detail(&self, id: u32) -> Result<FetchedPokemon> {
    let url = self.endpoint(&format!("pokemon/{}", id))?;
    let detail: ApiPokemonDetail = self.get_json(url).await?;
    Ok(detail.into_fetched())
  }
}

#[async_trait]
impl RemoteSource for PokeApiClient {
  async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<FetchedPokemon>> {
    let ids = self.list(offset, limit).await?;
    try_join_all(ids.into_iter().map(|id| self.detail(id))).await
  }

  async fn fetch_one(&self, id: u32) -> Result<FetchedPokemon> {
    self.detail(id).await
  }
}

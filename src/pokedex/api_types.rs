//! Serde-deserializable types matching PokeAPI responses and bundled page files.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;

use super::types::{FetchedPokemon, Pokemon, Stats};

// ============================================================================
// List endpoint: GET /pokemon?limit=&offset=
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiPokemonList {
  #[serde(default)]
  pub count: u32,
  #[serde(default)]
  pub results: Vec<ApiNamedResource>,
}

#[derive(Debug, Deserialize)]
pub struct ApiNamedResource {
  pub name: String,
  pub url: String,
}

impl ApiNamedResource {
  /// Pokémon id from the trailing path segment (".../pokemon/25/").
  pub fn id(&self) -> Option<u32> {
    self
      .url
      .trim_end_matches('/')
      .rsplit('/')
      .next()
      .and_then(|segment| segment.parse().ok())
  }
}

// ============================================================================
// Detail endpoint: GET /pokemon/{id}
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiPokemonDetail {
  pub id: u32,
  pub name: String,
  /// Decimetres
  #[serde(default)]
  pub height: u32,
  /// Hectograms
  #[serde(default)]
  pub weight: u32,
  #[serde(default)]
  pub types: Vec<ApiTypeSlot>,
  #[serde(default)]
  pub sprites: ApiSprites,
  #[serde(default)]
  pub stats: Vec<ApiStat>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTypeSlot {
  pub slot: u32,
  #[serde(rename = "type")]
  pub kind: ApiNamedRef,
}

#[derive(Debug, Deserialize)]
pub struct ApiNamedRef {
  pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSprites {
  pub other: Option<ApiOtherSprites>,
}

#[derive(Debug, Deserialize)]
pub struct ApiOtherSprites {
  #[serde(rename = "official-artwork")]
  pub official_artwork: Option<ApiArtwork>,
}

#[derive(Debug, Deserialize)]
pub struct ApiArtwork {
  pub front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStat {
  pub base_stat: u32,
  pub stat: ApiNamedRef,
}

impl ApiPokemonDetail {
  pub fn into_fetched(self) -> FetchedPokemon {
    let artwork_url = self
      .sprites
      .other
      .and_then(|other| other.official_artwork)
      .and_then(|artwork| artwork.front_default);

    let mut types = self.types;
    types.sort_by_key(|t| t.slot);

    let stats = Stats::from_named(self.stats.iter().map(|s| (s.stat.name.as_str(), s.base_stat)));

    FetchedPokemon {
      pokemon: Pokemon {
        id: self.id,
        name: self.name,
        types: types.into_iter().map(|t| t.kind.name).collect(),
        weight: self.weight as f32 / 10.0,
        height: self.height as f32 / 10.0,
        stats,
      },
      artwork_url,
    }
  }
}

// ============================================================================
// Bundled page files
// ============================================================================

/// Body of a bundled page file: either an envelope with a declared id range
/// or a bare list of entities.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BundlePage {
  Envelope {
    range: BundleRange,
    items: Vec<BundlePokemon>,
  },
  Bare(Vec<BundleEntity>),
}

#[derive(Debug, Deserialize)]
pub struct BundleRange {
  pub start: u32,
  pub end: u32,
}

#[derive(Debug, Deserialize)]
pub struct BundlePokemon {
  pub id: u32,
  pub name: String,
  #[serde(rename = "type", alias = "types", default)]
  pub types: Vec<String>,
  #[serde(default)]
  pub weight: f32,
  #[serde(default)]
  pub height: f32,
  #[serde(default)]
  pub stats: Vec<BundleStat>,
}

/// Entity in a bare page: stats are a record rather than a name/value list
#[derive(Debug, Deserialize)]
pub struct BundleEntity {
  pub id: u32,
  pub name: String,
  #[serde(alias = "type", default)]
  pub types: Vec<String>,
  #[serde(default)]
  pub weight: f32,
  #[serde(default)]
  pub height: f32,
  #[serde(default)]
  pub stats: Stats,
}

#[derive(Debug, Deserialize)]
pub struct BundleStat {
  pub name: String,
  pub value: u32,
}

impl BundlePage {
  /// Split into the declared id range (envelopes only) and the entries.
  pub fn into_parts(self) -> (Option<BundleRange>, Vec<Pokemon>) {
    match self {
      BundlePage::Envelope { range, items } => (
        Some(range),
        items.into_iter().map(BundlePokemon::into_pokemon).collect(),
      ),
      BundlePage::Bare(items) => (None, items.into_iter().map(Pokemon::from).collect()),
    }
  }
}

impl BundlePokemon {
  pub fn into_pokemon(self) -> Pokemon {
    let stats = Stats::from_named(self.stats.iter().map(|s| (s.name.as_str(), s.value)));
    Pokemon {
      id: self.id,
      name: self.name,
      types: self.types,
      weight: self.weight,
      height: self.height,
      stats,
    }
  }
}

impl From<BundleEntity> for Pokemon {
  fn from(entity: BundleEntity) -> Self {
    Pokemon {
      id: entity.id,
      name: entity.name,
      types: entity.types,
      weight: entity.weight,
      height: entity.height,
      stats: entity.stats,
    }
  }
}

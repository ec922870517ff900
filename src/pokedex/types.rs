use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base stats of a Pokémon. Bundled entities spell the two special stats
/// in camelCase; missing stats read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
  pub hp: u32,
  pub attack: u32,
  pub defense: u32,
  #[serde(alias = "specialAttack")]
  pub special_attack: u32,
  #[serde(alias = "specialDefense")]
  pub special_defense: u32,
  pub speed: u32,
}

impl Stats {
  /// Build stats from `(name, value)` pairs using PokeAPI stat names.
  /// Unknown names are ignored, missing ones stay at zero.
  pub fn from_named<'a>(pairs: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
    let mut stats = Stats::default();
    for (name, value) in pairs {
      match name {
        "hp" => stats.hp = value,
        "attack" => stats.attack = value,
        "defense" => stats.defense = value,
        "special-attack" => stats.special_attack = value,
        "special-defense" => stats.special_defense = value,
        "speed" => stats.speed = value,
        _ => {}
      }
    }
    stats
  }

  /// Labelled stats in display order
  pub fn labelled(&self) -> [(&'static str, u32); 6] {
    [
      ("HP", self.hp),
      ("Attack", self.attack),
      ("Defense", self.defense),
      ("Sp. Atk", self.special_attack),
      ("Sp. Def", self.special_defense),
      ("Speed", self.speed),
    ]
  }
}

/// A single Pokédex entry
#[derive(Debug, Clone, PartialEq)]
pub struct Pokemon {
  pub id: u32,
  pub name: String,
  pub types: Vec<String>,
  /// Kilograms
  pub weight: f32,
  /// Metres
  pub height: f32,
  pub stats: Stats,
}

/// A Pokémon as returned by the remote API, with the artwork URL if the
/// payload carried one.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPokemon {
  pub pokemon: Pokemon,
  pub artwork_url: Option<String>,
}

/// Persisted projection of a [`Pokemon`].
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPokemon {
  pub id: u32,
  pub name: String,
  pub image_url: String,
  pub types: Vec<String>,
  pub weight: f32,
  pub height: f32,
  pub hp: u32,
  pub attack: u32,
  pub defense: u32,
  pub special_attack: u32,
  pub special_defense: u32,
  pub speed: u32,
  /// Milliseconds since the Unix epoch, stamped when the record is written
  pub last_fetched_at: i64,
}

impl CachedPokemon {
  pub fn new(pokemon: &Pokemon, image_url: String, fetched_at: i64) -> Self {
    Self {
      id: pokemon.id,
      name: pokemon.name.clone(),
      image_url,
      types: pokemon.types.clone(),
      weight: pokemon.weight,
      height: pokemon.height,
      hp: pokemon.stats.hp,
      attack: pokemon.stats.attack,
      defense: pokemon.stats.defense,
      special_attack: pokemon.stats.special_attack,
      special_defense: pokemon.stats.special_defense,
      speed: pokemon.stats.speed,
      last_fetched_at: fetched_at,
    }
  }

  pub fn to_pokemon(&self) -> Pokemon {
    Pokemon {
      id: self.id,
      name: self.name.clone(),
      types: self.types.clone(),
      weight: self.weight,
      height: self.height,
      stats: Stats {
        hp: self.hp,
        attack: self.attack,
        defense: self.defense,
        special_attack: self.special_attack,
        special_defense: self.special_defense,
        speed: self.speed,
      },
    }
  }
}

/// Fallback artwork location for a Pokémon id.
pub fn artwork_url(artwork_base: &str, id: u32) -> String {
  format!("{}/{}.png", artwork_base.trim_end_matches('/'), id)
}

/// Ordering applied to the list view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SortOrder {
  #[default]
  #[value(name = "number-asc")]
  ByNumberAsc,
  #[value(name = "number-desc")]
  ByNumberDesc,
  #[value(name = "name-asc")]
  ByNameAsc,
  #[value(name = "name-desc")]
  ByNameDesc,
}

impl SortOrder {
  pub const ALL: [SortOrder; 4] = [
    SortOrder::ByNumberAsc,
    SortOrder::ByNumberDesc,
    SortOrder::ByNameAsc,
    SortOrder::ByNameDesc,
  ];

  /// Persisted form of the sort order
  pub fn as_str(self) -> &'static str {
    match self {
      SortOrder::ByNumberAsc => "BY_NUMBER_ASC",
      SortOrder::ByNumberDesc => "BY_NUMBER_DESC",
      SortOrder::ByNameAsc => "BY_NAME_ASC",
      SortOrder::ByNameDesc => "BY_NAME_DESC",
    }
  }
}

impl fmt::Display for SortOrder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SortOrder {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    SortOrder::ALL
      .into_iter()
      .find(|order| order.as_str() == s)
      .ok_or_else(|| format!("Unknown sort order: {}", s))
  }
}

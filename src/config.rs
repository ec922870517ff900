use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub cache: CacheConfig,
  pub bundle: BundleConfig,
  pub connectivity: ConnectivityConfig,
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
  /// Used to build artwork URLs when a response carries none
  pub artwork_base: String,
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://pokeapi.co/api/v2".to_string(),
      artwork_base:
        "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork"
          .to_string(),
      timeout_secs: 15,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Database file (defaults to $XDG_DATA_HOME/dex/cache.db)
  pub path: Option<PathBuf>,
  pub page_size: usize,
  /// Age after which cached data is refreshed
  pub stale_after_hours: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      path: None,
      page_size: 10,
      stale_after_hours: 24,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
  /// Directory of bundled page files (defaults to $XDG_DATA_HOME/dex/bundle)
  pub dir: Option<PathBuf>,
  pub prefix: String,
}

impl Default for BundleConfig {
  fn default() -> Self {
    Self {
      dir: None,
      prefix: "pokemon".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
  /// host:port probed to decide whether the API is reachable
  pub probe_addr: String,
  pub interval_secs: u64,
  pub timeout_ms: u64,
}

impl Default for ConnectivityConfig {
  fn default() -> Self {
    Self {
      probe_addr: "pokeapi.co:443".to_string(),
      interval_secs: 5,
      timeout_ms: 1500,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// tracing filter directive; RUST_LOG takes precedence
  pub filter: String,
  /// Log directory (defaults to $XDG_DATA_HOME/dex/logs)
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      filter: "info".to_string(),
      dir: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./dex.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/dex/config.yaml
  ///
  /// Every setting has a default, so no file at all is fine.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };
    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("dex.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("dex").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(contents)?)
  }

  fn validate(&self) -> Result<()> {
    if self.cache.page_size == 0 {
      return Err(eyre!("cache.page_size must be at least 1"));
    }
    if self.cache.stale_after_hours < 0 {
      return Err(eyre!("cache.stale_after_hours must not be negative"));
    }
    Ok(())
  }

  /// Application data directory ($XDG_DATA_HOME/dex)
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("dex"))
  }

  pub fn bundle_dir(&self) -> Result<PathBuf> {
    match &self.bundle.dir {
      Some(dir) => Ok(dir.clone()),
      None => Ok(Self::data_dir()?.join("bundle")),
    }
  }

  pub fn log_dir(&self) -> Result<PathBuf> {
    match &self.log.dir {
      Some(dir) => Ok(dir.clone()),
      None => Ok(Self::data_dir()?.join("logs")),
    }
  }

  pub fn stale_after(&self) -> chrono::Duration {
    chrono::Duration::hours(self.cache.stale_after_hours)
  }
}

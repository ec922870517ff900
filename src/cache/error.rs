use thiserror::Error;

/// Failures surfaced by the cache coordinator.
///
/// Every variant is recoverable; the presentation layer decides how (or
/// whether) to show it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
  #[error("No internet connection")]
  NoConnectivity,

  #[error("Failed to fetch Pokémon: {0}")]
  FetchFailed(String),

  #[error("No more pages to load")]
  NoMorePages,

  #[error("Page {page} is malformed: {reason}")]
  Decode { page: usize, reason: String },

  #[error("Cache storage error: {0}")]
  Storage(String),
}

impl CacheError {
  /// Wrap a storage failure, keeping the full eyre chain in the message.
  pub fn storage(err: color_eyre::Report) -> Self {
    CacheError::Storage(format!("{:#}", err))
  }

  pub fn fetch(err: color_eyre::Report) -> Self {
    CacheError::FetchFailed(format!("{:#}", err))
  }
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

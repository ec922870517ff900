//! Pre-packaged pages of Pokémon read from a directory of JSON files.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::api_types::BundlePage;
use super::types::Pokemon;
use crate::cache::{CacheError, CacheResult, PageSource};

/// Directory of page files named `<prefix>_<start>_<end>.json`, the start id
/// zero-padded to three digits
#[derive(Debug, Clone)]
pub struct BundleDir {
  dir: PathBuf,
  prefix: String,
  page_size: usize,
}

impl BundleDir {
  pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, page_size: usize) -> Self {
    Self {
      dir: dir.into(),
      prefix: prefix.into(),
      page_size,
    }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn id_range(&self, index: usize) -> (usize, usize) {
    (index * self.page_size + 1, (index + 1) * self.page_size)
  }

  /// File name for a page holding ids `index * size + 1 ..= (index + 1) * size`.
  pub fn file_name(&self, index: usize) -> String {
    let (start, end) = self.id_range(index);
    format!("{}_{:03}_{}.json", self.prefix, start, end)
  }

  /// Older bundles pad both ends (`pokemon_001_010.json`).
  fn padded_file_name(&self, index: usize) -> String {
    let (start, end) = self.id_range(index);
    format!("{}_{:03}_{:03}.json", self.prefix, start, end)
  }

  /// Read the page file, trying the padded name when the plain one is missing.
  async fn read_page(&self, index: usize) -> std::io::Result<Option<(PathBuf, String)>> {
    let mut names = vec![self.file_name(index)];
    let padded = self.padded_file_name(index);
    if padded != names[0] {
      names.push(padded);
    }

    for name in names {
      let path = self.dir.join(name);
      match tokio::fs::read_to_string(&path).await {
        Ok(contents) => return Ok(Some((path, contents))),
        Err(e) if e.kind() == ErrorKind::NotFound => {
          debug!(path = %path.display(), "bundle page not found");
        }
        Err(e) => return Err(e),
      }
    }
    Ok(None)
  }
}

#[async_trait]
impl PageSource for BundleDir {
  async fn page(&self, index: usize) -> CacheResult<Option<Vec<Pokemon>>> {
    let (path, contents) = match self.read_page(index).await {
      Ok(Some(found)) => found,
      Ok(None) => return Ok(None),
      Err(e) => {
        return Err(CacheError::FetchFailed(format!(
          "Failed to read page {} from {}: {}",
          index,
          self.dir.display(),
          e
        )))
      }
    };

    let page: BundlePage = serde_json::from_str(&contents).map_err(|e| CacheError::Decode {
      page: index,
      reason: format!("{}: {}", path.display(), e),
    })?;

    let (range, pokemon) = page.into_parts();
    if let Some(range) = range {
      let (expected_start, _) = self.id_range(index);
      if range.start as usize != expected_start {
        warn!(
          path = %path.display(),
          start = range.start,
          end = range.end,
          expected_start,
          "bundle page declares an unexpected range"
        );
      }
    }

    Ok(Some(pokemon))
  }
}

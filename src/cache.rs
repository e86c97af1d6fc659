use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::ItemData;

pub const CACHE_FILE_NAME: &str = ".wnb.itemCache.json";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Error reading item cache {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error de-serialising item cache {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Error writing item cache {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error serialising item cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Item id -> item detail, persisted as one JSON object between runs.
///
/// Entries are never updated or expired: an item id is assumed to always
/// describe the same item. Keys are the decimal form of the id.
#[derive(Debug)]
pub struct ItemCache {
    path: PathBuf,
    store: Option<BTreeMap<String, ItemData>>,
}

impl ItemCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.store.is_some()
    }

    pub fn len(&self) -> usize {
        self.store.as_ref().map_or(0, BTreeMap::len)
    }

    /// Read the cache file once. A missing file starts an empty cache, a
    /// corrupt one is an error.
    pub fn load(&mut self) -> Result<&mut Self, CacheError> {
        if self.store.is_some() {
            return Ok(self);
        }

        let store = match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| CacheError::Parse {
                path: self.path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No item cache at {}, starting empty", self.path.display());
                BTreeMap::new()
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        self.store = Some(store);
        debug!("Item cache loaded ({} items)", self.len());
        Ok(self)
    }

    pub fn get(&mut self, id: u64) -> Option<&ItemData> {
        self.store
            .get_or_insert_with(BTreeMap::new)
            .get(&cache_key(id))
    }

    pub fn set(&mut self, id: u64, data: ItemData) -> &mut Self {
        self.store
            .get_or_insert_with(BTreeMap::new)
            .insert(cache_key(id), data);
        self
    }

    /// Write the whole cache back to disk. Does nothing if it was never used.
    pub fn persist(&self) -> Result<(), CacheError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string(store)?;
        std::fs::write(&self.path, content).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Item cache written to {} ({} items)", self.path.display(), store.len());
        Ok(())
    }
}

fn cache_key(id: u64) -> String {
    id.to_string()
}

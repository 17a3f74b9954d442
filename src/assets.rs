//! Logo lookup.
//!
//! Rendering only knows logical [`LogoKey`]s. Where the bytes come from is
//! decided by the [`AssetResolver`] handed to the renderer.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Error;
use crate::model::LogoKey;

pub type SharedAsset = Arc<Vec<u8>>;

pub trait AssetResolver: Send + Sync + Debug {
    /// Load the raw image bytes for `key`. A key without a backing asset is
    /// `Error::AssetNotFound`.
    fn load(&self, key: LogoKey) -> Result<SharedAsset, Error>;

    fn exists(&self, key: LogoKey) -> bool;
}

/// Resolves `<base>/<key>.png`.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    base: PathBuf,
}

impl DirectoryAssets {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn path_for(&self, key: LogoKey) -> PathBuf {
        self.base.join(format!("{}.png", key.as_str()))
    }
}

impl AssetResolver for DirectoryAssets {
    /// Any read failure of the key's file, not only a missing one, means the
    /// key has no usable asset.
    fn load(&self, key: LogoKey) -> Result<SharedAsset, Error> {
        let path = self.path_for(key);
        std::fs::read(&path)
            .map(Arc::new)
            .map_err(|e| Error::AssetNotFound(format!("{key} ({}): {e}", path.display())))
    }

    fn exists(&self, key: LogoKey) -> bool {
        self.path_for(key).is_file()
    }
}

/// Assets held in memory, for embedding hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAssets {
    assets: BTreeMap<LogoKey, SharedAsset>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: LogoKey, data: Vec<u8>) -> Self {
        self.insert(key, data);
        self
    }

    pub fn insert(&mut self, key: LogoKey, data: Vec<u8>) {
        self.assets.insert(key, Arc::new(data));
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetResolver for InMemoryAssets {
    fn load(&self, key: LogoKey) -> Result<SharedAsset, Error> {
        self.assets
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::AssetNotFound(key.to_string()))
    }

    fn exists(&self, key: LogoKey) -> bool {
        self.assets.contains_key(&key)
    }
}

impl<T: AssetResolver + ?Sized> AssetResolver for Arc<T> {
    fn load(&self, key: LogoKey) -> Result<SharedAsset, Error> {
        (**self).load(key)
    }

    fn exists(&self, key: LogoKey) -> bool {
        (**self).exists(key)
    }
}

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::Result,
    request::{AssetRequest, AssetResponse, CacheKey},
};

/// Named caches of request → response entries.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Creates the cache when missing.
    async fn open(&self, cache: &str) -> Result<()>;
    async fn cache_names(&self) -> Result<Vec<String>>;
    /// Returns whether a cache was removed.
    async fn delete(&self, cache: &str) -> Result<bool>;
    async fn lookup(&self, cache: &str, request: &AssetRequest) -> Result<Option<AssetResponse>>;
    async fn put(&self, cache: &str, request: &AssetRequest, response: AssetResponse)
        -> Result<()>;
    /// Stores every entry or none of them.
    async fn put_all(&self, cache: &str, entries: Vec<(AssetRequest, AssetResponse)>)
        -> Result<()>;
}

type Entries = HashMap<CacheKey, AssetResponse>;

#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<BTreeMap<String, Entries>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entry_count(&self, cache: &str) -> usize {
        self.caches
            .read()
            .await
            .get(cache)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, cache: &str) -> Result<()> {
        self.caches
            .write()
            .await
            .entry(cache.to_string())
            .or_default();
        Ok(())
    }

    async fn cache_names(&self) -> Result<Vec<String>> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }

    async fn delete(&self, cache: &str) -> Result<bool> {
        Ok(self.caches.write().await.remove(cache).is_some())
    }

    async fn lookup(&self, cache: &str, request: &AssetRequest) -> Result<Option<AssetResponse>> {
        let caches = self.caches.read().await;
        Ok(caches
            .get(cache)
            .and_then(|entries| entries.get(&request.cache_key()))
            .cloned())
    }

    async fn put(
        &self,
        cache: &str,
        request: &AssetRequest,
        response: AssetResponse,
    ) -> Result<()> {
        self.caches
            .write()
            .await
            .entry(cache.to_string())
            .or_default()
            .insert(request.cache_key(), response);
        Ok(())
    }

    async fn put_all(
        &self,
        cache: &str,
        entries: Vec<(AssetRequest, AssetResponse)>,
    ) -> Result<()> {
        let mut caches = self.caches.write().await;
        let target = caches.entry(cache.to_string()).or_default();
        target.extend(
            entries
                .into_iter()
                .map(|(request, response)| (request.cache_key(), response)),
        );
        Ok(())
    }
}

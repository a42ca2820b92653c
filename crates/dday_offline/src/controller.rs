use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use http::Method;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{OfflineError, Result},
    manifest::AssetManifest,
    network::Network,
    request::{AssetRequest, AssetResponse},
    storage::CacheStorage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; a later install attempt may start over.
    Redundant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// Cached root document served for a navigation that failed offline.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: AssetResponse,
    pub source: ResponseSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub removed_caches: Vec<String>,
}

/// Drives install → activate for one cache generation and answers fetches.
/// Fetch handling takes `&self`, so any number of requests may be in flight.
pub struct OfflineCacheController {
    manifest: AssetManifest,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    state: Mutex<LifecycleState>,
    controls_clients: AtomicBool,
}

impl OfflineCacheController {
    pub fn new(
        manifest: AssetManifest,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            manifest,
            storage,
            network,
            state: Mutex::new(LifecycleState::Parsed),
            controls_clients: AtomicBool::new(false),
        }
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    /// True once activation has finished cleaning up and claimed open pages.
    pub fn controls_clients(&self) -> bool {
        self.controls_clients.load(Ordering::Acquire)
    }

    /// Fetches and stores every manifest asset. Succeeds only when all of them
    /// were stored; any failure leaves the cache untouched and the controller
    /// `Redundant`.
    #[instrument(skip(self), fields(cache = %self.manifest.cache_name()))]
    pub async fn install(&self) -> Result<()> {
        self.begin(
            &[LifecycleState::Parsed, LifecycleState::Redundant],
            LifecycleState::Installing,
            "install",
        )?;
        match self.populate().await {
            Ok(stored) => {
                self.set_state(LifecycleState::Installed);
                info!(stored, "offline cache installed");
                Ok(())
            }
            Err(err) => {
                self.set_state(LifecycleState::Redundant);
                warn!(%err, "offline cache install failed");
                Err(err)
            }
        }
    }

    async fn populate(&self) -> Result<usize> {
        let cache = self.manifest.cache_name();
        self.storage.open(cache).await?;

        let requests: Vec<AssetRequest> = self
            .manifest
            .assets()
            .iter()
            .map(|path| AssetRequest::get(path.as_str()))
            .collect();
        let responses =
            try_join_all(requests.iter().map(|request| self.network.fetch(request))).await?;

        let mut entries = Vec::with_capacity(requests.len());
        for (request, response) in requests.into_iter().zip(responses) {
            if !response.status.is_success() {
                return Err(OfflineError::BadStatus {
                    path: request.path,
                    status: response.status,
                });
            }
            entries.push((request, response));
        }
        let stored = entries.len();
        self.storage.put_all(cache, entries).await?;
        Ok(stored)
    }

    /// Deletes every cache except the current generation, then claims clients.
    #[instrument(skip(self), fields(cache = %self.manifest.cache_name()))]
    pub async fn activate(&self) -> Result<ActivationReport> {
        self.begin(
            &[LifecycleState::Installed],
            LifecycleState::Activating,
            "activate",
        )?;
        match self.remove_stale_caches().await {
            Ok(removed_caches) => {
                self.set_state(LifecycleState::Activated);
                self.controls_clients.store(true, Ordering::Release);
                info!(removed = removed_caches.len(), "offline cache activated");
                Ok(ActivationReport { removed_caches })
            }
            Err(err) => {
                self.set_state(LifecycleState::Installed);
                warn!(%err, "offline cache activation failed");
                Err(err)
            }
        }
    }

    async fn remove_stale_caches(&self) -> Result<Vec<String>> {
        let current = self.manifest.cache_name();
        let mut removed = Vec::new();
        for name in self.storage.cache_names().await? {
            if name == current {
                continue;
            }
            if self.storage.delete(&name).await? {
                debug!(stale = %name, "removed stale cache");
                removed.push(name);
            }
        }
        Ok(removed)
    }

    /// Cache-first; on a miss the network answer is returned and, when it is a
    /// successful same-origin GET, a copy is stored first. A failed navigation
    /// falls back to the cached root document; other failures propagate.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<Served> {
        let is_get = request.method == Method::GET;
        if is_get {
            if let Some(response) = self.cached(request).await {
                debug!(path = %request.path, "cache hit");
                return Ok(Served {
                    response,
                    source: ResponseSource::Cache,
                });
            }
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if is_get && response.is_cacheable() {
                    let copy = response.clone();
                    if let Err(err) = self
                        .storage
                        .put(self.manifest.cache_name(), request, copy)
                        .await
                    {
                        warn!(path = %request.path, %err, "unable to cache network response");
                    }
                }
                Ok(Served {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(err) => {
                if request.is_navigation() {
                    let fallback = AssetRequest::get(self.manifest.fallback_document());
                    if let Some(response) = self.cached(&fallback).await {
                        debug!(path = %request.path, "offline navigation served from fallback");
                        return Ok(Served {
                            response,
                            source: ResponseSource::Fallback,
                        });
                    }
                }
                debug!(path = %request.path, %err, "fetch failed");
                Err(err.into())
            }
        }
    }

    async fn cached(&self, request: &AssetRequest) -> Option<AssetResponse> {
        match self
            .storage
            .lookup(self.manifest.cache_name(), request)
            .await
        {
            Ok(hit) => hit,
            Err(err) => {
                warn!(path = %request.path, %err, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    fn begin(
        &self,
        allowed: &[LifecycleState],
        next: LifecycleState,
        action: &'static str,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !allowed.contains(&*state) {
            return Err(OfflineError::InvalidState {
                action,
                state: *state,
            });
        }
        *state = next;
        Ok(())
    }

    fn set_state(&self, next: LifecycleState) {
        *self.state.lock() = next;
    }
}

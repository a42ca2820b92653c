//! Versioned offline cache for the client's static app shell: install
//! populates the cache, activate drops older generations, and fetch serves
//! cache-first with a network fallback.

pub mod controller;
pub mod error;
pub mod manifest;
pub mod network;
pub mod request;
pub mod storage;

pub use crate::controller::{
    ActivationReport, LifecycleState, OfflineCacheController, ResponseSource, Served,
};
pub use crate::error::{FetchError, OfflineError};
pub use crate::manifest::AssetManifest;

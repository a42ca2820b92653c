use std::collections::HashSet;

use crate::error::{OfflineError, Result};

/// Bump whenever [`APP_SHELL_ASSETS`] changes so clients drop the old cache.
pub const CACHE_VERSION: &str = "dday-cache-v1";

/// Served in place of any navigation that fails while offline.
pub const FALLBACK_DOCUMENT: &str = "/index.html";

pub const APP_SHELL_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/css/style.css",
    "/js/app.js",
    "/js/holidays.js",
    "/manifest.json",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
];

/// Versioned list of root-relative asset paths the shell needs offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    version: String,
    assets: Vec<String>,
    fallback_document: String,
}

impl AssetManifest {
    /// Duplicate paths are dropped, first occurrence wins.
    pub fn new<I, S>(version: impl Into<String>, assets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(OfflineError::InvalidManifest("empty cache version".into()));
        }
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for asset in assets {
            let asset = asset.into();
            if !asset.starts_with('/') {
                return Err(OfflineError::InvalidManifest(format!(
                    "asset `{asset}` is not root-relative"
                )));
            }
            if seen.insert(asset.clone()) {
                unique.push(asset);
            }
        }
        Ok(Self {
            version,
            assets: unique,
            fallback_document: FALLBACK_DOCUMENT.to_string(),
        })
    }

    pub fn app_shell() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            assets: APP_SHELL_ASSETS.iter().map(|asset| asset.to_string()).collect(),
            fallback_document: FALLBACK_DOCUMENT.to_string(),
        }
    }

    pub fn with_fallback_document(mut self, path: impl Into<String>) -> Self {
        self.fallback_document = path.into();
        self
    }

    /// The version tag doubles as the cache identifier.
    pub fn cache_name(&self) -> &str {
        &self.version
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn fallback_document(&self) -> &str {
        &self.fallback_document
    }
}

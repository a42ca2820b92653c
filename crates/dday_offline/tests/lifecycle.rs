use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dday_offline::{
    network::{DirectoryOrigin, Network},
    request::{AssetRequest, AssetResponse},
    storage::{CacheStorage, MemoryCacheStorage},
    AssetManifest, FetchError, LifecycleState, OfflineCacheController, OfflineError,
    ResponseSource,
};
use http::{Method, StatusCode};
use parking_lot::Mutex;

/// Scripted network: known paths answer 200, everything else 404, and any
/// path in `offline` fails outright. Counts every call.
#[derive(Default)]
struct ScriptedNetwork {
    assets: HashMap<String, AssetResponse>,
    offline: Mutex<HashSet<String>>,
    all_offline: Mutex<bool>,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    fn serving(paths: &[&str]) -> Self {
        let assets = paths
            .iter()
            .map(|path| (path.to_string(), AssetResponse::ok(format!("body of {path}"))))
            .collect();
        Self {
            assets,
            ..Self::default()
        }
    }

    fn with_response(mut self, path: &str, response: AssetResponse) -> Self {
        self.assets.insert(path.to_string(), response);
        self
    }

    fn fail(&self, path: &str) {
        self.offline.lock().insert(path.to_string());
    }

    fn go_offline(&self) {
        *self.all_offline.lock() = true;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.all_offline.lock() || self.offline.lock().contains(&request.path) {
            return Err(FetchError::Unreachable(request.path.clone()));
        }
        Ok(self
            .assets
            .get(&request.path)
            .cloned()
            .unwrap_or_else(|| AssetResponse::with_status(StatusCode::NOT_FOUND)))
    }
}

/// In-memory storage whose individual operations can be switched to fail.
#[derive(Default)]
struct FaultyStorage {
    inner: MemoryCacheStorage,
    failing: Mutex<HashSet<&'static str>>,
}

impl FaultyStorage {
    fn fail_on(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    fn check(&self, operation: &'static str) -> Result<(), OfflineError> {
        if self.failing.lock().contains(operation) {
            return Err(OfflineError::Storage(format!("{operation} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for FaultyStorage {
    async fn open(&self, cache: &str) -> Result<(), OfflineError> {
        self.check("open")?;
        self.inner.open(cache).await
    }

    async fn cache_names(&self) -> Result<Vec<String>, OfflineError> {
        self.check("cache_names")?;
        self.inner.cache_names().await
    }

    async fn delete(&self, cache: &str) -> Result<bool, OfflineError> {
        self.check("delete")?;
        self.inner.delete(cache).await
    }

    async fn lookup(
        &self,
        cache: &str,
        request: &AssetRequest,
    ) -> Result<Option<AssetResponse>, OfflineError> {
        self.check("lookup")?;
        self.inner.lookup(cache, request).await
    }

    async fn put(
        &self,
        cache: &str,
        request: &AssetRequest,
        response: AssetResponse,
    ) -> Result<(), OfflineError> {
        self.check("put")?;
        self.inner.put(cache, request, response).await
    }

    async fn put_all(
        &self,
        cache: &str,
        entries: Vec<(AssetRequest, AssetResponse)>,
    ) -> Result<(), OfflineError> {
        self.check("put_all")?;
        self.inner.put_all(cache, entries).await
    }
}

fn controller(
    version: &str,
    assets: &[&str],
    storage: Arc<dyn CacheStorage>,
    network: Arc<ScriptedNetwork>,
) -> OfflineCacheController {
    let manifest = AssetManifest::new(version, assets.iter().copied())
        .expect("valid manifest")
        .with_fallback_document("/index.html");
    OfflineCacheController::new(manifest, storage, network)
}

#[tokio::test]
async fn installed_assets_are_served_without_network() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(ScriptedNetwork::serving(&["/a.js", "/b.css", "/c.png"]));
    let ctrl = controller("v1", &["/a.js", "/b.css", "/c.png"], storage.clone(), network.clone());

    ctrl.install().await.expect("install succeeds");
    assert_eq!(ctrl.state(), LifecycleState::Installed);
    assert_eq!(storage.entry_count("v1").await, 3);
    assert_eq!(network.calls(), 3);

    let served = ctrl
        .handle_fetch(&AssetRequest::get("/a.js"))
        .await
        .expect("served");
    assert_eq!(served.source, ResponseSource::Cache);
    assert_eq!(served.response.body, b"body of /a.js".to_vec());
    assert_eq!(network.calls(), 3, "cache hit must not touch the network");
}

#[tokio::test]
async fn failing_asset_aborts_install_and_stores_nothing() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(ScriptedNetwork::serving(&["/a.js", "/b.css", "/c.png"]));
    network.fail("/b.css");
    let ctrl = controller("v1", &["/a.js", "/b.css", "/c.png"], storage.clone(), network.clone());

    let err = ctrl.install().await.unwrap_err();
    assert!(matches!(err, OfflineError::Fetch(FetchError::Unreachable(ref path)) if path == "/b.css"));
    assert_eq!(ctrl.state(), LifecycleState::Redundant);
    assert_eq!(storage.entry_count("v1").await, 0);

    let err = ctrl.activate().await.unwrap_err();
    assert!(matches!(
        err,
        OfflineError::InvalidState {
            state: LifecycleState::Redundant,
            ..
        }
    ));
    assert!(!ctrl.controls_clients());
}

#[tokio::test]
async fn unsuccessful_status_is_an_install_failure() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(ScriptedNetwork::serving(&["/a.js"]));
    let ctrl = controller("v1", &["/a.js", "/missing.css"], storage.clone(), network);

    let err = ctrl.install().await.unwrap_err();
    assert!(matches!(
        err,
        OfflineError::BadStatus { ref path, status } if path == "/missing.css" && status == StatusCode::NOT_FOUND
    ));
    assert_eq!(storage.entry_count("v1").await, 0);
}

#[tokio::test]
async fn install_can_be_retried_after_failure() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(ScriptedNetwork::serving(&["/a.js"]));
    network.fail("/a.js");
    let ctrl = controller("v1", &["/a.js"], storage.clone(), network.clone());
    assert!(ctrl.install().await.is_err());

    network.offline.lock().clear();
    ctrl.install().await.expect("retry succeeds");
    assert_eq!(ctrl.state(), LifecycleState::Installed);
    assert!(matches!(
        ctrl.install().await,
        Err(OfflineError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn activation_keeps_only_the_current_generation() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage.open("v0").await.unwrap();
    storage.open("unrelated").await.unwrap();
    let network = Arc::new(ScriptedNetwork::serving(&["/index.html"]));
    let ctrl = controller("v1", &["/index.html"], storage.clone(), network);

    ctrl.install().await.expect("install");
    assert!(!ctrl.controls_clients());
    let report = ctrl.activate().await.expect("activate");

    assert_eq!(report.removed_caches, vec!["unrelated".to_string(), "v0".to_string()]);
    assert_eq!(storage.cache_names().await.unwrap(), vec!["v1".to_string()]);
    assert_eq!(ctrl.state(), LifecycleState::Activated);
    assert!(ctrl.controls_clients());
}

#[tokio::test]
async fn network_responses_are_cached_when_same_origin_and_successful() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(
        ScriptedNetwork::serving(&["/index.html", "/late.js"])
            .with_response("/cdn.js", AssetResponse::opaque()),
    );
    let ctrl = controller("v1", &["/index.html"], storage.clone(), network.clone());
    ctrl.install().await.unwrap();
    ctrl.activate().await.unwrap();

    let first = ctrl.handle_fetch(&AssetRequest::get("/late.js")).await.unwrap();
    assert_eq!(first.source, ResponseSource::Network);
    let second = ctrl.handle_fetch(&AssetRequest::get("/late.js")).await.unwrap();
    assert_eq!(second.source, ResponseSource::Cache);
    assert_eq!(first.response, second.response);

    let calls = network.calls();
    ctrl.handle_fetch(&AssetRequest::get("/cdn.js")).await.unwrap();
    ctrl.handle_fetch(&AssetRequest::get("/cdn.js")).await.unwrap();
    assert_eq!(network.calls(), calls + 2, "opaque responses are never cached");

    let missing = ctrl.handle_fetch(&AssetRequest::get("/gone.js")).await.unwrap();
    assert_eq!(missing.response.status, StatusCode::NOT_FOUND);
    assert!(storage
        .lookup("v1", &AssetRequest::get("/gone.js"))
        .await
        .unwrap()
        .is_none());

    let post = AssetRequest::get("/late.js").with_method(Method::POST);
    let served = ctrl.handle_fetch(&post).await.unwrap();
    assert_eq!(served.source, ResponseSource::Network);
}

#[tokio::test]
async fn offline_navigation_falls_back_to_root_document() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(ScriptedNetwork::serving(&["/index.html"]));
    let ctrl = controller("v1", &["/index.html"], storage, network.clone());
    ctrl.install().await.unwrap();
    ctrl.activate().await.unwrap();
    network.go_offline();

    let served = ctrl
        .handle_fetch(&AssetRequest::navigate("/calendar"))
        .await
        .expect("fallback document");
    assert_eq!(served.source, ResponseSource::Fallback);
    assert_eq!(served.response.body, b"body of /index.html".to_vec());

    let err = ctrl
        .handle_fetch(&AssetRequest::get("/images/photo.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, OfflineError::Fetch(FetchError::Unreachable(_))));
}

#[tokio::test]
async fn concurrent_fetches_are_independent() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(ScriptedNetwork::serving(&["/index.html", "/x.js", "/y.js"]));
    let ctrl = Arc::new(controller("v1", &["/index.html"], storage.clone(), network));
    ctrl.install().await.unwrap();
    ctrl.activate().await.unwrap();

    let x = AssetRequest::get("/x.js");
    let y = AssetRequest::get("/y.js");
    let index = AssetRequest::get("/index.html");
    let (x, y, index) = tokio::join!(
        ctrl.handle_fetch(&x),
        ctrl.handle_fetch(&y),
        ctrl.handle_fetch(&index),
    );
    assert_eq!(x.unwrap().source, ResponseSource::Network);
    assert_eq!(y.unwrap().source, ResponseSource::Network);
    assert_eq!(index.unwrap().source, ResponseSource::Cache);
    assert_eq!(storage.entry_count("v1").await, 3);
}

#[tokio::test]
async fn storage_failure_during_install_leaves_controller_redundant() {
    let storage = Arc::new(FaultyStorage::default());
    storage.fail_on("put_all");
    let network = Arc::new(ScriptedNetwork::serving(&["/a.js", "/b.css"]));
    let ctrl = controller("v1", &["/a.js", "/b.css"], storage.clone(), network);

    let err = ctrl.install().await.unwrap_err();
    assert!(matches!(err, OfflineError::Storage(ref reason) if reason.contains("put_all")));
    assert_eq!(ctrl.state(), LifecycleState::Redundant);
    assert_eq!(storage.inner.entry_count("v1").await, 0);
    assert!(!ctrl.controls_clients());
}

#[tokio::test]
async fn failed_cleanup_does_not_claim_clients() {
    let storage = Arc::new(FaultyStorage::default());
    storage.inner.open("v0").await.unwrap();
    let network = Arc::new(ScriptedNetwork::serving(&["/index.html"]));
    let ctrl = controller("v1", &["/index.html"], storage.clone(), network);
    ctrl.install().await.expect("install");

    storage.fail_on("delete");
    let err = ctrl.activate().await.unwrap_err();
    assert!(matches!(err, OfflineError::Storage(_)));
    assert_eq!(ctrl.state(), LifecycleState::Installed);
    assert!(!ctrl.controls_clients());

    storage.failing.lock().clear();
    let report = ctrl.activate().await.expect("activation retried");
    assert_eq!(report.removed_caches, vec!["v0".to_string()]);
    assert!(ctrl.controls_clients());
}

#[tokio::test]
async fn fetch_survives_cache_write_and_lookup_failures() {
    let storage = Arc::new(FaultyStorage::default());
    let network = Arc::new(ScriptedNetwork::serving(&["/index.html", "/late.js"]));
    let ctrl = controller("v1", &["/index.html"], storage.clone(), network.clone());
    ctrl.install().await.unwrap();
    ctrl.activate().await.unwrap();

    storage.fail_on("put");
    let served = ctrl.handle_fetch(&AssetRequest::get("/late.js")).await.unwrap();
    assert_eq!(served.source, ResponseSource::Network);
    assert_eq!(served.response.body, b"body of /late.js".to_vec());
    assert_eq!(storage.inner.entry_count("v1").await, 1);

    storage.fail_on("lookup");
    let calls = network.calls();
    let served = ctrl
        .handle_fetch(&AssetRequest::get("/index.html"))
        .await
        .expect("lookup failure falls through to the network");
    assert_eq!(served.source, ResponseSource::Network);
    assert_eq!(network.calls(), calls + 1);
}

#[tokio::test]
async fn installs_app_shell_from_a_directory_origin() {
    let temp = tempfile::tempdir().expect("tempdir");
    let manifest = AssetManifest::app_shell();
    for asset in manifest.assets() {
        if asset == "/" {
            continue;
        }
        let path = temp.path().join(asset.trim_start_matches('/'));
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, asset.as_bytes()).expect("write asset");
    }
    let storage = Arc::new(MemoryCacheStorage::new());
    let ctrl = OfflineCacheController::new(
        manifest.clone(),
        storage.clone(),
        Arc::new(DirectoryOrigin::new(temp.path())),
    );

    ctrl.install().await.expect("install from directory");
    assert_eq!(ctrl.manifest(), &manifest);
    assert_eq!(
        storage.entry_count(ctrl.manifest().cache_name()).await,
        manifest.assets().len()
    );
    let root = ctrl
        .handle_fetch(&AssetRequest::navigate("/"))
        .await
        .expect("root");
    assert_eq!(root.source, ResponseSource::Cache);
    assert_eq!(root.response.body, b"/index.html".to_vec());
}

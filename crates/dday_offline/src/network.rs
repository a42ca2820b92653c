use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use http::{Method, StatusCode};
use tracing::debug;

use crate::{
    error::FetchError,
    request::{AssetRequest, AssetResponse},
};

/// Transport used when the cache cannot answer.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError>;
}

/// Same-origin server backed by a directory of static files.
#[derive(Debug, Clone)]
pub struct DirectoryOrigin {
    root: PathBuf,
}

impl DirectoryOrigin {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Maps a root-relative request path onto the directory; `None` for
    /// paths that would escape it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = path.split(['?', '#']).next().unwrap_or_default();
        let relative = relative.trim_start_matches('/');
        let mut resolved = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if relative.is_empty() || relative.ends_with('/') {
            resolved.push("index.html");
        }
        Some(resolved)
    }
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webmanifest" => "application/manifest+json",
        _ => return None,
    };
    Some(content_type)
}

#[async_trait]
impl Network for DirectoryOrigin {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        if request.path.starts_with("http://") || request.path.starts_with("https://") {
            return Err(FetchError::Unreachable(request.path.clone()));
        }
        if request.method != Method::GET && request.method != Method::HEAD {
            return Ok(AssetResponse::with_status(StatusCode::METHOD_NOT_ALLOWED));
        }
        let Some(file) = self.resolve(&request.path) else {
            return Ok(AssetResponse::with_status(StatusCode::NOT_FOUND));
        };
        match tokio::fs::read(&file).await {
            Ok(body) => {
                debug!(path = %request.path, bytes = body.len(), "served from origin");
                let mut response = AssetResponse::ok(body);
                if let Some(content_type) = content_type_for(&file) {
                    response = response.with_content_type(content_type);
                }
                if request.method == Method::HEAD {
                    response.body.clear();
                }
                Ok(response)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Ok(AssetResponse::with_status(StatusCode::NOT_FOUND))
            }
            Err(err) => Err(FetchError::Failed {
                path: request.path.clone(),
                reason: err.to_string(),
            }),
        }
    }
}

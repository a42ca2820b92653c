use http::{Method, StatusCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    SameOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub method: Method,
    pub path: String,
    pub mode: RequestMode,
}

/// Cache entries are addressed by method and exact path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: Method,
    pub path: String,
}

impl AssetRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            mode: RequestMode::SameOrigin,
        }
    }

    pub fn navigate(path: impl Into<String>) -> Self {
        Self {
            mode: RequestMode::Navigate,
            ..Self::get(path)
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            method: self.method.clone(),
            path: self.path.clone(),
        }
    }
}

/// How much of the response the page may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Same-origin response.
    Basic,
    Cors,
    /// Cross-origin response without CORS; status and body are hidden.
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: StatusCode,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            kind: ResponseKind::Basic,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            kind: ResponseKind::Basic,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn opaque() -> Self {
        Self {
            // opaque responses report status 0; there is no StatusCode for that
            status: StatusCode::OK,
            kind: ResponseKind::Opaque,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Only successful same-origin responses are written to the cache.
    pub fn is_cacheable(&self) -> bool {
        self.status.is_success() && self.kind == ResponseKind::Basic
    }
}

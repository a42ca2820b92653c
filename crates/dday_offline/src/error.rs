use http::StatusCode;
use thiserror::Error;

use crate::controller::LifecycleState;

/// Failure to obtain any response at all from the network.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network unreachable while fetching {0}")]
    Unreachable(String),
    #[error("fetching {path} failed: {reason}")]
    Failed { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum OfflineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("asset {path} answered {status} during install")]
    BadStatus { path: String, status: StatusCode },

    #[error("cache storage error: {0}")]
    Storage(String),

    #[error("invalid asset manifest: {0}")]
    InvalidManifest(String),

    #[error("cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: LifecycleState,
    },
}

pub type Result<T> = std::result::Result<T, OfflineError>;

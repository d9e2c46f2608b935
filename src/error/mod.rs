//! Error types for cilium-status

use crate::status::Status;
use thiserror::Error;

/// Main error type for cilium-status
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("{kind} {name} not found")]
    NotFound { kind: String, name: String },

    #[error("no pods found")]
    NoPods,

    #[error("{0}")]
    Container(String),

    #[error("unable to retrieve ConfigMap {name:?}: {source}")]
    ConfigMap {
        name: String,
        #[source]
        source: Box<StatusError>,
    },

    #[error("exec in {pod}/{container} failed: {message}")]
    Exec {
        pod: String,
        container: String,
        message: String,
    },

    #[error("Helm release error: {0}")]
    Helm(String),

    #[error("{0}")]
    NotReady(String),

    #[error("ClusterMesh status is not available")]
    ClusterMeshStatusNotAvailable,

    #[error("timeout while waiting for status to become successful")]
    WaitTimeout { last: Option<Box<Status>> },

    #[error("wait canceled, cilium agent container has crashed or was terminated")]
    WaitCanceled { last: Option<Box<Status>> },

    #[error("worker pool: {0}")]
    Pool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StatusError {
    /// The most recent status collected before a wait error, if any
    pub fn last_status(&self) -> Option<&Status> {
        match self {
            StatusError::WaitTimeout { last } | StatusError::WaitCanceled { last } => {
                last.as_deref()
            }
            _ => None,
        }
    }

    /// Whether this error is an HTTP 404 from the API server
    pub fn is_not_found(&self) -> bool {
        match self {
            StatusError::NotFound { .. } => true,
            StatusError::Kube(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for StatusError {
    fn from(e: serde_json::Error) -> Self {
        StatusError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for StatusError {
    fn from(e: serde_yaml::Error) -> Self {
        StatusError::Serialization(e.to_string())
    }
}

/// Result type alias for cilium-status
pub type Result<T> = std::result::Result<T, StatusError>;

//! Transport adapter errors

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the cluster API
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Generic API failure reported by the underlying transport
    #[error("API error: {0}")]
    Api(String),

    /// Resource not found; rollback treats this as success
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Kubernetes client error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// A create call failed; carries the payload that was attempted
    #[error("Failed to create {kind}: {source}")]
    Create {
        kind: String,
        payload: Box<Value>,
        #[source]
        source: Box<ClusterError>,
    },

    /// A get call failed
    #[error("Failed to get {kind} {namespace}/{name}: {source}")]
    Get {
        kind: String,
        name: String,
        namespace: String,
        #[source]
        source: Box<ClusterError>,
    },

    /// A patch call failed; carries the target and the attempted patch
    #[error("Failed to patch {kind}: {source}")]
    Patch {
        kind: String,
        resource: Box<Value>,
        patch: Box<Value>,
        #[source]
        source: Box<ClusterError>,
    },

    /// A delete call failed; carries the resource that was being deleted
    #[error("Failed to delete {kind}: {source}")]
    Delete {
        kind: String,
        resource: Box<Value>,
        #[source]
        source: Box<ClusterError>,
    },

    /// One or more deletions failed during rollback. The resources behind
    /// the collected errors are still present on the cluster.
    #[error("Rollback finished with {} failed deletions", .0.len())]
    Rollback(Vec<ClusterError>),
}

impl ClusterError {
    /// Whether this error ultimately means the resource was already gone
    pub fn is_not_found(&self) -> bool {
        match self {
            ClusterError::NotFound(_) => true,
            ClusterError::Create { source, .. }
            | ClusterError::Get { source, .. }
            | ClusterError::Patch { source, .. }
            | ClusterError::Delete { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

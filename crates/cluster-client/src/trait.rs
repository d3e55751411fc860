//! ClusterOps trait for mocking
//!
//! Abstracts the raw cluster API so the wizard can run against either a
//! real Kubernetes cluster or an in-memory mock in unit tests. Resources
//! travel as `serde_json::Value` dynamic objects; the typed manifest model
//! is serialized at the boundary.

use serde_json::Value;

use crate::error::ClusterError;
use crate::kind::ResourceKind;

/// Raw cluster operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing
/// runtime. Implementations report plain errors (`Api`, `NotFound`, ...);
/// the kind-tagged wrapping happens in [`crate::EnhancedMethods`].
#[async_trait::async_trait]
pub trait ClusterOps: Send + Sync {
    /// Create a resource, returning it as the server stored it
    async fn create(&self, kind: &ResourceKind, data: Value) -> Result<Value, ClusterError>;

    /// Fetch a resource by name
    async fn get(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Value, ClusterError>;

    /// Merge-patch a resource, returning the patched object
    async fn patch(
        &self,
        kind: &ResourceKind,
        resource: &Value,
        patch: Value,
    ) -> Result<Value, ClusterError>;

    /// Delete a resource, returning the server's status object.
    /// Deleting a resource that is already gone yields `NotFound`.
    async fn delete(&self, kind: &ResourceKind, resource: &Value) -> Result<Value, ClusterError>;
}

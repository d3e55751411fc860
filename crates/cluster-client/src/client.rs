//! Kubernetes-backed transport
//!
//! Implements [`ClusterOps`] over the dynamic object API so any
//! group/version/kind the wizard produces can be submitted without
//! compile-time type registration.

use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, Patch, PatchParams, PostParams};
use kube::core::GroupVersionKind;
use kube::Client;
use serde_json::Value;
use tracing::debug;

use crate::cluster_trait::ClusterOps;
use crate::error::ClusterError;
use crate::kind::ResourceKind;

/// Cluster transport backed by a `kube::Client`
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, kind: &ResourceKind, namespace: &str) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(&kind.group, &kind.version, &kind.kind);
        let resource = ApiResource::from_gvk(&gvk);
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }
}

fn namespace_of(resource: &Value) -> Result<String, ClusterError> {
    resource
        .pointer("/metadata/namespace")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClusterError::Api("resource has no metadata.namespace".to_string()))
}

fn name_of(resource: &Value) -> Result<String, ClusterError> {
    resource
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClusterError::Api("resource has no metadata.name".to_string()))
}

fn map_kube_err(error: kube::Error, what: String) -> ClusterError {
    match error {
        kube::Error::Api(ref response) if response.code == 404 => ClusterError::NotFound(what),
        other => ClusterError::Kube(other),
    }
}

#[async_trait::async_trait]
impl ClusterOps for KubeCluster {
    async fn create(&self, kind: &ResourceKind, data: Value) -> Result<Value, ClusterError> {
        let namespace = namespace_of(&data)?;
        let object: DynamicObject = serde_json::from_value(data)?;
        debug!(kind = %kind.kind, %namespace, "creating resource");

        let created = self
            .api(kind, &namespace)
            .create(&PostParams::default(), &object)
            .await
            .map_err(|e| map_kube_err(e, kind.kind.clone()))?;
        Ok(serde_json::to_value(created)?)
    }

    async fn get(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Value, ClusterError> {
        debug!(kind = %kind.kind, %namespace, %name, "fetching resource");
        let fetched = self
            .api(kind, namespace)
            .get(name)
            .await
            .map_err(|e| map_kube_err(e, format!("{}/{}", namespace, name)))?;
        Ok(serde_json::to_value(fetched)?)
    }

    async fn patch(
        &self,
        kind: &ResourceKind,
        resource: &Value,
        patch: Value,
    ) -> Result<Value, ClusterError> {
        let namespace = namespace_of(resource)?;
        let name = name_of(resource)?;
        debug!(kind = %kind.kind, %namespace, %name, "patching resource");

        let patched = self
            .api(kind, &namespace)
            .patch(&name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(|e| map_kube_err(e, format!("{}/{}", namespace, name)))?;
        Ok(serde_json::to_value(patched)?)
    }

    async fn delete(&self, kind: &ResourceKind, resource: &Value) -> Result<Value, ClusterError> {
        let namespace = namespace_of(resource)?;
        let name = name_of(resource)?;
        debug!(kind = %kind.kind, %namespace, %name, "deleting resource");

        let deleted = self
            .api(kind, &namespace)
            .delete(&name, &DeleteParams::default())
            .await
            .map_err(|e| map_kube_err(e, format!("{}/{}", namespace, name)))?;
        deleted
            .either(serde_json::to_value, serde_json::to_value)
            .map_err(ClusterError::from)
    }
}

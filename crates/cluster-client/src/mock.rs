//! Mock cluster for unit testing
//!
//! Stores resources in memory, keyed by their full resource id, and can be
//! configured to fail specific creates or deletes to exercise error and
//! rollback paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::cluster_trait::ClusterOps;
use crate::error::ClusterError;
use crate::kind::{full_resource_id, ResourceKind};

/// In-memory [`ClusterOps`] implementation
#[derive(Clone, Default)]
pub struct MockCluster {
    objects: Arc<Mutex<HashMap<String, Value>>>,
    fail_creates: Arc<Mutex<HashSet<String>>>,
    fail_deletes: Arc<Mutex<HashSet<String>>>,
    // Chronological log of "<op> <full id>" entries
    operations: Arc<Mutex<Vec<String>>>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make creates of resources with this `metadata.name` fail
    pub fn fail_create_named(&self, name: &str) {
        self.fail_creates.lock().unwrap().insert(name.to_string());
    }

    /// Make deletes of resources with this `metadata.name` fail
    pub fn fail_delete_named(&self, name: &str) {
        self.fail_deletes.lock().unwrap().insert(name.to_string());
    }

    /// Remove a stored object out-of-band, simulating an external deletion
    pub fn remove(&self, id: &str) {
        self.objects.lock().unwrap().remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.lock().unwrap().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }

    /// All operations performed so far, in order
    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }

    fn log(&self, op: &str, id: &str) {
        self.operations.lock().unwrap().push(format!("{op} {id}"));
    }

    fn name_of(resource: &Value) -> String {
        resource
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    }
}

/// Recursive JSON merge; `null` values remove the target key
fn merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    target.remove(key);
                } else if let Some(existing) = target.get_mut(key) {
                    merge(existing, value);
                } else {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[async_trait::async_trait]
impl ClusterOps for MockCluster {
    async fn create(&self, _kind: &ResourceKind, data: Value) -> Result<Value, ClusterError> {
        let name = Self::name_of(&data);
        if self.fail_creates.lock().unwrap().contains(&name) {
            return Err(ClusterError::Api(format!("create of {name} refused")));
        }
        let id = full_resource_id(&data);
        self.log("create", &id);
        self.objects.lock().unwrap().insert(id, data.clone());
        Ok(data)
    }

    async fn get(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Value, ClusterError> {
        let id = format!("{}-{}-{}", kind.kind, namespace, name);
        self.log("get", &id);
        self.objects
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound(id))
    }

    async fn patch(
        &self,
        _kind: &ResourceKind,
        resource: &Value,
        patch: Value,
    ) -> Result<Value, ClusterError> {
        let id = full_resource_id(resource);
        self.log("patch", &id);
        let mut objects = self.objects.lock().unwrap();
        let stored = objects
            .get_mut(&id)
            .ok_or_else(|| ClusterError::NotFound(id))?;
        merge(stored, &patch);
        Ok(stored.clone())
    }

    async fn delete(&self, _kind: &ResourceKind, resource: &Value) -> Result<Value, ClusterError> {
        let name = Self::name_of(resource);
        if self.fail_deletes.lock().unwrap().contains(&name) {
            return Err(ClusterError::Api(format!("delete of {name} refused")));
        }
        let id = full_resource_id(resource);
        self.log("delete", &id);
        match self.objects.lock().unwrap().remove(&id) {
            Some(_) => Ok(serde_json::json!({ "kind": "Status", "status": "Success" })),
            None => Err(ClusterError::NotFound(id)),
        }
    }
}

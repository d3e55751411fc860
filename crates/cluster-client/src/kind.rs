//! Resource kind descriptor

use serde_json::Value;

use crate::error::ClusterError;

/// Group/version/kind triple identifying an API resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceKind {
    /// API group; empty for the core group
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl ResourceKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// The `apiVersion` string resources of this kind carry
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Recover the kind descriptor from a serialized resource.
    ///
    /// Used by rollback, which only has the created objects to go on.
    pub fn from_object(resource: &Value) -> Result<Self, ClusterError> {
        let kind = resource
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| ClusterError::Api("resource has no kind".to_string()))?;
        let api_version = resource
            .get("apiVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| ClusterError::Api("resource has no apiVersion".to_string()))?;

        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };
        Ok(Self::new(group, version, kind))
    }
}

/// Identity a resource is tracked under in the call history:
/// `"<kind>-<namespace>-<name>"`.
pub fn full_resource_id(resource: &Value) -> String {
    let field = |path: &[&str]| -> &str {
        let mut current = resource;
        for key in path {
            match current.get(key) {
                Some(v) => current = v,
                None => return "",
            }
        }
        current.as_str().unwrap_or("")
    };
    format!(
        "{}-{}-{}",
        field(&["kind"]),
        field(&["metadata", "namespace"]),
        field(&["metadata", "name"])
    )
}

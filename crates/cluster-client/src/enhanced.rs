//! History-tracking wrapper around a cluster transport
//!
//! Every call is recorded as a [`HistoryItem`]; the history can be
//! replayed into the set of resources the session actually left on the
//! cluster, and [`EnhancedMethods::rollback`] deletes that set in reverse
//! creation order. "Already gone" counts as a successful deletion.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cluster_trait::ClusterOps;
use crate::error::ClusterError;
use crate::kind::{full_resource_id, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOp {
    Get,
    Create,
    Patch,
    Delete,
    /// A delete that found the resource already absent
    NotFound,
}

/// One recorded transport call
#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub op: HistoryOp,
    /// The resource as the server returned it, if any
    pub resource: Option<Value>,
    /// The resource as it was sent (or identified) by the caller
    pub initial_resource: Option<Value>,
    pub at: DateTime<Utc>,
}

impl HistoryItem {
    fn new(op: HistoryOp, resource: Option<Value>, initial_resource: Option<Value>) -> Self {
        Self {
            op,
            resource,
            initial_resource,
            at: Utc::now(),
        }
    }

    fn id(&self) -> String {
        let resource = self.resource.as_ref().or(self.initial_resource.as_ref());
        resource.map(full_resource_id).unwrap_or_default()
    }
}

/// Transport wrapper adding history, error wrapping and rollback
pub struct EnhancedMethods<C> {
    inner: C,
    history: Vec<HistoryItem>,
    record_history: bool,
}

impl<C: ClusterOps> EnhancedMethods<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            history: Vec::new(),
            record_history: true,
        }
    }

    /// Pause or resume history recording for subsequent calls.
    ///
    /// Calls made while paused are invisible to rollback; used for
    /// server-side transformations that leave nothing behind.
    pub fn set_history_recording(&mut self, on: bool) {
        self.record_history = on;
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    fn record(&mut self, item: HistoryItem) {
        if self.record_history {
            self.history.push(item);
        }
    }

    pub async fn create(&mut self, kind: &ResourceKind, data: Value) -> Result<Value, ClusterError> {
        match self.inner.create(kind, data.clone()).await {
            Ok(result) => {
                self.record(HistoryItem::new(HistoryOp::Create, Some(result.clone()), Some(data)));
                Ok(result)
            }
            Err(source) => Err(ClusterError::Create {
                kind: kind.kind.clone(),
                payload: Box::new(data),
                source: Box::new(source),
            }),
        }
    }

    pub async fn get(
        &mut self,
        kind: &ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Value, ClusterError> {
        match self.inner.get(kind, name, namespace).await {
            Ok(result) => {
                let identity = serde_json::json!({
                    "kind": kind.kind,
                    "metadata": { "name": name, "namespace": namespace }
                });
                self.record(HistoryItem::new(HistoryOp::Get, Some(result.clone()), Some(identity)));
                Ok(result)
            }
            Err(source) => Err(ClusterError::Get {
                kind: kind.kind.clone(),
                name: name.to_string(),
                namespace: namespace.to_string(),
                source: Box::new(source),
            }),
        }
    }

    pub async fn patch(
        &mut self,
        kind: &ResourceKind,
        resource: &Value,
        patch: Value,
    ) -> Result<Value, ClusterError> {
        match self.inner.patch(kind, resource, patch.clone()).await {
            Ok(result) => {
                self.record(HistoryItem::new(
                    HistoryOp::Patch,
                    Some(result.clone()),
                    Some(resource.clone()),
                ));
                Ok(result)
            }
            Err(source) => Err(ClusterError::Patch {
                kind: kind.kind.clone(),
                resource: Box::new(resource.clone()),
                patch: Box::new(patch),
                source: Box::new(source),
            }),
        }
    }

    pub async fn delete(
        &mut self,
        kind: &ResourceKind,
        resource: &Value,
    ) -> Result<Value, ClusterError> {
        match self.inner.delete(kind, resource).await {
            Ok(result) => {
                self.record(HistoryItem::new(HistoryOp::Delete, None, Some(resource.clone())));
                Ok(result)
            }
            Err(source) => Err(ClusterError::Delete {
                kind: kind.kind.clone(),
                resource: Box::new(resource.clone()),
                source: Box::new(source),
            }),
        }
    }

    /// Replay the history and resolve the resources still on the cluster,
    /// in creation order.
    pub fn actual_state(&self) -> Vec<Value> {
        let mut indexes: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        let mut state: Vec<Option<Value>> = Vec::new();

        for item in &self.history {
            let id = item.id();
            match item.op {
                HistoryOp::Patch => {}
                HistoryOp::Create | HistoryOp::Get => {
                    // The initial payload names what the caller owns; the
                    // server response may carry server-filled fields
                    let resource = match item.op {
                        HistoryOp::Create => item.initial_resource.clone(),
                        _ => item.resource.clone(),
                    };
                    if let Some(resource) = resource {
                        match indexes.get(&id) {
                            Some(&index) => state[index] = Some(resource),
                            None => {
                                state.push(Some(resource));
                                indexes.insert(id, state.len() - 1);
                            }
                        }
                    }
                }
                HistoryOp::Delete | HistoryOp::NotFound => {
                    if let Some(&index) = indexes.get(&id) {
                        state[index] = None;
                    }
                }
            }
        }

        state.into_iter().flatten().collect()
    }

    /// Delete everything this session left behind, newest first.
    ///
    /// Resources that are already gone are recorded and skipped; any other
    /// failure is collected and the whole batch re-raised as
    /// [`ClusterError::Rollback`]. Returns the per-resource delete
    /// statuses on success.
    pub async fn rollback(&mut self) -> Result<Vec<Value>, ClusterError> {
        let state = self.actual_state();
        let mut errors = Vec::new();
        let mut statuses = Vec::new();

        info!(resources = state.len(), "rolling back session");
        for resource in state.into_iter().rev() {
            let kind = match ResourceKind::from_object(&resource) {
                Ok(kind) => kind,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            match self.delete(&kind, &resource).await {
                Ok(status) => statuses.push(status),
                Err(e) if e.is_not_found() => {
                    debug!(id = %full_resource_id(&resource), "already deleted");
                    self.record(HistoryItem::new(HistoryOp::NotFound, None, Some(resource)));
                    statuses.push(Value::Null);
                }
                Err(e) => {
                    warn!(id = %full_resource_id(&resource), error = %e, "rollback deletion failed");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(statuses)
        } else {
            Err(ClusterError::Rollback(errors))
        }
    }
}

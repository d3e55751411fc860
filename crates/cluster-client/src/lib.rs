//! Cluster transport adapter
//!
//! Create/get/patch/delete operations against a Kubernetes-style API,
//! abstracted behind the [`ClusterOps`] trait so the wizard can be tested
//! without a cluster. [`EnhancedMethods`] wraps any implementation with a
//! call-history ledger, kind-tagged error wrapping and a rollback that
//! deletes every resource created during a session in reverse order.

pub mod client;
pub mod enhanced;
pub mod error;
pub mod kind;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeCluster;
pub use cluster_trait::ClusterOps;
pub use enhanced::{EnhancedMethods, HistoryItem, HistoryOp};
pub use error::ClusterError;
pub use kind::ResourceKind;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockCluster;

//! Wizard errors
//!
//! Field-level problems are data (validation messages on fields and rows),
//! never errors. These variants cover compilation and submission failures
//! only; the orchestrator is the sole layer turning them into user text.

use thiserror::Error;

use crate::fields::FieldKey;
use cluster_client::ClusterError;

#[derive(Debug, Error)]
pub enum WizardError {
    /// No template in the catalog matches the chosen OS/workload/flavor.
    /// Raised before any manifest draft is touched.
    #[error("No template matches the selected operating system, workload profile and flavor")]
    NoTemplate,

    /// A field the current configuration requires was absent at compile
    /// time; upstream validation should have prevented this
    #[error("Required field {0:?} is missing")]
    MissingField(FieldKey),

    /// A field value could not be interpreted (e.g. a non-numeric CPU count)
    #[error("Field {0:?} has an invalid value")]
    InvalidField(FieldKey),

    /// The chosen template defines no default device of the given kind
    #[error("Template defines no default {0}")]
    MissingDefaultDevice(&'static str),

    #[error("Cloud-init encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

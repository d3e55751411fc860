//! VM creation wizard core
//!
//! Turns a flat set of basic settings plus a list of storage rows into a
//! schema-correct VirtualMachine manifest ready for submission:
//!
//! - `fields` — field descriptors with visibility/validation predicates
//!   and the step-gating settings validation
//! - `selectors` — label-intersection narrowing of the template catalog
//! - `compiler` — settings + chosen template + storage rows → manifest
//! - `storage` — the disk/attach row engine with bootability derivation
//! - `wizard` — the step orchestrator wiring all of it to the transport

pub mod compiler;
pub mod error;
pub mod fields;
pub mod selectors;
pub mod storage;
pub mod wizard;

#[cfg(test)]
pub(crate) mod test_utils;

pub use compiler::{compile, create_vm, StorageEntry};
pub use error::WizardError;
pub use fields::{BasicSettings, FieldKey, FieldValue, ProvisionSource};
pub use storage::{Publication, RowKind, StorageRow, StorageRowEngine};
pub use wizard::{CreateVmWizard, WizardStep};

//! Step orchestrator
//!
//! Owns the settings, the storage editor and the transport, and gates
//! movement between the wizard's three steps. Reaching the final step
//! submits the machine exactly once; afterwards the wizard is read-only
//! apart from rollback.

use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use k8s_openapi::api::storage::v1::StorageClass;
use serde_json::Value;
use tracing::warn;

use cluster_client::{ClusterError, ClusterOps, EnhancedMethods};
use vm_manifests::Template;

use crate::compiler::create_vm;
use crate::fields::{BasicSettings, FieldKey, FieldValue};
use crate::storage::{Publication, RowUpdate, StorageRow, StorageRowEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    BasicSettings = 0,
    Storage = 1,
    Result = 2,
}

impl WizardStep {
    const ALL: [WizardStep; 3] = [Self::BasicSettings, Self::Storage, Self::Result];
}

pub struct CreateVmWizard<C: ClusterOps> {
    methods: EnhancedMethods<C>,
    templates: Vec<Template>,
    namespaces: Vec<String>,
    settings: BasicSettings,
    storage: StorageRowEngine,
    // Last outward publication; an untouched storage step counts as valid
    publication: Publication,
    active_step: WizardStep,
    result: Option<Result<String, String>>,
}

impl<C: ClusterOps> CreateVmWizard<C> {
    pub fn new(
        transport: C,
        templates: Vec<Template>,
        namespaces: Vec<String>,
        claims: Vec<PersistentVolumeClaim>,
        storage_classes: Vec<StorageClass>,
    ) -> Self {
        Self {
            methods: EnhancedMethods::new(transport),
            templates,
            namespaces,
            settings: BasicSettings::new(),
            storage: StorageRowEngine::new(Vec::new(), claims, storage_classes),
            publication: Publication {
                entries: Vec::new(),
                valid: true,
            },
            active_step: WizardStep::BasicSettings,
            result: None,
        }
    }

    pub fn active_step(&self) -> WizardStep {
        self.active_step
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn settings(&self) -> &BasicSettings {
        &self.settings
    }

    pub fn set_field(&mut self, key: FieldKey, value: FieldValue) {
        self.settings.set(key, value);
    }

    /// Outcome text of the submission, present once the Result step ran
    pub fn result(&self) -> Option<&Result<String, String>> {
        self.result.as_ref()
    }

    pub fn storage_rows(&self) -> &[StorageRow] {
        self.storage.rows()
    }

    pub fn create_disk(&mut self) {
        self.publication = self.storage.create_disk();
    }

    pub fn attach_storage(&mut self) {
        self.publication = self.storage.attach_storage();
    }

    pub fn change_storage(&mut self, id: u64, update: RowUpdate) {
        self.storage.change(id, update);
    }

    pub fn confirm_storage(&mut self) {
        self.publication = self.storage.confirm();
    }

    pub fn cancel_storage(&mut self) {
        self.storage.cancel();
    }

    pub fn delete_storage(&mut self, id: u64) {
        self.publication = self.storage.delete(id);
    }

    pub fn move_storage(&mut self, from: usize, to: usize) {
        self.publication = self.storage.move_row(from, to);
    }

    fn step_valid(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::BasicSettings => self.settings.validate_wizard(),
            WizardStep::Storage => self.publication.valid,
            WizardStep::Result => true,
        }
    }

    /// Move to another step if gating permits; returns the step actually
    /// active afterwards. First arrival at the Result step submits the
    /// machine exactly once.
    pub async fn to_step(&mut self, step: WizardStep) -> WizardStep {
        // Terminal: once a result exists the wizard no longer navigates
        if self.result.is_some() {
            return self.active_step;
        }
        if step as usize > self.active_step as usize {
            let blocked = WizardStep::ALL[..step as usize]
                .iter()
                .any(|earlier| !self.step_valid(*earlier));
            if blocked {
                return self.active_step;
            }
        }
        self.active_step = step;
        if step == WizardStep::Result {
            self.finish().await;
        }
        self.active_step
    }

    async fn finish(&mut self) {
        let outcome = create_vm(
            &mut self.methods,
            &self.templates,
            &self.settings,
            &self.publication.entries,
        )
        .await;
        self.result = Some(match outcome {
            Ok(_) => {
                let name = self.settings.text(FieldKey::Name).unwrap_or_default();
                Ok(format!("VM {name} created"))
            }
            Err(err) => {
                warn!(error = %err, "virtual machine creation failed");
                Err(err.to_string())
            }
        });
    }

    /// Delete everything created during this session, newest first
    pub async fn rollback(&mut self) -> Result<Vec<Value>, ClusterError> {
        self.methods.rollback().await
    }
}

#[cfg(test)]
#[path = "wizard_test.rs"]
mod wizard_test;

//! Storage row editor
//!
//! State machine over the wizard's storage rows. Rows either attach an
//! existing persistent volume claim or define a fresh disk; edits arrive as
//! UI events (activate, change, confirm, cancel, delete, move) and valid
//! row sets are published to the owning wizard step as typed storage
//! entries.

use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use k8s_openapi::api::storage::v1::StorageClass;
use tracing::debug;

use vm_manifests::quantity_to_gib;

use crate::compiler::StorageEntry;

/// Marker shown next to the row that will boot first
pub const BOOTABLE_ADDENDUM: &str = "(Bootable)";

const MSG_EMPTY_ENTITY: &str = "Empty entity";
const MSG_NAME_EMPTY: &str = "Name is empty";
const MSG_SIZE_POSITIVE: &str = "Size must be positive";
const MSG_CLASS_NOT_SELECTED: &str = "Storage Class not selected";
const MSG_NO_STORAGE: &str = "No storage is selected";
const MSG_STORAGE_INVALID: &str = "Selected storage is not valid";

/// The four things a row can be wrong about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationAxis {
    Identity = 0,
    Name = 1,
    Size = 2,
    StorageClass = 3,
}

/// Per-axis validation messages for one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowErrors([Option<String>; 4]);

impl RowErrors {
    pub fn get(&self, axis: ValidationAxis) -> Option<&str> {
        self.0[axis as usize].as_deref()
    }

    fn set(&mut self, axis: ValidationAxis, message: &str) {
        self.0[axis as usize] = Some(message.to_string());
    }

    fn clear(&mut self) {
        self.0 = Default::default();
    }

    pub fn is_clean(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

/// What a storage row is: a fresh disk to provision, or an existing claim
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    Disk {
        name: String,
        /// Requested capacity in GiB; zero until the user enters one
        size: f64,
        storage_class: Option<String>,
    },
    Attach {
        /// Name of the selected claim, if any
        claim_name: Option<String>,
        // Display fields derived from the claim catalog
        name: String,
        size: f64,
        storage_class: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageRow {
    pub id: Option<u64>,
    pub kind: RowKind,
    pub is_bootable: bool,
    pub addendum: Option<&'static str>,
    pub errors: RowErrors,
}

impl StorageRow {
    fn new_disk(id: u64) -> Self {
        Self {
            id: Some(id),
            kind: RowKind::Disk {
                name: String::new(),
                size: 0.0,
                storage_class: None,
            },
            is_bootable: false,
            addendum: None,
            errors: RowErrors::default(),
        }
    }

    fn new_attach(id: u64) -> Self {
        Self {
            id: Some(id),
            kind: RowKind::Attach {
                claim_name: None,
                name: String::new(),
                size: 0.0,
                storage_class: None,
            },
            is_bootable: false,
            addendum: None,
            errors: RowErrors::default(),
        }
    }
}

/// An in-flight edit to a row's user-editable fields
#[derive(Debug, Clone, Default)]
pub struct RowUpdate {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub storage_class: Option<String>,
    pub claim_name: Option<String>,
}

/// What the engine hands upward after a structural event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Publication {
    pub entries: Vec<StorageEntry>,
    pub valid: bool,
}

pub struct StorageRowEngine {
    rows: Vec<StorageRow>,
    next_id: u64,
    editing: Option<u64>,
    claims: Vec<PersistentVolumeClaim>,
    storage_classes: Vec<StorageClass>,
}

impl StorageRowEngine {
    pub fn new(
        rows: Vec<StorageRow>,
        claims: Vec<PersistentVolumeClaim>,
        storage_classes: Vec<StorageClass>,
    ) -> Self {
        let next_id = rows.iter().filter_map(|r| r.id).max().unwrap_or(0) + 1;
        let mut engine = Self {
            rows,
            next_id,
            editing: None,
            claims,
            storage_classes,
        };
        for index in 0..engine.rows.len() {
            engine.resolve_attach_display(index);
        }
        engine.resolve_bootability();
        engine.validate();
        engine
    }

    pub fn rows(&self) -> &[StorageRow] {
        &self.rows
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn storage_classes(&self) -> &[StorageClass] {
        &self.storage_classes
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Begin editing a fresh created-disk row
    pub fn create_disk(&mut self) -> Publication {
        let id = self.allocate_id();
        self.rows.push(StorageRow::new_disk(id));
        self.editing = Some(id);
        self.resolve_bootability();
        self.publish_activation()
    }

    /// Begin editing a fresh attach row
    pub fn attach_storage(&mut self) -> Publication {
        let id = self.allocate_id();
        self.rows.push(StorageRow::new_attach(id));
        self.editing = Some(id);
        self.resolve_bootability();
        self.publish_activation()
    }

    // A just-activated row has not been validated yet, so the set cannot
    // count as valid until the edit is confirmed
    fn publish_activation(&self) -> Publication {
        Publication {
            valid: false,
            ..self.publish()
        }
    }

    /// Live edit; display sync only, no publication
    pub fn change(&mut self, id: u64, update: RowUpdate) {
        let Some(index) = self.rows.iter().position(|r| r.id == Some(id)) else {
            return;
        };
        match &mut self.rows[index].kind {
            RowKind::Disk {
                name,
                size,
                storage_class,
            } => {
                if let Some(new_name) = update.name {
                    *name = new_name;
                }
                if let Some(new_size) = update.size {
                    *size = new_size;
                }
                if let Some(class) = update.storage_class {
                    *storage_class = Some(class);
                }
            }
            RowKind::Attach { claim_name, .. } => {
                if let Some(claim) = update.claim_name {
                    *claim_name = Some(claim);
                }
            }
        }
        if matches!(self.rows[index].kind, RowKind::Attach { .. }) {
            self.resolve_attach_display(index);
        }
    }

    pub fn confirm(&mut self) -> Publication {
        self.editing = None;
        self.validate();
        self.publish()
    }

    /// Abandon the current edit; re-validates but does not publish
    pub fn cancel(&mut self) {
        if let Some(id) = self.editing.take() {
            self.rows.retain(|r| r.id != Some(id));
        }
        self.validate();
    }

    pub fn delete(&mut self, id: u64) -> Publication {
        self.rows.retain(|r| r.id != Some(id));
        if self.editing == Some(id) {
            self.editing = None;
        }
        self.validate();
        self.resolve_bootability();
        self.publish()
    }

    pub fn move_row(&mut self, from: usize, to: usize) -> Publication {
        if from < self.rows.len() && to < self.rows.len() && from != to {
            let row = self.rows.remove(from);
            self.rows.insert(to, row);
        }
        self.resolve_bootability();
        self.publish()
    }

    /// Refresh an attach row's derived display fields from the claim catalog
    fn resolve_attach_display(&mut self, index: usize) {
        let RowKind::Attach { claim_name, .. } = &self.rows[index].kind else {
            return;
        };
        let Some(selected) = claim_name.clone() else {
            return;
        };
        let Some(claim) = self
            .claims
            .iter()
            .find(|c| c.metadata.name.as_deref() == Some(selected.as_str()))
        else {
            return;
        };

        let resolved_size = claim
            .spec
            .as_ref()
            .and_then(|s| s.resources.as_ref())
            .and_then(|r| r.requests.as_ref())
            .and_then(|requests| requests.get("storage"))
            .and_then(|q| quantity_to_gib(&q.0).ok())
            .unwrap_or(0.0);
        let resolved_class = claim
            .spec
            .as_ref()
            .and_then(|s| s.storage_class_name.clone());

        if let RowKind::Attach {
            name,
            size,
            storage_class,
            ..
        } = &mut self.rows[index].kind
        {
            *name = selected;
            *size = resolved_size;
            *storage_class = resolved_class;
        }
    }

    /// Exactly `rows[0]` carries the bootable flag after any structural change
    fn resolve_bootability(&mut self) {
        if self.rows.first().is_some_and(|r| r.is_bootable) {
            return;
        }
        for row in &mut self.rows {
            row.is_bootable = false;
            row.addendum = None;
        }
        if let Some(first) = self.rows.first_mut() {
            first.is_bootable = true;
            first.addendum = Some(BOOTABLE_ADDENDUM);
        }
    }

    fn validate(&mut self) {
        let claims = &self.claims;
        for row in &mut self.rows {
            row.errors.clear();
            if row.id.is_none() {
                row.errors.set(ValidationAxis::Identity, MSG_EMPTY_ENTITY);
            }
            match &row.kind {
                RowKind::Disk {
                    name,
                    size,
                    storage_class,
                } => {
                    if name.is_empty() {
                        row.errors.set(ValidationAxis::Name, MSG_NAME_EMPTY);
                    }
                    if *size <= 0.0 {
                        row.errors.set(ValidationAxis::Size, MSG_SIZE_POSITIVE);
                    }
                    if storage_class.is_none() {
                        row.errors
                            .set(ValidationAxis::StorageClass, MSG_CLASS_NOT_SELECTED);
                    }
                }
                RowKind::Attach { claim_name, .. } => match claim_name {
                    None => row.errors.set(ValidationAxis::Name, MSG_NO_STORAGE),
                    Some(selected) => {
                        let known = claims
                            .iter()
                            .any(|c| c.metadata.name.as_deref() == Some(selected.as_str()));
                        if !known {
                            row.errors.set(ValidationAxis::Name, MSG_STORAGE_INVALID);
                        }
                    }
                },
            }
        }
    }

    fn publish(&self) -> Publication {
        let entries = self
            .rows
            .iter()
            .filter_map(|row| match &row.kind {
                RowKind::Disk {
                    name,
                    size,
                    storage_class,
                } => {
                    let storage_class = storage_class.clone()?;
                    (!name.is_empty() && *size > 0.0).then(|| StorageEntry::Create {
                        name: name.clone(),
                        size_gib: *size,
                        storage_class,
                        bootable: row.is_bootable,
                    })
                }
                RowKind::Attach { claim_name, .. } => {
                    claim_name.clone().map(|claim_name| StorageEntry::Attach {
                        claim_name,
                        bootable: row.is_bootable,
                    })
                }
            })
            .collect();
        let valid = self.rows.iter().all(|r| r.errors.is_clean());
        debug!(rows = self.rows.len(), valid, "storage rows published");
        Publication { entries, valid }
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

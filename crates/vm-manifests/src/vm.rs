//! VirtualMachine custom resource
//!
//! The declarative manifest the wizard compiles and submits to the cluster.
//! Field names and nesting are an external contract
//! (`spec.template.spec.domain.devices.disks[].bootOrder`,
//! `spec.dataVolumeTemplates[].spec.pvc.resources.requests.storage`, ...),
//! so every struct here serializes with its exact wire name.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default bus for disks and synthesized network interfaces
pub const VIRTIO_BUS: &str = "virtio";

/// Disk/volume pair appended when cloud-init is enabled
pub const CLOUDINIT_DISK: &str = "cloudinitdisk";
pub const CLOUDINIT_VOLUME: &str = "cloudinitvolume";

/// Name of the network interface synthesized for PXE provisioning
pub const POD_NETWORK: &str = "pod-network";

/// Annotation set on PXE-provisioned machines so the first boot can be
/// detected and the root disk imaged afterwards
pub const FIRST_BOOT_ANNOTATION: &str = "firstRun";

/// Annotation carrying the user-entered description
pub const DESCRIPTION_ANNOTATION: &str = "description";

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "kubevirt.io",
    version = "v1alpha3",
    kind = "VirtualMachine",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSpec {
    /// Whether the machine should be started once created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,

    /// Data volumes provisioned together with the machine
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_volume_templates: Vec<DataVolumeTemplate>,

    /// Template for the machine instance
    #[serde(default)]
    pub template: VmiTemplateSpec,
}

/// Instance template inside a VirtualMachine spec
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VmiTemplateSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NestedMetadata>,

    #[serde(default)]
    pub spec: VmiSpec,
}

/// Metadata embedded below the resource's own metadata.
///
/// Kept minimal on purpose; only the fields the wizard reads or writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NestedMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VmiSpec {
    #[serde(default)]
    pub domain: DomainSpec,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DomainSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,

    #[serde(default)]
    pub devices: Devices,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Cpu {
    pub cores: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Resources {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Devices {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disks: Vec<Disk>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub name: String,

    /// Name of the volume this disk is backed by
    pub volume_name: String,

    /// Boot precedence; absent means the disk takes no part in boot ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_order: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskTarget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DiskTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_order: Option<u32>,
}

/// A named volume with exactly one source populated
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_disk: Option<RegistryDiskSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_init_no_cloud: Option<CloudInitNoCloudSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_volume: Option<DataVolumeVolumeSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim: Option<PvcVolumeSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RegistryDiskSource {
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloudInitNoCloudSource {
    pub user_data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DataVolumeVolumeSource {
    /// Name of the matching entry in `spec.dataVolumeTemplates`
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PvcVolumeSource {
    pub claim_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DataVolumeTemplate {
    #[serde(default)]
    pub metadata: NestedMetadata,

    pub spec: DataVolumeSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DataVolumeSpec {
    pub pvc: PvcSpec,

    /// Provisioning source; an empty object means a blank volume
    #[serde(default)]
    pub source: DataVolumeSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PvcSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access_modes: Vec<String>,

    #[serde(default)]
    pub resources: Resources,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DataVolumeSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HttpSource {
    pub url: String,
}

impl VirtualMachine {
    /// Append a disk to the instance template
    pub fn add_disk(&mut self, disk: Disk) {
        self.spec.template.spec.domain.devices.disks.push(disk);
    }

    /// Append a network interface to the instance template
    pub fn add_interface(&mut self, interface: Interface) {
        self.spec.template.spec.domain.devices.interfaces.push(interface);
    }

    /// Append a volume to the instance template
    pub fn add_volume(&mut self, volume: Volume) {
        self.spec.template.spec.volumes.push(volume);
    }

    /// Remove every volume carrying the given name
    pub fn remove_volume(&mut self, name: &str) {
        self.spec.template.spec.volumes.retain(|v| v.name != name);
    }

    /// Remove any cloud-init volume together with the disks backed by it
    pub fn remove_cloud_init(&mut self) {
        let volumes = &mut self.spec.template.spec.volumes;
        let removed: Vec<String> = volumes
            .iter()
            .filter(|v| v.cloud_init_no_cloud.is_some())
            .map(|v| v.name.clone())
            .collect();
        volumes.retain(|v| v.cloud_init_no_cloud.is_none());
        self.spec
            .template
            .spec
            .domain
            .devices
            .disks
            .retain(|d| !removed.contains(&d.volume_name));
    }

    pub fn add_data_volume_template(&mut self, template: DataVolumeTemplate) {
        self.spec.data_volume_templates.push(template);
    }

    pub fn disk(&self, name: &str) -> Option<&Disk> {
        self.spec
            .template
            .spec
            .domain
            .devices
            .disks
            .iter()
            .find(|d| d.name == name)
    }

    pub fn interface_mut(&mut self, name: &str) -> Option<&mut Interface> {
        self.spec
            .template
            .spec
            .domain
            .devices
            .interfaces
            .iter_mut()
            .find(|i| i.name == name)
    }

    /// Whether any interface already takes part in boot ordering.
    ///
    /// Decides the boot-order tie-break for bootable storage disks.
    pub fn has_boot_ordered_interface(&self) -> bool {
        self.spec
            .template
            .spec
            .domain
            .devices
            .interfaces
            .iter()
            .any(|i| i.boot_order.is_some())
    }

    pub fn add_annotation(&mut self, key: &str, value: &str) {
        self.metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
    }

    pub fn add_label(&mut self, key: &str, value: &str) {
        self.metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
    }
}

//! Settings-to-manifest compiler
//!
//! Takes validated basic settings, the resolved template and the published
//! storage entries and produces a complete VirtualMachine manifest. The
//! compiler is pure; `create_vm` wires it to a transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use cluster_client::{ClusterOps, EnhancedMethods, ResourceKind};
use vm_manifests::{
    CloudInitNoCloudSource, DataVolumeSource, DataVolumeSpec, DataVolumeTemplate,
    DataVolumeVolumeSource, Disk, DiskTarget, HttpSource, Interface, NestedMetadata, PvcSpec,
    PvcVolumeSource, RegistryDiskSource, Resources, Template, VirtualMachine, Volume,
    CLOUDINIT_DISK, CLOUDINIT_VOLUME, DEFAULT_DISK_ANNOTATION, DEFAULT_NETWORK_ANNOTATION,
    DESCRIPTION_ANNOTATION, FIRST_BOOT_ANNOTATION, PARAM_VM_NAME, POD_NETWORK, VIRTIO_BUS,
};

use crate::error::WizardError;
use crate::fields::{BasicSettings, FieldKey, ProvisionSource, CUSTOM_FLAVOR};
use crate::selectors::resolve_template;

/// Storage request the compiler turns into disks, volumes and data-volume
/// templates. Produced by the storage engine on publication.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageEntry {
    /// Attach an existing persistent volume claim
    Attach { claim_name: String, bootable: bool },
    /// Provision a fresh blank data volume
    Create {
        name: String,
        size_gib: f64,
        storage_class: String,
        bootable: bool,
    },
}

/// Cloud-init user-data document, rendered below the `#cloud-config` header
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CloudConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    users: Vec<CloudUser>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CloudUser {
    name: String,

    #[serde(
        rename = "ssh-authorized-keys",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    ssh_authorized_keys: Vec<String>,
}

fn required_text<'a>(
    settings: &'a BasicSettings,
    key: FieldKey,
) -> Result<&'a str, WizardError> {
    settings
        .text(key)
        .filter(|t| !t.is_empty())
        .ok_or(WizardError::MissingField(key))
}

/// Compile settings and published storage into a VirtualMachine manifest.
///
/// The caller is responsible for having validated the settings; a missing
/// required field here is a contract violation, not a user error.
pub fn compile(
    settings: &BasicSettings,
    chosen: &Template,
    storage: &[StorageEntry],
) -> Result<VirtualMachine, WizardError> {
    let name = required_text(settings, FieldKey::Name)?.to_string();
    let namespace = required_text(settings, FieldKey::Namespace)?.to_string();

    let mut template = chosen.clone();
    template.set_parameter_value(PARAM_VM_NAME, &name);
    let mut vm = template.vm_object().cloned().ok_or(WizardError::NoTemplate)?;

    vm.metadata.name = Some(name.clone());
    vm.metadata.namespace = Some(namespace);
    if let Some(description) = settings.text(FieldKey::Description) {
        vm.add_annotation(DESCRIPTION_ANNOTATION, description);
    }

    if settings.text(FieldKey::Flavor) == Some(CUSTOM_FLAVOR) {
        apply_custom_flavor(settings, &mut vm)?;
    }

    // Registry and URL re-point the volume backing the template's default
    // disk; PXE boots from the network and leaves the template's disk and
    // volume untouched, so every disk stays backed by a real volume.
    match settings.provision_source() {
        ProvisionSource::Registry => {
            let volume_name = default_disk_volume(&template, &vm)
                .ok_or(WizardError::MissingDefaultDevice("disk"))?;
            let image = required_text(settings, FieldKey::RegistryImage)?.to_string();
            vm.remove_volume(&volume_name);
            vm.add_volume(Volume {
                name: volume_name,
                registry_disk: Some(RegistryDiskSource { image }),
                ..Default::default()
            });
        }
        ProvisionSource::Url => {
            let volume_name = default_disk_volume(&template, &vm)
                .ok_or(WizardError::MissingDefaultDevice("disk"))?;
            let url = required_text(settings, FieldKey::ImageUrl)?.to_string();
            let dv_name = format!("datavolume-{name}");
            vm.add_data_volume_template(DataVolumeTemplate {
                metadata: NestedMetadata {
                    name: Some(dv_name.clone()),
                    ..Default::default()
                },
                spec: DataVolumeSpec {
                    pvc: PvcSpec {
                        access_modes: vec!["ReadWriteOnce".to_string()],
                        resources: Resources {
                            requests: [("storage".to_string(), "2Gi".to_string())].into(),
                        },
                        storage_class_name: None,
                    },
                    source: DataVolumeSource {
                        http: Some(HttpSource { url }),
                    },
                },
            });
            vm.remove_volume(&volume_name);
            vm.add_volume(Volume {
                name: volume_name,
                data_volume: Some(DataVolumeVolumeSource { name: dv_name }),
                ..Default::default()
            });
        }
        ProvisionSource::Pxe => {
            let interface = template
                .annotation(DEFAULT_NETWORK_ANNOTATION)
                .map(str::to_string);
            let interface = match interface.and_then(|n| vm.interface_mut(&n).map(|_| n)) {
                Some(name) => name,
                None => {
                    vm.add_interface(Interface {
                        name: POD_NETWORK.to_string(),
                        model: Some(VIRTIO_BUS.to_string()),
                        boot_order: None,
                    });
                    POD_NETWORK.to_string()
                }
            };
            if let Some(iface) = vm.interface_mut(&interface) {
                iface.boot_order = Some(1);
            }
            vm.add_annotation(FIRST_BOOT_ANNOTATION, "true");
        }
    }

    apply_cloud_init(settings, &mut vm)?;
    apply_storage(&mut vm, storage);

    vm.spec.running = Some(settings.flag(FieldKey::StartVm));
    Ok(vm)
}

/// Name of the volume backing the template's default boot disk
fn default_disk_volume(template: &Template, vm: &VirtualMachine) -> Option<String> {
    let disks = &vm.spec.template.spec.domain.devices.disks;
    template
        .annotation(DEFAULT_DISK_ANNOTATION)
        .and_then(|name| vm.disk(name))
        .or_else(|| disks.first())
        .map(|d| d.volume_name.clone())
}

fn apply_custom_flavor(
    settings: &BasicSettings,
    vm: &mut VirtualMachine,
) -> Result<(), WizardError> {
    let cpu = required_text(settings, FieldKey::Cpu)?;
    let cores: u32 = cpu
        .parse()
        .map_err(|_| WizardError::InvalidField(FieldKey::Cpu))?;
    let memory = required_text(settings, FieldKey::Memory)?;

    let domain = &mut vm.spec.template.spec.domain;
    domain.cpu = Some(vm_manifests::Cpu { cores });
    domain
        .resources
        .get_or_insert_with(Default::default)
        .requests
        .insert("memory".to_string(), format!("{memory}G"));
    Ok(())
}

fn apply_cloud_init(
    settings: &BasicSettings,
    vm: &mut VirtualMachine,
) -> Result<(), WizardError> {
    vm.remove_cloud_init();
    if !settings.flag(FieldKey::CloudInit) {
        return Ok(());
    }

    let keys = required_text(settings, FieldKey::AuthKeys)?;
    let mut config = CloudConfig {
        users: vec![CloudUser {
            name: "root".to_string(),
            ssh_authorized_keys: vec![keys.to_string()],
        }],
        hostname: None,
    };
    config.hostname = settings
        .text(FieldKey::Hostname)
        .filter(|h| !h.is_empty())
        .map(str::to_string);

    let user_data = format!("#cloud-config\n{}", serde_yaml::to_string(&config)?);
    vm.add_disk(Disk {
        name: CLOUDINIT_DISK.to_string(),
        volume_name: CLOUDINIT_VOLUME.to_string(),
        boot_order: None,
        disk: Some(DiskTarget {
            bus: Some(VIRTIO_BUS.to_string()),
        }),
    });
    vm.add_volume(Volume {
        name: CLOUDINIT_VOLUME.to_string(),
        cloud_init_no_cloud: Some(CloudInitNoCloudSource { user_data }),
        ..Default::default()
    });
    Ok(())
}

fn apply_storage(vm: &mut VirtualMachine, storage: &[StorageEntry]) {
    for entry in storage {
        let (name, bootable) = match entry {
            StorageEntry::Attach {
                claim_name,
                bootable,
            } => {
                vm.add_volume(Volume {
                    name: claim_name.clone(),
                    persistent_volume_claim: Some(PvcVolumeSource {
                        claim_name: claim_name.clone(),
                    }),
                    ..Default::default()
                });
                (claim_name.clone(), *bootable)
            }
            StorageEntry::Create {
                name,
                size_gib,
                storage_class,
                bootable,
            } => {
                vm.add_data_volume_template(DataVolumeTemplate {
                    metadata: NestedMetadata {
                        name: Some(name.clone()),
                        ..Default::default()
                    },
                    spec: DataVolumeSpec {
                        pvc: PvcSpec {
                            access_modes: vec!["ReadWriteOnce".to_string()],
                            resources: Resources {
                                requests: [("storage".to_string(), format!("{size_gib}Gi"))]
                                    .into(),
                            },
                            storage_class_name: Some(storage_class.clone()),
                        },
                        source: DataVolumeSource::default(),
                    },
                });
                vm.add_volume(Volume {
                    name: name.clone(),
                    data_volume: Some(DataVolumeVolumeSource { name: name.clone() }),
                    ..Default::default()
                });
                (name.clone(), *bootable)
            }
        };

        // A bootable disk yields to an interface that already boots first
        let boot_order = bootable.then(|| {
            if vm.has_boot_ordered_interface() {
                2
            } else {
                1
            }
        });
        vm.add_disk(Disk {
            name: name.clone(),
            volume_name: name,
            boot_order,
            disk: None,
        });
    }
}

/// Resolve the template, compile the manifest and create it through the
/// transport. Returns the created resource as reported by the cluster.
pub async fn create_vm<C: ClusterOps>(
    methods: &mut EnhancedMethods<C>,
    templates: &[Template],
    settings: &BasicSettings,
    storage: &[StorageEntry],
) -> Result<Value, WizardError> {
    let chosen = resolve_template(settings, templates).ok_or(WizardError::NoTemplate)?;
    let vm = compile(settings, chosen, storage)?;
    let kind = ResourceKind::new("kubevirt.io", "v1alpha3", "VirtualMachine");
    let created = methods.create(&kind, serde_json::to_value(&vm)?).await?;
    info!(
        name = vm.metadata.name.as_deref().unwrap_or_default(),
        "virtual machine created"
    );
    Ok(created)
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod compiler_test;

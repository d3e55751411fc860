//! Shared fixtures for wizard unit tests

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use k8s_openapi::api::storage::v1::StorageClass;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use vm_manifests::{
    Disk, DiskTarget, RegistryDiskSource, Template, TemplateParameter, VirtualMachine,
    VirtualMachineSpec, Volume, DEFAULT_DISK_ANNOTATION, PARAM_VM_NAME, TEMPLATE_FLAVOR_LABEL,
    TEMPLATE_OS_LABEL, TEMPLATE_WORKLOAD_LABEL, VIRTIO_BUS,
};

use crate::fields::{BasicSettings, FieldKey, FieldValue, ProvisionSource, CUSTOM_FLAVOR};

/// A template labelled on all three axes whose VM object carries the usual
/// rootdisk/rootvolume pair
pub fn template(name: &str, os: &str, workload: &str, flavor: &str) -> Template {
    let mut labels = BTreeMap::new();
    labels.insert(format!("{TEMPLATE_OS_LABEL}/{os}"), "true".to_string());
    labels.insert(
        format!("{TEMPLATE_WORKLOAD_LABEL}/{workload}"),
        "true".to_string(),
    );
    labels.insert(
        format!("{TEMPLATE_FLAVOR_LABEL}/{flavor}"),
        "true".to_string(),
    );

    let mut annotations = BTreeMap::new();
    annotations.insert(DEFAULT_DISK_ANNOTATION.to_string(), "rootdisk".to_string());

    let mut vm = VirtualMachine::new("${NAME}", VirtualMachineSpec::default());
    vm.add_disk(Disk {
        name: "rootdisk".to_string(),
        volume_name: "rootvolume".to_string(),
        boot_order: None,
        disk: Some(DiskTarget {
            bus: Some(VIRTIO_BUS.to_string()),
        }),
    });
    vm.add_volume(Volume {
        name: "rootvolume".to_string(),
        registry_disk: Some(RegistryDiskSource {
            image: "kubevirt/fedora-cloud-registry-disk-demo".to_string(),
        }),
        ..Default::default()
    });

    Template {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels),
            annotations: Some(annotations),
            ..Default::default()
        },
        parameters: vec![TemplateParameter {
            name: PARAM_VM_NAME.to_string(),
            value: None,
            required: true,
        }],
        objects: vec![vm],
    }
}

pub fn templates() -> Vec<Template> {
    vec![
        template("fedora28", "fedora28", "generic", "small"),
        template("rhel75", "rhel75", "high-performance", "medium"),
    ]
}

fn claim(name: &str, size: &str, storage_class: &str) -> PersistentVolumeClaim {
    let mut requests = BTreeMap::new();
    requests.insert("storage".to_string(), Quantity(size.to_string()));
    PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            storage_class_name: Some(storage_class.to_string()),
            resources: Some(VolumeResourceRequirements {
                requests: Some(requests),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn claims() -> Vec<PersistentVolumeClaim> {
    vec![
        claim("disk-one", "10Gi", "nfs"),
        claim("disk-two", "15Gi", "glusterfs"),
        claim("disk-three", "20Gi", "iscsi"),
    ]
}

pub fn storage_classes() -> Vec<StorageClass> {
    ["nfs", "glusterfs", "iscsi"]
        .iter()
        .map(|name| StorageClass {
            metadata: ObjectMeta {
                name: Some((*name).to_string()),
                ..Default::default()
            },
            provisioner: format!("kubernetes.io/{name}"),
            ..Default::default()
        })
        .collect()
}

fn base_settings(source: &str) -> BasicSettings {
    let mut settings = BasicSettings::new();
    settings.set(FieldKey::Name, FieldValue::Text("name".to_string()));
    settings.set(FieldKey::Namespace, FieldValue::Text("namespace".to_string()));
    settings.set(FieldKey::ImageSourceType, FieldValue::Text(source.to_string()));
    settings.set(FieldKey::Flavor, FieldValue::Text("small".to_string()));
    settings
}

pub fn registry_settings() -> BasicSettings {
    let mut settings = base_settings(ProvisionSource::REGISTRY);
    settings.set(
        FieldKey::RegistryImage,
        FieldValue::Text("imageURL".to_string()),
    );
    settings
}

pub fn url_settings() -> BasicSettings {
    let mut settings = base_settings(ProvisionSource::URL);
    settings.set(FieldKey::Description, FieldValue::Text("desc".to_string()));
    settings.set(FieldKey::ImageUrl, FieldValue::Text("httpURL".to_string()));
    settings
}

pub fn pxe_settings() -> BasicSettings {
    let mut settings = base_settings(ProvisionSource::PXE);
    settings.set(FieldKey::Description, FieldValue::Text("desc".to_string()));
    settings.set(FieldKey::StartVm, FieldValue::Flag(true));
    settings
}

pub fn cloud_init_settings() -> BasicSettings {
    let mut settings = registry_settings();
    settings.set(FieldKey::CloudInit, FieldValue::Flag(true));
    settings.set(FieldKey::Hostname, FieldValue::Text("hostname".to_string()));
    settings.set(FieldKey::AuthKeys, FieldValue::Text("keys".to_string()));
    settings
}

pub fn custom_flavor_settings() -> BasicSettings {
    let mut settings = registry_settings();
    settings.set(FieldKey::Flavor, FieldValue::Text(CUSTOM_FLAVOR.to_string()));
    settings.set(FieldKey::Cpu, FieldValue::Text("1".to_string()));
    settings.set(FieldKey::Memory, FieldValue::Text("1".to_string()));
    settings.set(FieldKey::StartVm, FieldValue::Flag(true));
    settings
}

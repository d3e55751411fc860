use super::*;
use crate::fields::FieldValue;
use crate::test_utils::{
    cloud_init_settings, custom_flavor_settings, pxe_settings, registry_settings, templates,
    url_settings,
};

fn fedora() -> Template {
    templates().remove(0)
}

fn attach_disk_one(bootable: bool) -> Vec<StorageEntry> {
    vec![StorageEntry::Attach {
        claim_name: "disk-one".to_string(),
        bootable,
    }]
}

#[test]
fn registry_source_replaces_default_volume() {
    let vm = compile(&registry_settings(), &fedora(), &[]).unwrap();

    assert_eq!(vm.metadata.name.as_deref(), Some("name"));
    assert_eq!(vm.metadata.namespace.as_deref(), Some("namespace"));
    assert_eq!(vm.spec.running, Some(false));

    let disks = &vm.spec.template.spec.domain.devices.disks;
    assert_eq!(disks.len(), 1);
    assert_eq!(disks[0].name, "rootdisk");
    assert_eq!(disks[0].volume_name, "rootvolume");
    assert!(disks[0].boot_order.is_none());

    let volumes = &vm.spec.template.spec.volumes;
    assert_eq!(volumes.len(), 1);
    assert_eq!(volumes[0].name, "rootvolume");
    assert_eq!(
        volumes[0].registry_disk.as_ref().map(|r| r.image.as_str()),
        Some("imageURL")
    );
}

#[test]
fn url_source_synthesizes_data_volume_template() {
    let vm = compile(&url_settings(), &fedora(), &[]).unwrap();

    assert_eq!(vm.spec.data_volume_templates.len(), 1);
    let dv = &vm.spec.data_volume_templates[0];
    assert_eq!(dv.metadata.name.as_deref(), Some("datavolume-name"));
    assert_eq!(
        dv.spec.source.http.as_ref().map(|h| h.url.as_str()),
        Some("httpURL")
    );
    assert_eq!(dv.spec.pvc.access_modes, vec!["ReadWriteOnce"]);
    assert_eq!(dv.spec.pvc.resources.requests["storage"], "2Gi");

    let volumes = &vm.spec.template.spec.volumes;
    assert_eq!(volumes.len(), 1);
    assert_eq!(
        volumes[0].data_volume.as_ref().map(|d| d.name.as_str()),
        Some("datavolume-name")
    );

    let annotations = vm.metadata.annotations.as_ref().unwrap();
    assert_eq!(annotations["description"], "desc");
}

#[test]
fn pxe_source_boots_from_synthesized_interface() {
    let vm = compile(&pxe_settings(), &fedora(), &[]).unwrap();

    let interfaces = &vm.spec.template.spec.domain.devices.interfaces;
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].name, "pod-network");
    assert_eq!(interfaces[0].model.as_deref(), Some("virtio"));
    assert_eq!(interfaces[0].boot_order, Some(1));

    // the template's disk/volume pair survives; it is imaged on first boot
    let volumes = &vm.spec.template.spec.volumes;
    assert_eq!(volumes.len(), 1);
    assert_eq!(volumes[0].name, "rootvolume");
    let annotations = vm.metadata.annotations.as_ref().unwrap();
    assert_eq!(annotations["firstRun"], "true");
    assert_eq!(vm.spec.running, Some(true));
}

#[test]
fn cloud_init_appends_disk_and_config_volume() {
    let vm = compile(&cloud_init_settings(), &fedora(), &[]).unwrap();

    let disks = &vm.spec.template.spec.domain.devices.disks;
    assert_eq!(disks[1].name, "cloudinitdisk");
    assert_eq!(disks[1].volume_name, "cloudinitvolume");

    let volumes = &vm.spec.template.spec.volumes;
    assert_eq!(volumes[1].name, "cloudinitvolume");
    let user_data = &volumes[1].cloud_init_no_cloud.as_ref().unwrap().user_data;
    let body = user_data
        .strip_prefix("#cloud-config\n")
        .expect("cloud-config header");

    let config: CloudConfig = serde_yaml::from_str(body).unwrap();
    assert_eq!(config.hostname.as_deref(), Some("hostname"));
    assert_eq!(config.users.len(), 1);
    assert_eq!(config.users[0].name, "root");
    assert_eq!(config.users[0].ssh_authorized_keys, vec!["keys"]);
}

#[test]
fn cloud_init_without_auth_keys_is_rejected() {
    let mut settings = cloud_init_settings();
    settings.set(FieldKey::AuthKeys, FieldValue::Text(String::new()));

    let err = compile(&settings, &fedora(), &[]).unwrap_err();
    assert!(matches!(err, WizardError::MissingField(FieldKey::AuthKeys)));
}

#[test]
fn custom_flavor_sets_cores_and_memory() {
    let vm = compile(&custom_flavor_settings(), &fedora(), &[]).unwrap();

    let domain = &vm.spec.template.spec.domain;
    assert_eq!(domain.cpu.as_ref().map(|c| c.cores), Some(1));
    assert_eq!(
        domain.resources.as_ref().unwrap().requests["memory"],
        "1G"
    );
}

#[test]
fn attached_storage_boots_first_without_network_boot() {
    let vm = compile(&registry_settings(), &fedora(), &attach_disk_one(true)).unwrap();

    let volumes = &vm.spec.template.spec.volumes;
    assert_eq!(volumes[1].name, "disk-one");
    assert_eq!(
        volumes[1]
            .persistent_volume_claim
            .as_ref()
            .map(|p| p.claim_name.as_str()),
        Some("disk-one")
    );

    let disks = &vm.spec.template.spec.domain.devices.disks;
    assert_eq!(disks[1].name, "disk-one");
    assert_eq!(disks[1].boot_order, Some(1));
}

#[test]
fn attached_storage_yields_to_network_boot() {
    let vm = compile(&pxe_settings(), &fedora(), &attach_disk_one(true)).unwrap();

    let volumes = &vm.spec.template.spec.volumes;
    assert_eq!(volumes[1].name, "disk-one");

    let disks = &vm.spec.template.spec.domain.devices.disks;
    assert_eq!(disks[1].name, "disk-one");
    assert_eq!(disks[1].boot_order, Some(2));
}

#[test]
fn every_disk_is_backed_by_a_volume() {
    let compiled = [
        compile(&registry_settings(), &fedora(), &attach_disk_one(true)).unwrap(),
        compile(&url_settings(), &fedora(), &[]).unwrap(),
        compile(&pxe_settings(), &fedora(), &attach_disk_one(true)).unwrap(),
        compile(&cloud_init_settings(), &fedora(), &[]).unwrap(),
    ];
    for vm in &compiled {
        let spec = &vm.spec.template.spec;
        for disk in &spec.domain.devices.disks {
            assert!(
                spec.volumes.iter().any(|v| v.name == disk.volume_name),
                "disk {} references missing volume {}",
                disk.name,
                disk.volume_name
            );
        }
    }
}

#[test]
fn non_bootable_storage_carries_no_boot_order() {
    let vm = compile(&registry_settings(), &fedora(), &attach_disk_one(false)).unwrap();
    let disks = &vm.spec.template.spec.domain.devices.disks;
    assert!(disks[1].boot_order.is_none());
}

#[test]
fn created_storage_becomes_blank_data_volume() {
    let storage = vec![StorageEntry::Create {
        name: "data".to_string(),
        size_gib: 10.0,
        storage_class: "nfs".to_string(),
        bootable: false,
    }];
    let vm = compile(&registry_settings(), &fedora(), &storage).unwrap();

    let dv = &vm.spec.data_volume_templates[0];
    assert_eq!(dv.metadata.name.as_deref(), Some("data"));
    assert_eq!(dv.spec.pvc.resources.requests["storage"], "10Gi");
    assert_eq!(dv.spec.pvc.storage_class_name.as_deref(), Some("nfs"));
    assert!(dv.spec.source.http.is_none());

    let volumes = &vm.spec.template.spec.volumes;
    assert_eq!(
        volumes[1].data_volume.as_ref().map(|d| d.name.as_str()),
        Some("data")
    );
}

#[tokio::test]
async fn create_vm_submits_through_transport() {
    let mock = cluster_client::MockCluster::new();
    let mut methods = EnhancedMethods::new(mock.clone());
    let templates = templates();

    let created = create_vm(&mut methods, &templates, &registry_settings(), &[])
        .await
        .unwrap();
    assert_eq!(created["metadata"]["name"], "name");
    assert!(mock.contains("VirtualMachine-namespace-name"));
    assert_eq!(methods.history().len(), 1);
}

#[tokio::test]
async fn create_vm_without_matching_template_is_rejected() {
    let mock = cluster_client::MockCluster::new();
    let mut methods = EnhancedMethods::new(mock.clone());
    let mut settings = registry_settings();
    settings.set(
        FieldKey::OperatingSystem,
        FieldValue::Text("windows".to_string()),
    );

    let err = create_vm(&mut methods, &templates(), &settings, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::NoTemplate));
    assert!(mock.len() == 0);
    assert!(methods.history().is_empty());
}

use super::*;
use crate::test_utils::{claims, storage_classes};

fn engine() -> StorageRowEngine {
    StorageRowEngine::new(Vec::new(), claims(), storage_classes())
}

fn filled_disk(engine: &mut StorageRowEngine, name: &str, size: f64) -> u64 {
    engine.create_disk();
    let id = engine.rows().last().unwrap().id.unwrap();
    engine.change(
        id,
        RowUpdate {
            name: Some(name.to_string()),
            size: Some(size),
            storage_class: Some("nfs".to_string()),
            ..Default::default()
        },
    );
    engine.confirm();
    id
}

#[test]
fn first_row_is_the_only_bootable_one() {
    let mut engine = engine();
    filled_disk(&mut engine, "a", 1.0);
    filled_disk(&mut engine, "b", 2.0);
    filled_disk(&mut engine, "c", 3.0);

    let bootable: Vec<bool> = engine.rows().iter().map(|r| r.is_bootable).collect();
    assert_eq!(bootable, vec![true, false, false]);
    assert_eq!(engine.rows()[0].addendum, Some(BOOTABLE_ADDENDUM));
    assert_eq!(engine.rows()[1].addendum, None);
}

#[test]
fn deleting_the_bootable_row_promotes_the_next() {
    let mut engine = engine();
    let first = filled_disk(&mut engine, "a", 1.0);
    filled_disk(&mut engine, "b", 2.0);

    engine.delete(first);
    assert_eq!(engine.rows().len(), 1);
    assert!(engine.rows()[0].is_bootable);
    assert_eq!(engine.rows()[0].addendum, Some(BOOTABLE_ADDENDUM));
}

#[test]
fn moving_a_new_row_first_transfers_bootability() {
    let mut engine = engine();
    filled_disk(&mut engine, "a", 1.0);
    filled_disk(&mut engine, "b", 2.0);

    engine.move_row(0, 1);
    let bootable: Vec<bool> = engine.rows().iter().map(|r| r.is_bootable).collect();
    assert_eq!(bootable, vec![true, false]);
    assert_eq!(engine.rows()[0].kind, RowKind::Disk {
        name: "b".to_string(),
        size: 2.0,
        storage_class: Some("nfs".to_string()),
    });
}

#[test]
fn row_ids_are_never_reused() {
    let mut engine = engine();
    let _one = filled_disk(&mut engine, "a", 1.0);
    let two = filled_disk(&mut engine, "b", 2.0);
    filled_disk(&mut engine, "c", 3.0);

    engine.delete(two);
    filled_disk(&mut engine, "d", 4.0);

    let ids: Vec<u64> = engine.rows().iter().filter_map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

#[test]
fn next_id_is_seeded_above_existing_rows() {
    let mut seeded = StorageRow::new_disk(7);
    seeded.kind = RowKind::Disk {
        name: "seed".to_string(),
        size: 1.0,
        storage_class: Some("nfs".to_string()),
    };
    let mut engine = StorageRowEngine::new(vec![seeded], claims(), storage_classes());

    filled_disk(&mut engine, "next", 1.0);
    assert_eq!(engine.rows()[1].id, Some(8));
}

#[test]
fn empty_disk_row_collects_every_axis_message() {
    let mut engine = engine();
    engine.create_disk();
    let publication = engine.confirm();

    let errors = &engine.rows()[0].errors;
    assert_eq!(errors.get(ValidationAxis::Name), Some("Name is empty"));
    assert_eq!(errors.get(ValidationAxis::Size), Some("Size must be positive"));
    assert_eq!(
        errors.get(ValidationAxis::StorageClass),
        Some("Storage Class not selected")
    );
    assert!(!publication.valid);
}

#[test]
fn negative_size_is_rejected() {
    let mut engine = engine();
    engine.create_disk();
    let id = engine.rows()[0].id.unwrap();
    engine.change(
        id,
        RowUpdate {
            name: Some("a".to_string()),
            size: Some(-1.0),
            storage_class: Some("nfs".to_string()),
            ..Default::default()
        },
    );
    let publication = engine.confirm();
    assert_eq!(
        engine.rows()[0].errors.get(ValidationAxis::Size),
        Some("Size must be positive")
    );
    assert!(!publication.valid);
}

#[test]
fn confirmed_disk_row_publishes_a_create_entry() {
    let mut engine = engine();
    engine.create_disk();
    let id = engine.rows()[0].id.unwrap();
    engine.change(
        id,
        RowUpdate {
            name: Some("data".to_string()),
            size: Some(10.0),
            storage_class: Some("glusterfs".to_string()),
            ..Default::default()
        },
    );
    let publication = engine.confirm();

    assert!(publication.valid);
    assert_eq!(
        publication.entries,
        vec![StorageEntry::Create {
            name: "data".to_string(),
            size_gib: 10.0,
            storage_class: "glusterfs".to_string(),
            bootable: true,
        }]
    );
    assert!(!engine.is_editing());
}

#[test]
fn attach_row_derives_display_from_the_claim_catalog() {
    let mut engine = engine();
    engine.attach_storage();
    let id = engine.rows()[0].id.unwrap();
    engine.change(
        id,
        RowUpdate {
            claim_name: Some("disk-one".to_string()),
            ..Default::default()
        },
    );

    assert_eq!(
        engine.rows()[0].kind,
        RowKind::Attach {
            claim_name: Some("disk-one".to_string()),
            name: "disk-one".to_string(),
            size: 10.0,
            storage_class: Some("nfs".to_string()),
        }
    );

    let publication = engine.confirm();
    assert!(publication.valid);
    assert_eq!(
        publication.entries,
        vec![StorageEntry::Attach {
            claim_name: "disk-one".to_string(),
            bootable: true,
        }]
    );
}

#[test]
fn attach_row_without_selection_is_invalid() {
    let mut engine = engine();
    engine.attach_storage();
    let publication = engine.confirm();

    assert_eq!(
        engine.rows()[0].errors.get(ValidationAxis::Name),
        Some("No storage is selected")
    );
    assert!(!publication.valid);
    assert!(publication.entries.is_empty());
}

#[test]
fn attach_row_with_unknown_claim_is_invalid() {
    let mut engine = engine();
    engine.attach_storage();
    let id = engine.rows()[0].id.unwrap();
    engine.change(
        id,
        RowUpdate {
            claim_name: Some("ghost".to_string()),
            ..Default::default()
        },
    );
    let publication = engine.confirm();

    assert_eq!(
        engine.rows()[0].errors.get(ValidationAxis::Name),
        Some("Selected storage is not valid")
    );
    assert!(!publication.valid);
}

#[test]
fn seeded_row_without_id_is_an_empty_entity() {
    let mut orphan = StorageRow::new_disk(0);
    orphan.id = None;
    orphan.kind = RowKind::Disk {
        name: "a".to_string(),
        size: 1.0,
        storage_class: Some("nfs".to_string()),
    };
    let engine = StorageRowEngine::new(vec![orphan], claims(), storage_classes());

    assert_eq!(
        engine.rows()[0].errors.get(ValidationAxis::Identity),
        Some("Empty entity")
    );
}

#[test]
fn cancel_discards_the_row_being_edited() {
    let mut engine = engine();
    filled_disk(&mut engine, "a", 1.0);
    engine.create_disk();
    assert!(engine.is_editing());

    engine.cancel();
    assert_eq!(engine.rows().len(), 1);
    assert!(!engine.is_editing());
}

#[test]
fn activation_publishes_an_invalid_set() {
    let mut engine = engine();
    let publication = engine.create_disk();
    // the fresh row contributes no entry and the set stays invalid until
    // the edit is confirmed
    assert!(publication.entries.is_empty());
    assert!(!publication.valid);

    let attach = engine.attach_storage();
    assert!(!attach.valid);
}

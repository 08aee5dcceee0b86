use herdbook_core::db::open_db_in_memory;
use herdbook_core::lifecycle::{
    Cardinality, HookRegistry, OnHardDelete, PolymorphicGuard, RelationDescriptor,
    RelationRegistry,
};
use herdbook_core::{
    AssetRef, Calving, Cattle, DeleteMode, Entity, EntityKind, EntityStore, LifecycleEngine,
    LifecycleError, Location, Partner, Sex, SoftDeletable, Transaction, TransactionItem,
    TransactionKind, User, WeighingSession, WeightRecord,
};
use std::sync::Arc;

fn expect_protected(err: LifecycleError) -> Vec<&'static str> {
    match err {
        LifecycleError::Protected(protected) => protected.accessors(),
        other => panic!("expected protected error, got: {other}"),
    }
}

#[test]
fn hard_delete_of_location_is_blocked_until_cattle_moves() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut pasture_a = store.create(Location::new("A", 10)).unwrap();
    let pasture_b = store.create(Location::new("B", 10)).unwrap();
    let mut cow = store
        .create(Cattle::new("C-1", Sex::Female).at_location(pasture_a.id()))
        .unwrap();

    let err = store.delete(&mut pasture_a, DeleteMode::Hard).unwrap_err();
    assert_eq!(expect_protected(err), vec!["cattle"]);
    assert!(store.active::<Location>().find(pasture_a.id()).unwrap().is_some());

    cow.location_id = Some(pasture_b.id());
    store.update(&mut cow).unwrap();

    let outcome = store.delete(&mut pasture_a, DeleteMode::Hard).unwrap();
    assert_eq!(outcome.modified_at, None);
    assert!(store.all::<Location>().find(pasture_a.id()).unwrap().is_none());
}

#[test]
fn soft_and_hard_delete_are_blocked_by_the_same_dependents() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut cow = store.create(Cattle::new("W-1", Sex::Female)).unwrap();
    let session = store.create(WeighingSession::new("Spring weighing")).unwrap();
    let mut record = store
        .create(WeightRecord::new(session.id(), cow.id(), 412_000))
        .unwrap();

    let soft = expect_protected(store.delete(&mut cow, DeleteMode::Soft).unwrap_err());
    let hard = expect_protected(store.delete(&mut cow, DeleteMode::Hard).unwrap_err());
    assert_eq!(soft, vec!["weight_records"]);
    assert_eq!(soft, hard);
    assert!(!cow.is_deleted());

    store.soft_delete(&mut record).unwrap();
    store.soft_delete(&mut cow).unwrap();
    assert!(cow.is_deleted());
    assert!(store.all::<Cattle>().get(cow.id()).unwrap().is_deleted());
}

#[test]
fn soft_deleted_dependents_do_not_block() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut partner = store.create(Partner::new("Feed & Co")).unwrap();
    let mut sale = store
        .create(Transaction::new(partner.id(), TransactionKind::Sale, 1_700_000_000_000))
        .unwrap();

    assert_eq!(
        expect_protected(store.soft_delete(&mut partner).unwrap_err()),
        vec!["transactions"]
    );

    store.soft_delete(&mut sale).unwrap();
    store.soft_delete(&mut partner).unwrap();
    assert!(partner.is_deleted());
}

#[test]
fn composition_children_never_block_their_parent() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let partner = store.create(Partner::new("Buyer")).unwrap();
    let cow = store.create(Cattle::new("S-1", Sex::Female)).unwrap();
    let mut sale = store
        .create(Transaction::new(partner.id(), TransactionKind::Sale, 0))
        .unwrap();
    store
        .create(TransactionItem::new(
            sale.id(),
            AssetRef::new(EntityKind::Cattle, cow.id()),
            1,
            150_000,
        ))
        .unwrap();

    assert!(store.can_delete(&sale).unwrap().is_allowed());
    store.soft_delete(&mut sale).unwrap();
    assert_eq!(store.active::<TransactionItem>().count().unwrap(), 1);

    store.delete(&mut sale, DeleteMode::Hard).unwrap();
    assert_eq!(store.all::<TransactionItem>().count().unwrap(), 0);
}

#[test]
fn relations_without_accessor_are_skipped() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut operator = store.create(User::new("operator")).unwrap();
    let mut session = WeighingSession::new("Audit only");
    session.performed_by = Some(operator.id());
    store.create(session).unwrap();

    assert!(store.can_delete(&operator).unwrap().is_allowed());
    store.soft_delete(&mut operator).unwrap();
    assert!(operator.is_deleted());
}

#[test]
fn custom_registry_controls_what_blocks() {
    let conn = open_db_in_memory().unwrap();
    let registry = RelationRegistry::new(&[RelationDescriptor::unreachable(
        EntityKind::Cattle,
        "location_id",
        EntityKind::Location,
        OnHardDelete::SetNull,
    )]);
    let engine = LifecycleEngine::new(
        Arc::new(registry),
        PolymorphicGuard::new(),
        HookRegistry::new(),
    );
    let store = EntityStore::with_engine(&conn, &engine).unwrap();

    let mut pasture = store.create(Location::new("Remote", 2)).unwrap();
    store
        .create(Cattle::new("R-1", Sex::Male).at_location(pasture.id()))
        .unwrap();

    store.soft_delete(&mut pasture).unwrap();
    assert!(pasture.is_deleted());
}

#[test]
fn can_delete_reports_every_conflict_without_mutating() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let dam = store.create(Cattle::new("D-1", Sex::Female)).unwrap();
    let mut calf = Cattle::new("K-1", Sex::Male);
    calf.dam_id = Some(dam.id());
    let calf = store.create(calf).unwrap();
    let mut calving = Calving::new(dam.id());
    calving.calf_id = Some(calf.id());
    store.create(calving).unwrap();

    let check = store.can_delete(&dam).unwrap();
    assert!(!check.is_allowed());
    let accessors: Vec<_> = check
        .conflicts()
        .iter()
        .map(|conflict| conflict.accessor)
        .collect();
    assert_eq!(accessors, vec!["offspring_dam", "calvings"]);
    assert!(store.active::<Cattle>().get(dam.id()).unwrap().is_active());
}

#[test]
fn one_to_one_birth_event_protects_the_calf() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let dam = store.create(Cattle::new("D-2", Sex::Female)).unwrap();
    let mut calf = store.create(Cattle::new("K-2", Sex::Female)).unwrap();
    let mut calving = Calving::new(dam.id());
    calving.calf_id = Some(calf.id());
    let mut calving = store.create(calving).unwrap();

    let err = store.soft_delete(&mut calf).unwrap_err();
    match err {
        LifecycleError::Protected(protected) => {
            assert_eq!(protected.target().id, calf.id());
            assert_eq!(protected.conflicts().len(), 1);
            assert_eq!(protected.conflicts()[0].accessor, "birth_event");
            assert_eq!(protected.conflicts()[0].cardinality, Cardinality::OneToOne);
        }
        other => panic!("unexpected error: {other}"),
    }

    store.soft_delete(&mut calving).unwrap();
    store.soft_delete(&mut calf).unwrap();
}

#[test]
fn offspring_protects_the_sire_but_not_itself() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut sire = store.create(Cattle::new("S-9", Sex::Male)).unwrap();
    let mut offspring = Cattle::new("O-9", Sex::Female);
    offspring.sire_id = Some(sire.id());
    let mut offspring = store.create(offspring).unwrap();

    assert_eq!(
        expect_protected(store.soft_delete(&mut sire).unwrap_err()),
        vec!["offspring_sire"]
    );
    store.soft_delete(&mut offspring).unwrap();
    store.soft_delete(&mut sire).unwrap();
}

#[test]
fn soft_delete_of_trashed_entity_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut pasture = store.create(Location::new("Twice", 1)).unwrap();
    store.soft_delete(&mut pasture).unwrap();
    let err = store.soft_delete(&mut pasture).unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound { kind: EntityKind::Location, .. }));

    store.delete(&mut pasture, DeleteMode::Hard).unwrap();
    let err = store.delete(&mut pasture, DeleteMode::Hard).unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound { .. }));
}

#[test]
fn soft_delete_round_trip_restores_visibility() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut pasture = store.create(Location::new("Loop", 4)).unwrap();
    let created_modified_at = pasture.meta().modified_at();

    store.soft_delete(&mut pasture).unwrap();
    let deleted_at = pasture.deleted_at().unwrap();
    assert!(deleted_at > created_modified_at);
    assert_eq!(store.active::<Location>().count().unwrap(), 0);

    store.restore(&mut pasture).unwrap();
    assert!(pasture.is_active());
    assert!(pasture.meta().modified_at() > deleted_at);
    let loaded = store.active::<Location>().get(pasture.id()).unwrap();
    assert_eq!(loaded.name, "Loop");
    assert_eq!(loaded.capacity_head, 4);
}

use herdbook_core::db::open_db_in_memory;
use herdbook_core::lifecycle::{
    herdbook_relations, DeleteHook, HookRegistry, LifecycleResult, PolymorphicGuard, ReadView,
};
use herdbook_core::{
    Cattle, DeleteMode, Entity, EntityKind, EntityRef, EntityStore, LifecycleEngine,
    LifecycleError, Medication, SanitaryEvent, Sex, SoftDeletable, User,
};
use std::sync::Arc;

fn expect_validation_code(err: LifecycleError) -> &'static str {
    match err {
        LifecycleError::Validation(err) => err.code(),
        other => panic!("expected validation error, got: {other}"),
    }
}

#[test]
fn last_active_superuser_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut admin = store.create(User::superuser("admin")).unwrap();
    let err = store.soft_delete(&mut admin).unwrap_err();
    assert_eq!(err.to_string(), "Cannot delete the last active superuser.");
    assert_eq!(
        expect_validation_code(store.delete(&mut admin, DeleteMode::Hard).unwrap_err()),
        "last_superuser"
    );

    let mut deputy = store.create(User::superuser("deputy")).unwrap();
    store.soft_delete(&mut admin).unwrap();
    assert_eq!(
        expect_validation_code(store.soft_delete(&mut deputy).unwrap_err()),
        "last_superuser"
    );

    store.delete(&mut admin, DeleteMode::Hard).unwrap();
    assert!(store.all::<User>().find(admin.id()).unwrap().is_none());
}

#[test]
fn regular_users_are_not_affected_by_the_superuser_rule() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut clerk = store.create(User::new("clerk")).unwrap();
    store.soft_delete(&mut clerk).unwrap();
    assert!(clerk.is_deleted());
}

#[test]
fn trashed_superuser_cannot_be_purged_when_none_is_active() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let admin = store.create(User::superuser("admin")).unwrap();
    conn.execute(
        "UPDATE users SET is_deleted = 1 WHERE id = ?1;",
        [admin.id().to_string()],
    )
    .unwrap();

    let err = store
        .delete_by_id(EntityKind::User, admin.id(), DeleteMode::Hard)
        .unwrap_err();
    assert_eq!(expect_validation_code(err), "last_superuser");
    assert!(store.all::<User>().find(admin.id()).unwrap().is_some());
}

#[test]
fn medication_used_by_any_sanitary_event_is_kept() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut dewormer = store.create(Medication::new("Albendazole")).unwrap();
    let mut event = SanitaryEvent::new("Spring deworming");
    event.medication_id = Some(dewormer.id());
    let mut event = store.create(event).unwrap();

    let expected = "Cannot delete this medication because it has been used in sanitary events (active or archived).";
    assert_eq!(store.soft_delete(&mut dewormer).unwrap_err().to_string(), expected);

    store.soft_delete(&mut event).unwrap();
    assert_eq!(
        store
            .delete(&mut dewormer, DeleteMode::Hard)
            .unwrap_err()
            .to_string(),
        expected
    );

    store.delete(&mut event, DeleteMode::Hard).unwrap();
    store.soft_delete(&mut dewormer).unwrap();
    assert!(dewormer.is_deleted());
}

struct WritingHook;

impl DeleteHook for WritingHook {
    fn name(&self) -> &'static str {
        "writing_hook"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Cattle
    }

    fn before_delete(&self, _target: EntityRef, view: &ReadView<'_>) -> LifecycleResult<()> {
        view.exists("DELETE FROM cattle;", [])?;
        Ok(())
    }
}

#[test]
fn hooks_cannot_write_through_the_read_view() {
    let conn = open_db_in_memory().unwrap();
    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(WritingHook)).unwrap();
    let engine = LifecycleEngine::new(herdbook_relations(), PolymorphicGuard::herdbook(), hooks);
    let store = EntityStore::with_engine(&conn, &engine).unwrap();

    let mut cow = store.create(Cattle::new("H-1", Sex::Female)).unwrap();
    store.create(Cattle::new("H-2", Sex::Female)).unwrap();

    let err = store.soft_delete(&mut cow).unwrap_err();
    assert!(matches!(err, LifecycleError::ReadOnlyViolation));
    assert_eq!(store.active::<Cattle>().count().unwrap(), 2);
}

#[test]
fn hooks_run_before_the_protection_scan() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut admin = store.create(User::superuser("root")).unwrap();
    let mut event = SanitaryEvent::new("Vaccination");
    event.performed_by = Some(admin.id());
    store.create(event).unwrap();

    assert_eq!(
        expect_validation_code(store.soft_delete(&mut admin).unwrap_err()),
        "last_superuser"
    );
    assert!(!store.can_delete(&admin).unwrap().is_allowed());
}

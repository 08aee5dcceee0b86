use herdbook_core::db::open_db_in_memory;
use herdbook_core::{
    BreedingEvent, Cattle, DeleteMode, DependentState, Diet, DietItem, Entity, EntityStore,
    FeedIngredient, FeedingEvent, LifecycleError, Location, Movement, MovementAnimal,
    PregnancyCheck, PregnancyResult, Sex, SoftDeletable, Task, TrashService, User,
};

fn expect_protected(err: LifecycleError) -> Vec<&'static str> {
    match err {
        LifecycleError::Protected(protected) => protected.accessors(),
        other => panic!("expected protected error, got: {other}"),
    }
}

#[test]
fn ingredient_used_by_a_diet_is_protected_until_purged_from_it() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();
    let trash = TrashService::new(store);

    let mut corn = store.create(FeedIngredient::new("Ground corn")).unwrap();
    let diet = store.create(Diet::new("Finishing")).unwrap();
    let mut item = store.create(DietItem::new(diet.id(), corn.id(), 6_500)).unwrap();

    assert_eq!(
        expect_protected(store.soft_delete(&mut corn).unwrap_err()),
        vec!["diet_items"]
    );

    store.soft_delete(&mut item).unwrap();
    store.soft_delete(&mut corn).unwrap();

    let check = trash.can_purge::<FeedIngredient>(corn.id()).unwrap();
    assert_eq!(check.conflicts()[0].state, DependentState::Trashed);
    assert_eq!(
        expect_protected(trash.purge::<FeedIngredient>(corn.id()).unwrap_err()),
        vec!["diet_items"]
    );

    trash.purge::<DietItem>(item.id()).unwrap();
    trash.purge::<FeedIngredient>(corn.id()).unwrap();
    assert!(store.all::<FeedIngredient>().find(corn.id()).unwrap().is_none());
}

#[test]
fn diet_items_never_block_their_diet() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let soy = store.create(FeedIngredient::new("Soybean meal")).unwrap();
    let mut diet = store.create(Diet::new("Creep feed")).unwrap();
    store.create(DietItem::new(diet.id(), soy.id(), 10_000)).unwrap();

    assert!(store.can_delete(&diet).unwrap().is_allowed());
    store.soft_delete(&mut diet).unwrap();
    assert_eq!(store.active::<DietItem>().count().unwrap(), 1);

    store.delete(&mut diet, DeleteMode::Hard).unwrap();
    assert_eq!(store.all::<DietItem>().count().unwrap(), 0);
    assert!(store.active::<FeedIngredient>().find(soy.id()).unwrap().is_some());
}

#[test]
fn feeding_history_protects_diet_location_and_operator() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut feedlot = store.create(Location::new("Feedlot", 120)).unwrap();
    let mut diet = store.create(Diet::new("Growing")).unwrap();
    let mut operator = store.create(User::new("feeder")).unwrap();
    let mut feeding = FeedingEvent::new(feedlot.id(), diet.id(), 1_700_000_000_000, 250_000);
    feeding.performed_by = Some(operator.id());
    let mut feeding = store.create(feeding).unwrap();

    assert_eq!(
        expect_protected(store.soft_delete(&mut diet).unwrap_err()),
        vec!["feeding_events"]
    );
    assert_eq!(
        expect_protected(store.soft_delete(&mut feedlot).unwrap_err()),
        vec!["feeding_events"]
    );
    assert_eq!(
        expect_protected(store.soft_delete(&mut operator).unwrap_err()),
        vec!["feeding_events"]
    );

    store.soft_delete(&mut feeding).unwrap();
    store.soft_delete(&mut diet).unwrap();
    store.soft_delete(&mut feedlot).unwrap();
    store.soft_delete(&mut operator).unwrap();
}

#[test]
fn movements_protect_both_ends_and_only_the_destination_on_purge() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();
    let trash = TrashService::new(store);

    let mut origin = store.create(Location::new("Calving paddock", 20)).unwrap();
    let mut destination = store.create(Location::new("Weaning pen", 40)).unwrap();
    let mut weaning = store
        .create(Movement::new(destination.id(), 1_700_000_000_000).from_location(origin.id()))
        .unwrap();

    assert_eq!(
        expect_protected(store.soft_delete(&mut destination).unwrap_err()),
        vec!["movements_in"]
    );
    assert_eq!(
        expect_protected(store.soft_delete(&mut origin).unwrap_err()),
        vec!["movements_out"]
    );

    store.soft_delete(&mut weaning).unwrap();
    store.soft_delete(&mut origin).unwrap();
    store.soft_delete(&mut destination).unwrap();

    assert_eq!(
        expect_protected(trash.purge::<Location>(destination.id()).unwrap_err()),
        vec!["movements_in"]
    );
    trash.purge::<Location>(origin.id()).unwrap();
    let weaning = store.all::<Movement>().get(weaning.id()).unwrap();
    assert_eq!(weaning.origin_id, None);

    trash.purge::<Movement>(weaning.id()).unwrap();
    trash.purge::<Location>(destination.id()).unwrap();
}

#[test]
fn moved_animals_do_not_protect_cattle_or_their_movement() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let pen = store.create(Location::new("Pen 4", 15)).unwrap();
    let mut movement = store.create(Movement::new(pen.id(), 0)).unwrap();
    let mut steer = store.create(Cattle::new("MV-1", Sex::Male)).unwrap();
    store
        .create(MovementAnimal::new(movement.id(), steer.id()))
        .unwrap();

    assert!(store.can_delete(&steer).unwrap().is_allowed());
    assert!(store.can_delete(&movement).unwrap().is_allowed());

    store.soft_delete(&mut steer).unwrap();
    store.delete(&mut steer, DeleteMode::Hard).unwrap();
    assert_eq!(store.all::<MovementAnimal>().count().unwrap(), 0);

    store.soft_delete(&mut movement).unwrap();
    assert!(movement.is_deleted());
}

#[test]
fn pregnancy_checks_block_their_breeding_event_but_go_with_its_purge() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();
    let trash = TrashService::new(store);

    let cow = store.create(Cattle::new("PG-1", Sex::Female)).unwrap();
    let mut service = store.create(BreedingEvent::new(cow.id())).unwrap();
    let mut check = PregnancyCheck::new(service.id(), 1_700_000_000_000, PregnancyResult::Positive);
    check.fetus_days = Some(45);
    let mut check = store.create(check).unwrap();

    assert_eq!(
        expect_protected(store.soft_delete(&mut service).unwrap_err()),
        vec!["pregnancy_checks"]
    );

    store.soft_delete(&mut check).unwrap();
    store.soft_delete(&mut service).unwrap();
    assert!(trash.can_purge::<BreedingEvent>(service.id()).unwrap().is_allowed());
    trash.purge::<BreedingEvent>(service.id()).unwrap();
    assert_eq!(store.all::<PregnancyCheck>().count().unwrap(), 0);
}

#[test]
fn sire_services_and_assigned_tasks_block_deletion() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();

    let mut bull = store.create(Cattle::new("BU-1", Sex::Male)).unwrap();
    let cow = store.create(Cattle::new("CW-1", Sex::Female)).unwrap();
    let mut service = store
        .create(BreedingEvent::new(cow.id()).with_sire(bull.id()))
        .unwrap();

    assert_eq!(
        expect_protected(store.soft_delete(&mut bull).unwrap_err()),
        vec!["breeding_events_as_sire"]
    );
    store.soft_delete(&mut service).unwrap();
    store.soft_delete(&mut bull).unwrap();

    let mut vet = store.create(User::new("vet")).unwrap();
    let mut task = store
        .create(Task::new("Check pregnancy of CW-1", 1_700_000_000_000).assigned_to(vet.id()))
        .unwrap();
    assert_eq!(
        expect_protected(store.soft_delete(&mut vet).unwrap_err()),
        vec!["tasks"]
    );

    task.complete(1_700_000_100_000);
    store.update(&mut task).unwrap();
    store.soft_delete(&mut task).unwrap();
    store.soft_delete(&mut vet).unwrap();
}

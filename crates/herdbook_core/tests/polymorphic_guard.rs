use herdbook_core::db::open_db_in_memory;
use herdbook_core::{
    AssetRef, Cattle, DeleteMode, Entity, EntityKind, EntityStore, LifecycleError, Medication,
    Partner, Sex, SoftDeletable, TransactionKind, TransactionService,
};

fn expect_validation(err: LifecycleError) -> (String, String) {
    match err {
        LifecycleError::Validation(err) => (err.code().to_string(), err.message().to_string()),
        other => panic!("expected validation error, got: {other}"),
    }
}

#[test]
fn sale_line_item_blocks_cattle_until_removed() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();
    let sales = TransactionService::new(store);

    let buyer = store.create(Partner::new("Neighbour farm")).unwrap();
    let mut cow = store.create(Cattle::new("C-10", Sex::Female)).unwrap();
    let sale = sales
        .create_transaction(buyer.id(), TransactionKind::Sale, 1_700_000_000_000, "")
        .unwrap();
    let item = sales
        .add_item(sale.id(), AssetRef::new(EntityKind::Cattle, cow.id()), 1, 180_000)
        .unwrap();

    let (code, message) = expect_validation(store.soft_delete(&mut cow).unwrap_err());
    assert_eq!(code, "polymorphic_reference");
    assert_eq!(
        message,
        "Cannot delete cattle because it is part of a Sale transaction. Please delete the transaction item first."
    );
    assert!(!cow.is_deleted());

    sales.remove_item(item.id()).unwrap();
    store.soft_delete(&mut cow).unwrap();
    assert!(cow.is_deleted());
}

#[test]
fn purchase_line_item_names_purchase_and_blocks_hard_delete() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();
    let purchases = TransactionService::new(store);

    let supplier = store.create(Partner::new("Vet supplies")).unwrap();
    let mut vaccine = store.create(Medication::new("Clostridial vaccine")).unwrap();
    let purchase = purchases
        .create_transaction(supplier.id(), TransactionKind::Purchase, 0, "spring order")
        .unwrap();
    purchases
        .add_item(
            purchase.id(),
            AssetRef::new(EntityKind::Medication, vaccine.id()),
            20,
            1_250,
        )
        .unwrap();

    let (_, message) =
        expect_validation(store.delete(&mut vaccine, DeleteMode::Hard).unwrap_err());
    assert_eq!(
        message,
        "Cannot delete medication because it is part of a Purchase transaction. Please delete the transaction item first."
    );
    assert!(store.active::<Medication>().find(vaccine.id()).unwrap().is_some());
}

#[test]
fn items_of_a_trashed_transaction_still_block() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();
    let sales = TransactionService::new(store);

    let buyer = store.create(Partner::new("Auction")).unwrap();
    let mut steer = store.create(Cattle::new("ST-1", Sex::Male)).unwrap();
    let mut sale = sales
        .create_transaction(buyer.id(), TransactionKind::Sale, 0, "")
        .unwrap();
    sales
        .add_item(sale.id(), AssetRef::new(EntityKind::Cattle, steer.id()), 1, 99_000)
        .unwrap();

    store.soft_delete(&mut sale).unwrap();
    let (code, _) = expect_validation(store.soft_delete(&mut steer).unwrap_err());
    assert_eq!(code, "polymorphic_reference");

    store.delete(&mut sale, DeleteMode::Hard).unwrap();
    store.soft_delete(&mut steer).unwrap();
}

#[test]
fn references_to_other_assets_do_not_block() {
    let conn = open_db_in_memory().unwrap();
    let store = EntityStore::try_new(&conn).unwrap();
    let sales = TransactionService::new(store);

    let buyer = store.create(Partner::new("Butcher")).unwrap();
    let sold = store.create(Cattle::new("X-1", Sex::Male)).unwrap();
    let mut kept = store.create(Cattle::new("X-2", Sex::Male)).unwrap();
    let sale = sales
        .create_transaction(buyer.id(), TransactionKind::Sale, 0, "")
        .unwrap();
    sales
        .add_item(sale.id(), AssetRef::new(EntityKind::Cattle, sold.id()), 1, 1)
        .unwrap();

    store.soft_delete(&mut kept).unwrap();
}

//! End-to-end synchronization against the in-memory storefront, plus
//! failure-mode checks against a mocked repository.

use smallvec::smallvec;
use testresult::TestResult;

use flowz::{
    attributes::AttributePair,
    fixtures::Fixture,
    ids::{ProductId, RemoteVariationId, StoreId},
    storefront::{
        MockVariationsRepository, StorefrontError,
        memory::InMemoryStorefront,
        records::{NewVariationRow, VariationRecord},
    },
    sync::{SyncError, SyncService},
    variations::{FieldUpdate, VariationFields, VariationStatus, set::VariationSet},
};

const PARENT: ProductId = ProductId(7);

/// Seed the in-memory storefront with the fixture's persisted rows.
fn seeded_storefront(store: StoreId, fixture: &Fixture) -> InMemoryStorefront {
    let storefront = InMemoryStorefront::new();

    for record in fixture.records() {
        storefront.seed_variation(
            store,
            record.parent,
            NewVariationRow {
                pairs: record.pairs.clone(),
                fields: record.fields.clone(),
            },
        );
    }

    storefront
}

#[tokio::test]
async fn load_generate_edit_persist_round_trip() -> TestResult {
    let fixture = Fixture::from_set("tshirts")?;
    let store = StoreId::new();
    let service = SyncService::new(store, seeded_storefront(store, &fixture));

    let mut set = service.load(PARENT).await?;
    assert_eq!(set.len(), 4);

    let report = set.generate(fixture.attributes())?;
    assert_eq!(report.created, 2);

    // Price the two new sizes before saving.
    set.toggle_all();
    set.bulk_update_field(&FieldUpdate::RegularPrice(Some(2399)));

    let outcome = service.persist(PARENT, &mut set).await?;

    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.updated, 4, "bulk edit dirtied the synced rows");
    assert_eq!(outcome.deleted, 0);

    // The refreshed set is fully synced with durable ids everywhere.
    assert_eq!(set.len(), 6);
    assert!(
        set.iter()
            .all(|(_, v)| v.status() == VariationStatus::Synced && v.remote_id().is_some()),
        "persisting leaves only synced rows behind"
    );

    Ok(())
}

#[tokio::test]
async fn deletions_are_marked_remotely_and_leave_the_set() -> TestResult {
    let fixture = Fixture::from_set("tshirts")?;
    let store = StoreId::new();
    let storefront = seeded_storefront(store, &fixture);
    let service = SyncService::new(store, storefront);

    let mut set = service.load(PARENT).await?;
    let (doomed, _) = set.iter().next().expect("four rows loaded");
    set.remove(doomed);

    let outcome = service.persist(PARENT, &mut set).await?;

    assert_eq!(outcome.deleted, 1);
    assert_eq!(set.len(), 3, "the refresh drops delete-marked rows");
    assert_eq!(service.repository().deleted_count(store, PARENT), 1);

    Ok(())
}

#[tokio::test]
async fn orphaned_rows_are_deleted_on_the_next_persist() -> TestResult {
    let fixture = Fixture::from_set("tshirts")?;
    let store = StoreId::new();
    let service = SyncService::new(store, seeded_storefront(store, &fixture));

    let mut set = service.load(PARENT).await?;

    // Narrow the matrix to Red only; both Blue rows become orphans.
    let narrowed = vec![
        flowz::attributes::Attribute::variation("Color", &["Red"]),
        flowz::attributes::Attribute::variation("Size", &["S", "M"]),
    ];
    set.generate(&narrowed)?;

    let outcome = service.persist(PARENT, &mut set).await?;

    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.created, 0);
    assert_eq!(set.len(), 2);

    Ok(())
}

#[tokio::test]
async fn a_catalog_sku_conflict_aborts_before_any_write() -> TestResult {
    let fixture = Fixture::from_set("tshirts")?;
    let store = StoreId::new();
    let storefront = seeded_storefront(store, &fixture);
    storefront.seed_catalog_sku(ProductId(9), "Classic Hoodie", "ABC-1");

    let service = SyncService::new(store, storefront);

    let mut set = service.load(PARENT).await?;
    let (first, _) = set.iter().next().expect("four rows loaded");
    set.update_field(first, FieldUpdate::Sku("ABC-1".to_string()));

    let result = service.persist(PARENT, &mut set).await;

    match result {
        Err(SyncError::DuplicateSku { sku, owner }) => {
            assert_eq!(sku, "ABC-1");
            assert_eq!(owner, "Classic Hoodie");
        }
        other => panic!("expected a duplicate SKU error, got {other:?}"),
    }

    assert_eq!(
        service.repository().write_count(),
        0,
        "validation runs before the write phases"
    );

    Ok(())
}

#[tokio::test]
async fn a_batch_local_sku_duplicate_aborts_before_any_write() -> TestResult {
    let store = StoreId::new();
    let storefront = InMemoryStorefront::new();
    let service = SyncService::new(store, storefront);

    let mut set = VariationSet::new();
    set.generate(&[
        flowz::attributes::Attribute::variation("Color", &["Red", "Blue"]),
    ])?;

    for key in set.iter().map(|(key, _)| key).collect::<Vec<_>>() {
        set.update_field(key, FieldUpdate::Sku("DUP-1".to_string()));
    }

    let result = service.persist(PARENT, &mut set).await;

    assert!(
        matches!(result, Err(SyncError::DuplicateSku { .. })),
        "expected a duplicate SKU error"
    );
    assert!(
        set.iter().all(|(_, v)| v.status() == VariationStatus::New),
        "nothing was persisted"
    );

    Ok(())
}

#[tokio::test]
async fn reusing_the_own_parents_sku_is_allowed() -> TestResult {
    let fixture = Fixture::from_set("tshirts")?;
    let store = StoreId::new();
    let storefront = seeded_storefront(store, &fixture);

    // The parent product itself holds this SKU.
    storefront.seed_catalog_sku(PARENT, "Basic Tee", "TEE-PARENT");

    let service = SyncService::new(store, storefront);

    let mut set = service.load(PARENT).await?;
    let (first, _) = set.iter().next().expect("four rows loaded");
    set.update_field(first, FieldUpdate::Sku("TEE-PARENT".to_string()));

    let outcome = service.persist(PARENT, &mut set).await?;
    assert_eq!(outcome.updated, 1);

    Ok(())
}

#[tokio::test]
async fn zero_writes_are_issued_on_sku_conflict() -> TestResult {
    let store = StoreId::new();
    let storefront = InMemoryStorefront::new();
    storefront.seed_catalog_sku(ProductId(2), "Other Product", "ABC-1");

    let service = SyncService::new(store, storefront);

    let mut set = VariationSet::new();
    set.generate(&[flowz::attributes::Attribute::variation(
        "Color",
        &["Red"],
    )])?;
    set.toggle_all();
    set.bulk_update_field(&FieldUpdate::Sku("ABC-1".to_string()));

    let result = service.persist(PARENT, &mut set).await;

    assert!(matches!(result, Err(SyncError::DuplicateSku { .. })));
    assert_eq!(
        service.repository().write_count(),
        0,
        "the persist must abort before any write"
    );

    Ok(())
}

#[tokio::test]
async fn a_mid_persist_failure_keeps_local_edits() -> TestResult {
    let mut mock = MockVariationsRepository::new();

    mock.expect_insert_variations()
        .times(1)
        .returning(|_, _, rows| {
            let count = rows.len() as u64;
            Ok((1..=count).map(RemoteVariationId).collect())
        });

    // The update phase fails after the insert phase already committed.
    mock.expect_update_variation()
        .times(1)
        .returning(|_, _, _, _| Err(StorefrontError::Backend("503 from storefront".to_string())));

    mock.expect_list_variations().never();
    mock.expect_mark_deleted().never();
    mock.expect_find_sku_conflict().never();

    let service = SyncService::new(StoreId::new(), mock);

    let mut set = VariationSet::from_records(vec![VariationRecord {
        id: RemoteVariationId(50),
        parent: PARENT,
        pairs: smallvec![AttributePair::new("Color", "Red")],
        fields: VariationFields::default(),
    }]);
    let (synced, _) = set.iter().next().expect("one loaded row");
    set.update_field(synced, FieldUpdate::StockQuantity(Some(3)));

    set.push(flowz::variations::Variation::new(smallvec![
        AttributePair::new("Color", "Blue")
    ]));

    let result = service.persist(PARENT, &mut set).await;

    assert!(
        matches!(result, Err(SyncError::Storefront(_))),
        "expected the storefront failure to surface"
    );

    // No rollback, no refresh: the local set still carries its edits.
    assert_eq!(set.len(), 2);
    assert_eq!(
        set.get(synced).map(flowz::variations::Variation::status),
        Some(VariationStatus::Modified)
    );
    assert_eq!(
        set.get(synced)
            .and_then(|v| v.fields().stock_quantity),
        Some(3)
    );

    Ok(())
}

//! Property tests for the product store.
//!
//! Each case runs against a fresh in-memory store on a current-thread
//! runtime.

use std::collections::BTreeSet;
use std::future::Future;

use proptest::prelude::*;
use serde_json::Value;
use shopdb::{MemoryEngine, NewProduct, ProductPatch, RecordId, UpdateOutcome};
use shopdb_testkit::generators::{new_product, product_patch, record_id};
use shopdb_testkit::TestFixture;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

async fn seeded(products: &[NewProduct]) -> (TestFixture<MemoryEngine>, Vec<RecordId>) {
    let fixture = TestFixture::memory().await;
    let ids = fixture.insert_all(products).await;
    (fixture, ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_inserted_ids_are_sequential(products in prop::collection::vec(new_product(), 0..12)) {
        let (ids, stored) = block_on(async {
            let (fixture, ids) = seeded(&products).await;
            (ids, fixture.store.fetch_all().await.unwrap())
        });

        let expected: Vec<RecordId> = (1..=products.len() as u64).map(RecordId).collect();
        prop_assert_eq!(&ids, &expected);

        prop_assert_eq!(stored.len(), products.len());
        for (product, inserted) in stored.iter().zip(&products) {
            prop_assert_eq!(&product.name, &inserted.name);
            prop_assert_eq!(product.price, inserted.price);
            prop_assert_eq!(product.stock, inserted.stock);
            prop_assert_eq!(&product.extra, &inserted.extra);
        }
    }

    #[test]
    fn test_update_is_shallow_merge(
        products in prop::collection::vec(new_product(), 1..6),
        pick in any::<prop::sample::Index>(),
        patch in product_patch(),
    ) {
        let target = RecordId(pick.index(products.len()) as u64 + 1);

        let (before, outcome, after) = block_on(async {
            let (fixture, _) = seeded(&products).await;
            let before = fixture.store.fetch_all().await.unwrap();
            let outcome = fixture.store.update(target, &patch).await.unwrap();
            (before, outcome, fixture.store.fetch_all().await.unwrap())
        });

        let UpdateOutcome::Updated(updated) = outcome else {
            return Err(TestCaseError::fail("existing id reported missing"));
        };

        let original = before.iter().find(|p| p.id == target).unwrap();
        let mut expected = serde_json::to_value(original).unwrap();
        if let Value::Object(fields) = &mut expected {
            for (field, value) in patch.as_record().iter() {
                fields.insert(field.clone(), value.clone());
            }
        }
        prop_assert_eq!(serde_json::to_value(&updated).unwrap(), expected);

        // Every other product is untouched.
        for (b, a) in before.iter().zip(&after) {
            if b.id == target {
                prop_assert_eq!(a, &updated);
            } else {
                prop_assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_update_missing_changes_nothing(
        products in prop::collection::vec(new_product(), 0..6),
        patch in product_patch(),
    ) {
        let missing = RecordId(products.len() as u64 + 1);

        let (before, outcome, after) = block_on(async {
            let (fixture, _) = seeded(&products).await;
            let before = fixture.store.fetch_all().await.unwrap();
            let outcome = fixture.store.update(missing, &patch).await.unwrap();
            (before, outcome, fixture.store.fetch_all().await.unwrap())
        });

        prop_assert_eq!(outcome, UpdateOutcome::NotFound);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn test_delete_removes_exactly_one(
        products in prop::collection::vec(new_product(), 0..10),
        doomed in prop::collection::vec(record_id(), 0..6),
    ) {
        let (remaining, next) = block_on(async {
            let (fixture, _) = seeded(&products).await;
            for id in &doomed {
                fixture.store.delete(*id).await.unwrap();
            }
            let remaining = fixture.ids().await;
            let next = fixture.store.insert(&NewProduct::new("late", 1.0, 1)).await.unwrap();
            (remaining, next)
        });

        let doomed: BTreeSet<RecordId> = doomed.into_iter().collect();
        let expected: Vec<RecordId> = (1..=products.len() as u64)
            .map(RecordId)
            .filter(|id| !doomed.contains(id))
            .collect();
        prop_assert_eq!(remaining, expected);

        // Deleted ids are never handed out again.
        prop_assert_eq!(next, RecordId(products.len() as u64 + 1));
    }

    #[test]
    fn test_patch_roundtrips_through_update(patch in product_patch()) {
        let updated = block_on(async {
            let (fixture, ids) = seeded(&[NewProduct::new("base", 1.0, 1)]).await;
            fixture.store.update(ids[0], &patch).await.unwrap()
        });

        let UpdateOutcome::Updated(product) = updated else {
            return Err(TestCaseError::fail("existing id reported missing"));
        };
        let stored = serde_json::to_value(&product).unwrap();
        for (field, value) in patch.as_record().iter() {
            prop_assert_eq!(stored.get(field), Some(value));
        }
        prop_assert_eq!(product.id, RecordId(1));
    }
}

#[test]
fn test_empty_patch_is_noop() {
    let (before, after) = block_on(async {
        let (fixture, ids) = seeded(&[NewProduct::new("A", 10.0, 1)]).await;
        let before = fixture.store.get(ids[0]).await.unwrap();
        fixture.store.update(ids[0], &ProductPatch::new()).await.unwrap();
        (before, fixture.store.get(ids[0]).await.unwrap())
    });

    assert_eq!(before, after);
}

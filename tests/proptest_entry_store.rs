//! Property test: the number of listed entries tracks saves minus deletes.

use caller_shell::store::{Entry, SqliteStorage, Storage};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

fn id_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-z0-9_]{1,12}", 0..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn list_counts_saves_minus_deletes(ids in id_set(), delete_mask in prop::collection::vec(any::<bool>(), 24)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (listed, deleted) = runtime.block_on(async {
            let storage = SqliteStorage::new_ephemeral().await.unwrap();

            for id in &ids {
                storage.save(Entry::new(id, "note", json!(id))).await.unwrap();
            }

            let mut deleted = BTreeSet::new();
            for (id, delete) in ids.iter().zip(&delete_mask) {
                if *delete {
                    storage.delete(id).await.unwrap();
                    deleted.insert(id.clone());
                }
            }

            let listed: BTreeSet<String> =
                storage.list().await.unwrap().into_iter().map(|e| e.id).collect();
            (listed, deleted)
        });

        prop_assert_eq!(listed.len(), ids.len() - deleted.len());
        prop_assert!(listed.is_disjoint(&deleted));
        prop_assert!(listed.is_subset(&ids));
    }
}

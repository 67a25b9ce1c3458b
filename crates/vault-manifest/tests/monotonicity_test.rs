//! Property: appended records are never removed; supersession only adds.

use proptest::prelude::*;
use test_fixtures::{record, uri, TempVault};
use vault_core::models::VaultKind;
use vault_core::traits::{IManifestStore, SupersedeTarget};
use vault_manifest::ManifestStore;

#[derive(Debug, Clone)]
enum Op {
    Append { id: u8, body: u8 },
    Supersede { id: u8, body: u8 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, any::<u8>()).prop_map(|(id, body)| Op::Append { id, body }),
        (0u8..4, any::<u8>()).prop_map(|(id, body)| Op::Supersede { id, body }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn history_only_grows(ops in proptest::collection::vec(op(), 1..30)) {
        let vault = TempVault::new();
        let store = ManifestStore::from_config(vault.config()).unwrap();
        let mut seen: Vec<uuid::Uuid> = Vec::new();

        for (step, op) in ops.iter().enumerate() {
            let (id, body, supersede) = match op {
                Op::Append { id, body } => (*id, *body, false),
                Op::Supersede { id, body } => (*id, *body, true),
            };
            let u = format!("vault://default/raw/item{id}");
            let r = record(&u, &format!("raw/item{id}/{step}"), &[body]);
            let landed = if supersede {
                store.supersede(SupersedeTarget::Logical(uri(&u)), r)
            } else {
                store.append(VaultKind::Raw, r)
            };
            if let Ok(landed) = landed {
                if !seen.contains(&landed.record_id) {
                    seen.push(landed.record_id);
                }
            }

            let all: Vec<uuid::Uuid> = store
                .records(VaultKind::Raw)
                .unwrap()
                .into_iter()
                .map(|r| r.record_id)
                .collect();
            prop_assert_eq!(&all, &seen);

            for i in 0..4u8 {
                let current = store.lookup(&uri(&format!("vault://default/raw/item{i}"))).unwrap();
                prop_assert!(current.len() <= 1);
            }
        }

        let reopened = ManifestStore::from_config(vault.config()).unwrap();
        prop_assert_eq!(reopened.records(VaultKind::Raw).unwrap().len(), seen.len());
        prop_assert_eq!(reopened.current_count(), store.current_count());
    }
}

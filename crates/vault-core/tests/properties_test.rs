//! Property tests for identifiers and content addressing.

use proptest::prelude::*;
use vault_core::hashing;
use vault_core::models::{VaultKind, VaultUri};

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,8}"
}

proptest! {
    #[test]
    fn display_parses_back(
        vault_id in segment(),
        kind in prop::sample::select(VaultKind::ALL.to_vec()),
        parts in prop::collection::vec(segment(), 1..4),
    ) {
        let uri = VaultUri::new(&vault_id, kind, &parts.join("/")).unwrap();
        prop_assert_eq!(VaultUri::parse(&uri.to_string()).unwrap(), uri);
    }

    #[test]
    fn redundant_slashes_do_not_change_identity(
        vault_id in segment(),
        parts in prop::collection::vec(segment(), 1..4),
    ) {
        let clean = format!("vault://{vault_id}/raw/{}", parts.join("/"));
        let noisy = format!("vault://{vault_id}//raw///{}/", parts.join("//"));
        prop_assert_eq!(VaultUri::parse(&noisy).unwrap(), VaultUri::parse(&clean).unwrap());
    }

    #[test]
    fn any_byte_flip_changes_the_digest(
        data in prop::collection::vec(any::<u8>(), 1..256),
        idx in any::<prop::sample::Index>(),
    ) {
        let original = hashing::hash(&data);
        let mut tampered = data.clone();
        let i = idx.index(tampered.len());
        tampered[i] ^= 0x01;
        prop_assert!(hashing::verify(&original, &data));
        prop_assert!(!hashing::verify(&original, &tampered));
    }
}

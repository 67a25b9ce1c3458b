use vault_core::models::{VaultKind, VaultUri};

#[test]
fn parses_all_six_kinds() {
    for kind in VaultKind::ALL {
        let uri = VaultUri::parse(&format!("vault://default/{kind}/a/b.txt")).unwrap();
        assert_eq!(uri.kind(), kind);
        assert_eq!(uri.relative_path(), format!("{kind}/a/b.txt"));
    }
}

#[test]
fn collapses_empty_segments_and_trailing_slash() {
    let uri = VaultUri::parse("vault://default//mu//2026/x.mimo/").unwrap();
    assert_eq!(uri.path(), "2026/x.mimo");
    assert_eq!(uri.to_string(), "vault://default/mu/2026/x.mimo");
}

#[test]
fn rejects_malformed_uris() {
    assert!(VaultUri::parse("file:///tmp/x").is_err());
    assert!(VaultUri::parse("vault://default/raw").is_err());
    assert!(VaultUri::parse("vault://default/bogus/x").is_err());
    assert!(VaultUri::parse("vault://default/raw/../etc/passwd").is_err());
}

#[test]
fn serializes_as_plain_string() {
    let uri = VaultUri::parse("vault://v1/assets/img.png").unwrap();
    let json = serde_json::to_string(&uri).unwrap();
    assert_eq!(json, "\"vault://v1/assets/img.png\"");
    let back: VaultUri = serde_json::from_str(&json).unwrap();
    assert_eq!(back, uri);
    assert!(serde_json::from_str::<VaultUri>("\"vault://v1/nope/x\"").is_err());
}

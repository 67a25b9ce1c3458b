use criterion::{black_box, criterion_group, criterion_main, Criterion};

use test_fixtures::{record, uri, TempVault};
use vault_core::models::VaultKind;
use vault_core::traits::IManifestStore;
use vault_manifest::ManifestStore;

fn bench_lookup(c: &mut Criterion) {
    let vault = TempVault::new();
    let store = ManifestStore::from_config(vault.config()).unwrap();
    for i in 0..2_000 {
        let u = format!("vault://default/raw/doc{i}");
        store
            .append(VaultKind::Raw, record(&u, &format!("raw/doc{i}"), format!("{i}").as_bytes()))
            .unwrap();
    }
    let target = uri("vault://default/raw/doc1234");

    c.bench_function("manifest_lookup_2k", |b| {
        b.iter(|| store.lookup(black_box(&target)).unwrap())
    });

    c.bench_function("manifest_reload_2k", |b| {
        b.iter(|| ManifestStore::from_config(vault.config()).unwrap().current_count())
    });
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);

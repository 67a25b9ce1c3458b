use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use test_fixtures::{uri, TempVault};
use vault_core::models::{PointerRange, VaultKind};
use vault_core::traits::{IManifestStore, IPointerResolver};
use vault_manifest::ManifestStore;
use vault_resolver::PointerResolver;

fn bench_resolve(c: &mut Criterion) {
    let vault = TempVault::new();
    let store = Arc::new(ManifestStore::from_config(vault.config()).unwrap());
    let body = "line of evidence\n".repeat(4_096);
    store
        .append(
            VaultKind::Raw,
            vault.ingest("vault://default/raw/big.txt", "raw/big.txt", body.as_bytes()),
        )
        .unwrap();
    let resolver = PointerResolver::from_config(store, vault.config());
    let id = uri("vault://default/raw/big.txt");

    c.bench_function("resolve_64k_whole", |b| {
        b.iter(|| resolver.resolve(black_box(&id), None))
    });
    c.bench_function("resolve_64k_lines", |b| {
        b.iter(|| resolver.resolve(black_box(&id), Some(PointerRange::Lines { start: 100, end: 120 })))
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);

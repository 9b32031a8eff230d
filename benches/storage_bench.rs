//! Benchmarks for FlatKV storage operations

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use flatkv::record::JsonCodec;
use flatkv::recovery::replay;
use flatkv::{Config, Store};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Store {
    let config = Config::builder()
        .path(dir.path().join("bench.db"))
        .fsync_on_write(false)
        .build();
    Store::open(config).unwrap()
}

fn storage_benchmarks(c: &mut Criterion) {
    c.bench_function("put_single_key", |b| {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            store.put("counter", i).unwrap()
        });
        store.wait_drained();
    });

    c.bench_function("put_distinct_keys", |b| {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            store.put(&format!("key-{}", i), "value").unwrap()
        });
        store.wait_drained();
    });

    c.bench_function("get_hit", |b| {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        for i in 0..1000 {
            store.put(&format!("key-{}", i), i).unwrap();
        }
        store.wait_drained();
        b.iter(|| store.get("key-500").unwrap());
    });

    c.bench_function("replay_10k_records", |b| {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bench.db");
        {
            let store = open_store(&dir);
            for i in 0..10_000 {
                store.put(&format!("key-{}", i % 2_000), i).unwrap();
            }
            store.close().unwrap();
        }
        let data = std::fs::read(&path).unwrap();
        b.iter_batched(|| data.clone(), |data| replay(&data, &JsonCodec), BatchSize::LargeInput);
    });
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);

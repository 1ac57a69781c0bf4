//! Cache throughput benchmarks.
//!
//! Measures key derivation and local fallback cache hit/miss paths.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use forge_core::cache::{generation_key, LocalCache, LocalCacheConfig};

const TTL: Duration = Duration::from_secs(3600);

fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_key");

    for (name, len) in [("short", 32), ("medium", 512), ("long", 4096)] {
        let prompt = "a".repeat(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(BenchmarkId::new("prompt", name), |b| {
            b.iter(|| generation_key(black_box("owner-1"), black_box(&prompt)))
        });
    }

    group.finish();
}

fn bench_local_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_cache_get");

    for (name, entries) in [("100", 100), ("10k", 10_000)] {
        let cache = LocalCache::new(LocalCacheConfig { max_entries: entries });
        let keys: Vec<_> = (0..entries).map(|i| format!("k{i}")).collect();
        for key in &keys {
            cache.set(key, "{\"title\":\"x\"}".to_string(), TTL);
        }

        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::new("hit", name), |b| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % keys.len();
                black_box(cache.get(&keys[i]))
            })
        });
        group.bench_function(BenchmarkId::new("miss", name), |b| {
            b.iter(|| black_box(cache.get(black_box("absent"))))
        });
    }

    group.finish();
}

fn bench_local_set_at_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_cache_set_at_capacity");

    for (name, entries) in [("100", 100usize), ("1k", 1_000)] {
        let cache = LocalCache::new(LocalCacheConfig { max_entries: entries });
        for i in 0..entries {
            cache.set(&format!("seed{i}"), String::new(), TTL);
        }

        group.bench_function(BenchmarkId::new("evicting", name), |b| {
            let mut i = 0u64;
            b.iter(|| {
                i += 1;
                cache.set(&format!("new{i}"), String::new(), TTL);
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_key_derivation,
    bench_local_hits,
    bench_local_set_at_capacity
);
criterion_main!(benches);

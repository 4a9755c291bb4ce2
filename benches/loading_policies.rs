//! Benchmarks for association loading policies.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fetchgraph::query::{ArtistId, LoadingPolicy, RowStore, Session, plan_fetches};

fn seeded_store(artists: usize, songs_each: usize) -> Arc<RowStore> {
    let store = Arc::new(RowStore::new());
    for i in 0..artists {
        let id = store.insert_artist(format!("Artist {i}"));
        for j in 0..songs_each {
            store
                .insert_song(format!("Song {i}.{j}"), id)
                .expect("artist exists");
        }
    }
    store
}

fn policies() -> Vec<LoadingPolicy> {
    vec![
        LoadingPolicy::Eager,
        LoadingPolicy::JoinFetch,
        LoadingPolicy::Subselect,
        LoadingPolicy::batch(10).expect("non-zero batch size"),
    ]
}

/// Benchmark a full load under each policy.
fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for artists in [10usize, 100, 1000] {
        let store = seeded_store(artists, 5);
        group.throughput(Throughput::Elements(artists as u64));

        for policy in policies() {
            group.bench_with_input(BenchmarkId::new(policy.to_string(), artists), &policy, |b, policy| {
                b.iter(|| {
                    let session = Session::open(Arc::clone(&store));
                    black_box(session.load(*policy).expect("load succeeds"))
                })
            });
        }
    }

    group.finish();
}

/// Benchmark lazy loading with every collection touched.
fn bench_lazy_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("lazy_access");

    for artists in [10usize, 100] {
        let store = seeded_store(artists, 5);

        group.bench_with_input(BenchmarkId::from_parameter(artists), &artists, |b, _| {
            b.iter(|| {
                let session = Session::open(Arc::clone(&store));
                let loaded = session.load(LoadingPolicy::Lazy).expect("load succeeds");
                for artist in &loaded {
                    black_box(artist.songs().expect("songs load").len());
                }
            })
        });
    }

    group.finish();
}

/// Benchmark fetch planning.
fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_fetches");
    let ids: Vec<ArtistId> = (1..=1000).map(ArtistId).collect();

    for policy in policies() {
        group.bench_function(policy.to_string(), |b| {
            b.iter(|| black_box(plan_fetches(black_box(&ids), policy)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_lazy_access, bench_plan);

criterion_main!(benches);

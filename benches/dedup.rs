use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quern_notify::{
    DedupEntry, DedupStore, DedupWindow, IngredientRule, ItemStack, LocationKey, LockedStorage,
    Notifier, NullSender, Role, Rule, ShardedStorage, Strategy, Validator,
};
use std::sync::Arc;

fn sharded_store() -> DedupStore<ShardedStorage<LocationKey, DedupEntry>> {
    DedupStore::new(ShardedStorage::new(), DedupWindow::default())
}

/// Benchmark single-threaded dedup decisions per storage backend
fn bench_single_threaded_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("sharded", |b| {
        let store = sharded_store();
        let key = LocationKey::new(0, 64, 0);
        let mut now = 0i64;

        b.iter(|| {
            for _ in 0..1000 {
                now += 1;
                black_box(store.should_send(black_box(key), black_box("Flint"), now));
            }
        })
    });

    group.bench_function("locked", |b| {
        let store = DedupStore::new(LockedStorage::new(), DedupWindow::default());
        let key = LocationKey::new(0, 64, 0);
        let mut now = 0i64;

        b.iter(|| {
            for _ in 0..1000 {
                now += 1;
                black_box(store.should_send(black_box(key), black_box("Flint"), now));
            }
        })
    });

    group.finish();
}

/// Benchmark multi-threaded concurrent throughput
fn bench_concurrent_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements((*num_threads as u64) * 1000));

        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let store = Arc::new(sharded_store());

                    let mut handles = vec![];
                    for t in 0..num_threads {
                        let store = Arc::clone(&store);
                        let handle = std::thread::spawn(move || {
                            // Each thread hits its own quern to avoid contention
                            let key = LocationKey::new(t, 64, 0);
                            for now in 0..1000 {
                                black_box(store.should_send(black_box(key), "Flint", now));
                            }
                        });
                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark store growth with many distinct locations
fn bench_store_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_scaling");

    for num_locations in [100, 1000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("insert", num_locations),
            num_locations,
            |b, &num_locations| {
                b.iter(|| {
                    let store = sharded_store();
                    for i in 0..num_locations {
                        store.should_send(LocationKey::new(i, 0, -i), "Flint", 0);
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark registry scan cost against rule count
fn bench_registry_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_scan");

    for num_rules in [10, 100, 1000].iter() {
        let rules: Vec<Arc<dyn Rule>> = (0..*num_rules)
            .map(|i| Arc::new(IngredientRule::new(format!("game:grain-{i}"))) as Arc<dyn Rule>)
            .collect();
        let validator = Validator::new(Strategy::registry(rules));
        let miss = ItemStack::new("game:flint");

        group.bench_with_input(BenchmarkId::new("miss", num_rules), &validator, |b, v| {
            b.iter(|| black_box(v.can_proceed(Some(black_box(&miss)))))
        });
    }

    group.finish();
}

/// Benchmark the full notify pipeline
fn bench_notify_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify_pipeline");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("duplicate_heavy", |b| {
        let notifier = Notifier::builder().with_sender(NullSender).build().unwrap();
        let flint = ItemStack::new("game:flint").named("Flint");
        let key = LocationKey::new(0, 64, 0);
        let mut now = 0i64;

        b.iter(|| {
            for _ in 0..1000 {
                now += 1;
                black_box(notifier.notify(key, Some(&flint), now, Role::Authoritative));
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_threaded_throughput,
    bench_concurrent_throughput,
    bench_store_size,
    bench_registry_scan,
    bench_notify_pipeline,
);
criterion_main!(benches);

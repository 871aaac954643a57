use criterion::{BenchmarkId, Criterion};
use market_pricer::Registry;
use std::hint::black_box;

/// Register all benchmarks for registry price queries and trades.
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("Registry - Pricing");

    group.bench_function("price_for_buy_priced", |b| {
        let registry = Registry::new();
        let _ = registry.price_for_buy("BENCH", 1, 50.0, 20.0);
        b.iter(|| black_box(registry.price_for_buy(black_box("BENCH"), 1, 50.0, 20.0)));
    });

    group.bench_function("apply_buy", |b| {
        let registry = Registry::new();
        let _ = registry.price_for_buy("BENCH", 1, 50.0, 20.0);
        b.iter(|| black_box(registry.apply_buy(black_box("BENCH"), 1)));
    });

    // First query on many keys: exercises entry creation
    for &item_count in &[100, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("first_queries", item_count),
            &item_count,
            |b, &count| {
                let keys: Vec<String> = (0..count).map(|i| format!("ITEM_{i}")).collect();
                b.iter_with_setup(Registry::new, |registry| {
                    for key in &keys {
                        let _ = black_box(registry.price_for_sell(key, 1, 10.0, 5.0));
                    }
                });
            },
        );
    }

    // Promotion of loaded stock
    for &item_count in &[100, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("promote_loaded", item_count),
            &item_count,
            |b, &count| {
                let keys: Vec<String> = (0..count).map(|i| format!("ITEM_{i}")).collect();
                b.iter_with_setup(
                    || {
                        let registry = Registry::new();
                        for key in &keys {
                            registry.insert_stock(key, 10.0, None);
                        }
                        registry
                    },
                    |registry| {
                        for key in &keys {
                            let _ = black_box(registry.resolve_or_create(key, 10.0, 5.0));
                        }
                    },
                );
            },
        );
    }

    group.finish();
}

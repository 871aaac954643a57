use criterion::{criterion_group, criterion_main};

mod registry;

use registry::register_benchmarks as register_registry_benchmarks;

criterion_group!(benches, register_registry_benchmarks);

criterion_main!(benches);

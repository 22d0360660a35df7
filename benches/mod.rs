use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    submit_bench::bench_in_order,
    submit_bench::bench_reversed_drain,
    submit_bench::bench_duplicates
);
criterion_main!(benches);

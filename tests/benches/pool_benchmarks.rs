//! # ForkLab Pool Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | `submit_extrinsic` (prefix resolver) | < 10µs per tx |
//! | `create_new_block` snapshot | linear in pooled entries |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use fl_01_txpool::{BuildOverrides, PrefixSignerResolver, TxPool, TxPoolApi};
use shared_bus::InMemoryEventBus;
use shared_types::entities::HexBytes;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn new_pool() -> TxPool {
    TxPool::new(
        Arc::new(PrefixSignerResolver::new()),
        Arc::new(InMemoryEventBus::new()),
    )
}

fn extrinsic(i: u32) -> HexBytes {
    HexBytes::new(i.to_be_bytes().to_vec())
}

fn bench_submit(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("fl-01-submit");

    group.throughput(Throughput::Elements(1));
    group.bench_function("submit_extrinsic", |b| {
        let pool = new_pool();
        let mut i = 0u32;
        b.iter(|| {
            i = i.wrapping_add(1);
            rt.block_on(pool.submit_extrinsic(extrinsic(i))).unwrap();
        });
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("fl-01-snapshot");

    for size in [10u32, 100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("create_new_block", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let pool = new_pool();
                    rt.block_on(async {
                        for i in 0..size {
                            pool.submit_extrinsic(extrinsic(i)).await.unwrap();
                        }
                    });
                    pool
                },
                |pool| black_box(pool.create_new_block(BuildOverrides::none())),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_submit, bench_snapshot);
criterion_main!(benches);

use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ordered_pool::{OrderedThreadPool, ThreadPool};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

// Number of jobs submitted per benchmark iteration.
const TOTAL_JOBS: usize = 4096;

/// Work done by each compute step: a short, CPU-bound hash loop.
fn busy_work(seed: u64) -> u64 {
    let mut x = seed ^ 0x9E37_79B9_7F4A_7C15;
    for _ in 0..256 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
    }
    x
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential");
    group.throughput(Throughput::Elements(TOTAL_JOBS as u64));

    group.bench_function(format!("elems/{TOTAL_JOBS}"), |b| {
        b.iter(|| {
            let mut acc = 0_u64;
            for i in 0..TOTAL_JOBS as u64 {
                acc = acc.wrapping_add(busy_work(i));
            }
            black_box(acc)
        });
    });

    group.finish();
}

/// Benchmarks the ordered pool end to end, including spawn and shutdown.
fn bench_ordered(c: &mut Criterion, num_workers: usize, queue_capacity: usize) {
    let mut group = c.benchmark_group(format!(
        "ordered/workers/{num_workers}/capacity/{queue_capacity}"
    ));
    group.throughput(Throughput::Elements(TOTAL_JOBS as u64));

    group.bench_function(format!("elems/{TOTAL_JOBS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let pool = OrderedThreadPool::new(num_workers, queue_capacity).unwrap();
                let acc = Arc::new(AtomicU64::new(0));
                for i in 0..TOTAL_JOBS as u64 {
                    let acc = Arc::clone(&acc);
                    pool.submit(
                        move || busy_work(i),
                        move |v| {
                            acc.fetch_add(v, Ordering::Relaxed);
                        },
                    )
                    .unwrap();
                }
                pool.shutdown();
                black_box(acc.load(Ordering::Relaxed));
            }

            start.elapsed()
        });
    });

    group.finish();
}

fn bench_unordered(c: &mut Criterion, num_workers: usize) {
    let mut group = c.benchmark_group(format!("unordered/workers/{num_workers}"));
    group.throughput(Throughput::Elements(TOTAL_JOBS as u64));

    group.bench_function(format!("elems/{TOTAL_JOBS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let pool = ThreadPool::with_capacity(num_workers, 0).unwrap();
                let acc = Arc::new(AtomicU64::new(0));
                for i in 0..TOTAL_JOBS as u64 {
                    let acc = Arc::clone(&acc);
                    pool.submit(move || {
                        acc.fetch_add(busy_work(i), Ordering::Relaxed);
                    })
                    .unwrap();
                }
                pool.shutdown();
                black_box(acc.load(Ordering::Relaxed));
            }

            start.elapsed()
        });
    });

    group.finish();
}

fn benches(c: &mut Criterion) {
    bench_sequential(c);

    let cores = num_cpus::get();
    let mut worker_counts = vec![0, 1, cores];
    worker_counts.dedup();
    for num_workers in worker_counts {
        bench_ordered(c, num_workers, 0);
    }
    bench_ordered(c, cores, cores * 2);
    bench_unordered(c, cores);
}

criterion_group!(all, benches);
criterion_main!(all);

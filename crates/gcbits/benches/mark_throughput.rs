//! Benchmark: atomic mark path and sweep-style cursor traversal.

use criterion::{criterion_group, criterion_main, Criterion};
use gcbits::{BitStore, GcBits};
use std::hint::black_box;

const NELEMS: usize = 4096;

fn bench_set_marked(c: &mut Criterion) {
    let store = BitStore::new();
    let bits = GcBits::new_mark_bits(&store, NELEMS, true).unwrap();
    c.bench_function("set_marked_4096", |b| {
        b.iter(|| {
            for n in 0..NELEMS {
                bits.cursor_at(black_box(n)).set_marked();
            }
        });
    });
}

fn bench_sweep_scan(c: &mut Criterion) {
    let store = BitStore::new();
    let bits = GcBits::new_mark_bits(&store, NELEMS, true).unwrap();
    for n in (0..NELEMS).step_by(3) {
        bits.set_marked(n);
    }
    c.bench_function("sweep_scan_4096", |b| {
        b.iter(|| {
            let live = bits.iter().filter(|&marked| marked).count();
            black_box(live);
        });
    });
}

fn bench_invert(c: &mut Criterion) {
    let store = BitStore::new();
    let bits = GcBits::new_mark_bits(&store, NELEMS, true).unwrap();
    c.bench_function("invert_4096", |b| {
        b.iter(|| bits.invert(black_box(NELEMS)));
    });
}

criterion_group!(benches, bench_set_marked, bench_sweep_scan, bench_invert);
criterion_main!(benches);

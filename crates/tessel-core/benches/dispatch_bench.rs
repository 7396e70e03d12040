//! Criterion benchmarks for node dispatch.
//!
//! Compares the same gain chain in three shapes so the cost of each dispatch
//! path is visible on its own:
//!
//! - **Static** - a tuple chain, fully monomorphised
//! - **Opaque** - a `Vec<OpaqueNode>` chain, one table call per child
//! - **Frame** - the static chain forced to per-frame processing
//!
//! Run with: `cargo bench -p tessel-core -- dispatch/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tessel_core::container::{Chain, Split};
use tessel_core::nodes::Gain;
use tessel_core::prelude::*;
use tessel_core::wrap::{Duplicate, Frame, Oversample, Parallel};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn specs(block: usize) -> PrepareSpecs {
    PrepareSpecs::new(SAMPLE_RATE, block, 2)
}

fn static_chain() -> Chain<(Gain, Gain, Gain, Gain)> {
    Chain::new((Gain::new(-1.0), Gain::new(-1.0), Gain::new(-1.0), Gain::new(-1.0)))
}

fn opaque_chain() -> Chain<Vec<OpaqueNode>> {
    Chain::new((0..4).map(|_| OpaqueNode::new(Gain::new(-1.0))).collect())
}

fn run<T: Node>(node: &mut T, left: &mut [f32], right: &mut [f32]) {
    node.process(&mut ProcessData::new([left, right]));
}

// ---------------------------------------------------------------------------
// Dispatch paths
// ---------------------------------------------------------------------------

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/chain4");

    for &block in BLOCK_SIZES {
        let mut left = vec![0.5_f32; block];
        let mut right = vec![0.5_f32; block];

        let mut fixed = static_chain();
        fixed.prepare(&specs(block)).unwrap();
        group.bench_with_input(BenchmarkId::new("static", block), &block, |b, _| {
            b.iter(|| run(&mut fixed, black_box(&mut left), black_box(&mut right)));
        });

        let mut erased = opaque_chain();
        erased.prepare(&specs(block)).unwrap();
        group.bench_with_input(BenchmarkId::new("opaque", block), &block, |b, _| {
            b.iter(|| run(&mut erased, black_box(&mut left), black_box(&mut right)));
        });

        let mut framed = Frame::new(static_chain());
        framed.prepare(&specs(block)).unwrap();
        group.bench_with_input(BenchmarkId::new("frame", block), &block, |b, _| {
            b.iter(|| run(&mut framed, black_box(&mut left), black_box(&mut right)));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Composite nodes, fixed block size 256
// ---------------------------------------------------------------------------

fn bench_composites(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch/composite");
    let block = 256;
    let mut left = vec![0.5_f32; block];
    let mut right = vec![0.5_f32; block];

    {
        let mut split = Split::new((Gain::new(-6.0), Gain::new(-6.0), Gain::new(-6.0)));
        split.prepare(&specs(block)).unwrap();
        group.bench_function("split3_block256", |b| {
            b.iter(|| run(&mut split, black_box(&mut left), black_box(&mut right)));
        });
    }

    {
        let mut duplicate: Duplicate<Gain, Parallel> = Duplicate::new(Gain::new(-6.0), 8).unwrap();
        duplicate.prepare(&specs(block)).unwrap();
        group.bench_function("duplicate8_parallel_block256", |b| {
            b.iter(|| run(&mut duplicate, black_box(&mut left), black_box(&mut right)));
        });
    }

    {
        let mut oversampled = Oversample::<4, _>::new(Gain::new(-6.0));
        oversampled.prepare(&specs(block)).unwrap();
        group.bench_function("oversample4_block256", |b| {
            b.iter(|| run(&mut oversampled, black_box(&mut left), black_box(&mut right)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_composites);
criterion_main!(benches);

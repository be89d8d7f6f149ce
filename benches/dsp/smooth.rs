//! Benchmarks for the one-pole smoother.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::dsp::Smoother;

use crate::BLOCK_SIZES;

pub fn bench_smooth(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/smooth");

    for &size in BLOCK_SIZES {
        let targets: Vec<i32> = (0..size).map(|i| ((i * 37) % 400) as i32).collect();
        let mut output = vec![0i32; size];
        let mut smoother = Smoother::default();

        group.bench_with_input(BenchmarkId::new("next", size), &size, |b, _| {
            b.iter(|| {
                for (o, &t) in output.iter_mut().zip(&targets) {
                    *o = smoother.next(black_box(t));
                }
                black_box(&output);
            })
        });
    }

    group.finish();
}

//! Benchmarks for the resonant low-pass filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::dsp::{LowPassFilter, Oscillator, Wavetable};
use fm_voice::AUDIO_RATE;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    let mut osc = Oscillator::new(Wavetable::moog_square(2048).unwrap(), AUDIO_RATE);
    osc.set_freq(220);

    for &size in BLOCK_SIZES {
        let input: Vec<i16> = (0..size).map(|_| osc.next() as i16).collect();
        let mut output = vec![0i16; size];

        for (name, cutoff, resonance) in [("open", 255u8, 20u8), ("dark", 30, 20), ("resonant", 100, 200)] {
            let mut lpf = LowPassFilter::new();
            lpf.set_cutoff_and_resonance(cutoff, resonance);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (o, &x) in output.iter_mut().zip(&input) {
                        *o = lpf.next(black_box(x));
                    }
                    black_box(&output);
                })
            });
        }
    }

    group.finish();
}

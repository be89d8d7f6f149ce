//! Benchmarks for the wavetable oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::dsp::{Oscillator, Wavetable};
use fm_voice::AUDIO_RATE;

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let table = Wavetable::moog_square(2048).unwrap();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i8; size];

        // Plain table read
        let mut osc = Oscillator::new(table.clone(), AUDIO_RATE);
        osc.set_freq_f32(440.0);
        group.bench_with_input(BenchmarkId::new("next", size), &size, |b, _| {
            b.iter(|| {
                for s in buffer.iter_mut() {
                    *s = osc.next();
                }
                black_box(&buffer);
            })
        });

        // Carrier read with a modulator driving the phase offset
        let mut carrier = Oscillator::new(table.clone(), AUDIO_RATE);
        let mut modulator = Oscillator::new(table.clone(), AUDIO_RATE);
        carrier.set_freq_f32(440.0);
        modulator.set_freq(2200);
        group.bench_with_input(BenchmarkId::new("phase_modulate", size), &size, |b, _| {
            b.iter(|| {
                for s in buffer.iter_mut() {
                    let offset = black_box(200) * modulator.next() as i32;
                    *s = carrier.phase_modulate(offset);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}

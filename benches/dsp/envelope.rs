//! Benchmarks for the dual-rate ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::dsp::Envelope;
use fm_voice::{AUDIO_RATE, CONTROL_RATE};

use crate::BLOCK_SIZES;

fn envelope() -> Envelope {
    let mut env = Envelope::new(CONTROL_RATE, AUDIO_RATE);
    env.set_ad_levels(255, 64);
    env.set_times(50, 200, 10_000, 200);
    env
}

/// Render `buffer`, ticking the control side every 128 samples.
fn render(env: &mut Envelope, buffer: &mut [u8], counter: &mut usize) {
    for s in buffer.iter_mut() {
        if *counter == 0 {
            env.update();
            *counter = 128;
        }
        *counter -= 1;
        *s = env.next();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0u8; size];

        let mut env = envelope();
        let mut counter = 0;
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                // Retrigger so the measurement stays inside the ramp
                if !env.playing() {
                    env.note_on();
                }
                render(&mut env, black_box(&mut buffer), &mut counter);
            })
        });

        let mut env = envelope();
        let mut counter = 0;
        env.note_on();
        let mut warmup = vec![0u8; 128 * 40];
        render(&mut env, &mut warmup, &mut counter);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer), &mut counter))
        });

        let mut env = envelope();
        let mut counter = 0;
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer), &mut counter))
        });
    }

    group.finish();
}

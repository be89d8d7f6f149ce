//! Benchmarks for the complete FM voice.

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fm_voice::synth::message::NoMessages;
use fm_voice::{ControlPanel, ControlReadings, EngineConfig, FmEngine, SynthMessage, Voice};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");
    let config = EngineConfig::default();

    // Control update alone, the per-tick cost paid every 128 samples
    let mut engine = FmEngine::new(&config).unwrap();
    let controls = ControlReadings::default();
    engine.on_note_on(57, 100);
    group.bench_function("control_update", |b| {
        b.iter(|| engine.control_update(black_box(&controls)))
    });

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i16; size];

        // === HELD NOTE ===
        let mut engine = FmEngine::new(&config).unwrap();
        engine.on_note_on(45, 100);
        let mut voice = Voice::new(
            engine,
            NoMessages,
            ControlReadings::default(),
            config.samples_per_control(),
        );
        group.bench_with_input(BenchmarkId::new("held_note", size), &size, |b, _| {
            b.iter(|| voice.render(black_box(&mut buffer)))
        });

        // === SHARED PANEL ===
        // Atomic knob reads instead of a plain snapshot
        let panel = ControlPanel::new(ControlReadings::uniform(300));
        let mut queue = VecDeque::new();
        queue.push_back(SynthMessage::NoteOn {
            note: 60,
            velocity: 100,
        });
        let mut voice = Voice::new(
            FmEngine::new(&config).unwrap(),
            queue,
            &panel,
            config.samples_per_control(),
        );
        group.bench_with_input(BenchmarkId::new("panel_controls", size), &size, |b, _| {
            b.iter(|| voice.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}

use tracing::info;

use crate::config::EngineConfig;
use crate::dsp::envelope::{Envelope, EnvelopeState};
use crate::dsp::filter::LowPassFilter;
use crate::dsp::mapper::ControlMapping;
use crate::dsp::oscillator::Oscillator;
use crate::dsp::smooth::Smoother;
use crate::dsp::wavetable::Wavetable;
use crate::error::Result;
use crate::io::controls::{ControlLine, ControlSource};
use crate::io::converter::midi_note_to_freq;
use crate::synth::message::SynthMessage;

/*
FM Voice Engine
===============

One monophonic two-operator FM voice, run at two rates.

Signal Flow (audio rate)
------------------------

    intensity ──smooth──┐
                        × ── phase offset ──┐
    modulator ──────────┘                   │
                                            ▼
                                  carrier (phase_modulate)
                                            │
                                   low-pass filter
                                            │
                                   × envelope >> 8 ──→ sample

Control Flow (control rate)
---------------------------

    pots → map → smooth ─┬─→ release time  → envelope
                         ├─→ cutoff         → filter
                         ├─→ intensity × (LFO + 128) >> 8 → fm_intensity
                         └─→ LFO speed
    envelope.update()

The control update writes `fm_intensity`, the filter coefficients and the
envelope ramp. The audio update only reads them (the ramp and the intensity
smoother advance, but they are audio-side state). Nothing flows from audio
back to control.

Widths
------

  carrier, modulator, LFOs   i8
  filter in/out              i16 in, truncated to i8 after filtering
  envelope                   u8
  FM intensity, modulation   i32 (Q15.16 fraction of a cycle)
  output                     (u8 · i8) >> 8 as i16, so -128..=126

Both update functions are O(1), allocation-free and never block.
*/

pub struct FmEngine {
    carrier: Oscillator,
    modulator: Oscillator,
    intensity_lfo: Oscillator,
    cutoff_lfo: Oscillator,
    envelope: Envelope,
    filter: LowPassFilter,

    smooth_intensity: Smoother,
    smooth_cutoff: Smoother,
    smooth_release: Smoother,

    release_map: ControlMapping,
    cutoff_map: ControlMapping,
    intensity_map: ControlMapping,
    speed_map: ControlMapping,

    /// Control → audio handoff.
    fm_intensity: i32,

    mod_ratio: u32,
    lfo_offset: i32,
    intensity_shift: u32,
    cutoff_lfo_depth: i32,
    note: Option<u8>,
}

impl FmEngine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let table = Wavetable::moog_square(config.table_cells)?;
        let audio_rate = config.audio_rate;
        let control_rate = config.control_rate;

        let mut carrier = Oscillator::new(table.clone(), audio_rate);
        carrier.set_freq(config.initial_carrier_hz);
        let modulator = Oscillator::new(table.clone(), audio_rate);
        let intensity_lfo = Oscillator::new(table.clone(), control_rate);
        let mut cutoff_lfo = Oscillator::new(table, control_rate);
        cutoff_lfo.set_freq_f32(config.cutoff_lfo_hz);

        let env = &config.envelope;
        let mut envelope = Envelope::new(control_rate, audio_rate);
        envelope.set_ad_levels(env.attack_level, env.decay_level);
        envelope.set_release_level(env.release_level);
        envelope.set_attack_time(env.attack_ms);
        envelope.set_decay_time(env.decay_ms);
        envelope.set_sustain_time(env.sustain_ms);
        envelope.set_release_time(env.release_ms);

        let mut filter = LowPassFilter::new();
        filter.set_resonance(config.resonance);

        let ranges = &config.ranges;
        let auto = config.auto_range;

        info!(
            audio_rate,
            control_rate,
            table_cells = config.table_cells,
            mod_ratio = config.mod_ratio,
            "fm voice ready"
        );

        Ok(Self {
            carrier,
            modulator,
            intensity_lfo,
            cutoff_lfo,
            envelope,
            filter,
            smooth_intensity: Smoother::new(config.smoothness),
            smooth_cutoff: Smoother::new(config.smoothness),
            smooth_release: Smoother::new(config.smoothness),
            release_map: ControlMapping::new(ranges.release, auto),
            cutoff_map: ControlMapping::new(ranges.filter_cutoff, auto),
            intensity_map: ControlMapping::new(ranges.intensity, auto),
            speed_map: ControlMapping::new(ranges.mod_speed, auto),
            fm_intensity: 0,
            mod_ratio: config.mod_ratio,
            lfo_offset: config.lfo_offset,
            intensity_shift: config.intensity_shift,
            cutoff_lfo_depth: config.cutoff_lfo_depth as i32,
            note: None,
        })
    }

    /// Retune both operators to `note` and (re)start the envelope. Velocity
    /// is accepted for interface compatibility; the voice is not
    /// velocity-sensitive.
    ///
    /// The modulator frequency is kept as a full `u32` rather than narrowed to
    /// 16 bits. From note 116 up the product passes 32767, where a 16-bit
    /// value would wrap by a multiple of 65536 Hz. At the default rates that
    /// shifts the phase increment by whole table cycles per sample, so the
    /// audio is identical either way and only `modulator_frequency()` reports
    /// the unwrapped pitch.
    pub fn on_note_on(&mut self, note: u8, _velocity: u8) {
        let freq = midi_note_to_freq(note);
        self.modulator.set_freq((freq * self.mod_ratio as f32) as u32);
        self.carrier.set_freq_f32(freq);
        self.envelope.note_on();
        self.note = Some(note);
    }

    /// Any note-off releases the voice, whichever key it names.
    pub fn on_note_off(&mut self, _note: u8, _velocity: u8) {
        self.envelope.note_off();
        self.note = None;
    }

    pub fn all_notes_off(&mut self) {
        if self.envelope.state() != EnvelopeState::Idle {
            self.envelope.note_off();
        }
        self.note = None;
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, velocity } => self.on_note_on(note, velocity),
            SynthMessage::NoteOff { note, velocity } => self.on_note_off(note, velocity),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Control-rate tick: read pots, refresh modulation and filter, advance
    /// the envelope clock.
    pub fn control_update<C: ControlSource + ?Sized>(&mut self, controls: &C) {
        let release_raw = controls.read(ControlLine::Release) as i32;
        let cutoff_raw = controls.read(ControlLine::FilterCutoff) as i32;
        let intensity_raw = controls.read(ControlLine::Intensity) as i32;
        let speed_raw = controls.read(ControlLine::ModSpeed) as i32;

        let release_ms = self.release_map.next(release_raw);
        let cutoff = self.cutoff_map.next(cutoff_raw);
        let intensity = self.intensity_map.next(intensity_raw);
        let mod_speed = self.speed_map.next(speed_raw) as f32 / 1000.0;

        let smooth_cutoff = self.smooth_cutoff.next(cutoff);
        let smooth_release = self.smooth_release.next(release_ms);

        let lfo = self.intensity_lfo.next() as i32 + self.lfo_offset;
        self.fm_intensity = intensity.wrapping_mul(lfo) >> self.intensity_shift;

        self.envelope.set_release_time(smooth_release as u16);

        let wobble = (self.cutoff_lfo.next() as i32 * self.cutoff_lfo_depth) >> 8;
        let cutoff = (smooth_cutoff + wobble).clamp(0, u8::MAX as i32);
        self.filter.set_cutoff(cutoff as u8);

        self.envelope.update();

        self.intensity_lfo.set_freq_f32(mod_speed);
    }

    /// Audio-rate tick: one output sample.
    #[inline]
    pub fn audio_update(&mut self) -> i16 {
        let depth = self.smooth_intensity.next(self.fm_intensity);
        let modulation = depth.wrapping_mul(self.modulator.next() as i32);
        let carrier = self.carrier.phase_modulate(modulation);
        let filtered = self.filter.next(carrier as i16) as i8;

        (self.envelope.next() as i16 * filtered as i16) >> 8
    }

    pub fn fm_intensity(&self) -> i32 {
        self.fm_intensity
    }

    pub fn carrier_frequency(&self) -> f32 {
        self.carrier.frequency()
    }

    pub fn modulator_frequency(&self) -> f32 {
        self.modulator.frequency()
    }

    pub fn intensity_lfo_frequency(&self) -> f32 {
        self.intensity_lfo.frequency()
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    pub fn envelope_level(&self) -> u8 {
        self.envelope.level()
    }

    pub fn is_playing(&self) -> bool {
        self.envelope.playing()
    }

    pub fn release_steps(&self) -> u16 {
        self.envelope.update_steps(EnvelopeState::Release)
    }

    pub fn cutoff(&self) -> u8 {
        self.filter.cutoff()
    }

    /// Note currently held, if any.
    pub fn note(&self) -> Option<u8> {
        self.note
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::controls::{ControlReadings, RAW_MAX};
    use proptest::prelude::*;

    fn engine() -> FmEngine {
        FmEngine::new(&EngineConfig::default()).unwrap()
    }

    fn run_ticks(engine: &mut FmEngine, controls: &ControlReadings, ticks: usize) -> Vec<i16> {
        let mut out = Vec::with_capacity(ticks * 128);
        for _ in 0..ticks {
            engine.control_update(controls);
            for _ in 0..128 {
                out.push(engine.audio_update());
            }
        }
        out
    }

    #[test]
    fn note_on_sets_operator_frequencies() {
        let mut engine = engine();
        engine.on_note_on(69, 100);
        assert_eq!(engine.carrier_frequency(), 440.0);
        assert_eq!(engine.modulator_frequency(), 2200.0);
        assert_eq!(engine.note(), Some(69));
        assert_eq!(engine.envelope_state(), EnvelopeState::Attack);
    }

    #[test]
    fn wide_modulator_frequency_sounds_like_sixteen_bit_wrap() {
        let mut engine = engine();
        engine.on_note_on(120, 100);
        let hz = engine.modulator_frequency() as u32;
        assert_eq!(hz, 41_860);
        assert!(hz > i16::MAX as u32);

        let table = Wavetable::moog_square(2048).unwrap();
        let mut wide = Oscillator::new(table.clone(), crate::AUDIO_RATE);
        let mut narrow = Oscillator::new(table, crate::AUDIO_RATE);
        wide.set_freq(hz);
        narrow.set_freq(hz as i16 as i32 as u32);
        assert_ne!(wide.phase_increment(), narrow.phase_increment());
        for _ in 0..4096 {
            assert_eq!(wide.next(), narrow.next());
        }
    }

    #[test]
    fn silent_before_first_note() {
        let mut engine = engine();
        let out = run_ticks(&mut engine, &ControlReadings::default(), 4);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn knobs_at_rest_map_to_reference_values() {
        let mut engine = engine();
        let controls = ControlReadings::uniform(0);
        engine.control_update(&controls);

        assert_eq!(engine.cutoff(), 200);
        // 5000 ms * 128 >> 10
        assert_eq!(engine.release_steps(), 625);
        assert!((engine.intensity_lfo_frequency() - 0.001).abs() < 1e-6);
        // First LFO read is cell 0 of the table (0) → 400 * 128 >> 8
        assert_eq!(engine.fm_intensity(), 200);
    }

    #[test]
    fn cutoff_glides_toward_new_knob_position() {
        let mut engine = engine();
        engine.control_update(&ControlReadings::uniform(0));
        assert_eq!(engine.cutoff(), 200);

        engine.control_update(&ControlReadings::uniform(RAW_MAX));
        let after_one = engine.cutoff();
        assert!(after_one < 200 && after_one > 150, "cutoff jumped to {after_one}");

        for _ in 0..400 {
            engine.control_update(&ControlReadings::uniform(RAW_MAX));
        }
        assert_eq!(engine.cutoff(), 1);
    }

    #[test]
    fn sounding_note_produces_audio() {
        let mut engine = engine();
        let controls = ControlReadings::default();
        engine.on_note_on(57, 100);
        let out = run_ticks(&mut engine, &controls, 10);
        assert!(out.iter().any(|&s| s != 0));
    }

    #[test]
    fn release_runs_to_silence() {
        let mut engine = engine();
        let controls = ControlReadings::uniform(RAW_MAX);
        engine.on_note_on(60, 100);
        run_ticks(&mut engine, &controls, 40);

        engine.on_note_off(60, 0);
        // Release knob fully up is 200 ms → 25 steps once the smoother settles.
        run_ticks(&mut engine, &controls, 200);
        assert_eq!(engine.envelope_state(), EnvelopeState::Idle);
        let tail = run_ticks(&mut engine, &controls, 2);
        assert!(tail.iter().all(|&s| s == 0));
    }

    #[test]
    fn cutoff_lfo_depth_zero_matches_plain_cutoff() {
        let mut plain = engine();
        let mut wobbly = FmEngine::new(&EngineConfig {
            cutoff_lfo_hz: 3.0,
            cutoff_lfo_depth: 0,
            ..Default::default()
        })
        .unwrap();
        let controls = ControlReadings::default();
        plain.on_note_on(64, 90);
        wobbly.on_note_on(64, 90);

        assert_eq!(
            run_ticks(&mut plain, &controls, 20),
            run_ticks(&mut wobbly, &controls, 20)
        );
    }

    #[test]
    fn cutoff_lfo_moves_cutoff() {
        let mut engine = FmEngine::new(&EngineConfig {
            cutoff_lfo_hz: 4.0,
            cutoff_lfo_depth: 100,
            ..Default::default()
        })
        .unwrap();
        let controls = ControlReadings::default();
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..64 {
            engine.control_update(&controls);
            seen.insert(engine.cutoff());
        }
        assert!(seen.len() > 2);
    }

    #[test]
    fn all_notes_off_releases() {
        let mut engine = engine();
        engine.handle_message(SynthMessage::NoteOn {
            note: 60,
            velocity: 1,
        });
        engine.handle_message(SynthMessage::AllNotesOff);
        assert_eq!(engine.envelope_state(), EnvelopeState::Release);
        assert_eq!(engine.note(), None);
    }

    proptest! {
        #[test]
        fn fm_intensity_is_bounded(readings in proptest::collection::vec(0u16..=RAW_MAX, 1..200)) {
            let mut engine = engine();
            let max = (400 * 383) >> 8;
            for raw in readings {
                let controls = ControlReadings { intensity: raw, mod_speed: raw, ..ControlReadings::uniform(0) };
                engine.control_update(&controls);
                let fm = engine.fm_intensity();
                prop_assert!(fm >= 0 && fm <= max, "fm_intensity {} out of [0, {}]", fm, max);
            }
        }

        #[test]
        fn output_stays_in_eight_bit_domain(note in 24u8..108, ticks in 1usize..40) {
            let mut engine = engine();
            engine.on_note_on(note, 100);
            let out = run_ticks(&mut engine, &ControlReadings::default(), ticks);
            prop_assert!(out.iter().all(|&s| (-128..=127).contains(&s)));
        }
    }
}

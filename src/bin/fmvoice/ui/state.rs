//! Voice state published from the audio callback
//!
//! `Copy` and allocation-free so the callback can push it every buffer.

use fm_voice::{dsp::EnvelopeState, FmEngine};

#[derive(Clone, Copy, Debug)]
pub struct UiState {
    pub envelope_state: EnvelopeState,
    /// Current envelope amplitude (0-255)
    pub envelope_level: u8,
    pub fm_intensity: i32,
    pub cutoff: u8,
    pub carrier_hz: f32,
    pub modulator_hz: f32,
    pub lfo_hz: f32,
    /// Note currently held, if any
    pub note: Option<u8>,
}

impl UiState {
    pub fn capture(engine: &FmEngine) -> Self {
        Self {
            envelope_state: engine.envelope_state(),
            envelope_level: engine.envelope_level(),
            fm_intensity: engine.fm_intensity(),
            cutoff: engine.cutoff(),
            carrier_hz: engine.carrier_frequency(),
            modulator_hz: engine.modulator_frequency(),
            lfo_hz: engine.intensity_lfo_frequency(),
            note: engine.note(),
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            envelope_state: EnvelopeState::Idle,
            envelope_level: 0,
            fm_intensity: 0,
            cutoff: 0,
            carrier_hz: 0.0,
            modulator_hz: 0.0,
            lfo_hz: 0.0,
            note: None,
        }
    }
}
